//! Reading history services.
//!
//! [`EntriesService`] implements both driving ports over a single
//! [`ReadingRepository`]: the write path authenticates and stores a batch
//! record by record, the read path enforces retention and then serves the
//! newest readings.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    EntriesCommand, EntriesQuery, IngestRequest, IngestResponse, ReadingRepository,
    ReadingRepositoryError,
};
use crate::domain::{AuthFailure, Authenticator, DomainError, Reading, ReadingLimit, RetentionCap};

/// Entries service implementing the ingestion and query ports.
#[derive(Clone)]
pub struct EntriesService<R> {
    repository: Arc<R>,
    authenticator: Authenticator,
    retention: RetentionCap,
}

impl<R> EntriesService<R> {
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(repository: Arc<R>, authenticator: Authenticator, retention: RetentionCap) -> Self {
        Self {
            repository,
            authenticator,
            retention,
        }
    }
}

impl<R> EntriesService<R>
where
    R: ReadingRepository,
{
    fn map_auth_failure(failure: AuthFailure) -> DomainError {
        match failure {
            AuthFailure::MissingCredential => {
                warn!("client did not pass in the api-secret header");
                DomainError::invalid_request("Client didn't pass in api-secret header")
            }
            AuthFailure::Mismatch => {
                warn!("api-secret does not match API_SECRET or API_SECRET_xDripAPS");
                DomainError::unauthorized("Authentication failed!")
            }
        }
    }

    fn map_repository_error(error: ReadingRepositoryError) -> DomainError {
        match error {
            ReadingRepositoryError::Connection { message } => {
                DomainError::service_unavailable(format!("reading store unavailable: {message}"))
            }
            ReadingRepositoryError::Query { message } => {
                DomainError::internal(format!("reading store error: {message}"))
            }
        }
    }

    async fn enforce_retention(&self) {
        match self.repository.trim_to_capacity(self.retention).await {
            Ok(0) => {}
            Ok(removed) => debug!(removed, cap = self.retention.get(), "trimmed reading history"),
            Err(err) => warn!(error = %err, "retention trim failed; serving untrimmed history"),
        }
    }
}

#[async_trait]
impl<R> EntriesCommand for EntriesService<R>
where
    R: ReadingRepository,
{
    async fn ingest(&self, request: IngestRequest) -> Result<IngestResponse, DomainError> {
        let IngestRequest { secret, records } = request;
        self.verify_secret(secret).await?;

        let submitted = records.len();
        let mut response = IngestResponse::default();
        for (index, record) in records.into_iter().enumerate() {
            let reading = match Reading::from_candidate(&record) {
                Ok(reading) => reading,
                Err(defect) => {
                    warn!(index, %defect, "skipping invalid reading");
                    response.invalid += 1;
                    continue;
                }
            };
            if let Err(err) = self.repository.insert(&reading).await {
                warn!(index, error = %err, "reading was not stored");
                response.failed += 1;
                continue;
            }
            response.accepted.push(record);
        }

        info!(
            submitted,
            accepted = response.accepted.len(),
            invalid = response.invalid,
            failed = response.failed,
            "ingested reading batch"
        );
        Ok(response)
    }

    async fn verify_secret(&self, secret: Option<String>) -> Result<(), DomainError> {
        self.authenticator
            .authenticate(secret.as_deref())
            .map_err(Self::map_auth_failure)
    }
}

#[async_trait]
impl<R> EntriesQuery for EntriesService<R>
where
    R: ReadingRepository,
{
    async fn recent(&self, limit: Option<ReadingLimit>) -> Result<Vec<Reading>, DomainError> {
        self.enforce_retention().await;
        let readings = self
            .repository
            .query_recent(limit)
            .await
            .map_err(Self::map_repository_error)?;
        info!(
            returned = readings.len(),
            limit = limit.map(ReadingLimit::get),
            "served reading history"
        );
        Ok(readings)
    }
}

#[cfg(test)]
#[path = "entries_service_tests.rs"]
mod tests;
