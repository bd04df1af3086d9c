//! Driving port for the write path: batch ingestion of readings.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

/// One authenticated ingestion request.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestRequest {
    /// Secret supplied by the caller, if any.
    pub secret: Option<String>,
    /// Candidate records in submission order.
    pub records: Vec<Value>,
}

/// Outcome of an ingestion batch.
///
/// `accepted` is the in-order subsequence of the submitted records that were
/// durably stored, echoed exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestResponse {
    /// Stored records, in submission order.
    pub accepted: Vec<Value>,
    /// Records dropped by per-record validation.
    pub invalid: usize,
    /// Valid records the store refused.
    pub failed: usize,
}

/// Ingest a batch of candidate readings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntriesCommand: Send + Sync {
    /// Authenticate, validate each record, store the valid ones.
    ///
    /// Authentication failures are returned as errors before any write.
    /// Per-record problems never fail the call; they only shrink
    /// [`IngestResponse::accepted`].
    async fn ingest(&self, request: IngestRequest) -> Result<IngestResponse, DomainError>;

    /// Check a caller's secret without writing anything.
    async fn verify_secret(&self, secret: Option<String>) -> Result<(), DomainError>;
}

/// Fixture that trusts every caller and stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEntriesCommand;

#[async_trait]
impl EntriesCommand for FixtureEntriesCommand {
    async fn ingest(&self, _request: IngestRequest) -> Result<IngestResponse, DomainError> {
        Ok(IngestResponse::default())
    }

    async fn verify_secret(&self, _secret: Option<String>) -> Result<(), DomainError> {
        Ok(())
    }
}
