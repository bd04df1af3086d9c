//! Port for the bounded store of CGM readings.
//!
//! The [`ReadingRepository`] trait is the only persistence contract in the
//! relay. Adapters must keep physical insertion order available, because the
//! retention trim removes the oldest *inserted* rows, not the oldest
//! timestamps.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Reading, ReadingLimit, RetentionCap};

/// Errors raised by reading repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadingRepositoryError {
    /// Repository connection could not be established.
    #[error("reading repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("reading repository query failed: {message}")]
    Query {
        /// Adapter-supplied detail.
        message: String,
    },
}

impl ReadingRepositoryError {
    /// Create a connection error with the given message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for reading storage, retention and retrieval.
///
/// # Concurrency
///
/// All operations may run concurrently from different requests. A trim
/// followed by a read is two steps; an insert landing in between may or may
/// not be visible to the read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadingRepository: Send + Sync {
    /// Append one reading as a new row.
    ///
    /// Fails only on storage faults. Business validation happens before a
    /// reading reaches the store.
    async fn insert(&self, reading: &Reading) -> Result<(), ReadingRepositoryError>;

    /// Delete the oldest-inserted rows so at most `cap` remain.
    ///
    /// Returns the number of rows removed. Running it twice without an
    /// intervening insert removes nothing the second time.
    async fn trim_to_capacity(&self, cap: RetentionCap) -> Result<u64, ReadingRepositoryError>;

    /// Return readings newest first by timestamp, optionally bounded.
    ///
    /// Readings sharing a timestamp come back most recently inserted first.
    async fn query_recent(
        &self,
        limit: Option<ReadingLimit>,
    ) -> Result<Vec<Reading>, ReadingRepositoryError>;

    /// Number of stored readings.
    async fn count(&self) -> Result<u64, ReadingRepositoryError>;
}

/// In-memory implementation for tests and local runs without SQLite.
///
/// Keeps readings in insertion order, which doubles as the row identity the
/// retention trim relies on.
#[derive(Debug, Default)]
pub struct FixtureReadingRepository {
    rows: Mutex<Vec<Reading>>,
}

impl FixtureReadingRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<Reading>>, ReadingRepositoryError> {
        self.rows
            .lock()
            .map_err(|_| ReadingRepositoryError::query("fixture store lock poisoned"))
    }
}

#[async_trait]
impl ReadingRepository for FixtureReadingRepository {
    async fn insert(&self, reading: &Reading) -> Result<(), ReadingRepositoryError> {
        self.rows()?.push(reading.clone());
        Ok(())
    }

    async fn trim_to_capacity(&self, cap: RetentionCap) -> Result<u64, ReadingRepositoryError> {
        let mut rows = self.rows()?;
        let keep = usize::try_from(cap.get()).unwrap_or(usize::MAX);
        let excess = rows.len().saturating_sub(keep);
        rows.drain(..excess);
        Ok(u64::try_from(excess).unwrap_or(u64::MAX))
    }

    async fn query_recent(
        &self,
        limit: Option<ReadingLimit>,
    ) -> Result<Vec<Reading>, ReadingRepositoryError> {
        let rows = self.rows()?;
        // Reverse first so the stable sort keeps later inserts ahead on ties.
        let mut newest: Vec<Reading> = rows.iter().rev().cloned().collect();
        newest.sort_by(|lhs, rhs| rhs.date.value().total_cmp(&lhs.date.value()));
        if let Some(max) = limit {
            newest.truncate(usize::try_from(max.get()).unwrap_or(usize::MAX));
        }
        Ok(newest)
    }

    async fn count(&self) -> Result<u64, ReadingRepositoryError> {
        Ok(u64::try_from(self.rows()?.len()).unwrap_or(u64::MAX))
    }
}
