//! Driving port for the read path: the retained reading history.

use async_trait::async_trait;

use crate::domain::{DomainError, Reading, ReadingLimit};

/// Serve the most recent readings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntriesQuery: Send + Sync {
    /// Enforce retention, then return readings newest first.
    async fn recent(&self, limit: Option<ReadingLimit>) -> Result<Vec<Reading>, DomainError>;
}

/// Fixture returning an empty history.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEntriesQuery;

#[async_trait]
impl EntriesQuery for FixtureEntriesQuery {
    async fn recent(&self, _limit: Option<ReadingLimit>) -> Result<Vec<Reading>, DomainError> {
        Ok(Vec::new())
    }
}
