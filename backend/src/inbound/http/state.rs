//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! the domain ports and stay testable without SQLite.

use std::sync::Arc;

use crate::domain::ports::{EntriesCommand, EntriesQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Write path: authenticated batch ingestion.
    pub entries: Arc<dyn EntriesCommand>,
    /// Read path: retained history.
    pub history: Arc<dyn EntriesQuery>,
}

impl HttpState {
    /// Construct state from the two entries ports.
    #[must_use]
    pub const fn new(entries: Arc<dyn EntriesCommand>, history: Arc<dyn EntriesQuery>) -> Self {
        Self { entries, history }
    }
}
