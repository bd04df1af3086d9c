//! Domain ports and supporting types for the hexagonal boundary.

mod entries_command;
mod entries_query;
mod reading_repository;

#[cfg(test)]
pub use entries_command::MockEntriesCommand;
pub use entries_command::{EntriesCommand, FixtureEntriesCommand, IngestRequest, IngestResponse};
#[cfg(test)]
pub use entries_query::MockEntriesQuery;
pub use entries_query::{EntriesQuery, FixtureEntriesQuery};
#[cfg(test)]
pub use reading_repository::MockReadingRepository;
pub use reading_repository::{
    FixtureReadingRepository, ReadingRepository, ReadingRepositoryError,
};
