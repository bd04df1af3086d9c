//! SQLite persistence adapters using Diesel ORM.
//!
//! The relay keeps a single table of readings. This module provides:
//!
//! - [`prepare_store`]: synchronous startup work (directory, integrity check,
//!   migrations) that must finish before the pool opens the file.
//! - [`DbPool`]: a `bb8` pool of `diesel-async` wrapped SQLite connections.
//! - [`DieselReadingRepository`]: the `ReadingRepository` adapter.
//!
//! Diesel row structs (`models`) and the table definition (`schema`) stay
//! private to this module.
//!
//! # Example
//!
//! ```no_run
//! use glucose_relay::outbound::persistence::{
//!     DbPool, DieselReadingRepository, PoolConfig, prepare_store,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = prepare_store(std::path::Path::new("/var/lib/relay"), "xDripAPS.db")?;
//! let pool = DbPool::new(PoolConfig::new(store.database_url()?)).await?;
//! let repo = DieselReadingRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod diesel_reading_repository;
mod models;
mod pool;
mod schema;

pub use bootstrap::{BootstrapError, MIGRATIONS, PreparedStore, StoreStatus, prepare_store};
pub use diesel_reading_repository::DieselReadingRepository;
pub use pool::{AsyncSqliteConnection, BUSY_TIMEOUT_MS, DbPool, PoolConfig, PoolError};
