//! Async connection pool for the SQLite reading store.
//!
//! SQLite connections are blocking, so each pooled connection is a
//! `diesel-async` [`SyncConnectionWrapper`] that runs statements on the tokio
//! blocking pool. `bb8` hands connections out to request handlers.
//!
//! Every connection is opened with `journal_mode=WAL` and a `busy_timeout`,
//! so readers do not block the writer and concurrent writers wait for the
//! lock instead of failing with `SQLITE_BUSY`.

use std::time::Duration;

use diesel::{ConnectionError, ConnectionResult, SqliteConnection};
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

/// Async SQLite connection type handed out by the pool.
pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

/// Milliseconds a connection waits on a locked database before giving up.
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout {
        /// Pool-supplied detail.
        message: String,
    },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build {
        /// Pool-supplied detail.
        message: String,
    },
}

impl PoolError {
    /// Create a checkout error with the given message.
    #[must_use]
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    #[must_use]
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the store connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use glucose_relay::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("/var/lib/relay/xDripAPS.db")
///     .with_max_size(2)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_url(), "/var/lib/relay/xDripAPS.db");
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Create a configuration for the SQLite file at `database_url`.
    ///
    /// Defaults:
    /// - `max_size`: 4 connections
    /// - `min_idle`: 1 connection
    /// - `connection_timeout`: 10 seconds
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 4,
            min_idle: Some(1),
            connection_timeout: Duration::from_secs(10),
        }
    }

    /// Set the maximum number of connections in the pool.
    #[must_use]
    pub const fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    #[must_use]
    pub const fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the connection checkout timeout.
    #[must_use]
    pub const fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Open a connection and apply the per-connection pragmas.
fn establish_with_pragmas(url: &str) -> BoxFuture<'_, ConnectionResult<AsyncSqliteConnection>> {
    async move {
        let mut conn = AsyncSqliteConnection::establish(url).await?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA journal_mode = WAL;"
        ))
        .await
        .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    }
    .boxed()
}

/// Async connection pool over the SQLite store.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncSqliteConnection>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the initial connections cannot be
    /// opened, for example when the data directory is not writable.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(establish_with_pragmas);
        let manager = AsyncDieselConnectionManager::<AsyncSqliteConnection>::new_with_config(
            config.database_url,
            manager_config,
        );

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncSqliteConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_config_default_values() {
        let config = PoolConfig::new("relay.db");

        assert_eq!(config.database_url(), "relay.db");
        assert_eq!(config.max_size, 4);
        assert_eq!(config.min_idle, Some(1));
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
    }

    #[rstest]
    fn pool_config_builder_pattern() {
        let config = PoolConfig::new("relay.db")
            .with_max_size(1)
            .with_min_idle(None)
            .with_connection_timeout(Duration::from_secs(2));

        assert_eq!(config.max_size, 1);
        assert_eq!(config.min_idle, None);
        assert_eq!(config.connection_timeout, Duration::from_secs(2));
    }

    #[rstest]
    fn pool_error_display() {
        assert!(
            PoolError::checkout("timed out")
                .to_string()
                .contains("timed out")
        );
        assert!(
            PoolError::build("unable to open database file")
                .to_string()
                .contains("unable to open")
        );
    }

    #[tokio::test]
    async fn connections_use_write_ahead_logging() {
        use diesel::sql_types::Text;
        use diesel_async::RunQueryDsl;

        #[derive(diesel::QueryableByName)]
        struct JournalMode {
            #[diesel(sql_type = Text)]
            journal_mode: String,
        }

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pool.db");
        let pool = DbPool::new(PoolConfig::new(path.to_string_lossy()).with_max_size(1))
            .await
            .expect("pool builds");
        let mut conn = pool.get().await.expect("connection");
        let mode: JournalMode = diesel::sql_query("PRAGMA journal_mode")
            .get_result(&mut *conn)
            .await
            .expect("pragma query");
        assert_eq!(mode.journal_mode, "wal");
    }
}
