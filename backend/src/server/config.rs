//! HTTP server configuration object.

use std::net::SocketAddr;

use glucose_relay::domain::RetentionCap;
use glucose_relay::domain::SharedSecrets;
use glucose_relay::outbound::persistence::DbPool;

/// Everything the server needs once startup checks have passed.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) secrets: SharedSecrets,
    pub(crate) retention: RetentionCap,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, secrets: SharedSecrets) -> Self {
        Self {
            bind_addr,
            db_pool,
            secrets,
            retention: RetentionCap::default(),
        }
    }

    /// Override the retention cap.
    #[must_use]
    pub fn with_retention(mut self, retention: RetentionCap) -> Self {
        self.retention = retention;
        self
    }
}
