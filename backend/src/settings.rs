//! Relay settings loaded via OrthoConfig.
//!
//! Values come from the command line (`--data-dir`, `--port`, ...) or
//! `GLUCOSE_RELAY_*` environment variables. The shared secrets are not part
//! of this struct; they keep their historical variable names and are read by
//! [`crate::domain::SharedSecrets::from_env`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::RetentionCap;

const DEFAULT_DATA_DIR_NAME: &str = ".xDripAPS_data";
const DEFAULT_DB_FILE: &str = "xDripAPS.db";
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Errors raised when settings values are unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The retention cap must keep at least one row.
    #[error("max_rows must be greater than zero")]
    ZeroMaxRows,
    /// The bind host is not an IP address.
    #[error("host must be an IP address, got {host:?}")]
    InvalidHost {
        /// The rejected host value.
        host: String,
    },
}

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(DEFAULT_DATA_DIR_NAME)
}

/// Configuration for the relay process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GLUCOSE_RELAY")]
pub struct RelaySettings {
    /// Directory holding the SQLite store.
    pub data_dir: Option<PathBuf>,
    /// Store file name inside `data_dir`.
    pub db_file: Option<String>,
    /// Rows retained after each read.
    #[ortho_config(default = 336)]
    pub max_rows: u32,
    /// Listen address.
    pub host: Option<String>,
    /// Listen port.
    #[ortho_config(default = 5000)]
    pub port: u16,
}

impl RelaySettings {
    /// Data directory, defaulting to `$HOME/.xDripAPS_data`.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Store file name, defaulting to `xDripAPS.db`.
    #[must_use]
    pub fn db_file(&self) -> &str {
        self.db_file.as_deref().unwrap_or(DEFAULT_DB_FILE)
    }

    /// Retention cap; zero is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroMaxRows`] when `max_rows` is zero.
    pub fn retention_cap(&self) -> Result<RetentionCap, SettingsError> {
        RetentionCap::new(self.max_rows).ok_or(SettingsError::ZeroMaxRows)
    }

    /// Socket address to bind, defaulting to `0.0.0.0` on the configured port.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when `host` is not an IP
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let ip = self.host.as_deref().map_or(Ok(DEFAULT_HOST), |host| {
            host.parse().map_err(|_| SettingsError::InvalidHost {
                host: host.to_owned(),
            })
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
