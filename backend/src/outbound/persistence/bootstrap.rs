//! Store preparation run once before the server starts.
//!
//! Creates the data directory, checks an existing store with
//! `PRAGMA integrity_check` and replaces it when the check fails or the file
//! is not a database at all, then applies the embedded migrations. Recovery
//! discards every stored reading; the uploader refills the history within a
//! day.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{info, warn};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Suffixes of the files SQLite keeps next to a WAL-mode database.
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// What bootstrap found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No store existed; a new one was created.
    Created,
    /// The existing store passed the integrity check.
    Verified,
    /// The existing store was corrupt and has been replaced.
    Recreated,
}

/// A store ready to be pooled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStore {
    /// Location of the SQLite file.
    pub path: PathBuf,
    /// Outcome of the integrity check.
    pub status: StoreStatus,
}

impl PreparedStore {
    /// The store path as a connection URL.
    pub fn database_url(&self) -> Result<&str, BootstrapError> {
        path_to_url(&self.path)
    }
}

/// Errors raised while preparing the store.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The data directory could not be created.
    #[error("failed to create data directory {path}: {source}")]
    DataDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// A corrupt store could not be removed.
    #[error("failed to remove corrupt store {path}: {source}")]
    Remove {
        /// Store file that could not be removed.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The store path is not valid UTF-8.
    #[error("store path is not valid UTF-8: {path}")]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
    },
    /// SQLite refused to open the store.
    #[error("failed to open store {path}: {message}")]
    Open {
        /// Store file being opened.
        path: PathBuf,
        /// SQLite error text.
        message: String,
    },
    /// Applying the schema failed.
    #[error("failed to migrate store {path}: {message}")]
    Migration {
        /// Store file being migrated.
        path: PathBuf,
        /// Migration error text.
        message: String,
    },
}

#[derive(QueryableByName)]
struct IntegrityRow {
    #[diesel(sql_type = Text)]
    integrity_check: String,
}

fn path_to_url(path: &Path) -> Result<&str, BootstrapError> {
    path.to_str().ok_or_else(|| BootstrapError::InvalidPath {
        path: path.to_path_buf(),
    })
}

/// Run the integrity check, returning the first problem SQLite reports.
fn integrity_problem(url: &str) -> Option<String> {
    let mut conn = match SqliteConnection::establish(url) {
        Ok(conn) => conn,
        Err(err) => return Some(err.to_string()),
    };
    match diesel::sql_query("PRAGMA integrity_check").load::<IntegrityRow>(&mut conn) {
        Ok(rows) => match rows.as_slice() {
            [row] if row.integrity_check == "ok" => None,
            [first, ..] => Some(first.integrity_check.clone()),
            [] => Some("integrity check returned no rows".to_owned()),
        },
        Err(err) => Some(err.to_string()),
    }
}

fn remove_store(path: &Path) -> Result<(), BootstrapError> {
    fs::remove_file(path).map_err(|source| BootstrapError::Remove {
        path: path.to_path_buf(),
        source,
    })?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        match fs::remove_file(&sidecar) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(BootstrapError::Remove {
                    path: PathBuf::from(sidecar),
                    source,
                });
            }
        }
    }
    Ok(())
}

fn migrate(path: &Path, url: &str) -> Result<(), BootstrapError> {
    let mut conn = SqliteConnection::establish(url).map_err(|err| BootstrapError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| BootstrapError::Migration {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied store migrations");
    }
    Ok(())
}

/// Prepare `data_dir/file_name` for use.
///
/// # Errors
///
/// Fails when the directory cannot be created, a corrupt store cannot be
/// removed, or the schema cannot be applied. A corrupt store on its own is
/// not an error.
///
/// # Examples
/// ```
/// use glucose_relay::outbound::persistence::{StoreStatus, prepare_store};
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let store = prepare_store(dir.path(), "relay.db").expect("store prepared");
/// assert_eq!(store.status, StoreStatus::Created);
/// ```
pub fn prepare_store(data_dir: &Path, file_name: &str) -> Result<PreparedStore, BootstrapError> {
    fs::create_dir_all(data_dir).map_err(|source| BootstrapError::DataDir {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let path = data_dir.join(file_name);
    let url = path_to_url(&path)?;

    let status = if path.exists() {
        match integrity_problem(url) {
            None => StoreStatus::Verified,
            Some(problem) => {
                warn!(
                    path = %path.display(),
                    problem = %problem,
                    "store failed integrity check; recreating"
                );
                remove_store(&path)?;
                StoreStatus::Recreated
            }
        }
    } else {
        StoreStatus::Created
    };

    migrate(&path, url)?;
    info!(path = %path.display(), ?status, "store ready");
    Ok(PreparedStore { path, status })
}
