//! Shared helpers for the relay integration tests.
//!
//! Every test gets its own SQLite file in a temporary directory, prepared by
//! the same bootstrap `main` runs.

use glucose_relay::domain::{Numeric, Reading};
use glucose_relay::outbound::persistence::{
    DbPool, DieselReadingRepository, PoolConfig, PreparedStore, prepare_store,
};
use tempfile::TempDir;

/// A prepared store that lives as long as its temporary directory.
pub struct TestStore {
    #[expect(dead_code, reason = "Retains the temporary directory for each test")]
    pub dir: TempDir,
    pub store: PreparedStore,
    pub pool: DbPool,
}

impl TestStore {
    /// A repository over this store's pool.
    pub fn repository(&self) -> DieselReadingRepository {
        DieselReadingRepository::new(self.pool.clone())
    }
}

/// Create, migrate and pool a fresh store.
pub async fn test_store() -> TestStore {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = prepare_store(dir.path(), "relay.db").expect("store prepared");
    let url = store.database_url().expect("utf8 path").to_owned();
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
        .await
        .expect("pool builds");
    TestStore { dir, store, pool }
}

/// A complete reading with the given device and timestamp.
pub fn reading(device: &str, date: i32) -> Reading {
    Reading {
        device: device.to_owned(),
        date: Numeric::from(date),
        date_string: format!("reading at {date}"),
        sgv: Numeric::from(100),
        direction: "Flat".to_owned(),
        kind: "sgv".to_owned(),
        filtered: None,
        unfiltered: None,
        rssi: None,
        noise: None,
    }
}
