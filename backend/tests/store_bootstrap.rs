//! Integration tests for store preparation at startup.

use std::fs;

use glucose_relay::domain::ports::ReadingRepository;
use glucose_relay::outbound::persistence::{
    DbPool, DieselReadingRepository, PoolConfig, StoreStatus, prepare_store,
};
use rstest::rstest;

mod support;

use support::{reading, test_store};

#[rstest]
fn creates_the_data_directory_and_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let data_dir = dir.path().join("nested").join(".xDripAPS_data");

    let store = prepare_store(&data_dir, "xDripAPS.db").expect("store prepared");

    assert_eq!(store.status, StoreStatus::Created);
    assert_eq!(store.path, data_dir.join("xDripAPS.db"));
    assert!(store.path.is_file());
}

#[tokio::test]
async fn healthy_store_is_kept() {
    let ctx = test_store().await;
    ctx.repository()
        .insert(&reading("kept", 100))
        .await
        .expect("insert");

    let data_dir = ctx.store.path.parent().expect("store has a directory");
    let second = prepare_store(data_dir, "relay.db").expect("store prepared");
    assert_eq!(second.status, StoreStatus::Verified);
    assert_eq!(second.path, ctx.store.path);
    assert_eq!(ctx.repository().count().await.expect("count"), 1);
}

#[tokio::test]
async fn corrupt_store_is_recreated_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("relay.db");
    fs::write(&path, vec![b'x'; 4096]).expect("write garbage");

    let store = prepare_store(dir.path(), "relay.db").expect("store prepared");
    assert_eq!(store.status, StoreStatus::Recreated);

    let pool = DbPool::new(PoolConfig::new(store.database_url().expect("utf8 path")))
        .await
        .expect("pool builds");
    let repo = DieselReadingRepository::new(pool);
    assert_eq!(repo.count().await.expect("count"), 0);
    repo.insert(&reading("fresh", 1)).await.expect("insert");
    assert_eq!(repo.count().await.expect("count"), 1);
}

#[rstest]
fn unusable_data_directory_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"file").expect("write file");

    let result = prepare_store(&blocker.join("data"), "relay.db");
    assert!(result.is_err());
}
