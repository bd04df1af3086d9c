//! Tests for the entries service.

use std::sync::Arc;

use mockall::Sequence;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{FixtureReadingRepository, MockReadingRepository};
use crate::domain::{ErrorCode, SharedSecrets};

const SECRET: &str = "Relay-Secret";

#[fixture]
fn authenticator() -> Authenticator {
    let secrets = SharedSecrets::new(None, Some(SECRET.to_owned())).expect("secret configured");
    Authenticator::new(Arc::new(secrets))
}

fn cap(rows: u32) -> RetentionCap {
    RetentionCap::new(rows).expect("non-zero cap")
}

fn make_service<R>(repo: R, authenticator: Authenticator) -> EntriesService<R> {
    EntriesService::new(Arc::new(repo), authenticator, cap(336))
}

fn record(device: &str, date: i64, sgv: i64) -> Value {
    json!({
        "device": device,
        "date": date,
        "dateString": format!("reading at {date}"),
        "sgv": sgv,
        "direction": "Flat",
        "type": "sgv"
    })
}

fn request(secret: Option<&str>, records: Vec<Value>) -> IngestRequest {
    IngestRequest {
        secret: secret.map(str::to_owned),
        records,
    }
}

#[rstest]
#[case(None, ErrorCode::InvalidRequest)]
#[case(Some("wrong"), ErrorCode::Unauthorized)]
#[tokio::test]
async fn ingest_rejects_bad_credentials_before_writing(
    authenticator: Authenticator,
    #[case] secret: Option<&str>,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockReadingRepository::new();
    repo.expect_insert().never();

    let service = make_service(repo, authenticator);
    let error = service
        .ingest(request(secret, vec![record("a", 100, 120)]))
        .await
        .expect_err("authentication failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn ingest_accepts_secret_case_insensitively(authenticator: Authenticator) {
    let mut repo = MockReadingRepository::new();
    repo.expect_insert().times(1).returning(|_| Ok(()));

    let service = make_service(repo, authenticator);
    let response = service
        .ingest(request(Some("RELAY-SECRET"), vec![record("a", 100, 120)]))
        .await
        .expect("authenticated");
    assert_eq!(response.accepted.len(), 1);
}

#[rstest]
#[case(None, Some(ErrorCode::InvalidRequest))]
#[case(Some("nope"), Some(ErrorCode::Unauthorized))]
#[case(Some("relay-secret"), None)]
#[tokio::test]
async fn verify_secret_touches_no_storage(
    authenticator: Authenticator,
    #[case] secret: Option<&str>,
    #[case] expected: Option<ErrorCode>,
) {
    let service = make_service(MockReadingRepository::new(), authenticator);
    let outcome = service.verify_secret(secret.map(str::to_owned)).await;
    assert_eq!(outcome.err().map(|err| err.code()), expected);
}

#[rstest]
#[tokio::test]
async fn ingest_skips_records_the_store_refuses(authenticator: Authenticator) {
    let mut repo = MockReadingRepository::new();
    repo.expect_insert().times(4).returning(|reading| {
        if reading.device == "flaky" {
            Err(ReadingRepositoryError::query("disk I/O error"))
        } else {
            Ok(())
        }
    });

    let records = vec![
        record("one", 100, 101),
        record("flaky", 200, 102),
        record("three", 300, 103),
        record("four", 400, 104),
    ];
    let expected = vec![records[0].clone(), records[2].clone(), records[3].clone()];

    let service = make_service(repo, authenticator);
    let response = service
        .ingest(request(Some(SECRET), records))
        .await
        .expect("batch processed");

    assert_eq!(response.accepted, expected);
    assert_eq!(response.failed, 1);
    assert_eq!(response.invalid, 0);
}

#[rstest]
#[tokio::test]
async fn ingest_rejects_only_the_malformed_record(authenticator: Authenticator) {
    let mut malformed = record("ignored", 200, 140);
    malformed
        .as_object_mut()
        .expect("object")
        .remove("device");
    let valid = record("kept", 100, 120);

    let mut repo = MockReadingRepository::new();
    repo.expect_insert()
        .times(1)
        .withf(|reading| reading.device == "kept")
        .returning(|_| Ok(()));

    let service = make_service(repo, authenticator);
    let response = service
        .ingest(request(Some(SECRET), vec![malformed, valid.clone()]))
        .await
        .expect("batch processed");

    assert_eq!(response.accepted, vec![valid]);
    assert_eq!(response.invalid, 1);
}

#[rstest]
#[tokio::test]
async fn ingest_echoes_records_verbatim(authenticator: Authenticator) {
    let mut submitted = record("a", 100, 120);
    submitted["sysTime"] = json!("2023-11-14T22:13:20Z");
    submitted["filtered"] = json!(171.5);

    let service = make_service(FixtureReadingRepository::new(), authenticator);
    let response = service
        .ingest(request(Some(SECRET), vec![submitted.clone()]))
        .await
        .expect("batch processed");

    assert_eq!(response.accepted, vec![submitted]);
}

#[rstest]
#[tokio::test]
async fn recent_trims_before_reading(authenticator: Authenticator) {
    let mut seq = Sequence::new();
    let mut repo = MockReadingRepository::new();
    repo.expect_trim_to_capacity()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|cap| cap.get() == 336)
        .returning(|_| Ok(3));
    repo.expect_query_recent()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(Vec::new()));

    let service = make_service(repo, authenticator);
    let readings = service.recent(None).await.expect("history");
    assert!(readings.is_empty());
}

#[rstest]
#[tokio::test]
async fn recent_still_serves_when_trim_fails(authenticator: Authenticator) {
    let mut repo = MockReadingRepository::new();
    repo.expect_trim_to_capacity()
        .returning(|_| Err(ReadingRepositoryError::query("database is locked")));
    repo.expect_query_recent().times(1).returning(|_| Ok(Vec::new()));

    let service = make_service(repo, authenticator);
    assert!(service.recent(None).await.is_ok());
}

#[rstest]
#[case(ReadingRepositoryError::connection("pool timed out"), ErrorCode::ServiceUnavailable)]
#[case(ReadingRepositoryError::query("malformed row"), ErrorCode::InternalError)]
#[tokio::test]
async fn recent_maps_store_errors(
    authenticator: Authenticator,
    #[case] failure: ReadingRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockReadingRepository::new();
    repo.expect_trim_to_capacity().returning(|_| Ok(0));
    repo.expect_query_recent()
        .return_once(move |_| Err(failure));

    let service = make_service(repo, authenticator);
    let error = service.recent(None).await.expect_err("store failure");
    assert_eq!(error.code(), expected);
}

#[rstest]
#[tokio::test]
async fn recent_enforces_retention_on_the_fixture(authenticator: Authenticator) {
    let repo = Arc::new(FixtureReadingRepository::new());
    let service = EntriesService::new(repo.clone(), authenticator, cap(3));
    let records = (1..=5).map(|i| record("d", i * 100, 100 + i)).collect();
    service
        .ingest(request(Some(SECRET), records))
        .await
        .expect("batch processed");

    let limit = ReadingLimit::new(2).expect("non-zero limit");
    let readings = service.recent(Some(limit)).await.expect("history");

    let dates: Vec<Option<i64>> = readings.iter().map(|r| r.date.as_integer()).collect();
    assert_eq!(dates, vec![Some(500), Some(400)]);
    assert_eq!(repo.count().await.expect("count"), 3);
}
