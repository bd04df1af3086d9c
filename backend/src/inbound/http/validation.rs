//! Shared request parsing helpers for the entries endpoints.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, QueryPayloadError};
use serde_json::Value;

use crate::domain::{DomainError, ReadingLimit};

/// Header carrying the caller's shared secret.
pub const API_SECRET_HEADER: &str = "api-secret";

/// Read the shared secret header, if present.
///
/// Header names match case-insensitively. A value that is not valid UTF-8 is
/// kept lossily so it fails authentication instead of reading as missing.
pub(crate) fn api_secret(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(API_SECRET_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Parse the optional `count` query parameter.
pub(crate) fn parse_count(raw: Option<&str>) -> Result<Option<ReadingLimit>, DomainError> {
    raw.map(|value| {
        value
            .parse::<ReadingLimit>()
            .map_err(|err| DomainError::invalid_request(err.to_string()))
    })
    .transpose()
}

/// Require the request body to be a JSON array of records.
pub(crate) fn expect_batch(body: Value) -> Result<Vec<Value>, DomainError> {
    match body {
        Value::Array(records) => Ok(records),
        _ => Err(DomainError::invalid_request(
            "Request body must be a JSON array of entries",
        )),
    }
}

/// Render JSON extractor failures as plain-text `400` responses.
#[must_use]
pub fn invalid_json(err: &JsonPayloadError) -> actix_web::Error {
    DomainError::invalid_request(format!("Invalid JSON body: {err}")).into()
}

/// Render query string failures as plain-text `400` responses.
#[must_use]
pub fn invalid_query(err: &QueryPayloadError) -> actix_web::Error {
    DomainError::invalid_request(format!("Invalid query string: {err}")).into()
}
