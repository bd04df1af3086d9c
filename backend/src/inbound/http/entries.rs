//! Reading history HTTP handlers.
//!
//! ```text
//! GET  /api/v1/entries[?count=N]
//! POST /api/v1/entries
//! ```
//!
//! Reads are open; writes need the `api-secret` header. Posted records are
//! echoed back exactly as received, minus any the relay did not store.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ports::IngestRequest;
use crate::domain::{Numeric, Reading};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{api_secret, expect_batch, parse_count};

/// Query string accepted by the history endpoint.
///
/// `count` stays a string here so invalid values reach the relay's own
/// validation and error message.
#[derive(Debug, Deserialize)]
pub struct EntriesParams {
    /// Raw `count` value, if supplied.
    pub count: Option<String>,
}

/// One stored reading as served to the dosing controller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingResponse {
    /// Uploading device identifier.
    #[schema(example = "xDrip-DexcomG6")]
    pub device: String,
    /// Epoch timestamp in milliseconds.
    #[schema(value_type = f64, example = 1_700_000_000_000_i64)]
    pub date: Numeric,
    /// Timestamp as rendered by the uploader.
    pub date_string: String,
    /// Sensor glucose value.
    #[schema(value_type = f64, example = 120)]
    pub sgv: Numeric,
    /// Trend arrow name.
    #[schema(example = "Flat")]
    pub direction: String,
    /// Record type, serialised as `type`.
    #[serde(rename = "type")]
    #[schema(example = "sgv")]
    pub kind: String,
    /// Filtered raw sensor value.
    #[schema(value_type = Option<f64>)]
    pub filtered: Option<Numeric>,
    /// Unfiltered raw sensor value.
    #[schema(value_type = Option<f64>)]
    pub unfiltered: Option<Numeric>,
    /// Signal strength.
    #[schema(value_type = Option<f64>)]
    pub rssi: Option<Numeric>,
    /// Sensor noise level.
    #[schema(value_type = Option<f64>)]
    pub noise: Option<Numeric>,
    /// Same value as `sgv`, kept for controllers that read this key.
    #[schema(value_type = f64, example = 120)]
    pub glucose: Numeric,
}

impl From<Reading> for ReadingResponse {
    fn from(value: Reading) -> Self {
        Self {
            device: value.device,
            date: value.date,
            date_string: value.date_string,
            sgv: value.sgv,
            direction: value.direction,
            kind: value.kind,
            filtered: value.filtered,
            unfiltered: value.unfiltered,
            rssi: value.rssi,
            noise: value.noise,
            glucose: value.sgv,
        }
    }
}

/// Return the retained readings, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/entries",
    description = "Trim the history to the retention cap, then return readings newest first.",
    params(
        ("count" = Option<u32>, Query, description = "Maximum number of readings to return")
    ),
    responses(
        (status = 200, description = "Readings, newest first", body = [ReadingResponse]),
        (status = 400, description = "count is not a positive integer", body = String, content_type = "text/plain"),
        (status = 503, description = "Reading store unavailable", body = String, content_type = "text/plain")
    ),
    tags = ["entries"],
    operation_id = "listEntries"
)]
#[get("/entries")]
pub async fn list_entries(
    state: web::Data<HttpState>,
    params: web::Query<EntriesParams>,
) -> ApiResult<HttpResponse> {
    let limit = parse_count(params.count.as_deref())?;
    let readings = state.history.recent(limit).await?;
    let body: Vec<ReadingResponse> = readings.into_iter().map(ReadingResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Store a batch of readings.
#[utoipa::path(
    post,
    path = "/api/v1/entries",
    description = "Store each valid reading. The response echoes the readings that were stored.",
    params(
        ("api-secret" = String, Header, description = "Shared secret, compared case-insensitively")
    ),
    request_body(content = Vec<serde_json::Value>, description = "Array of readings"),
    responses(
        (status = 200, description = "Stored readings, as submitted", body = Vec<serde_json::Value>),
        (status = 400, description = "Missing api-secret header or body is not an array", body = String, content_type = "text/plain"),
        (status = 401, description = "Secret does not match", body = String, content_type = "text/plain")
    ),
    tags = ["entries"],
    security(("ApiSecret" = [])),
    operation_id = "createEntries"
)]
#[post("/entries")]
pub async fn create_entries(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let secret = api_secret(&req);
    // Authenticate before inspecting the body shape.
    state.entries.verify_secret(secret.clone()).await?;
    let records = expect_batch(payload.into_inner())?;
    let outcome = state
        .entries
        .ingest(IngestRequest { secret, records })
        .await?;
    Ok(HttpResponse::Ok().json(outcome.accepted))
}
