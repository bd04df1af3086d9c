//! Secret verification endpoint used by uploaders to test their settings.
//!
//! ```text
//! GET /api/v1/experiments/test
//! ```

use actix_web::{HttpRequest, HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::api_secret;

/// Body returned when the secret checks out.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always `ok`.
    #[schema(example = "ok")]
    pub status: &'static str,
}

/// Confirm that the caller's `api-secret` is accepted.
#[utoipa::path(
    get,
    path = "/api/v1/experiments/test",
    params(
        ("api-secret" = String, Header, description = "Shared secret, compared case-insensitively")
    ),
    responses(
        (status = 200, description = "Secret accepted", body = StatusResponse),
        (status = 400, description = "Missing api-secret header", body = String, content_type = "text/plain"),
        (status = 401, description = "Secret does not match", body = String, content_type = "text/plain")
    ),
    tags = ["entries"],
    security(("ApiSecret" = [])),
    operation_id = "testSecret"
)]
#[get("/experiments/test")]
pub async fn test_secret(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    state.entries.verify_secret(api_secret(&req)).await?;
    Ok(HttpResponse::Ok().json(StatusResponse { status: "ok" }))
}
