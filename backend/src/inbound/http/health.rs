//! Health endpoints: liveness and readiness checks for the process supervisor.
//!
//! Readiness means startup finished, the relay is not draining, and the
//! reading store answers a row count. Liveness only fails once shutdown has
//! begun, so a supervisor stops routing uploads before connections close.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, HttpResponseBuilder, get, http::header, web};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::ReadingRepository;

/// Body of a successful readiness check.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// Rows currently held by the store, before any pending trim.
    #[schema(example = 288)]
    pub readings: u64,
}

/// Shared health state for readiness and liveness checks.
///
/// The relay starts live but not ready; `main` marks it ready once the store
/// is prepared and the listener is bound, and marks it draining when a
/// shutdown signal arrives.
pub struct HealthState {
    started: AtomicBool,
    draining: AtomicBool,
    store: Arc<dyn ReadingRepository>,
}

impl HealthState {
    /// Create a health state that consults `store` for readiness.
    #[must_use]
    pub const fn new(store: Arc<dyn ReadingRepository>) -> Self {
        Self {
            started: AtomicBool::new(false),
            draining: AtomicBool::new(false),
            store,
        }
    }

    /// Record that startup finished and the listener is bound.
    pub fn mark_ready(&self) {
        self.started.store(true, Ordering::Release);
    }

    /// Record that shutdown began; both checks fail from now on.
    pub fn mark_draining(&self) {
        self.draining.store(true, Ordering::Release);
    }

    /// Whether shutdown has begun.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Whether the relay should receive uploads, ignoring the store check.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.is_draining()
    }
}

fn health_response(mut builder: HttpResponseBuilder) -> HttpResponseBuilder {
    builder.insert_header((header::CACHE_CONTROL, "no-store"));
    builder
}

/// Readiness check: `200` with the stored row count once serving.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Relay is ready to accept readings", body = ReadinessResponse),
        (status = 503, description = "Relay is starting, draining, or cannot reach its store")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if !state.is_accepting() {
        return health_response(HttpResponse::ServiceUnavailable()).finish();
    }
    state.store.count().await.map_or_else(
        |err| {
            warn!(error = %err, "readiness check could not reach the reading store");
            health_response(HttpResponse::ServiceUnavailable()).finish()
        },
        |readings| health_response(HttpResponse::Ok()).json(ReadinessResponse { readings }),
    )
}

/// Liveness check: `200` until shutdown begins, then `503`.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Relay is alive"),
        (status = 503, description = "Relay is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    let builder = if state.is_draining() {
        HttpResponse::ServiceUnavailable()
    } else {
        HttpResponse::Ok()
    };
    health_response(builder).finish()
}
