//! HTTP adapter mapping for domain errors.
//!
//! The relay's clients expect plain-text error bodies, so failures render as
//! `text/plain` with the status chosen from the error code. Internal error
//! details are logged against the request trace id and replaced by a generic
//! message on the wire.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{DomainError, ErrorCode};
use crate::middleware::trace::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, DomainError>;

/// Body sent in place of internal error details.
pub const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_message(error: &DomainError) -> &str {
    if matches!(error.code(), ErrorCode::InternalError) {
        REDACTED_MESSAGE
    } else {
        error.message()
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self.code(), ErrorCode::InternalError) {
            let trace_id = TraceId::current().map(|id| id.to_string()).unwrap_or_default();
            error!(trace_id = trace_id.as_str(), message = self.message(), "internal error redacted");
        }
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(client_message(self).to_owned())
    }
}
