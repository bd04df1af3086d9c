//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the entries endpoints, the secret check and the
//! health checks, plus the `api-secret` header scheme that guards writes.
//! Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::entries::ReadingResponse;
use crate::inbound::http::experiments::StatusResponse;
use crate::inbound::http::health::ReadinessResponse;

/// Add the shared-secret header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiSecret",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "api-secret",
                "Shared secret matching API_SECRET or API_SECRET_xDripAPS.",
            ))),
        );
    }
}

/// OpenAPI document for the relay.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Glucose relay API",
        description = "Accepts CGM readings from an uploader and serves the recent history."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::entries::list_entries,
        crate::inbound::http::entries::create_entries,
        crate::inbound::http::experiments::test_secret,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ReadingResponse, StatusResponse, ReadinessResponse)),
    tags(
        (name = "entries", description = "Reading ingestion and history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
