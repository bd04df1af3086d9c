//! HTTP inbound adapter exposing the relay's REST endpoints.

pub mod entries;
pub mod error;
pub mod experiments;
pub mod health;
pub mod state;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

use self::entries::{create_entries, list_entries};
use self::experiments::test_secret;
use self::validation::{invalid_json, invalid_query};

/// Largest accepted upload body. Backfills after a phone outage can carry a
/// day of readings in one request.
pub const JSON_BODY_LIMIT: usize = 1024 * 1024;

/// Register the `/api/v1` scope and its extractor configuration.
///
/// Bodies are parsed as JSON whatever their `Content-Type`, because
/// uploaders do not always send one.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use glucose_relay::inbound::http::configure_api;
///
/// let _app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(
                web::JsonConfig::default()
                    .limit(JSON_BODY_LIMIT)
                    .content_type_required(false)
                    .error_handler(|err, _req| invalid_json(&err)),
            )
            .app_data(web::QueryConfig::default().error_handler(|err, _req| invalid_query(&err)))
            .service(list_entries)
            .service(create_entries)
            .service(test_secret),
    );
}
