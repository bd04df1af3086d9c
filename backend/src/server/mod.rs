//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use glucose_relay::Trace;
#[cfg(debug_assertions)]
use glucose_relay::doc::ApiDoc;
use glucose_relay::domain::{Authenticator, EntriesService};
use glucose_relay::inbound::http::configure_api;
use glucose_relay::inbound::http::health::{HealthState, live, ready};
use glucose_relay::inbound::http::state::HttpState;
use glucose_relay::outbound::persistence::DieselReadingRepository;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_http_state(config: ServerConfig) -> (std::net::SocketAddr, HttpState) {
    let ServerConfig {
        bind_addr,
        db_pool,
        secrets,
        retention,
    } = config;
    let repository = Arc::new(DieselReadingRepository::new(db_pool));
    let authenticator = Authenticator::new(Arc::new(secrets));
    let service = Arc::new(EntriesService::new(repository, authenticator, retention));
    (bind_addr, HttpState::new(service.clone(), service))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure_api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server and mark the relay ready.
///
/// Actix's own signal handling is replaced by `drain_on_shutdown`, so the
/// health checks report draining before in-flight uploads finish.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let (bind_addr, state) = build_http_state(config);
    let http_state = web::Data::new(state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .disable_signals()
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "relay listening");
    health_state.mark_ready();
    actix_web::rt::spawn(drain_on_shutdown(server.handle(), health_state));
    Ok(server)
}

/// Wait for SIGINT or SIGTERM, fail the health checks, then stop gracefully.
async fn drain_on_shutdown(handle: ServerHandle, health_state: web::Data<HealthState>) {
    wait_for_shutdown_signal().await;
    health_state.mark_draining();
    info!("shutdown requested; draining connections");
    handle.stop(true).await;
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                result = tokio::signal::ctrl_c() => log_signal_error(result),
                _ = terminate.recv() => {}
            }
        }
        Err(err) => {
            warn!(error = %err, "SIGTERM handler unavailable; waiting for SIGINT only");
            log_signal_error(tokio::signal::ctrl_c().await);
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    log_signal_error(tokio::signal::ctrl_c().await);
}

fn log_signal_error(result: std::io::Result<()>) {
    if let Err(err) = result {
        warn!(error = %err, "shutdown signal listener failed; stopping");
    }
}
