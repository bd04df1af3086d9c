//! Relay entry-point: loads settings, prepares the store and serves HTTP.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use glucose_relay::domain::SharedSecrets;
use glucose_relay::inbound::http::health::HealthState;
use glucose_relay::outbound::persistence::{
    DbPool, DieselReadingRepository, PoolConfig, prepare_store,
};
use glucose_relay::settings::RelaySettings;

use server::{ServerConfig, create_server};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = RelaySettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load relay settings: {err}"))?;
    let secrets = SharedSecrets::from_env().wrap_err("shared secret configuration")?;
    info!(
        primary = secrets.has_primary(),
        application = secrets.has_application(),
        "shared secrets configured"
    );
    let retention = settings.retention_cap()?;
    let bind_addr = settings.bind_addr()?;

    let store = prepare_store(&settings.data_dir(), settings.db_file())
        .wrap_err("failed to prepare the reading store")?;
    let pool = DbPool::new(PoolConfig::new(store.database_url()?))
        .await
        .wrap_err("failed to open the reading store")?;

    let health_state = web::Data::new(HealthState::new(Arc::new(DieselReadingRepository::new(
        pool.clone(),
    ))));
    let config = ServerConfig::new(bind_addr, pool, secrets).with_retention(retention);
    let server = create_server(health_state, config)?;
    info!(max_rows = retention.get(), "relay started");
    server.await?;
    Ok(())
}
