//! Backend entry-point: wires the shelf engine, background workers, and REST
//! endpoints.

mod server;

use actix_web::web;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use ortho_config::OrthoConfig;
use server::{Engine, ShelfSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ShelfSettings::load().map_err(std::io::Error::other)?;
    let engine = Engine::new(&settings);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let background = engine.spawn_background(shutdown_rx);
    info!(
        workers = settings.workers,
        sweep_interval_ms = settings.sweep_interval_ms,
        "background tasks started"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &engine, settings.bind_addr())?;
    let result = server.await;

    // Fail liveness first so orchestrators stop routing, then drain tasks.
    health_state.mark_unhealthy();
    if shutdown_tx.send(true).is_err() {
        warn!("background tasks already stopped");
    }
    for handle in background {
        if let Err(e) = handle.await {
            warn!(error = %e, "background task ended abnormally");
        }
    }
    result
}
