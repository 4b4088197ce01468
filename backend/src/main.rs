//! Service entry-point: loads configuration, wires the user store and serves
//! the REST endpoints, health probes and OpenAPI docs.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use apid::inbound::http::health::HealthState;
use apid::settings::ServiceSettings;
use server::{ServerConfig, build_user_directory, create_server};

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

    let settings =
        ServiceSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let users = build_user_directory(&settings).await?;
    let bind_addr = settings.bind_addr();
    info!(host = %bind_addr.0, port = bind_addr.1, "starting user directory service");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, ServerConfig::new(bind_addr, users))?;
    server.await
}
