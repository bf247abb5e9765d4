//! Directory server entry-point: loads settings, picks storage and serves the
//! REST API with its OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use staff_directory::inbound::http::health::HealthState;
use staff_directory::inbound::http::internal_key::InternalApiKey;
use staff_directory::inbound::http::session_config::{BuildMode, session_settings};
use staff_directory::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use staff_directory::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let config = build_server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    server.await.wrap_err("server terminated with an error")
}

async fn build_server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let session = session_settings(
        settings.jwt_secret.as_deref(),
        settings.token_ttl_hours,
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("invalid token settings")?;
    if session.ephemeral {
        warn!("no JWT secret configured; using a temporary secret (dev only)");
    }
    info!(
        fingerprint = %session.fingerprint(),
        ttl_hours = settings.token_ttl_hours,
        "token signing configured"
    );

    let internal_key = InternalApiKey::new(settings.internal_api_key.as_deref());
    if !internal_key.is_enabled() {
        warn!("no internal API key configured; /internal/v1 rejects every request");
    }

    let config = ServerConfig::new(bind_addr, session, internal_key);
    let Some(database_url) = settings.database_url() else {
        warn!("no database configured; data lives in memory and is lost on restart");
        return Ok(config);
    };

    run_migrations(database_url)
        .await
        .wrap_err("database migrations failed")?;
    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections),
    )
    .await
    .wrap_err("failed to build database pool")?;
    Ok(config.with_db_pool(pool))
}
