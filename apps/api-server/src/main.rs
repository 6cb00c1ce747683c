//! # Portal API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting portal API server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;

    match state.users.bootstrap_default_admin().await {
        Ok(Some(admin)) => tracing::warn!(
            username = %admin.username,
            "Default admin account created. Change its password after first login."
        ),
        Ok(None) => tracing::debug!("Default admin already present"),
        Err(e) => tracing::error!(error = %e, "Failed to bootstrap default admin"),
    }

    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(handlers::configure_app(state.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
