mod config;
mod error;
mod routes;
mod services;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::catalog::Catalog;
use crate::services::support::FixedDelay;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("knoxengage: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = match Catalog::load(config.responsible_ai_data_path.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(error = %e, "catalog load failed");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        templates = catalog.templates.len(),
        policies = catalog.responsible_ai.policies.len(),
        "catalog loaded"
    );

    let state = state::AppState::new(catalog, Arc::new(FixedDelay(config.support_reply_delay)));
    let app = routes::app(state);

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "knoxengage listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
