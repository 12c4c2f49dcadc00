use std::sync::Arc;

use anyhow::Context as _;
use axum::{routing::get, Router};
use tera::Tera;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use modemviz::error::SetupError;
use modemviz::state::{AppState, Config};
use modemviz::{fetcher, handlers, poller};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("modemviz=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    info!("validating router at {}", config.host);

    // Same split the operator would see in an installer dialog: a
    // connection problem and a bad address need different fixes.
    if let Err(err) = fetcher::probe(&config.host).await {
        match &err {
            SetupError::CannotConnect { host } => {
                error!("cannot connect to {}; is the modem reachable?", host)
            }
            SetupError::InvalidHost { host, reason } => {
                error!("invalid host {:?}: {}", host, reason)
            }
        }
        return Err(err.into());
    }

    let tera = Tera::new("templates/**/*.html").context("parsing templates")?;
    let state = Arc::new(AppState::new(tera, config.clone()));

    tokio::spawn(poller::run(state.clone()));

    let app = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/api/status", get(handlers::api_status))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding {}", config.bind_address))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
