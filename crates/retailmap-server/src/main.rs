mod api;
mod middleware;

use std::sync::Arc;

use retailmap_client::{GeoJsonLoader, MapboxGeocoder, RetailerLoader};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = retailmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting retailmap-server");

    let loader = GeoJsonLoader::from_config(&config)?;
    let collection = match loader.load().await {
        Ok(collection) => Some(Arc::new(collection)),
        Err(error) => {
            tracing::warn!(%error, url = %loader.url(), "retailer collection unavailable; serving without pins");
            None
        }
    };

    let geocoder = Arc::new(MapboxGeocoder::from_config(&config)?);
    let state = AppState::new(collection, geocoder, config.search_radius_mi);
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
