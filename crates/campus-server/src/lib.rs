//! HTTP backend for the campus smart-energy dashboard.
//!
//! # Routes
//! - `GET /solar`: synthetic daily solar yield for the first eight buildings
//! - `GET /carbon`: CO₂ avoided for the same buildings
//! - `GET /recommendations`: fixed advice list
//! - `GET /green-zones`: building locations labelled by the clustering tool
//! - `POST /analyze_region`: 6×6 grid scan of a drawn bounding box
//! - `POST /predict_solar`: DC power from the trained model, if one is loaded
//! - `GET /health`: table sizes and model status
//!
//! Any other path is served from the frontend directory.
//!
//! # Data
//! Tables and the model are loaded once by [`state::AppState::load`] and shared
//! read-only between requests.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use signal::ctrl_c;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::{error, info};

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use routes::{
    analyze_region_handler, carbon_handler, green_zones_handler, health_handler,
    predict_solar_handler, recommendations_handler, solar_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let frontend = ServeDir::new(&state.config.frontend_dir);

    Router::new()
        .route("/solar", get(solar_handler))
        .route("/carbon", get(carbon_handler))
        .route("/recommendations", get(recommendations_handler))
        .route("/green-zones", get(green_zones_handler))
        .route("/analyze_region", post(analyze_region_handler))
        .route("/predict_solar", post(predict_solar_handler))
        .route("/health", get(health_handler))
        .fallback_service(frontend)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::load(config)?;

    info!("Starting server...");
    let address = state.config.address();
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving requests")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
