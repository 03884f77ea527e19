use axum::http::{HeaderValue, Method};
use log::*;
use sse::Broker;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::Error;
pub use service::AppState;

mod controller;
mod error;
mod event_stream;
pub mod router;

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface().to_string();
    let port = app_state.config.port;
    let server_url = format!("{host}:{port}");

    let cors_layer = cors_layer(&app_state.config.allowed_origins);
    let broker = Arc::clone(&app_state.broker);
    let app = router::define_routes(app_state).layer(cors_layer);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(broker))
        .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring invalid CORS origin {origin}: {err}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

// Open event streams would keep graceful shutdown waiting forever, so the broker
// is closed first; every stream then ends on its own.
async fn shutdown_signal(broker: Arc<Broker>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }

    info!("Shutdown signal received, closing event streams");
    broker.shutdown();
}
