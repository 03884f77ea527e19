use log::*;
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting shopping list server ({} environment)",
        config.runtime_env()
    );

    let app_state = AppState::new(config);

    if let Err(err) = web::init_server(app_state).await {
        error!("Server stopped unexpectedly: {err}");
        std::process::exit(1);
    }

    info!("Server shut down cleanly");
}
