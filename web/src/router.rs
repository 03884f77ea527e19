use crate::controller::{health_check_controller, item_controller};
use crate::event_stream::handler as event_stream_handler;
use crate::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(event_stream_routes(app_state.clone()))
        .merge(health_routes())
        .merge(item_routes(app_state))
}

fn event_stream_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/events", get(event_stream_handler::events_stream))
        .route("/events/status", get(event_stream_handler::status))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn item_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/items", post(item_controller::create))
        .route("/items", get(item_controller::index))
        .route("/items", delete(item_controller::delete_many))
        .route("/items/reorder", post(item_controller::reorder))
        .route("/items/:id", get(item_controller::read))
        .route("/items/:id", put(item_controller::update))
        .route("/items/:id", delete(item_controller::delete))
        .with_state(app_state)
}
