use crate::{AppState, Error};
use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::Stream;
use log::*;
use sse::adapter::StreamAdapter;
use std::convert::Infallible;
use tokio::sync::mpsc;

/// Frames rendered but not yet written to the socket, per connection.
const FRAME_BUFFER: usize = 16;

/// GET a long-lived event stream that receives one frame per published command.
///
/// Answers 503 without writing any frame when every subscription slot is taken.
pub(crate) async fn events_stream(
    State(app_state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    debug!("Establishing event stream");

    let mut adapter = StreamAdapter::new(
        app_state.broker.clone(),
        app_state.config.payload_shape,
    );
    let subscription_id = adapter.connect()?;

    let (tx, mut rx) = mpsc::channel(FRAME_BUFFER);
    tokio::spawn(adapter.run(tx));

    // Dropping this stream (peer gone) drops `rx`, which the adapter observes
    // and answers by giving the slot back.
    let stream = stream! {
        while let Some(frame) = rx.recv().await {
            yield Ok(frame.into_event());
        }

        debug!("Event stream {subscription_id} finished");
    };

    Ok(Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(app_state.config.keep_alive_interval())))
}

/// GET the subscription pool usage.
pub(crate) async fn status(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.broker.stats())
}
