//! Event stream endpoints for the web layer.
//!
//! Only the axum handlers live here. The broker, the per-connection stream
//! adapter and the frame format live in the `sse` crate.

pub mod handler;
