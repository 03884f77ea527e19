use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use sse::error::{Error as SseError, ErrorKind as SseErrorKind};

use log::*;

#[derive(Debug)]
pub enum Error {
    Entity(EntityApiError),
    EventStream(SseError),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::Entity(err) => write!(fmt, "{err}"),
            Error::EventStream(err) => write!(fmt, "{err}"),
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Entity(err) => match &err.error_kind {
                EntityApiErrorKind::RecordNotFound => {
                    (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                }
                EntityApiErrorKind::ValidationError(reasons) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("UNPROCESSABLE ENTITY: {}", reasons.join(", ")),
                )
                    .into_response(),
                EntityApiErrorKind::InvalidQueryTerm => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                }
                EntityApiErrorKind::Other => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            Error::EventStream(err) => match &err.error_kind {
                SseErrorKind::CapacityExceeded { .. } => {
                    info!("Rejecting event stream: {err}");
                    (StatusCode::SERVICE_UNAVAILABLE, "SERVICE UNAVAILABLE").into_response()
                }
                SseErrorKind::InvalidCommand(_) | SseErrorKind::TransportFailure => {
                    error!("Event stream failure: {err}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        Error::Entity(err)
    }
}

impl From<SseError> for Error {
    fn from(err: SseError) -> Self {
        Error::EventStream(err)
    }
}
