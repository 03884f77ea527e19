//! Error types for the `sse` crate.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding an
//! optional source and an `ErrorKind` that callers match on.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every slot in the subscription pool is taken (or the broker is shut down).
    /// Recoverable: the client should retry later.
    CapacityExceeded { max_subscriptions: usize },
    /// A publish named a command outside the whitelist. Always a local bug.
    InvalidCommand(String),
    /// Writing a frame to a subscriber's connection failed. Never leaves the adapter.
    TransportFailure,
}

impl Error {
    pub(crate) fn capacity_exceeded(max_subscriptions: usize) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::CapacityExceeded { max_subscriptions },
        }
    }

    pub(crate) fn invalid_command(command: &str) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::InvalidCommand(command.to_string()),
        }
    }

    pub(crate) fn transport_failure<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::TransportFailure,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::CapacityExceeded { max_subscriptions } => write!(
                f,
                "can not accept more than {max_subscriptions} event streams at the same time"
            ),
            ErrorKind::InvalidCommand(command) => write!(f, "not a valid command: {command}"),
            ErrorKind::TransportFailure => match &self.source {
                Some(source) => write!(f, "error writing to event stream: {source}"),
                None => write!(f, "error writing to event stream"),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}
