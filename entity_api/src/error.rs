//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

/// Errors while executing operations related to entities.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid path or query parameter
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Entity failed field validation, carries the reasons
    ValidationError(Vec<String>),
    // Other errors
    Other,
}

impl Error {
    pub(crate) fn not_found() -> Self {
        Self {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }

    pub(crate) fn validation(reasons: Vec<String>) -> Self {
        Self {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError(reasons),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self.error_kind)
    }
}

impl StdError for Error {}
