//! Error taxonomy for the HTTP surface.
//!
//! # Responsibilities
//! - Translate component failures into stable status codes
//! - Keep raw I/O error text out of client responses
//!
//! # Design Decisions
//! - Clients see a short machine-stable message, nothing else
//! - The underlying cause is logged at the component boundary, not here

use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::fs::{ListError, PathError, StreamError};

/// Everything a handler can fail with, mapped onto the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Attempted root escape or malformed input.
    #[error("Invalid path")]
    InvalidPath,

    /// Valid directory with no visible entries.
    #[error("Empty directory")]
    EmptyDirectory,

    /// Directory enumeration failed; missing or unreadable targets read
    /// as client errors, the rest as server faults.
    #[error("Unable to read directory")]
    DirectoryRead { client_fault: bool },

    /// Target missing or not a streamable file.
    #[error("File not found")]
    FileNotFound,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPath => StatusCode::BAD_REQUEST,
            ApiError::EmptyDirectory => StatusCode::NOT_FOUND,
            ApiError::DirectoryRead { client_fault: true } => StatusCode::NOT_FOUND,
            ApiError::DirectoryRead { client_fault: false } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::FileNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<PathError> for ApiError {
    fn from(_: PathError) -> Self {
        ApiError::InvalidPath
    }
}

impl From<ListError> for ApiError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::Empty => ApiError::EmptyDirectory,
            ListError::Read(io_err) => ApiError::DirectoryRead {
                client_fault: matches!(
                    io_err.kind(),
                    io::ErrorKind::NotFound
                        | io::ErrorKind::NotADirectory
                        | io::ErrorKind::PermissionDenied
                ),
            },
        }
    }
}

impl From<StreamError> for ApiError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::NotFound => ApiError::FileNotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_the_documented_status_codes() {
        assert_eq!(ApiError::InvalidPath.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyDirectory.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::FileNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::DirectoryRead { client_fault: true }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::DirectoryRead { client_fault: false }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn raw_io_text_never_reaches_the_client() {
        let io_err = io::Error::new(io::ErrorKind::Other, "/secret/internal/path exploded");
        let api: ApiError = ListError::Read(io_err).into();
        assert_eq!(api.to_string(), "Unable to read directory");
    }
}
