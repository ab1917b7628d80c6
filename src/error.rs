//! Relay Errors
//!
//! Every request-level failure is one [`RelayError`], and every variant maps
//! to exactly one HTTP status. None of them are retried by the server.
//!
//! | Variant            | Status |
//! |--------------------|--------|
//! | `MethodNotAllowed` | 405    |
//! | `BadRequest`       | 400    |
//! | `NotFound`         | 404    |
//! | `Internal`         | 500    |

use crate::naming::NameError;
use axum::http::StatusCode;

/// Errors surfaced to a caller of the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The upload route was hit with something other than POST
    #[error("Only POST method is allowed")]
    MethodNotAllowed,

    /// The request was malformed
    #[error(transparent)]
    BadRequest(#[from] BadRequest),

    /// Unknown, expired, or physically missing file
    #[error("File not found or expired")]
    NotFound,

    /// Local storage failed
    #[error(transparent)]
    Internal(#[from] InternalError),
}

/// The ways a request can be malformed.
#[derive(Debug, thiserror::Error)]
pub enum BadRequest {
    #[error("Unable to parse form")]
    MalformedForm(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Unable to parse form: upload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Unable to get the file from form")]
    MissingFile,

    #[error("File name is required")]
    MissingFileName,

    #[error("Invalid file name: {0}")]
    InvalidFileName(#[from] NameError),
}

/// Storage failures while accepting an upload.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    #[error("Unable to create the file on server")]
    Create(#[source] std::io::Error),

    #[error("Unable to save the file")]
    Write(#[source] std::io::Error),
}

impl RelayError {
    /// Returns the HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NameError> for RelayError {
    fn from(e: NameError) -> Self {
        RelayError::BadRequest(BadRequest::InvalidFileName(e))
    }
}

pub type Result<T, E = RelayError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RelayError::from(BadRequest::MissingFile).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::from(BadRequest::TooLarge { limit: 10 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RelayError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            RelayError::from(InternalError::Write(std::io::Error::other("disk full"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_are_caller_facing() {
        assert_eq!(
            RelayError::from(BadRequest::MissingFileName).to_string(),
            "File name is required"
        );
        assert_eq!(
            RelayError::from(NameError::Separator).to_string(),
            "Invalid file name: file name contains a path separator"
        );
        assert_eq!(
            RelayError::from(InternalError::Create(std::io::Error::other("x"))).to_string(),
            "Unable to create the file on server"
        );
    }
}
