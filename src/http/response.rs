//! Error responses.
//!
//! Every [`RelayError`] becomes a plain-text body with its mapped status.
//! Server-side failures are logged with their source; client mistakes only
//! at debug level.

use crate::error::RelayError;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use std::error::Error as _;
use tracing::{debug, error};

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            match self.source() {
                Some(source) => error!(status = %status, error = %self, source = %source, "Request failed"),
                None => error!(status = %status, error = %self, "Request failed"),
            }
        } else {
            debug!(status = %status, error = %self, "Request rejected");
        }

        let mut response = (status, self.to_string()).into_response();
        if let RelayError::MethodNotAllowed = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
