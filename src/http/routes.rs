//! Route handlers.
//!
//! ```text
//! GET  /                    upload form
//! POST /upload              multipart field `file` -> link page
//! *    /upload              405
//! GET  /download?file=NAME  attachment stream
//! ```

use crate::error::{BadRequest, RelayError};
use crate::http::pages;
use crate::relay::{Download, FileRelay};
use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Name of the multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Builds the application router.
pub fn router(relay: FileRelay) -> Router {
    let limit = relay.config().max_upload_size;

    Router::new()
        .route("/", get(upload_form))
        .route(
            "/upload",
            post(upload)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(limit)),
        )
        .route("/download", get(download))
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

async fn upload_form() -> Html<&'static str> {
    Html(pages::UPLOAD_FORM)
}

async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

/// POST /upload
///
/// Uses the first part named `file` that carries a filename. Other parts are
/// skipped.
async fn upload(
    State(relay): State<FileRelay>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, RelayError> {
    let mut multipart =
        multipart.map_err(|e| RelayError::from(BadRequest::MalformedForm(Box::new(e))))?;
    let limit = relay.config().max_upload_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(original) = field.file_name().filter(|n| !n.is_empty()).map(str::to_owned)
        else {
            continue;
        };

        debug!(original = %original, "Receiving upload");
        let upload = relay.upload(Some(original.as_str()), field).await?;
        return Ok(Html(pages::uploaded(&upload)));
    }

    Err(BadRequest::MissingFile.into())
}

fn form_error(e: MultipartError, limit: usize) -> RelayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BadRequest::TooLarge { limit }.into()
    } else {
        BadRequest::MalformedForm(Box::new(e)).into()
    }
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    file: Option<String>,
}

/// GET /download?file=NAME
async fn download(
    State(relay): State<FileRelay>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, RelayError> {
    let name = query.file.unwrap_or_default();
    let Download {
        file_name,
        file,
        len,
        content_type,
    } = relay.download(&name).await?;

    let headers = [
        (header::CONTENT_DISPOSITION, attachment(&file_name)),
        (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
        (header::CONTENT_LENGTH, HeaderValue::from(len)),
    ];

    Ok((StatusCode::OK, headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// Builds `attachment; filename="NAME"`, quoting `"` and `\`.
fn attachment(file_name: &str) -> HeaderValue {
    let quoted = file_name.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", quoted))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
