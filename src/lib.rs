//! # SimpleHost - A Minimal HTTP File Relay
//!
//! Upload a file through a web form, get back a download link that works for
//! one hour. After that the file is deleted.
//!
//! ## Features
//!
//! - **Generated names**: stored files are renamed `simplehost-<unix secs><ext>`;
//!   the client's basename never touches the disk
//! - **Logical expiry**: links stop working at their deadline, even before the
//!   bytes are removed
//! - **One-shot cleanup**: each upload schedules its own deletion task
//! - **Async I/O**: built on Tokio and axum; uploads and downloads are streamed
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                            SimpleHost                              │
//! │                                                                    │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────────┐    │
//! │  │ axum Router │───>│  handlers   │───>│      FileRelay       │    │
//! │  │ (TraceLayer)│    │ (http)      │    │  upload / download   │    │
//! │  └─────────────┘    └─────────────┘    └──────────┬───────────┘    │
//! │                                                   │                │
//! │                          ┌────────────────────────┼─────────┐      │
//! │                          ▼                        ▼         ▼      │
//! │                   ┌────────────┐          ┌───────────┐ ┌───────┐  │
//! │                   │  Registry  │<─────────│  Reaper   │ │ Store │  │
//! │                   │   Mutex    │          │ (1 task / │ │ disk  │  │
//! │                   └────────────┘          │   file)   │ └───────┘  │
//! │                                           └───────────┘            │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use simplehost::http::router;
//! use simplehost::relay::{FileRelay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RelayConfig::default();
//!     tokio::fs::create_dir_all(&config.storage_root).await?;
//!
//!     let app = router(FileRelay::new(config));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Endpoints
//!
//! - `GET /` - upload form
//! - `POST /upload` - multipart field `file`, at most 10 MiB
//! - `GET /download?file=<name>` - the file, as an attachment
//!
//! ## Module Overview
//!
//! - [`relay`]: the upload/download lifecycle
//! - [`storage`]: registry, file store, expiry tasks
//! - [`http`]: axum routes, pages, error responses
//! - [`naming`]: generated names and download-name validation
//! - [`clock`]: wall-clock abstraction
//! - [`sniff`]: content-type detection
//! - [`error`]: request errors and their status codes

pub mod clock;
pub mod error;
pub mod http;
pub mod naming;
pub mod relay;
pub mod sniff;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::RelayError;
pub use http::router;
pub use relay::{FileRelay, RelayConfig, Upload};
pub use storage::{Entry, FileStore, Reaper, Registry};

/// The default port SimpleHost listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host SimpleHost binds to
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Version of SimpleHost
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
