//! HTTP Module
//!
//! Adapts HTTP requests onto the [`FileRelay`](crate::relay::FileRelay).
//! Each request is served on its own Tokio task by axum; the relay is
//! shared through router state.
//!
//! ## Example
//!
//! ```ignore
//! use simplehost::http::router;
//! use simplehost::relay::{FileRelay, RelayConfig};
//!
//! let app = router(FileRelay::new(RelayConfig::default()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod pages;
pub mod response;
pub mod routes;

pub use routes::{router, FILE_FIELD};
