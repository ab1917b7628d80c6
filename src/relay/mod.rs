//! Relay Module
//!
//! The upload/expiry/download lifecycle, independent of the transport.
//!
//! ## Architecture
//!
//! ```text
//! HTTP request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  http handlers  │  (http module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   FileRelay     │  (this module)
//! │                 │
//! │  - Name         │
//! │  - Store        │
//! │  - Register     │
//! │  - Schedule     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    storage      │  Registry, FileStore, Reaper
//! └─────────────────┘
//! ```
//!
//! Each file moves through `UPLOADED -> EXPIRED (logically) -> DELETED`
//! and never back.

pub mod service;

pub use service::{
    Download, FileRelay, RelayConfig, Upload, DEFAULT_STORAGE_DIR, FILE_PREFIX, FILE_TTL,
    MAX_UPLOAD_SIZE,
};
