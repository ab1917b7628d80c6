//! Storage Module
//!
//! Everything the relay keeps between requests lives here: the in-memory
//! registry of live uploads, the directory holding their bytes, and the
//! per-file expiry tasks that clean both up.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────┐      ┌────────────────────────┐
//! │       Registry         │      │       FileStore        │
//! │  name ──> expires_at   │      │  {root}/{name}         │
//! │  (one Mutex)           │      │  (tokio::fs)           │
//! └───────────▲────────────┘      └───────────▲────────────┘
//!             │                               │
//!             └──────────────┬────────────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │          Reaper           │
//!              │  one tokio task per file  │
//!              └───────────────────────────┘
//! ```

pub mod expiry;
pub mod files;
pub mod registry;

// Re-export commonly used types
pub use expiry::{Reaped, Reaper};
pub use files::{FileStore, FillError};
pub use registry::{Entry, Registry, RegistryStats};
