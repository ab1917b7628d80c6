//! Durable File Storage
//!
//! [`FileStore`] owns the storage root. Every path it touches is
//! `{root}/{name}` for a name that passed [`naming::validate`], so nothing
//! outside the root is ever created, opened or removed.
//!
//! [`naming::validate`]: crate::naming::validate

use crate::naming::{self, NameError};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

/// Errors while filling a newly created file from an upload stream.
#[derive(Debug, thiserror::Error)]
pub enum FillError<E> {
    /// The source stream failed (malformed or truncated body)
    #[error("upload stream failed: {0}")]
    Source(E),

    /// More than the allowed number of bytes arrived
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// Writing to disk failed
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// A flat directory of uploaded files.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is not created here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derives the on-disk path of `name`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, NameError> {
        Ok(self.root.join(naming::validate(name)?))
    }

    /// Creates `name`, failing with `AlreadyExists` if the slot is taken.
    pub async fn create(&self, name: &str) -> io::Result<File> {
        let path = self.path_for(name).map_err(invalid_input)?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
    }

    /// Writes every chunk of `chunks` into `file` and syncs it to disk.
    ///
    /// # Returns
    ///
    /// Returns the number of bytes written.
    pub async fn fill<S, E>(&self, file: File, chunks: S, limit: usize) -> Result<u64, FillError<E>>
    where
        S: Stream<Item = Result<Bytes, E>>,
    {
        let mut chunks = std::pin::pin!(chunks);
        let mut file = file;
        let mut written = 0usize;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(FillError::Source)?;
            written += chunk.len();
            if written > limit {
                return Err(FillError::TooLarge { limit });
            }
            file.write_all(&chunk).await?;
            trace!(bytes = chunk.len(), total = written, "Wrote chunk");
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written as u64)
    }

    /// Opens `name` for reading and returns it with its length.
    pub async fn open(&self, name: &str) -> io::Result<(File, u64)> {
        let path = self.path_for(name).map_err(invalid_input)?;
        let file = File::open(&path).await?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }

    /// Removes `name` from disk.
    pub async fn remove(&self, name: &str) -> io::Result<()> {
        let path = self.path_for(name).map_err(invalid_input)?;
        fs::remove_file(&path).await
    }

    /// Removes a partially written upload. Failures are only logged.
    pub async fn discard(&self, name: &str) {
        match self.remove(name).await {
            Ok(()) => debug!(file = %name, "Discarded partial upload"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %name, error = %e, "Failed to discard partial upload"),
        }
    }
}

fn invalid_input(e: NameError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e)
}
