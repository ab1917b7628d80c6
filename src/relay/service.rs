//! File Relay Service
//!
//! [`FileRelay`] implements the upload and download lifecycle against the
//! registry and the file store. It knows nothing about HTTP; the `http`
//! module adapts requests onto it.
//!
//! ## Upload
//!
//! ```text
//! 1. Derive name       simplehost-{unix secs}{ext}
//! 2. Create file       exclusive; on collision retry with -1, -2, ...
//! 3. Stream bytes      discard the file on any failure
//! 4. Sync to disk
//! 5. Register          name -> now + ttl   (only now can downloads see it)
//! 6. Schedule expiry   one tokio task, fires after ttl
//! ```
//!
//! ## Download
//!
//! ```text
//! 1. Validate name     no separators, no dot segments
//! 2. Registry lookup   absent or now >= expires_at -> NotFound
//! 3. Open file         missing on disk -> NotFound
//! 4. Sniff type        first 512 bytes, then rewind
//! ```

use crate::clock::{Clock, SystemClock};
use crate::error::{BadRequest, InternalError, RelayError, Result};
use crate::naming;
use crate::sniff;
use crate::storage::{Entry, FileStore, FillError, Reaper, Registry, RegistryStats};
use bytes::Bytes;
use futures_util::Stream;
use std::io::{self, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, error, info};

/// Prefix of every generated file name.
pub const FILE_PREFIX: &str = "simplehost";

/// How long an upload stays downloadable.
pub const FILE_TTL: Duration = Duration::from_secs(60 * 60);

/// Upload size ceiling (10 MiB).
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Where uploads are written unless told otherwise.
pub const DEFAULT_STORAGE_DIR: &str = "./uploads";

/// Upper bound on collision suffixes tried within one second.
const MAX_NAME_ATTEMPTS: u32 = 1024;

/// Relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Directory uploads are written to
    pub storage_root: PathBuf,

    /// Lifetime of every upload
    pub ttl: Duration,

    /// Maximum accepted upload size in bytes
    pub max_upload_size: usize,

    /// Prefix for generated names
    pub file_prefix: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_DIR),
            ttl: FILE_TTL,
            max_upload_size: MAX_UPLOAD_SIZE,
            file_prefix: FILE_PREFIX.to_string(),
        }
    }
}

/// A completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// The generated name the file is stored and served under
    pub file_name: String,
    /// Relative link that downloads the file
    pub download_link: String,
    /// Bytes stored
    pub size: u64,
    /// When the link stops working
    pub expires_at: SystemTime,
}

/// An open, downloadable file.
#[derive(Debug)]
pub struct Download {
    /// The stored name, used as the attachment filename
    pub file_name: String,
    /// Positioned at the start of the file
    pub file: File,
    /// Length in bytes
    pub len: u64,
    /// Sniffed MIME type
    pub content_type: &'static str,
}

/// The file registry service.
///
/// Cheap to clone; clones share the same registry, store and reaper.
///
/// # Example
///
/// ```ignore
/// use simplehost::relay::{FileRelay, RelayConfig};
///
/// let relay = FileRelay::new(RelayConfig::default());
/// let upload = relay.upload(Some("report.pdf"), chunks).await?;
/// let download = relay.download(&upload.file_name).await?;
/// ```
#[derive(Clone)]
pub struct FileRelay {
    config: Arc<RelayConfig>,
    registry: Arc<Registry>,
    store: FileStore,
    reaper: Arc<Reaper>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for FileRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRelay")
            .field("storage_root", &self.config.storage_root)
            .field("ttl", &self.config.ttl)
            .field("entries", &self.registry.len())
            .field("pending_expiries", &self.reaper.pending())
            .finish()
    }
}

impl FileRelay {
    /// Creates a relay that reads the system clock.
    pub fn new(config: RelayConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a relay that reads time from `clock`.
    pub fn with_clock(config: RelayConfig, clock: Arc<dyn Clock>) -> Self {
        let registry = Arc::new(Registry::new());
        let store = FileStore::new(config.storage_root.clone());
        let reaper = Arc::new(Reaper::new(Arc::clone(&registry), store.clone()));

        Self {
            config: Arc::new(config),
            registry,
            store,
            reaper,
            clock,
        }
    }

    /// Returns the relay configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Returns the shared registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Returns the file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Returns registry statistics.
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Returns the number of expiry tasks that have not fired yet.
    pub fn pending_expiries(&self) -> u64 {
        self.reaper.pending()
    }

    /// Accepts an upload.
    ///
    /// `original_name` is the client's filename; only its extension is kept.
    /// `chunks` is the body of the file part. A chunk error means the request
    /// body was malformed.
    pub async fn upload<S, E>(&self, original_name: Option<&str>, chunks: S) -> Result<Upload>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let ext = naming::extension(original_name.unwrap_or_default());
        let (file_name, file) = self.create_unique(ext).await?;

        let size = match self
            .store
            .fill(file, chunks, self.config.max_upload_size)
            .await
        {
            Ok(size) => size,
            Err(e) => {
                self.store.discard(&file_name).await;
                return Err(match e {
                    FillError::Source(e) => BadRequest::MalformedForm(Box::new(e)).into(),
                    FillError::TooLarge { limit } => BadRequest::TooLarge { limit }.into(),
                    FillError::Io(e) => {
                        error!(file = %file_name, error = %e, "Unable to save the file");
                        InternalError::Write(e).into()
                    }
                });
            }
        };

        let entry = Entry::with_ttl(self.clock.now(), self.config.ttl);
        let expires_at = entry.expires_at;
        self.registry.register(file_name.clone(), entry);
        self.reaper.schedule(file_name.clone(), self.config.ttl);

        info!(file = %file_name, size = size, "File uploaded");

        Ok(Upload {
            download_link: naming::download_link(&file_name),
            file_name,
            size,
            expires_at,
        })
    }

    /// Picks a free name for an upload with extension `ext` and creates it.
    async fn create_unique(&self, ext: &str) -> Result<(String, File)> {
        let secs = self.clock.unix_seconds();

        for seq in 0..MAX_NAME_ATTEMPTS {
            let name = naming::generate(&self.config.file_prefix, secs, ext, seq);
            if self.registry.contains(&name) {
                continue;
            }
            match self.store.create(&name).await {
                Ok(file) => return Ok((name, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(file = %name, "Name taken, trying next suffix");
                }
                Err(e) => {
                    error!(file = %name, error = %e, "Unable to create the file on server");
                    return Err(InternalError::Create(e).into());
                }
            }
        }

        Err(InternalError::Create(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free file name for this second",
        ))
        .into())
    }

    /// Opens a registered, unexpired file for download.
    pub async fn download(&self, file_name: &str) -> Result<Download> {
        if file_name.is_empty() {
            return Err(BadRequest::MissingFileName.into());
        }
        let file_name = naming::validate(file_name)?;

        if self.registry.lookup(file_name, self.clock.now()).is_none() {
            debug!(file = %file_name, "Download refused: unknown or expired");
            return Err(RelayError::NotFound);
        }

        let (mut file, len) = self.store.open(file_name).await.map_err(|e| {
            debug!(file = %file_name, error = %e, "Download refused: missing on disk");
            RelayError::NotFound
        })?;

        let content_type = sniff_file(&mut file).await.unwrap_or(sniff::FALLBACK);

        Ok(Download {
            file_name: file_name.to_string(),
            file,
            len,
            content_type,
        })
    }
}

/// Sniffs the head of `file` and rewinds it.
async fn sniff_file(file: &mut File) -> io::Result<&'static str> {
    let mut head = Vec::with_capacity(sniff::SNIFF_LEN);
    (&mut *file)
        .take(sniff::SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .await?;
    file.seek(SeekFrom::Start(0)).await?;
    Ok(sniff::content_type(&head))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use futures_util::stream;
    use std::convert::Infallible;

    fn body(data: &'static [u8]) -> impl Stream<Item = Result<Bytes, Infallible>> {
        stream::iter(vec![Ok(Bytes::from_static(data))])
    }

    fn relay_at(secs: u64) -> (tempfile::TempDir, Arc<ManualClock>, FileRelay) {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_unix(secs));
        let config = RelayConfig {
            storage_root: dir.path().to_path_buf(),
            ..Default::default()
        };
        let relay = FileRelay::with_clock(config, clock.clone());
        (dir, clock, relay)
    }

    async fn read_all(mut download: Download) -> Vec<u8> {
        let mut buf = Vec::new();
        download.file.read_to_end(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_upload_scenario() {
        let (dir, _, relay) = relay_at(1_700_000_000);

        let upload = relay.upload(Some("report.pdf"), body(b"abc")).await.unwrap();
        assert_eq!(upload.file_name, "simplehost-1700000000.pdf");
        assert_eq!(upload.download_link, "/download?file=simplehost-1700000000.pdf");
        assert_eq!(upload.size, 3);
        assert_eq!(
            std::fs::read(dir.path().join("simplehost-1700000000.pdf")).unwrap(),
            b"abc"
        );

        let download = relay.download(&upload.file_name).await.unwrap();
        assert_eq!(download.len, 3);
        assert_eq!(download.content_type, "application/octet-stream");
        assert_eq!(read_all(download).await, b"abc");
    }

    #[tokio::test]
    async fn test_extension_preserved() {
        let (_dir, _, relay) = relay_at(1);
        let cases = [
            (Some("a.tar.gz"), ".gz"),
            (Some("README"), ""),
            (Some(""), ""),
            (None, ""),
        ];
        for (original, ext) in cases {
            let upload = relay.upload(original, body(b"x")).await.unwrap();
            assert_eq!(naming::extension(&upload.file_name), ext);
        }
    }

    #[tokio::test]
    async fn test_same_second_uploads_do_not_collide() {
        let (_dir, _, relay) = relay_at(1_700_000_000);

        let first = relay.upload(Some("a.txt"), body(b"first")).await.unwrap();
        let second = relay.upload(Some("b.txt"), body(b"second")).await.unwrap();
        assert_eq!(first.file_name, "simplehost-1700000000.txt");
        assert_eq!(second.file_name, "simplehost-1700000000-1.txt");

        assert_eq!(read_all(relay.download(&first.file_name).await.unwrap()).await, b"first");
        assert_eq!(read_all(relay.download(&second.file_name).await.unwrap()).await, b"second");
    }

    #[tokio::test]
    async fn test_logical_expiry() {
        let (dir, clock, relay) = relay_at(1_700_000_000);
        let upload = relay.upload(Some("a.txt"), body(b"abc")).await.unwrap();

        clock.advance(FILE_TTL - Duration::from_secs(1));
        assert!(relay.download(&upload.file_name).await.is_ok());

        clock.advance(Duration::from_secs(1));
        assert!(matches!(
            relay.download(&upload.file_name).await,
            Err(RelayError::NotFound)
        ));

        // Bytes are still there; only the timer deletes them
        assert!(dir.path().join(&upload.file_name).exists());
    }

    #[tokio::test]
    async fn test_download_errors() {
        let (dir, _, relay) = relay_at(1);

        assert!(matches!(
            relay.download("").await,
            Err(RelayError::BadRequest(BadRequest::MissingFileName))
        ));
        assert!(matches!(
            relay.download("../Cargo.toml").await,
            Err(RelayError::BadRequest(BadRequest::InvalidFileName(_)))
        ));
        assert!(matches!(
            relay.download("simplehost-0.txt").await,
            Err(RelayError::NotFound)
        ));

        // Registered but gone from disk
        let upload = relay.upload(Some("a.txt"), body(b"abc")).await.unwrap();
        std::fs::remove_file(dir.path().join(&upload.file_name)).unwrap();
        assert!(matches!(
            relay.download(&upload.file_name).await,
            Err(RelayError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_oversized_upload_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let relay = FileRelay::new(RelayConfig {
            storage_root: dir.path().to_path_buf(),
            max_upload_size: 4,
            ..Default::default()
        });

        let err = relay.upload(Some("big.bin"), body(b"12345")).await.unwrap_err();
        assert!(matches!(err, RelayError::BadRequest(BadRequest::TooLarge { limit: 4 })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(relay.registry().is_empty());
        assert_eq!(relay.pending_expiries(), 0);
    }

    #[tokio::test]
    async fn test_broken_stream_leaves_nothing() {
        let (dir, _, relay) = relay_at(1);
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
        ]);

        let err = relay.upload(Some("a.txt"), chunks).await.unwrap_err();
        assert!(matches!(err, RelayError::BadRequest(BadRequest::MalformedForm(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_storage_root_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let relay = FileRelay::new(RelayConfig {
            storage_root: dir.path().join("does-not-exist"),
            ..Default::default()
        });

        let err = relay.upload(Some("a.txt"), body(b"abc")).await.unwrap_err();
        assert!(matches!(err, RelayError::Internal(InternalError::Create(_))));
    }

    #[tokio::test]
    async fn test_expiry_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let relay = FileRelay::new(RelayConfig {
            storage_root: dir.path().to_path_buf(),
            ttl: Duration::from_millis(50),
            ..Default::default()
        });

        let upload = relay.upload(Some("a.txt"), body(b"abc")).await.unwrap();
        assert_eq!(relay.pending_expiries(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!dir.path().join(&upload.file_name).exists());
        assert!(relay.registry().is_empty());
        assert_eq!(relay.pending_expiries(), 0);
        assert!(matches!(
            relay.download(&upload.file_name).await,
            Err(RelayError::NotFound)
        ));
    }
}
