//! The share pipeline.
//!
//! One strictly sequential chain per shared image:
//!
//! ```text
//! file bytes ─► compress ─► caption ─► ShareRecord ─► token ─► URL
//!                  │                                            │
//!             DecodeError                                 HistoryEntry
//!           (abort, nothing                            (caller records it)
//!             recorded)
//! ```
//!
//! Compression failures abort the share. Captioning cannot fail (see
//! [`caption`](crate::caption)). The pipeline does not touch the history
//! file itself; it hands back a [`HistoryEntry`] for the caller to record,
//! so a failed share can never leave a partial entry behind.

use crate::caption::Captioner;
use crate::config::AppConfig;
use crate::history::HistoryEntry;
use crate::imaging::{BackendError, CompressConfig, Dimensions, ImageBackend, compress};
use crate::link::{self, ShareRecord};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to process image. Make sure it's a valid image file. ({0})")]
    Imaging(#[from] BackendError),
}

impl ShareError {
    /// True when the input was not a recognized image.
    pub fn is_not_an_image(&self) -> bool {
        matches!(self, Self::Imaging(e) if e.is_decode())
    }
}

/// Settings the pipeline needs, extracted from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShareOptions {
    pub compress: CompressConfig,
    pub base_url: String,
    /// Advisory only: longer URLs are logged, not rejected.
    pub max_url_length: usize,
}

impl ShareOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            compress: config.compression.to_compress_config(),
            base_url: config.link.base_url.clone(),
            max_url_length: config.link.max_url_length,
        }
    }
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// A finished share.
#[derive(Debug, Clone)]
pub struct SharedImage {
    pub record: ShareRecord,
    pub token: String,
    pub url: String,
    pub original: Dimensions,
    pub output: Dimensions,
    /// Entry to prepend to the history.
    pub entry: HistoryEntry,
}

impl SharedImage {
    /// Whether the URL exceeds the advisory length.
    pub fn url_too_long(&self, max_url_length: usize) -> bool {
        self.url.len() > max_url_length
    }
}

/// Token and URL for an existing record.
pub fn link_for(record: &ShareRecord, base_url: &str) -> (String, String) {
    let token = link::encode(record);
    let url = link::share_url(base_url, &token);
    (token, url)
}

/// Share an in-memory image under the given display name.
pub fn share_bytes(
    backend: &impl ImageBackend,
    captioner: &dyn Captioner,
    bytes: &[u8],
    name: &str,
    options: &ShareOptions,
) -> Result<SharedImage, ShareError> {
    let compressed = compress(backend, bytes, &options.compress)?;

    let caption = captioner.describe(&compressed.payload);
    let caption = (!caption.trim().is_empty()).then_some(caption);
    debug!(caption = ?caption, "caption resolved");

    let record = ShareRecord::new(compressed.payload, name, caption);
    let (token, url) = link_for(&record, &options.base_url);

    let shared = SharedImage {
        entry: HistoryEntry::new(&record),
        record,
        token,
        url,
        original: compressed.original,
        output: compressed.output,
    };

    if shared.url_too_long(options.max_url_length) {
        warn!(
            length = shared.url.len(),
            limit = options.max_url_length,
            "share URL is very long and may be truncated by some clients; \
             try a lower quality or max width"
        );
    }
    info!(name, url_length = shared.url.len(), "image shared");

    Ok(shared)
}

/// Read a file and share it. The display name is the file name.
pub fn share_file(
    backend: &impl ImageBackend,
    captioner: &dyn Captioner,
    path: &Path,
    options: &ShareOptions,
) -> Result<SharedImage, ShareError> {
    let bytes = std::fs::read(path).map_err(|source| ShareError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    share_bytes(backend, captioner, &bytes, &name, options)
}
