//! Local share history.
//!
//! A convenience list of the most recent shares so a user can find a link
//! again. It is never the source of truth: a link works whether or not it is
//! in the history, and losing the history file loses nothing else.
//!
//! # Design
//!
//! The history is an ordered list, newest first, capped at
//! [`DEFAULT_CAPACITY`] entries. The only mutation is prepend-and-truncate
//! ([`History::record`]); the only other operation is clearing it entirely.
//!
//! ## Storage
//!
//! A JSON array at `<data dir>/snaplink/history.json` (configurable). Entry
//! keys are camelCase (`dataUrl`, `aiDescription`) so the file matches the
//! web app's `snaphost_history` local-storage key.
//!
//! Loading is forgiving: a missing, unreadable, or corrupt file yields an
//! empty history. Saving overwrites the file; when two processes share one
//! file the last writer wins.

use crate::link::{CURRENT_VERSION, ShareRecord};
use crate::payload::Payload;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Number of entries kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One past share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub data_url: Payload,
    pub name: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_description: Option<String>,
    /// Approximate decoded size in bytes.
    pub size: u64,
}

impl HistoryEntry {
    /// New entry for a record, stamped now.
    pub fn new(record: &ShareRecord) -> Self {
        Self::at(record, chrono::Utc::now().timestamp_millis())
    }

    /// New entry with an explicit timestamp.
    pub fn at(record: &ShareRecord, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            data_url: record.payload.clone(),
            name: record.name.clone(),
            timestamp,
            ai_description: record.caption.clone(),
            size: record.payload.approximate_size(),
        }
    }

    /// The record this entry re-shares.
    pub fn to_record(&self) -> ShareRecord {
        ShareRecord {
            version: CURRENT_VERSION.to_string(),
            payload: self.data_url.clone(),
            name: self.name.clone(),
            caption: self.ai_description.clone(),
        }
    }

    /// Creation time in UTC, if the timestamp is representable.
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Bounded, newest-first list of past shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl History {
    /// An empty history. A capacity of zero is treated as one.
    pub fn empty(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Load from disk. Returns an empty history if the file doesn't exist or
    /// can't be parsed. A file longer than `capacity` is truncated on load.
    pub fn load(path: &Path, capacity: usize) -> Self {
        let mut history = Self::empty(capacity);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return history,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "history unreadable, starting empty");
                return history;
            }
        };
        match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
            Ok(entries) => {
                history.entries = entries;
                history.entries.truncate(history.capacity);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "history corrupt, starting empty");
            }
        }
        history
    }

    /// Save to disk, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&self.entries)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Prepend an entry, dropping the oldest beyond capacity.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }

    /// Forget everything and remove the file. A missing file is fine.
    pub fn clear(&mut self, path: &Path) -> Result<(), HistoryError> {
        self.entries.clear();
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Find an entry by id or by a unique id prefix.
    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        if id.is_empty() {
            return None;
        }
        let mut matches = self.entries.iter().filter(|e| e.id.starts_with(id));
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::empty(DEFAULT_CAPACITY)
    }
}
