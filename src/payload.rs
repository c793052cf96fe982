//! Directly displayable image payloads.
//!
//! A payload is a `data:` URI (`data:image/jpeg;base64,/9j/4AAQ…`) so any
//! browser can render it as an `<img src>` with no further decoding. The link
//! token carries it verbatim and the history file stores it verbatim.
//!
//! Payloads travel through serde as plain strings. Parsing is lenient: a
//! bare base64 string without the `data:` prefix is still accepted by
//! [`Payload::base64_data`], which is what the captioner sends upstream.

use crate::imaging::approximate_decoded_size;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("payload is not a base64 data URI")]
    NotDataUri,
    #[error("payload base64 is invalid: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// A self-contained, displayable encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(String);

impl Payload {
    /// Wrap encoded image bytes as `data:<media_type>;base64,<data>`.
    pub fn from_bytes(media_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", media_type, STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The declared media type, e.g. `image/jpeg`. `None` without a `data:` header.
    pub fn media_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (header, _) = rest.split_once(',')?;
        let media = header.strip_suffix(";base64")?;
        (!media.is_empty()).then_some(media)
    }

    /// The base64 body: everything after the first comma, or the whole
    /// string when there is no comma (or nothing after it).
    pub fn base64_data(&self) -> &str {
        match self.0.split_once(',') {
            Some((_, data)) if !data.is_empty() => data,
            _ => &self.0,
        }
    }

    /// Decode the embedded image bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        if self.media_type().is_none() {
            return Err(PayloadError::NotDataUri);
        }
        Ok(STANDARD.decode(self.base64_data())?)
    }

    /// Approximate binary size: payload text length × 3/4.
    pub fn approximate_size(&self) -> u64 {
        approximate_decoded_size(self.0.len())
    }

    /// File extension matching the media type, for saving decoded bytes.
    pub fn file_extension(&self) -> &'static str {
        match self.media_type() {
            Some("image/png") => "png",
            Some("image/webp") => "webp",
            Some("image/gif") => "gif",
            _ => "jpg",
        }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const BYTE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human-readable byte count with binary (1024) steps: `1536` → `"1.5 KB"`.
///
/// Trailing zeros after the decimal point are dropped.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut divisor = 1u64;
    while unit < BYTE_UNITS.len() - 1 && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let value = format!("{:.*}", decimals, bytes as f64 / divisor as f64);
    let value = if value.contains('.') {
        value.trim_end_matches('0').trim_end_matches('.')
    } else {
        value.as_str()
    };
    format!("{} {}", value, BYTE_UNITS[unit])
}
