//! CLI output formatting.
//!
//! Output leads with the image's identity (its display name) and puts
//! details on indented context lines underneath.
//!
//! # Output Format
//!
//! ## Share
//!
//! ```text
//! cat.jpg → https://snaphost.app/#/v/eyJ2IjoiMSIsImQiOi…
//!     Size: 2400x1600 → 800x533, 48.21 KB
//!     Caption: A tabby cat asleep on a sunny windowsill.
//! ```
//!
//! ## View
//!
//! ```text
//! cat.jpg
//!     Caption: A tabby cat asleep on a sunny windowsill.
//!     Type: image/jpeg, 48.21 KB
//! ```
//!
//! ## History
//!
//! ```text
//! Recent Uploads
//! 001 cat.jpg
//!     48.21 KB • 2026-10-18
//!     Id: 3f2c9a1e
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::history::History;
use crate::link::ShareRecord;
use crate::payload::format_bytes;
use crate::render::{INVALID_LINK_DETAIL, INVALID_LINK_TITLE};
use crate::share::SharedImage;

/// Captions longer than this are cut in listings.
const CAPTION_PREVIEW: usize = 60;
/// Characters of the entry id shown in listings.
const SHORT_ID: usize = 8;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display name, or a placeholder for unnamed images.
fn display_name(name: &str) -> &str {
    if name.is_empty() { "(unnamed)" } else { name }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ============================================================================
// Share
// ============================================================================

pub fn format_share_output(shared: &SharedImage) -> Vec<String> {
    let record = &shared.record;
    let mut lines = vec![format!("{} → {}", display_name(&record.name), shared.url)];

    let (ow, oh) = shared.original.as_tuple();
    let (nw, nh) = shared.output.as_tuple();
    lines.push(format!(
        "{}Size: {}x{} → {}x{}, {}",
        indent(1),
        ow,
        oh,
        nw,
        nh,
        format_bytes(record.payload.approximate_size(), 2)
    ));

    if let Some(caption) = record.caption() {
        lines.push(format!("{}Caption: {}", indent(1), caption));
    }
    lines.push(format!("{}URL length: {} characters", indent(1), shared.url.len()));

    lines
}

pub fn print_share_output(shared: &SharedImage) {
    for line in format_share_output(shared) {
        println!("{}", line);
    }
}

// ============================================================================
// View
// ============================================================================

pub fn format_view_output(record: &ShareRecord) -> Vec<String> {
    let mut lines = vec![display_name(&record.name).to_string()];

    if let Some(caption) = record.caption() {
        lines.push(format!("{}Caption: {}", indent(1), caption));
    }
    let media_type = record.payload.media_type().unwrap_or("unknown");
    lines.push(format!(
        "{}Type: {}, {}",
        indent(1),
        media_type,
        format_bytes(record.payload.approximate_size(), 2)
    ));

    lines
}

pub fn print_view_output(record: &ShareRecord) {
    for line in format_view_output(record) {
        println!("{}", line);
    }
}

pub fn format_invalid_link() -> Vec<String> {
    vec![INVALID_LINK_TITLE.to_string(), format!("{}{}", indent(1), INVALID_LINK_DETAIL)]
}

/// Printed to stderr: an invalid link is a failed command.
pub fn print_invalid_link() {
    for line in format_invalid_link() {
        eprintln!("{}", line);
    }
}

// ============================================================================
// History
// ============================================================================

pub fn format_history(history: &History) -> Vec<String> {
    if history.is_empty() {
        return vec!["No recent uploads".to_string()];
    }

    let mut lines = vec!["Recent Uploads".to_string()];
    for (i, entry) in history.entries().iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), display_name(&entry.name)));

        let date = entry
            .created_at()
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());
        lines.push(format!("{}{} • {}", indent(1), format_bytes(entry.size, 2), date));

        if let Some(caption) = entry.ai_description.as_deref().filter(|c| !c.trim().is_empty()) {
            lines.push(format!(
                "{}Caption: {}",
                indent(1),
                truncate(caption.trim(), CAPTION_PREVIEW)
            ));
        }
        let short_id: String = entry.id.chars().take(SHORT_ID).collect();
        lines.push(format!("{}Id: {}", indent(1), short_id));
    }
    lines
}

pub fn print_history(history: &History) {
    for line in format_history(history) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
