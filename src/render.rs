//! Self-contained HTML pages.
//!
//! Every view the CLI can show in a terminal can also be written as a single
//! HTML file with the stylesheet inlined and the image embedded as its data
//! URI, so the file opens anywhere without a server:
//!
//! - **Landing**: hero text plus the recent-shares list.
//! - **Viewer**: one decoded [`ShareRecord`].
//! - **Invalid link**: shown when a token does not decode.
//! - **About**: `static/about.md` converted with pulldown-cmark.
//!
//! Uses [maud](https://maud.lambda.xyz/) for templating. All interpolated
//! text (names, captions) is escaped by maud.

use crate::history::{History, HistoryEntry};
use crate::link::ShareRecord;
use crate::payload::format_bytes;
use crate::share::link_for;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::path::Path;

const CSS: &str = include_str!("../static/style.css");
/// Source of the about page.
pub const ABOUT_MARKDOWN: &str = include_str!("../static/about.md");

pub const SITE_NAME: &str = "SnapHost";
pub const INVALID_LINK_TITLE: &str = "Link Expired or Invalid";
pub const INVALID_LINK_DETAIL: &str = "The image data could not be recovered from this URL.";

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (site_header())
                (content)
                footer {
                    "Client-side encoding. No backend. No tracking."
                }
            }
        }
    }
}

fn site_header() -> Markup {
    html! {
        header.site-header {
            a.brand href="#/" { (SITE_NAME) }
            a href="#/about" { "How it works" }
        }
    }
}

fn entry_url(entry: &HistoryEntry, base_url: &str) -> String {
    link_for(&entry.to_record(), base_url).1
}

fn entry_date(entry: &HistoryEntry) -> String {
    entry
        .created_at()
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Landing page with the recent-shares list.
pub fn render_landing(history: &History, base_url: &str) -> Markup {
    let content = html! {
        main {
            section.hero {
                h1 { "Instant Image " span { "Hosting" } }
                p {
                    "Share an image and get a permanent link instantly. "
                    "No accounts, no database, just pure data."
                }
            }
            @if !history.is_empty() {
                section {
                    h2 { "Recent Uploads" }
                    ul.history {
                        @for entry in history.entries() {
                            li {
                                img src=(entry.data_url.as_str()) alt=(entry.name);
                                div {
                                    div { (entry.name) }
                                    div.meta {
                                        (format_bytes(entry.size, 2)) " • " (entry_date(entry))
                                    }
                                }
                                a href=(entry_url(entry, base_url)) { "View & Share" }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(SITE_NAME, Some("landing"), content)
}

/// Viewer page for a decoded record.
pub fn render_viewer(record: &ShareRecord, share_url: &str) -> Markup {
    let title = if record.name.is_empty() {
        SITE_NAME
    } else {
        record.name.as_str()
    };

    let content = html! {
        main.viewer {
            h1 { (title) }
            @if let Some(caption) = record.caption() {
                p.caption { "\u{201c}" (caption) "\u{201d}" }
            }
            img src=(record.payload.as_str()) alt=(record.alt_text());
            p.share-link {
                a href=(share_url) { (share_url) }
            }
        }
    };

    base_document(title, Some("image-view"), content)
}

/// Page shown for a token that does not decode.
pub fn render_invalid_link() -> Markup {
    let content = html! {
        main.invalid {
            h1 { (INVALID_LINK_TITLE) }
            p { (INVALID_LINK_DETAIL) }
            a href="#/" { "Back to Upload" }
        }
    };

    base_document(INVALID_LINK_TITLE, None, content)
}

/// Informational page.
pub fn render_about() -> Markup {
    let parser = Parser::new(ABOUT_MARKDOWN);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    let content = html! {
        main.about-page {
            article { (PreEscaped(body_html)) }
        }
    };

    base_document(&format!("About {SITE_NAME}"), None, content)
}

/// Write a rendered page, creating parent directories.
pub fn write_page(path: &Path, page: Markup) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, page.into_string())
}

// ============================================================================
// Tests
// ============================================================================
