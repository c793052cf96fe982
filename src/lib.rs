//! # SnapLink
//!
//! Share images as self-contained links. There is no server and no upload:
//! the image is compressed, wrapped in a small JSON record with its name and
//! an optional caption, and the record is encoded into the link itself.
//! Whoever has the link has the image.
//!
//! # Architecture: One Sequential Pipeline
//!
//! ```text
//! image file ─► imaging ─► caption ─► link ─► https://snaphost.app/#/v/<token>
//!   (bytes)     (JPEG      (best      (JSON →           │
//!               data URI)  effort)    base64url)        ▼
//!                                                   history
//! ```
//!
//! Opening a link runs the last step backwards: [`link::decode`] turns the
//! token into a [`link::ShareRecord`] whose payload is directly displayable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decode, bound the width, re-encode as JPEG behind the [`imaging::ImageBackend`] trait |
//! | [`payload`] | The `data:` URI type carried through the pipeline, plus byte formatting |
//! | [`caption`] | Best-effort Gemini captions that degrade to stock strings |
//! | [`link`] | Share record, token codec, share URLs |
//! | [`share`] | The pipeline tying the above together |
//! | [`history`] | Bounded, newest-first list of past shares persisted as JSON |
//! | [`render`] | Self-contained HTML pages using Maud |
//! | [`output`] | CLI output formatting |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## The Link Is the Data
//!
//! Tokens carry the full image, so links never expire and nothing needs to
//! be stored anywhere. The price is length: an 800px JPEG at quality 0.6 is
//! tens of kilobytes of base64. That is why compression is mandatory and why
//! [`share`] warns (but never fails) past `link.max_url_length`.
//!
//! ## Captions Never Block a Share
//!
//! [`caption::Captioner::describe`] returns a `String`, not a `Result`. Every
//! failure, from a missing API key to a timeout, collapses into a stock caption
//! and a `warn!` on stderr.
//!
//! ## Decode Returns `Option`
//!
//! A link is either fully recoverable or it is not. [`link::decode`] returns
//! `None` for every malformed input and the viewer shows a single "Link
//! Expired or Invalid" page. [`link::parse_token`] keeps the reason for
//! callers that want it.

pub mod caption;
pub mod config;
pub mod history;
pub mod imaging;
pub mod link;
pub mod logging;
pub mod output;
pub mod payload;
pub mod render;
pub mod share;

#[cfg(test)]
pub(crate) mod test_helpers;
