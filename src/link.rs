//! Self-describing share links.
//!
//! A link token is the whole [`ShareRecord`], payload included, serialized
//! to compact JSON and base64-encoded with the URL-safe alphabet and no
//! padding:
//!
//! ```text
//! {"v":"1","d":"data:image/jpeg;base64,…","n":"cat.jpg","a":"A cat"}
//!     │
//!     ▼  serde_json → base64url (no '=')
//! eyJ2IjoiMSIsImQiOiJkYXRhOmltYWdl…
//!     │
//!     ▼  share_url
//! https://snaphost.app/#/v/eyJ2IjoiMSIsImQiOiJkYXRh…
//! ```
//!
//! Nothing here enforces a length limit. Browsers and chat clients truncate
//! long URLs silently; the share pipeline warns about that, it does not fail.
//!
//! # Decoding is total
//!
//! [`decode`] returns `None` for every malformed token: bad alphabet,
//! truncated base64, invalid UTF-8, JSON that does not match the record
//! schema, or (by default) an unrecognized schema version. It never panics.
//! [`parse_token`] returns the same outcome with the reason attached.
//!
//! # Versions
//!
//! Only [`CURRENT_VERSION`] is understood. Tokens from a newer writer are
//! rejected under [`VersionPolicy::CurrentOnly`] (the default) because their
//! payload may not mean what this reader thinks it means.
//! [`VersionPolicy::AcceptAny`] decodes them anyway, for users who would
//! rather risk a mis-render than see an error page.

use crate::payload::Payload;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The schema version this build writes and reads.
pub const CURRENT_VERSION: &str = "1";

/// Route prefix for the viewer inside the URL fragment.
const VIEW_ROUTE: &str = "#/v/";

/// Everything needed to reconstruct a shared image.
///
/// Wire keys are single letters to keep tokens short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    #[serde(rename = "v")]
    pub version: String,
    #[serde(rename = "d")]
    pub payload: Payload,
    /// Original filename. Display only.
    #[serde(rename = "n", default)]
    pub name: String,
    /// Short description. Display and `alt` text only.
    #[serde(rename = "a", default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl ShareRecord {
    /// A record at the current schema version.
    pub fn new(payload: Payload, name: impl Into<String>, caption: Option<String>) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            payload,
            name: name.into(),
            caption,
        }
    }

    /// Caption if present and non-blank.
    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Text for `alt` attributes: the caption, else the filename.
    pub fn alt_text(&self) -> &str {
        self.caption().unwrap_or(&self.name)
    }
}

/// How [`decode_with`] treats the record's `version` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Reject anything but [`CURRENT_VERSION`].
    #[default]
    CurrentOnly,
    /// Accept any version string.
    AcceptAny,
}

/// Why a token failed to decode.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("token is empty")]
    Empty,
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token text is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("token does not contain a share record: {0}")]
    Record(#[from] serde_json::Error),
    #[error("unsupported link version {0:?}")]
    UnsupportedVersion(String),
}

/// Serialize a record into a URL-safe token.
pub fn encode(record: &ShareRecord) -> String {
    // Serializing a struct of strings into JSON cannot fail.
    let json = serde_json::to_string(record).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a token, rejecting unknown versions. Total over arbitrary input.
pub fn decode(token: &str) -> Option<ShareRecord> {
    decode_with(token, VersionPolicy::default())
}

/// Decode a token under an explicit version policy.
pub fn decode_with(token: &str, policy: VersionPolicy) -> Option<ShareRecord> {
    match parse_token(token, policy) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!(error = %e, "rejected share link");
            None
        }
    }
}

/// Decode a token and report why it failed.
///
/// Accepts both the URL-safe and the standard base64 alphabet, with or
/// without trailing padding.
pub fn parse_token(token: &str, policy: VersionPolicy) -> Result<ShareRecord, LinkError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(LinkError::Empty);
    }

    let normalized: String = token
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD.decode(normalized.as_bytes())?;
    let json = String::from_utf8(bytes)?;
    let record: ShareRecord = serde_json::from_str(&json)?;

    if policy == VersionPolicy::CurrentOnly && record.version != CURRENT_VERSION {
        return Err(LinkError::UnsupportedVersion(record.version));
    }
    Ok(record)
}

/// Build the shareable URL: `<base>/#/v/<token>`.
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/{}{}", base_url.trim_end_matches('/'), VIEW_ROUTE, token)
}

/// Pull the token out of whatever the user pasted.
///
/// Accepts a full share URL, a `#/v/<token>` fragment, a `/v/<token>` route,
/// or a bare token.
pub fn extract_token(input: &str) -> &str {
    let input = input.trim();
    if let Some(pos) = input.find(VIEW_ROUTE) {
        return &input[pos + VIEW_ROUTE.len()..];
    }
    input
        .strip_prefix("/v/")
        .or_else(|| input.strip_prefix("v/"))
        .unwrap_or(input)
        .trim_start_matches('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn cat_record() -> ShareRecord {
        ShareRecord {
            version: "1".into(),
            payload: Payload::from("data:image/jpeg;base64,/9j/AAA"),
            name: "cat.jpg".into(),
            caption: Some("A cat".into()),
        }
    }

    /// Encode arbitrary JSON the way a (possibly foreign) writer would.
    fn token_for_json(json: &str) -> String {
        URL_SAFE_NO_PAD.encode(json.as_bytes())
    }

    // =========================================================================
    // Round-trip
    // =========================================================================

    #[test]
    fn cat_record_roundtrips_field_for_field() {
        let original = cat_record();
        let decoded = decode(&encode(&original)).expect("valid token");

        assert_eq!(decoded.version, "1");
        assert_eq!(decoded.payload.as_str(), "data:image/jpeg;base64,/9j/AAA");
        assert_eq!(decoded.name, "cat.jpg");
        assert_eq!(decoded.caption.as_deref(), Some("A cat"));
        assert_eq!(decoded, original);
    }

    #[test]
    fn roundtrip_without_caption() {
        let record = ShareRecord::new(Payload::from("data:image/jpeg;base64,AAAA"), "x.png", None);
        assert_eq!(decode(&encode(&record)), Some(record));
    }

    #[test]
    fn roundtrip_preserves_empty_caption() {
        let record = ShareRecord::new(Payload::from("data:,"), "", Some(String::new()));
        assert_eq!(decode(&encode(&record)), Some(record));
    }

    #[test]
    fn roundtrip_unicode_and_json_metacharacters() {
        let names = [
            "日本の猫.jpg",
            "emoji 🐈‍⬛ cat.png",
            "quote \" backslash \\ slash /",
            "newline\nand\ttab",
            "plus+equals=question?hash#",
            "",
        ];
        for name in names {
            let record = ShareRecord::new(
                Payload::from("data:image/jpeg;base64,/9j/+/+/=="),
                name,
                Some(format!("caption for {name}")),
            );
            assert_eq!(decode(&encode(&record)), Some(record), "name {name:?}");
        }
    }

    #[test]
    fn tokens_use_only_url_safe_characters() {
        // Payload chosen so the standard alphabet would produce '+' and '/'
        let record = ShareRecord::new(
            Payload::from("data:image/jpeg;base64,>>>???~~~"),
            "ÿÿÿ.jpg",
            Some("???>>>".into()),
        );
        let token = encode(&record);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "unexpected character in {token}"
        );
    }

    #[test]
    fn wire_format_uses_short_keys() {
        let token = encode(&cat_record());
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(token).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["v"], "1");
        assert_eq!(value["d"], "data:image/jpeg;base64,/9j/AAA");
        assert_eq!(value["n"], "cat.jpg");
        assert_eq!(value["a"], "A cat");
    }

    #[test]
    fn absent_caption_is_omitted_from_wire() {
        let record = ShareRecord::new(Payload::from("data:,"), "a.jpg", None);
        let json = String::from_utf8(URL_SAFE_NO_PAD.decode(encode(&record)).unwrap()).unwrap();
        assert!(!json.contains("\"a\""));
    }

    // =========================================================================
    // Decode totality
    // =========================================================================

    #[test]
    fn invalid_literal_is_absent() {
        assert_eq!(decode("not-a-valid-token!!"), None);
    }

    #[test]
    fn garbage_inputs_are_absent() {
        let inputs = [
            "",
            "   ",
            "=",
            "====",
            "a",
            "ab",
            "abc",
            "!!!!",
            "%%%%%%%%",
            "eyJ2IjoiMSJ9", // {"v":"1"}, no payload
            "bnVsbA",       // null
            "W10",          // []
            "MTIz",         // 123
            "/v/",
            "#/v/",
            "data:image/jpeg;base64,/9j/",
            "\u{0}\u{1}\u{2}",
            "日本語",
        ];
        for input in inputs {
            assert_eq!(decode(input), None, "input {input:?}");
        }
    }

    #[test]
    fn truncated_token_is_absent() {
        let token = encode(&cat_record());
        for cut in [1, 2, 5, token.len() / 2] {
            let truncated = &token[..token.len() - cut];
            assert_eq!(decode(truncated), None, "cut {cut}");
        }
    }

    #[test]
    fn invalid_utf8_is_absent() {
        let token = URL_SAFE_NO_PAD.encode([0xC3, 0x28, 0xFF, 0xFE]);
        assert!(matches!(
            parse_token(&token, VersionPolicy::AcceptAny),
            Err(LinkError::Utf8(_))
        ));
    }

    #[test]
    fn missing_payload_is_absent() {
        let token = token_for_json(r#"{"v":"1","n":"cat.jpg","a":"A cat"}"#);
        assert!(matches!(
            parse_token(&token, VersionPolicy::CurrentOnly),
            Err(LinkError::Record(_))
        ));
        assert_eq!(decode(&token), None);
    }

    #[test]
    fn wrong_field_type_is_absent() {
        let token = token_for_json(r#"{"v":1,"d":"data:,","n":"x"}"#);
        assert_eq!(decode_with(&token, VersionPolicy::AcceptAny), None);
    }

    #[test]
    fn missing_name_defaults_to_empty() {
        let token = token_for_json(r#"{"v":"1","d":"data:image/jpeg;base64,AA"}"#);
        let record = decode(&token).unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.caption, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let token = token_for_json(r#"{"v":"1","d":"data:,","n":"x","future":true}"#);
        assert!(decode(&token).is_some());
    }

    #[test]
    fn accepts_standard_alphabet_and_padding() {
        let json = r#"{"v":"1","d":"data:image/jpeg;base64,/9j/AAA","n":"cat.jpg","a":"A cat"}"#;
        let padded_standard = STANDARD.encode(json);
        assert_eq!(decode(&padded_standard), Some(cat_record()));

        let padded_url_safe = format!("{}==", encode(&cat_record()));
        assert_eq!(decode(&padded_url_safe), Some(cat_record()));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let token = format!("  {}\n", encode(&cat_record()));
        assert_eq!(decode(&token), Some(cat_record()));
    }

    // =========================================================================
    // Version policy
    // =========================================================================

    #[test]
    fn future_version_rejected_by_default() {
        let token = token_for_json(r#"{"v":"2","d":"data:,","n":"x"}"#);
        assert_eq!(decode(&token), None);
        assert!(matches!(
            parse_token(&token, VersionPolicy::CurrentOnly),
            Err(LinkError::UnsupportedVersion(v)) if v == "2"
        ));
    }

    #[test]
    fn future_version_accepted_when_allowed() {
        let token = token_for_json(r#"{"v":"2","d":"data:,","n":"x"}"#);
        let record = decode_with(&token, VersionPolicy::AcceptAny).unwrap();
        assert_eq!(record.version, "2");
        assert_eq!(record.name, "x");
    }

    #[test]
    fn current_version_accepted_under_both_policies() {
        let token = encode(&cat_record());
        assert!(decode_with(&token, VersionPolicy::CurrentOnly).is_some());
        assert!(decode_with(&token, VersionPolicy::AcceptAny).is_some());
    }

    // =========================================================================
    // URLs
    // =========================================================================

    #[test]
    fn share_url_uses_view_route() {
        assert_eq!(share_url("https://snaphost.app", "abc"), "https://snaphost.app/#/v/abc");
        assert_eq!(share_url("https://snaphost.app/", "abc"), "https://snaphost.app/#/v/abc");
    }

    #[test]
    fn extract_token_variants() {
        assert_eq!(extract_token("https://snaphost.app/#/v/abc-_1"), "abc-_1");
        assert_eq!(extract_token("http://localhost:5173/#/v/xyz"), "xyz");
        assert_eq!(extract_token("#/v/xyz"), "xyz");
        assert_eq!(extract_token("/v/xyz"), "xyz");
        assert_eq!(extract_token("v/xyz"), "xyz");
        assert_eq!(extract_token("  xyz \n"), "xyz");
        assert_eq!(extract_token("#xyz"), "xyz");
    }

    #[test]
    fn share_url_then_extract_then_decode() {
        let token = encode(&cat_record());
        let url = share_url("https://snaphost.app", &token);
        assert_eq!(decode(extract_token(&url)), Some(cat_record()));
    }

    // =========================================================================
    // Display helpers
    // =========================================================================

    #[test]
    fn alt_text_prefers_caption() {
        assert_eq!(cat_record().alt_text(), "A cat");

        let mut record = cat_record();
        record.caption = Some("   ".into());
        assert_eq!(record.caption(), None);
        assert_eq!(record.alt_text(), "cat.jpg");
    }
}
