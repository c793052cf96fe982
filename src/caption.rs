//! Best-effort AI captions.
//!
//! A caption is a one-sentence description shown under the image and used
//! as its `alt` text. It is decoration: every failure path ends in a fixed
//! fallback string and the share goes ahead.
//!
//! | Situation | Caption |
//! |---|---|
//! | No API key configured | [`FALLBACK_CAPTION`] |
//! | Network error, timeout, HTTP error, bad JSON | [`FALLBACK_CAPTION`] |
//! | Payload is not base64 image data | [`FALLBACK_CAPTION`] |
//! | Service answered with no text | [`EMPTY_CAPTION`] |
//! | Service answered | the answer, trimmed |
//!
//! The production [`Captioner`] is [`GeminiCaptioner`], which calls the
//! Gemini `generateContent` REST endpoint once, with no retry.

use crate::config::CaptionConfig;
use crate::payload::Payload;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Caption when the service is unconfigured or unreachable.
pub const FALLBACK_CAPTION: &str = "A shared image via SnapHost.";

/// Caption when the service answered but said nothing.
pub const EMPTY_CAPTION: &str = "A beautiful shared image.";

/// Instruction sent alongside the image.
pub const CAPTION_PROMPT: &str =
    "Describe this image in one concise and engaging sentence for a social media sharing preview.";

/// Produces a caption for an image payload. Never fails.
pub trait Captioner {
    fn describe(&self, payload: &Payload) -> String;
}

/// Captioner for shares that should carry no caption at all.
///
/// Returns the empty string, which the share pipeline stores as "no caption".
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCaptioner;

impl Captioner for NoCaptioner {
    fn describe(&self, _payload: &Payload) -> String {
        String::new()
    }
}

/// The captioner `config` asks for: Gemini when enabled, otherwise none.
pub fn from_config(config: &CaptionConfig) -> Box<dyn Captioner> {
    if config.enabled {
        Box::new(GeminiCaptioner::from_env(config))
    } else {
        Box::new(NoCaptioner)
    }
}

#[derive(Error, Debug)]
enum CaptionError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("payload is not base64 image data")]
    InvalidPayload,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

// Request/response shapes for `models/{model}:generateContent`.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Default)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Captions through the Gemini REST API with a blocking `reqwest` client.
pub struct GeminiCaptioner {
    /// Present only when an API key is available.
    client: Option<(Client, String)>,
    endpoint: String,
    model: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiCaptioner {
    /// Build from config, reading the API key from the configured
    /// environment variable.
    pub fn from_env(config: &CaptionConfig) -> Self {
        Self::new(config, config.api_key_from_env())
    }

    /// Build with an explicit key. `None` yields a captioner that always
    /// returns [`FALLBACK_CAPTION`] without touching the network.
    pub fn new(config: &CaptionConfig, api_key: Option<String>) -> Self {
        let client = api_key.and_then(|key| {
            match Client::builder().timeout(config.timeout()).build() {
                Ok(client) => Some((client, key)),
                Err(e) => {
                    warn!(error = %e, "could not build HTTP client, captions disabled");
                    None
                }
            }
        });

        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.client.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// One round trip. Returns the raw (possibly empty) response text.
    fn request(&self, payload: &Payload) -> Result<String, CaptionError> {
        let (client, key) = self.client.as_ref().ok_or(CaptionError::MissingApiKey)?;

        let data = payload.base64_data();
        if data.is_empty() || STANDARD.decode(data).is_err() {
            return Err(CaptionError::InvalidPayload);
        }
        let mime_type = payload.media_type().unwrap_or("image/jpeg");

        let body = GenerateRequest {
            contents: [Content {
                parts: [
                    RequestPart::Image {
                        inline_data: InlineData { mime_type, data },
                    },
                    RequestPart::Text {
                        text: CAPTION_PROMPT,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        };

        debug!(model = %self.model, bytes = data.len(), "requesting caption");
        let response: GenerateResponse = client
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        Ok(response.text())
    }
}

impl Captioner for GeminiCaptioner {
    fn describe(&self, payload: &Payload) -> String {
        match self.request(payload) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    EMPTY_CAPTION.to_string()
                } else {
                    text.to_string()
                }
            }
            Err(CaptionError::MissingApiKey) => {
                warn!("API key not found, skipping AI description");
                FALLBACK_CAPTION.to_string()
            }
            Err(e) => {
                warn!(error = %e, "caption generation failed");
                FALLBACK_CAPTION.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    const JPEG_PAYLOAD: &str = "data:image/jpeg;base64,/9j/AAA=";

    #[test]
    fn disabled_config_yields_no_caption() {
        let config = CaptionConfig {
            enabled: false,
            ..CaptionConfig::default()
        };
        let captioner = from_config(&config);
        assert_eq!(captioner.describe(&Payload::from(JPEG_PAYLOAD)), "");
    }

    /// A captured HTTP request: head (request line + headers) and body.
    struct Captured {
        head: String,
        body: String,
    }

    /// Serve exactly one HTTP response on a random local port.
    ///
    /// Returns the base URL and a receiver for the captured request.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            // Read headers
            let header_end = loop {
                let n = stream.read(&mut chunk).unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break buf.len();
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            // Read body
            while buf.len() < header_end + content_length {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&buf[header_end..]).to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            let _ = tx.send(Captured {
                head,
                body: request_body,
            });
        });

        (format!("http://{addr}"), rx)
    }

    fn config_for(endpoint: &str) -> CaptionConfig {
        CaptionConfig {
            endpoint: endpoint.to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
            ..CaptionConfig::default()
        }
    }

    fn captioner(endpoint: &str) -> GeminiCaptioner {
        GeminiCaptioner::new(&config_for(endpoint), Some("test-key".to_string()))
    }

    #[test]
    fn no_captioner_returns_empty() {
        assert_eq!(NoCaptioner.describe(&Payload::from(JPEG_PAYLOAD)), "");
    }

    #[test]
    fn missing_api_key_falls_back_without_network() {
        let c = GeminiCaptioner::new(&config_for("http://127.0.0.1:1"), None);
        assert!(!c.has_api_key());
        assert_eq!(c.describe(&Payload::from(JPEG_PAYLOAD)), FALLBACK_CAPTION);
    }

    #[test]
    fn unreachable_service_falls_back() {
        // Port 1 on loopback: connection refused
        let c = captioner("http://127.0.0.1:1");
        assert_eq!(c.describe(&Payload::from(JPEG_PAYLOAD)), FALLBACK_CAPTION);
    }

    #[test]
    fn malformed_payload_falls_back() {
        let c = captioner("http://127.0.0.1:1");
        for bad in ["", "data:image/jpeg;base64,", "data:image/jpeg;base64,@@not base64@@"] {
            let caption = c.describe(&Payload::from(bad));
            assert_eq!(caption, FALLBACK_CAPTION, "payload {bad:?}");
        }
    }

    #[test]
    fn successful_response_is_trimmed() {
        let (url, rx) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"  A cat naps in the sun.\n"}]}}]}"#,
        );

        let caption = captioner(&url).describe(&Payload::from(JPEG_PAYLOAD));
        assert_eq!(caption, "A cat naps in the sun.");

        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(
            request
                .head
                .starts_with("POST /models/test-model:generateContent ")
        );
        assert!(request.head.to_ascii_lowercase().contains("x-goog-api-key: test-key"));

        let json: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        // Sent without the data URI prefix
        assert_eq!(parts[0]["inlineData"]["data"], "/9j/AAA=");
        assert_eq!(parts[1]["text"], CAPTION_PROMPT);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 100);
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn multiple_text_parts_are_joined() {
        let (url, _rx) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"A dog "},{"text":"on a beach."}]}}]}"#,
        );
        let caption = captioner(&url).describe(&Payload::from(JPEG_PAYLOAD));
        assert_eq!(caption, "A dog on a beach.");
    }

    #[test]
    fn empty_response_uses_empty_caption() {
        let (url, _rx) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#,
        );
        let caption = captioner(&url).describe(&Payload::from(JPEG_PAYLOAD));
        assert_eq!(caption, EMPTY_CAPTION);
    }

    #[test]
    fn no_candidates_uses_empty_caption() {
        let (url, _rx) = serve_once("200 OK", r#"{"promptFeedback":{"blockReason":"OTHER"}}"#);
        let caption = captioner(&url).describe(&Payload::from(JPEG_PAYLOAD));
        assert_eq!(caption, EMPTY_CAPTION);
    }

    #[test]
    fn http_error_falls_back() {
        let (url, _rx) = serve_once(
            "429 Too Many Requests",
            r#"{"error":{"code":429,"message":"quota"}}"#,
        );
        let caption = captioner(&url).describe(&Payload::from(JPEG_PAYLOAD));
        assert_eq!(caption, FALLBACK_CAPTION);
    }

    #[test]
    fn malformed_json_falls_back() {
        let (url, _rx) = serve_once("200 OK", "this is not json");
        let caption = captioner(&url).describe(&Payload::from(JPEG_PAYLOAD));
        assert_eq!(caption, FALLBACK_CAPTION);
    }

    #[test]
    fn slow_service_times_out_to_fallback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            // Accept and never answer
            let (_stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(5));
        });

        let config = CaptionConfig {
            timeout_secs: 1,
            ..config_for(&format!("http://{addr}"))
        };
        let c = GeminiCaptioner::new(&config, Some("k".into()));
        assert_eq!(c.describe(&Payload::from(JPEG_PAYLOAD)), FALLBACK_CAPTION);
    }

    #[test]
    fn bare_base64_payload_defaults_to_jpeg() {
        let (url, rx) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#,
        );
        captioner(&url).describe(&Payload::from("/9j/AAA="));
        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["data"], "/9j/AAA=");
    }
}
