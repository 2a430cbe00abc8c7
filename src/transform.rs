//! # Text Transform
//!
//! AI helpers that turn a web page or rough notes into receipt-ready text.
//! They are conveniences: a failure never blocks printing. [`Graceful`]
//! wraps any [`TextTransform`] and substitutes a fallback instead of an
//! error.
//!
//! ```text
//! extract(url)    → fetch page → model → plain text   (fallback: EXTRACT_FALLBACK)
//! reformat(text)  → model → receipt-shaped text        (fallback: the input)
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::TransformError;

/// Shown in place of extracted text when extraction fails.
pub const EXTRACT_FALLBACK: &str = "Failed to extract content from URL.";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Page text sent to the model is cut to this many characters.
const MAX_SOURCE_CHARS: usize = 30_000;

const EXTRACT_PROMPT: &str = "Extract the main readable content of this web page as plain text. \
Drop navigation, ads and markup. Keep it short enough for a paper receipt \
32 characters wide. Reply with the text only.\n\nPage:\n";

const REFORMAT_PROMPT: &str = "Reformat the following text for a 58mm thermal receipt \
(32 characters per line). Use short lines, simple ASCII punctuation and no markdown. \
Keep the meaning. Reply with the text only.\n\nText:\n";

/// Something that can extract or reformat text.
#[async_trait]
pub trait TextTransform: Send + Sync {
    /// Readable text from the page at `url`.
    async fn extract(&self, url: &str) -> Result<String, TransformError>;

    /// `text` reshaped for a narrow receipt.
    async fn reformat(&self, text: &str) -> Result<String, TransformError>;
}

/// Wrapper that turns transform failures into fallback text.
pub struct Graceful<T> {
    inner: T,
}

impl<T: TextTransform> Graceful<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub async fn extract(&self, url: &str) -> String {
        match self.inner.extract(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %e, "Extraction failed, using fallback text");
                EXTRACT_FALLBACK.to_string()
            }
        }
    }

    pub async fn reformat(&self, text: &str) -> String {
        match self.inner.reformat(text).await {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!(error = %e, "Reformat failed, keeping original text");
                text.to_string()
            }
        }
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiTransform {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiTransform {
    pub fn new(api_key: Option<String>) -> Result<Self, TransformError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recibo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn api_key(&self) -> Result<&str, TransformError> {
        self.api_key
            .as_deref()
            .ok_or(TransformError::MissingCredential)
    }

    async fn generate(&self, prompt: &str) -> Result<String, TransformError> {
        let key = self.api_key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling model");
        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(TransformError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(TransformError::EmptyResponse);
        }
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl TextTransform for GeminiTransform {
    async fn extract(&self, url: &str) -> Result<String, TransformError> {
        self.api_key()?;
        let page = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let page = truncate_chars(&page, MAX_SOURCE_CHARS);
        self.generate(&format!("{}{}", EXTRACT_PROMPT, page)).await
    }

    async fn reformat(&self, text: &str) -> Result<String, TransformError> {
        self.generate(&format!("{}{}", REFORMAT_PROMPT, text)).await
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((index, _)) => &s[..index],
        None => s,
    }
}

// ========== Wire types ==========

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Failing;

    #[async_trait]
    impl TextTransform for Failing {
        async fn extract(&self, _url: &str) -> Result<String, TransformError> {
            Err(TransformError::EmptyResponse)
        }

        async fn reformat(&self, _text: &str) -> Result<String, TransformError> {
            Err(TransformError::Api {
                status: 503,
                message: "overloaded".into(),
            })
        }
    }

    struct Upper;

    #[async_trait]
    impl TextTransform for Upper {
        async fn extract(&self, url: &str) -> Result<String, TransformError> {
            Ok(format!("page at {}", url))
        }

        async fn reformat(&self, text: &str) -> Result<String, TransformError> {
            Ok(text.to_uppercase())
        }
    }

    #[tokio::test]
    async fn test_graceful_fallbacks() {
        let graceful = Graceful::new(Failing);
        assert_eq!(graceful.extract("https://example.com").await, EXTRACT_FALLBACK);
        assert_eq!(graceful.reformat("keep me").await, "keep me");
    }

    #[tokio::test]
    async fn test_graceful_passes_results_through() {
        let graceful = Graceful::new(Upper);
        assert_eq!(graceful.extract("u").await, "page at u");
        assert_eq!(graceful.reformat("abc").await, "ABC");
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_network() {
        // An unroutable base URL would fail differently if it were contacted.
        let gemini = GeminiTransform::new(None)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        assert!(matches!(
            gemini.reformat("x").await,
            Err(TransformError::MissingCredential)
        ));
        assert!(matches!(
            gemini.extract("http://127.0.0.1:9/page").await,
            Err(TransformError::MissingCredential)
        ));

        let blank = GeminiTransform::new(Some("  ".into())).unwrap();
        assert!(matches!(
            blank.reformat("x").await,
            Err(TransformError::MissingCredential)
        ));
    }

    #[test]
    fn test_response_text() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), "Hello there");

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some("hi".into()),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hi"}]}]}"#
        );
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
