//! Generation backend: send a prompt to Gemini and return its text.
//!
//! [`Generator::generate`] cannot fail at the type level. Failures come back
//! as strings the caller passes through to the user:
//!
//! - `"Error generating feedback: <detail>"` for a missing key, transport
//!   errors, timeouts, non-2xx statuses, or a body that is not JSON
//! - `"No valid response from Gemini."` when the JSON carries no usable text

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ApiKey, Config};
use crate::error::{Error, Result};
use crate::retriever::preview;

const NO_VALID_RESPONSE: &str = "No valid response from Gemini.";
const PREVIEW_CHARS: usize = 250;

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> String;
}

/// Request body for `generateContent`.
#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Response from `generateContent`. Every level is optional so that shape
/// surprises surface as "no text" instead of a parse error.
#[derive(Deserialize, Default)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<ApiKey>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.generation.timeout_secs))
            .build()
            .map_err(|e| Error::Generation(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.gemini.api_base.clone(),
            model: config.generation.model.clone(),
            api_key: config.gemini_api_key.clone(),
        })
    }

    /// One round trip. `Ok(None)` means the backend answered without text.
    async fn request(&self, prompt: &str) -> Result<Option<String>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::Generation("GEMINI_API_KEY is not configured".to_string()))?;

        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);
        let body = GeminiRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.expose())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        let status = response.status();
        tracing::info!(status = status.as_u16(), "Gemini responded");

        let text = response
            .text()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Generation(format!("HTTP {}: {}", status, text)));
        }

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| Error::Generation(e.to_string()))?;
        let parsed: GeminiResponse = serde_json::from_value(json).unwrap_or_default();

        Ok(parsed.first_text())
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> String {
        tracing::debug!(prompt = %preview(prompt, PREVIEW_CHARS), "sending prompt to Gemini");

        match self.request(prompt).await {
            Ok(Some(text)) => {
                tracing::debug!(response = %preview(&text, PREVIEW_CHARS), "Gemini output");
                text
            }
            Ok(None) => {
                tracing::warn!("Gemini response carried no text");
                NO_VALID_RESPONSE.to_string()
            }
            Err(Error::Generation(detail)) => {
                tracing::error!(error = %detail, "Gemini request failed");
                format!("Error generating feedback: {}", detail)
            }
            Err(e) => {
                tracing::error!(error = %e, "Gemini request failed");
                format!("Error generating feedback: {}", e)
            }
        }
    }
}
