//! Generative text service used by the AI tools.

use crate::error::ServiceError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const INVALID_KEY_MARKER: &str = "API key not valid";

#[async_trait]
pub trait TextService: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, ServiceError>;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ServiceError>;

    async fn transcribe(&self, audio: &[u8], mime: &str) -> Result<String, ServiceError>;
}

pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following text concisely. Focus on the main points and key information. \
         Provide the summary as a few clear paragraphs or bullet points if appropriate. \
         Text to summarize:\n\n---\n\n{text}"
    )
}

pub fn translation_prompt(text: &str, source: &str, target: &str) -> String {
    format!("Translate the following text from {source} to {target}:\n\n---\n\n{text}")
}

/// Gemini `generateContent` client. Without an API key every call fails with
/// [`ServiceError::Unconfigured`] and nothing goes over the wire.
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiService {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, key
        )
    }

    async fn generate(&self, parts: Value, operation: &'static str) -> Result<String, ServiceError> {
        let key = self.api_key.as_deref().ok_or(ServiceError::Unconfigured)?;
        let body = json!({ "contents": [{ "parts": parts }] });

        log::debug!("gemini {operation} via model '{}'", self.model);
        let response = self
            .client
            .post(self.endpoint(key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::warn!("gemini {operation} request failed: {e}");
                ServiceError::Unavailable { operation }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            log::warn!("gemini {operation} body read failed: {e}");
            ServiceError::Unavailable { operation }
        })?;

        if !status.is_success() {
            if text.contains(INVALID_KEY_MARKER) {
                return Err(ServiceError::InvalidKey);
            }
            log::warn!("gemini {operation} returned HTTP {status}");
            return Err(ServiceError::Unavailable { operation });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            log::warn!("gemini {operation} response malformed: {e}");
            ServiceError::Unavailable { operation }
        })?;
        parsed.text().ok_or(ServiceError::Unavailable { operation })
    }
}

#[async_trait]
impl TextService for GeminiService {
    async fn summarize(&self, text: &str) -> Result<String, ServiceError> {
        if !self.is_configured() {
            return Err(ServiceError::Unconfigured);
        }
        if text.is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        self.generate(json!([{ "text": summary_prompt(text) }]), "generate summary")
            .await
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ServiceError> {
        if !self.is_configured() {
            return Err(ServiceError::Unconfigured);
        }
        if text.is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        self.generate(
            json!([{ "text": translation_prompt(text, source, target) }]),
            "translate text",
        )
        .await
    }

    async fn transcribe(&self, audio: &[u8], mime: &str) -> Result<String, ServiceError> {
        if !self.is_configured() {
            return Err(ServiceError::Unconfigured);
        }
        if audio.is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        let parts = json!([
            { "inlineData": { "mimeType": mime, "data": B64.encode(audio) } },
            { "text": "Transcribe this audio." },
        ]);
        self.generate(parts, "transcribe audio").await
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let joined: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(joined)
    }
}
