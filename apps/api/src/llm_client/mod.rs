/// LLM client: the single point of entry for all model calls in the recruiter API.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// All LLM interactions MUST go through `LlmClient`.
///
/// Every call is schema-constrained: the caller declares a `Schema`, the provider is
/// asked for `application/json` matching it, and the reply is isolated and parsed here.
/// There is no retry: a failed call is reported once and the user re-triggers it.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod schema;

#[cfg(test)]
pub mod testing;

use schema::Schema;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
pub const MODEL: &str = "gemini-2.5-flash";
/// Raw model output quoted in parse errors is cut to this many characters.
const RAW_OUTPUT_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not set in the environment")]
    MissingApiKey,

    #[error("Error initializing LLM client: {0}")]
    ClientInit(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM stopped without content (finish reason: {0})")]
    Stopped(String),

    #[error("Invalid JSON response format: {0}")]
    MalformedJson(&'static str),

    #[error("Failed to decode JSON response from model: {source}. Raw output: {raw}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

/// One structured generation request.
#[derive(Debug)]
pub struct StructuredRequest<'a> {
    pub prompt: &'a str,
    pub schema: &'a Schema,
    pub temperature: f32,
}

/// Transport seam for the LLM provider. Production uses `GeminiBackend`;
/// tests substitute a scripted backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Returns the raw text of the model's reply.
    async fn generate(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    response_mime_type: &'a str,
    response_schema: &'a Schema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCandidate {
    pub content: Option<ResponseContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Text of the first candidate, or the reason the model produced none.
    /// A missing or `STOP` finish reason is reported as plain empty content.
    pub fn into_text(self) -> Result<String, LlmError> {
        if let Some(text) = self.text() {
            return Ok(text);
        }
        match self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.finish_reason)
        {
            Some(reason) if reason != "STOP" => Err(LlmError::Stopped(reason)),
            _ => Err(LlmError::EmptyContent),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Google Gemini `generateContent` backend.
pub struct GeminiBackend {
    client: Client,
    api_key: Option<String>,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, request: &StructuredRequest<'_>) -> Result<String, LlmError> {
        // Checked per request so the server still starts without a credential.
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: "application/json",
                response_schema: request.schema,
            },
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{MODEL}:generateContent"))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.into_text()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by all AI-logic functions.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn LlmBackend>,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Builds a client backed by Gemini.
    pub fn gemini(api_key: Option<String>) -> Result<Self, LlmError> {
        Ok(Self::new(Arc::new(GeminiBackend::new(api_key)?)))
    }

    /// Makes a schema-constrained call and returns the raw reply text.
    pub async fn call(
        &self,
        prompt: &str,
        schema: &Schema,
        temperature: f32,
    ) -> Result<String, LlmError> {
        debug!("LLM call: prompt_chars={}, temperature={temperature}", prompt.len());
        self.backend
            .generate(&StructuredRequest {
                prompt,
                schema,
                temperature,
            })
            .await
    }

    /// Calls the LLM and deserializes the JSON object found in its reply.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: &Schema,
        temperature: f32,
    ) -> Result<T, LlmError> {
        let text = self.call(prompt, schema, temperature).await?;
        parse_json_reply(&text)
    }
}

/// Isolates the JSON object in `text` and decodes it.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let json = isolate_json_object(text)?;
    serde_json::from_str(json).map_err(|source| LlmError::Parse {
        source,
        raw: preview(text),
    })
}

/// Returns the slice from the first `{` to the last `}` inclusive.
///
/// Tolerates prose or code fences around the object. Fails when either brace is
/// missing or the last `}` precedes the first `{`.
pub fn isolate_json_object(text: &str) -> Result<&str, LlmError> {
    let start = text
        .find('{')
        .ok_or(LlmError::MalformedJson("no opening brace found"))?;
    let end = text
        .rfind('}')
        .ok_or(LlmError::MalformedJson("no closing brace found"))?;
    if end < start {
        return Err(LlmError::MalformedJson("braces are mismatched"));
    }
    Ok(&text[start..=end])
}

fn preview(text: &str) -> String {
    if text.chars().count() <= RAW_OUTPUT_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(RAW_OUTPUT_PREVIEW_CHARS).collect();
    format!("{cut}…")
}
