/// LLM client: the single point of entry for all model calls.
///
/// ARCHITECTURAL RULE: no other module may talk to the generation endpoint
/// directly. Extraction goes through `CompletionClient` so the parse
/// pipeline can be driven by a scripted fake in tests.
///
/// The endpoint is an Ollama-style generation API: `POST /api/generate`
/// with `{model, prompt, stream:false, options}` returning `{response}`.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Fallback model when OLLAMA_MODEL is not set. Small enough to run on a
/// laptop, deterministic enough at temperature 0 for schema extraction.
pub const DEFAULT_MODEL: &str = "qwen2.5:1.5b";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Model returned empty completion")]
    EmptyCompletion,
}

/// Sampling options for one generation call, serialized verbatim into the
/// request's `options` object.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f64>,
    pub num_predict: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

impl GenerateOptions {
    /// Primary extraction call: greedy sampling, generous budget, stop
    /// sequences that cut the model off before it starts explaining itself.
    pub fn extraction() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.1,
            top_k: Some(1),
            repeat_penalty: Some(1.0),
            num_predict: 2048,
            stop: vec![
                "\n\n".to_string(),
                "```".to_string(),
                "END".to_string(),
                "EXPLANATION".to_string(),
            ],
        }
    }

    /// Retry call: even lower diversity, smaller budget, no stop sequences
    /// (the compact retry prompt keeps the model terse on its own).
    pub fn strict_retry() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.05,
            top_k: None,
            repeat_penalty: None,
            num_predict: 1024,
            stop: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// The seam between the parse pipeline and the model. Production code uses
/// `OllamaClient`; tests script completions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions)
        -> Result<String, LlmError>;
}

/// Client for a local Ollama-compatible generation endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: Client::builder()
                // Local models can take a while on long resumes.
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one generation request, retrying transport failures, 429s and
    /// 5xx responses with exponential backoff.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };
        let url = format!("{}/api/generate", self.base_url);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Generation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(&url).json(&request_body).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation endpoint returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let generate_response: GenerateResponse = response.json().await?;

            let text = generate_response
                .response
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .ok_or(LlmError::EmptyCompletion)?;

            debug!("Generation succeeded: {} chars", text.len());

            return Ok(text);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Cheap reachability probe against the model list endpoint, used by
    /// the health route. Never errors; unreachable is just `false`.
    pub async fn is_reachable(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, LlmError> {
        OllamaClient::generate(self, prompt, options).await
    }
}
