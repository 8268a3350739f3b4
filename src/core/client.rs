//! Text-generation client for the Gemini REST API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::ModelInfo;

/// Page size requested when listing models
const MODELS_PAGE_SIZE: u32 = 1000;

/// Longest single wait between retries
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Opaque text-completion service
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Complete `prompt`, returning the model's raw text
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Every model the provider advertises
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<RawModel>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

impl From<RawModel> for ModelInfo {
    fn from(raw: RawModel) -> Self {
        ModelInfo {
            name: raw.name,
            supported_generation_methods: raw.supported_generation_methods,
        }
    }
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Result<String> {
        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            TranslationError::InvalidResponseError {
                message: match self.prompt_feedback {
                    Some(feedback) => format!("No candidates returned (feedback: {})", feedback),
                    None => "No candidates returned".to_string(),
                },
            }
        })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(TranslationError::InvalidResponseError {
                message: format!(
                    "No text in response (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            });
        }

        Ok(text)
    }
}

/// Gemini client with optional retry
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl GeminiClient {
    /// Create a new client
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Send with retry on transient failures
    async fn generate_with_retry(&self, prompt: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                debug!("Retry attempt {} for model {}", attempt, self.config.model);
            }

            match self.send_generate(prompt).await {
                Ok(text) => {
                    if attempt > 0 {
                        info!("Generation succeeded after {} retries", attempt);
                    }
                    return Ok(text);
                }
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = retry_delay(&e, self.config.retry_delay_ms, attempt);
                    warn!("Generation failed: {}, retrying in {:?}", e, delay);
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send actual HTTP request
    async fn send_generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = self.endpoint(&format!("{}:generateContent", self.config.model_path()));
        debug!("POST {} ({} prompt bytes)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let response = check_status(response).await?;

        let parsed: GenerateResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        parsed.into_text()
    }
}

/// Wait before retry `attempt`: the server's `Retry-After` when given,
/// else exponential backoff, never above `MAX_RETRY_DELAY`
fn retry_delay(err: &TranslationError, base_ms: u64, attempt: u32) -> Duration {
    let delay = match err {
        TranslationError::RateLimitError {
            retry_after: Some(secs),
        } => Duration::from_secs(*secs),
        _ => Duration::from_millis(base_ms.saturating_mul(2_u64.saturating_pow(attempt))),
    };
    delay.min(MAX_RETRY_DELAY)
}

/// Map non-success statuses to typed errors
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 429 {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        return Err(TranslationError::RateLimitError { retry_after });
    }

    let message = response.text().await.unwrap_or_default();
    Err(TranslationError::ApiError {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_retry(prompt).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.endpoint("models");
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", MODELS_PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let response = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .query(&query)
                .send()
                .await
                .map_err(|e| TranslationError::NetworkError {
                    message: e.to_string(),
                })?;

            let page: ModelsPage = check_status(response).await?.json().await.map_err(|e| {
                TranslationError::InvalidResponseError {
                    message: e.to_string(),
                }
            })?;

            models.extend(page.models.into_iter().map(ModelInfo::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Provider listed {} models", models.len());
        Ok(models)
    }
}
