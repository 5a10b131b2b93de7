//! Text generation collaborator.
//!
//! Services depend on [`TextGenerator`] only; the production implementation
//! calls the Generative Language `generateContent` endpoint.

use async_trait::async_trait;
use castroom_common::{AppError, AppResult, GenerationConfig};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Produces text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate one completion. Each call is a single attempt.
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Type alias for a shared text generator.
pub type TextGeneratorService = Arc<dyn TextGenerator>;

/// Generator used when no API key is configured. Every call fails.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _prompt: &str) -> AppResult<String> {
        Err(AppError::Precondition(
            "Text generation API key is not configured".to_string(),
        ))
    }
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    /// Create a client from configuration. Requires an API key.
    pub fn new(config: &GenerationConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Config("generation.api_key is not set".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let body = serde_json::json!({
            "contents": [
                {"parts": [{"text": prompt}]}
            ],
        });

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Gemini API error: {status} - {body}"
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse Gemini response: {e}"))
        })?;

        first_candidate_text(parsed)
            .ok_or_else(|| AppError::ExternalService("Gemini returned no text".to_string()))
    }
}

/// Build the generator the configuration asks for.
pub fn from_config(config: &GenerationConfig) -> AppResult<TextGeneratorService> {
    if config.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        tracing::warn!("No generation API key configured; generation will be refused");
        return Ok(Arc::new(UnconfiguredGenerator));
    }
    Ok(Arc::new(GeminiGenerator::new(config)?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(endpoint: &str) -> GenerationConfig {
        GenerationConfig {
            endpoint: endpoint.to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [
                    {"content": {"parts": [{"text": "Rainy night, "}, {"text": "warm tea."}]}},
                    {"content": {"parts": [{"text": "ignored"}]}}
                ]
            })))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config(&server.uri())).unwrap();
        let text = generator.generate("prompt").await.unwrap();
        assert_eq!(text, "Rainy night, warm tea.");
    }

    #[tokio::test]
    async fn test_error_status_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config(&server.uri())).unwrap();
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalService(ref m) if m.contains("quota")));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new(&config(&server.uri())).unwrap();
        assert!(generator.generate("prompt").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_to_unconfigured() {
        let generator = from_config(&GenerationConfig::default()).unwrap();
        let err = generator.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AppError::Precondition(_)));
        assert!(GeminiGenerator::new(&GenerationConfig::default()).is_err());
    }
}
