//! Text-generation backends.
//!
//! Thin transport adapters: one HTTP attempt per `generate` call (a local
//! server gets a second try on its native API), errors surfaced as
//! [`LlmError`]. Which adapter is used is decided once, from [`LlmSettings`],
//! by [`build_llm_client`].

mod anthropic;
mod gemini;
mod openai_compat;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::infrastructure::app_settings::{LlmProvider, LlmSettings};
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai_compat::OpenAiCompatibleClient;

/// Select and construct the adapter for the configured provider.
pub fn build_llm_client(settings: &LlmSettings) -> Result<Arc<dyn LlmPort>, LlmError> {
    if settings.provider.requires_api_key() && settings.api_key.is_none() {
        return Err(LlmError::Configuration(format!(
            "provider '{}' requires an API key",
            settings.provider
        )));
    }

    let client: Arc<dyn LlmPort> = match settings.provider {
        LlmProvider::OpenAi | LlmProvider::Ollama => {
            Arc::new(OpenAiCompatibleClient::new(settings))
        }
        LlmProvider::Anthropic => Arc::new(AnthropicClient::new(settings)),
        LlmProvider::Gemini => Arc::new(GeminiClient::new(settings)),
    };

    tracing::info!(
        provider = %settings.provider,
        model = %settings.model,
        base_url = %settings.base_url,
        "Text-generation backend configured"
    );

    Ok(client)
}

/// Backend that could not be built. Every call fails with the reason, so
/// callers take their usual fallback path.
#[derive(Debug, Clone)]
pub struct UnavailableLlm {
    reason: String,
}

impl UnavailableLlm {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmPort for UnavailableLlm {
    async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::Configuration(self.reason.clone()))
    }
}

fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a prepared request and decode a JSON body, mapping failures to `LlmError`.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, LlmError> {
    let response = request.send().await.map_err(LlmError::request)?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(LlmError::RequestFailed(format!("{}: {}", status, error_text)));
    }

    response.json().await.map_err(LlmError::invalid_response)
}
