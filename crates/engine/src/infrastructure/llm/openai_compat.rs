//! Chat-completions client for OpenAI and anything that mimics it (Ollama, LM Studio).
//!
//! A local server that rejects the chat-completions call is retried once on
//! Ollama's native `/api/generate` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{http_client, send_json};
use crate::infrastructure::app_settings::{LlmProvider, LlmSettings, ReasoningEffort};
use crate::infrastructure::ports::{FinishReason, LlmError, LlmPort, LlmRequest, LlmResponse, Usage};

#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    endpoint: String,
    /// Ollama's native generate endpoint, tried when the chat call fails.
    native_endpoint: Option<String>,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
    reasoning_effort: Option<ReasoningEffort>,
}

impl OpenAiCompatibleClient {
    pub fn new(settings: &LlmSettings) -> Self {
        let base = settings.base_url.trim_end_matches('/');
        Self {
            client: http_client(settings.request_timeout),
            endpoint: format!("{}/v1/chat/completions", base),
            native_endpoint: (settings.provider == LlmProvider::Ollama)
                .then(|| format!("{}/api/generate", base)),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            reasoning_effort: settings
                .reasoning_effort
                .filter(|_| settings.provider == LlmProvider::OpenAi),
        }
    }

    fn body<'a>(&'a self, request: &'a LlmRequest) -> CompletionBody<'a> {
        let system = request.system.as_deref().map(|content| Turn {
            role: "system",
            content,
        });
        let user = Turn {
            role: "user",
            content: &request.prompt,
        };

        CompletionBody {
            model: &self.model,
            messages: system.into_iter().chain(std::iter::once(user)).collect(),
            temperature: request.temperature.unwrap_or(self.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            reasoning_effort: self.reasoning_effort.map(|e| e.as_str()),
        }
    }

    fn native_body<'a>(&'a self, request: &'a LlmRequest) -> NativeBody<'a> {
        NativeBody {
            model: &self.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            stream: false,
            options: NativeOptions {
                temperature: request.temperature.unwrap_or(self.temperature),
                num_predict: request.max_tokens.unwrap_or(self.max_tokens),
            },
        }
    }

    async fn chat(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut http = self.client.post(&self.endpoint).json(&self.body(request));
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let completion: Completion = send_json(http).await?;
        completion.into_response()
    }

    async fn native(&self, endpoint: &str, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let http = self.client.post(endpoint).json(&self.native_body(request));
        let generated: NativeGeneration = send_json(http).await?;
        Ok(generated.into_response())
    }
}

#[async_trait]
impl LlmPort for OpenAiCompatibleClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let chat_error = match self.chat(&request).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        let Some(endpoint) = &self.native_endpoint else {
            return Err(chat_error);
        };

        tracing::warn!(
            error = %chat_error,
            "Chat completions failed on local endpoint, trying native generate API"
        );
        self.native(endpoint, &request).await.map_err(|e| {
            LlmError::RequestFailed(format!(
                "local endpoint rejected both APIs (chat: {}; generate: {})",
                chat_error, e
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<Turn<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        None | Some("stop") => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Unknown,
    }
}

impl Completion {
    fn into_response(self) -> Result<LlmResponse, LlmError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::invalid_response("completion has no choices"))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: finish_reason(choice.finish_reason.as_deref()),
            usage: self.usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

#[derive(Debug, Serialize)]
struct NativeBody<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: NativeOptions,
}

#[derive(Debug, Serialize)]
struct NativeOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct NativeGeneration {
    #[serde(default)]
    response: String,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

impl NativeGeneration {
    fn into_response(self) -> LlmResponse {
        let usage = match (self.prompt_eval_count, self.eval_count) {
            (Some(input_tokens), Some(output_tokens)) => Some(Usage {
                input_tokens,
                output_tokens,
            }),
            _ => None,
        };
        LlmResponse {
            content: self.response,
            finish_reason: finish_reason(self.done_reason.as_deref()),
            usage,
        }
    }
}
