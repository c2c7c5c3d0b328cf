//! Groq chat-completion client (OpenAI-compatible API).

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{
    AssistantReply, ChatMessage, ChatRequest, LlmClient, LlmError, MODEL_DECOMMISSIONED_CODE,
};

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl GroqClient {
    /// `http` should already carry the request timeout.
    pub fn new(http: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn chat_completion(&self, request: &ChatRequest<'_>) -> Result<AssistantReply, LlmError> {
        tracing::debug!(
            model = request.model,
            messages = request.messages.len(),
            tools = request.tools.map(|t| t.len()).unwrap_or(0),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(request.model, status, &body));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::InvalidResponse(format!("failed to decode completion: {}", e)))?;
        let message = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

        AssistantReply::from_message(message)
    }
}

/// Map a non-success response to the matching error variant.
fn classify_error(model: &str, status: StatusCode, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());
    let code = parsed
        .as_ref()
        .and_then(|e| e.error.code.as_ref())
        .and_then(|c| c.as_str())
        .unwrap_or_default();

    if code.contains(MODEL_DECOMMISSIONED_CODE) {
        tracing::error!(model, "Configured model has been decommissioned by the provider");
        LlmError::ModelDecommissioned {
            model: model.to_string(),
            message,
        }
    } else {
        tracing::warn!(status = status.as_u16(), "Provider returned an error: {}", message);
        LlmError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
