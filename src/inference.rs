//! The remote model, seen as an opaque capability: given the transcript and
//! the tool catalog it answers with text or with one tool call.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::ai_sdk::{
    GenerateContentResponse, ProviderErrorResponse, build_request, reply_from_response,
};
use crate::config::Config;
use crate::tools::{ToolDefinition, ToolResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: Value,
}

/// One entry of the provider-level transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(String),
    Model(String),
    ToolCall(ToolCall),
    ToolResponse { call: ToolCall, result: ToolResult },
}

pub struct InferenceRequest<'a> {
    pub system_instruction: &'a str,
    pub turns: &'a [Turn],
    pub tools: &'a [ToolDefinition],
}

#[derive(Debug, Clone, PartialEq)]
pub enum InferenceReply {
    Text(String),
    ToolCall(ToolCall),
}

/// Every way the inference service can be unavailable.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("no API key configured for the inference service")]
    MissingCredential,

    #[error("inference request failed: {0}")]
    Network(String),

    #[error("inference service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unreadable inference reply: {0}")]
    Malformed(String),
}

impl InferenceError {
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            InferenceError::MissingCredential | InferenceError::Api { status: 401 | 403, .. }
        )
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(
        &self,
        request: &InferenceRequest<'_>,
    ) -> Result<InferenceReply, InferenceError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            temperature: config.temperature,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn complete(
        &self,
        request: &InferenceRequest<'_>,
    ) -> Result<InferenceReply, InferenceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(InferenceError::MissingCredential)?;

        let body = build_request(request, self.temperature);
        debug!(model = %self.model, turns = request.turns.len(), "Sending inference request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| InferenceError::Malformed(e.to_string()))?;
        reply_from_response(parsed).map_err(InferenceError::Malformed)
    }
}
