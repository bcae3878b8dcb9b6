use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ui_state::UiState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub reply: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// What a renderer needs: the raw state plus the theme as CSS properties.
#[derive(Debug, Serialize)]
pub struct StateSnapshot {
    pub state: UiState,
    pub css: BTreeMap<&'static str, String>,
}

impl From<UiState> for StateSnapshot {
    fn from(state: UiState) -> Self {
        let css = state.theme.css_variables().into_iter().collect();
        Self { state, css }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    User { text: String },
    ToolCall {
        name: String,
        input: serde_json::Value,
    },
    ToolResult { content: String, is_error: bool },
    Reply { text: String },
}
