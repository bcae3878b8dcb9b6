//! Test doubles for the inference service and the tool dispatcher.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::dispatcher::ToolDispatcher;
use crate::inference::{InferenceClient, InferenceError, InferenceReply, InferenceRequest, Turn};
use crate::tools::ToolResult;

/// Lets a test hold a request open at the service boundary.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

struct Recorded {
    turns: Vec<Turn>,
    tool_count: usize,
    system_instruction: String,
}

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedInference {
    replies: Mutex<VecDeque<Result<InferenceReply, InferenceError>>>,
    seen: Mutex<Vec<Recorded>>,
    gate: Option<Arc<Gate>>,
}

impl ScriptedInference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        let client = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (client, gate)
    }

    pub fn push(&self, reply: Result<InferenceReply, InferenceError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.seen.lock().unwrap().iter().map(|r| r.turns.clone()).collect()
    }

    pub fn tool_counts(&self) -> Vec<usize> {
        self.seen.lock().unwrap().iter().map(|r| r.tool_count).collect()
    }

    pub fn system_instructions(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.system_instruction.clone())
            .collect()
    }
}

#[async_trait]
impl InferenceClient for ScriptedInference {
    async fn complete(
        &self,
        request: &InferenceRequest<'_>,
    ) -> Result<InferenceReply, InferenceError> {
        self.seen.lock().unwrap().push(Recorded {
            turns: request.turns.to_vec(),
            tool_count: request.tools.len(),
            system_instruction: request.system_instruction.to_string(),
        });

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Network("no scripted reply".to_string())))
    }
}

/// Accepts every call and answers "ok".
#[derive(Default)]
pub struct RecordingDispatcher {
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingDispatcher {
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolDispatcher for RecordingDispatcher {
    async fn dispatch(&self, name: &str, args: &Value) -> ToolResult {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), args.clone()));
        ToolResult::success("ok")
    }
}
