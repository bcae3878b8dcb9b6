//! One chat conversation between the visitor and the inference service.
//!
//! A session owns the visible message history and, lazily, a chat handle with
//! the provider-level transcript. At most one exchange runs at a time: a
//! submission made while another is in flight is rejected with
//! [`SessionError::Busy`] before anything is recorded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dispatcher::ToolDispatcher;
use crate::inference::{InferenceClient, InferenceError, InferenceReply, InferenceRequest, Turn};
use crate::protocol::StreamEvent;
use crate::tools::list_tools;

/// Reply used when the model's final answer carries no text.
pub const FALLBACK_REPLY: &str = "Command executed.";
pub const LINK_UNSTABLE_REPLY: &str =
    "Connection interrupted. My neural link is experiencing latency. Please retry the command.";
pub const SYSTEM_ERROR_REPLY: &str = "System Error: API key missing or invalid.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a request is already in flight")]
    Busy,

    #[error("message is empty")]
    EmptyMessage,
}

struct ChatHandle {
    id: Uuid,
    turns: Vec<Turn>,
}

impl ChatHandle {
    fn open() -> Self {
        let id = Uuid::new_v4();
        info!(chat_id = %id, "Opening chat");
        Self {
            id,
            turns: Vec::new(),
        }
    }
}

/// Clears the in-flight flag when the exchange ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owes the history an agent message for the user message just recorded.
/// If the exchange future is dropped before it answers, the debt is paid
/// with the degraded reply so every user message still gets one.
struct PendingReply<'a> {
    session: &'a ConversationSession,
    answered: bool,
}

impl<'a> PendingReply<'a> {
    fn new(session: &'a ConversationSession) -> Self {
        Self {
            session,
            answered: false,
        }
    }

    fn answer(mut self, reply: &str) {
        self.answered = true;
        self.session.record_reply(reply);
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.answered {
            warn!("Exchange abandoned before the reply");
            self.session.reset_chat();
            self.session.record_reply(LINK_UNSTABLE_REPLY);
        }
    }
}

pub struct ConversationSession {
    client: Arc<dyn InferenceClient>,
    dispatcher: Arc<dyn ToolDispatcher>,
    system_instruction: String,
    messages: Mutex<Vec<Message>>,
    chat: Mutex<Option<ChatHandle>>,
    in_flight: AtomicBool,
    events: broadcast::Sender<StreamEvent>,
}

impl ConversationSession {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        dispatcher: Arc<dyn ToolDispatcher>,
        system_instruction: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(200);
        Self {
            client,
            dispatcher,
            system_instruction: system_instruction.into(),
            messages: Mutex::new(Vec::new()),
            chat: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            events,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        lock(&self.messages).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.events.subscribe()
    }

    /// Drops the chat handle; the next message opens a fresh one.
    pub fn reset_chat(&self) {
        if let Some(chat) = lock(&self.chat).take() {
            info!(chat_id = %chat.id, "Discarding chat");
        }
    }

    /// Sends one visitor message and returns the agent's reply.
    ///
    /// The user message is recorded before the service is contacted. Failures
    /// of the service do not surface as errors: they produce a degraded reply
    /// that is recorded like any other.
    pub async fn send_user_message(&self, text: &str) -> Result<String, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let _in_flight = InFlight::acquire(&self.in_flight).ok_or(SessionError::Busy)?;

        self.record(Message::new(Role::User, text));
        self.emit(StreamEvent::User {
            text: text.to_string(),
        });
        // Dropped before `_in_flight`, so the history is complete by the
        // time the session reads as idle.
        let pending = PendingReply::new(self);

        let reply = match self.exchange(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Inference failed");
                self.reset_chat();
                degraded_reply(&e).to_string()
            }
        };

        pending.answer(&reply);
        Ok(reply)
    }

    async fn exchange(&self, text: &str) -> Result<String, InferenceError> {
        // Taken out for the duration of the exchange; an early `?` return
        // leaves the slot empty, which discards the handle.
        let mut chat = lock(&self.chat).take().unwrap_or_else(ChatHandle::open);
        chat.turns.push(Turn::User(text.to_string()));

        let reply = match self.complete(&chat).await? {
            InferenceReply::Text(text) => text,
            InferenceReply::ToolCall(call) => {
                info!(chat_id = %chat.id, tool = %call.name, "Model requested a tool");
                self.emit(StreamEvent::ToolCall {
                    name: call.name.clone(),
                    input: call.args.clone(),
                });

                chat.turns.push(Turn::ToolCall(call.clone()));
                let result = self.dispatcher.dispatch(&call.name, &call.args).await;
                debug!(tool = %call.name, is_error = result.is_error, "Tool finished");
                self.emit(StreamEvent::ToolResult {
                    content: result.content.clone(),
                    is_error: result.is_error,
                });
                chat.turns.push(Turn::ToolResponse { call, result });

                match self.complete(&chat).await? {
                    InferenceReply::Text(text) => text,
                    InferenceReply::ToolCall(extra) => {
                        warn!(tool = %extra.name, "Ignoring a second tool call in one turn");
                        String::new()
                    }
                }
            }
        };

        let reply = if reply.trim().is_empty() {
            FALLBACK_REPLY.to_string()
        } else {
            reply
        };
        chat.turns.push(Turn::Model(reply.clone()));
        *lock(&self.chat) = Some(chat);
        Ok(reply)
    }

    async fn complete(&self, chat: &ChatHandle) -> Result<InferenceReply, InferenceError> {
        let request = InferenceRequest {
            system_instruction: &self.system_instruction,
            turns: &chat.turns,
            tools: list_tools(),
        };
        self.client.complete(&request).await
    }

    fn record(&self, message: Message) {
        lock(&self.messages).push(message);
    }

    fn record_reply(&self, reply: &str) {
        self.record(Message::new(Role::Agent, reply));
        self.emit(StreamEvent::Reply {
            text: reply.to_string(),
        });
    }

    fn emit(&self, event: StreamEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn degraded_reply(error: &InferenceError) -> &'static str {
    if error.is_credential() {
        SYSTEM_ERROR_REPLY
    } else {
        LINK_UNSTABLE_REPLY
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
