//! The runtime both front ends share: one state store, one conversation
//! session, and the overlay player that animates the store.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, ConfigError};
use crate::contact::{ContactMessage, MockContactChannel};
use crate::dispatcher::UiDispatcher;
use crate::inference::{GeminiClient, InferenceClient};
use crate::overlay::OverlayPlayer;
use crate::session::ConversationSession;
use crate::ui_state::UiStateStore;

pub struct Portfolio {
    owner: String,
    store: UiStateStore,
    contact: Arc<MockContactChannel>,
    session: Arc<ConversationSession>,
    overlays: JoinHandle<()>,
}

impl Portfolio {
    /// Runtime backed by the Gemini client. Must be called inside a tokio
    /// runtime.
    pub fn start(config: &Config) -> Result<Self, ConfigError> {
        let client = GeminiClient::from_config(config);
        if !client.has_credential() {
            warn!("GEMINI_API_KEY is not set; the assistant will answer with a system error");
        }
        Self::with_client(config, Arc::new(client))
    }

    pub fn with_client(
        config: &Config,
        client: Arc<dyn InferenceClient>,
    ) -> Result<Self, ConfigError> {
        let resume = config.resume()?;
        let store = UiStateStore::new();
        let contact = Arc::new(MockContactChannel::new(config.owner.clone()));
        let dispatcher = UiDispatcher::new(store.clone(), contact.clone())
            .with_contact_delay(config.contact_delay());
        info!(
            model = %config.model,
            resume_file = ?config.resume,
            contact_delay_ms = dispatcher.contact_delay().as_millis() as u64,
            "Starting portfolio runtime"
        );

        let session = Arc::new(ConversationSession::new(
            client,
            Arc::new(dispatcher),
            config.system_instruction(&resume),
        ));
        let overlays = OverlayPlayer::new(store.clone()).spawn();

        Ok(Self {
            owner: config.owner.clone(),
            store,
            contact,
            session,
            overlays,
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn store(&self) -> &UiStateStore {
        &self.store
    }

    /// Messages the contact tool "sent". They never leave the process.
    pub fn outbox(&self) -> Vec<ContactMessage> {
        self.contact.delivered()
    }

    pub fn session(&self) -> &Arc<ConversationSession> {
        &self.session
    }
}

impl Drop for Portfolio {
    fn drop(&mut self) {
        self.overlays.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferenceReply, ToolCall};
    use crate::session::SYSTEM_ERROR_REPLY;
    use crate::testing::ScriptedInference;
    use crate::ui_state::{DeploymentStatus, OverlayKind};
    use clap::Parser;
    use serde_json::json;
    use std::time::Duration;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    fn config() -> Config {
        Harness::parse_from(["portfolio", "--api-key", ""]).config
    }

    fn tool_call(name: &str, args: serde_json::Value) -> InferenceReply {
        InferenceReply::ToolCall(ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            args,
        })
    }

    #[tokio::test]
    async fn missing_key_degrades_every_reply() {
        let portfolio = Portfolio::start(&config()).unwrap();

        for _ in 0..2 {
            let reply = portfolio.session().send_user_message("hello").await.unwrap();
            assert_eq!(reply, SYSTEM_ERROR_REPLY);
        }
        assert_eq!(portfolio.session().messages().len(), 4);
        assert!(!portfolio.session().is_busy());
    }

    #[tokio::test]
    async fn requests_carry_the_resume() {
        let client = Arc::new(ScriptedInference::new());
        client.push(Ok(InferenceReply::Text("Python, Go and Linux.".to_string())));
        let portfolio = Portfolio::with_client(&config(), client.clone()).unwrap();

        portfolio
            .session()
            .send_user_message("what languages does Eric know?")
            .await
            .unwrap();

        let instructions = client.system_instructions();
        assert_eq!(instructions.len(), 1);
        assert!(instructions[0].contains("CORE COMPETENCIES"));
        assert!(instructions[0].contains("STRICTLY on the context provided"));
    }

    #[test]
    fn unreadable_resume_stops_startup() {
        let config = Harness::parse_from(["portfolio", "--resume", "/nonexistent/resume.txt"]).config;
        let client = Arc::new(ScriptedInference::new());
        assert!(Portfolio::with_client(&config, client).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn contact_request_lands_in_the_outbox() {
        let client = Arc::new(ScriptedInference::new());
        client.push(Ok(tool_call(
            "send_message_to_eric",
            json!({"message": "Are you available in May?", "contactInfo": "ada@example.com"}),
        )));
        client.push(Ok(InferenceReply::Text("Sent.".to_string())));
        let portfolio = Portfolio::with_client(&config(), client).unwrap();

        let reply = portfolio
            .session()
            .send_user_message("tell Eric I want to hire him")
            .await
            .unwrap();

        assert_eq!(reply, "Sent.");
        let outbox = portfolio.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].body, "Are you available in May?");
        assert_eq!(outbox[0].reply_to.as_deref(), Some("ada@example.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn deploy_request_plays_out_after_the_reply() {
        let client = Arc::new(ScriptedInference::new());
        client.push(Ok(tool_call("deploy_demo_environment", json!({"envType": "cluster"}))));
        client.push(Ok(InferenceReply::Text("Spinning it up.".to_string())));
        let portfolio = Portfolio::with_client(&config(), client).unwrap();

        portfolio
            .session()
            .send_user_message("deploy a cluster")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(12)).await;

        let overlay = portfolio.store().get_state().overlay.unwrap();
        assert_eq!(overlay.log.len(), 18);
        assert!(matches!(
            overlay.kind,
            OverlayKind::DeploymentConsole {
                status: DeploymentStatus::Complete,
                ..
            }
        ));
    }
}
