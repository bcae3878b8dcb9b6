//! Turns a model's tool request into a state change and a result payload.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::contact::ContactChannel;
use crate::tools::{self, ToolError, ToolInvocation, ToolResult};
use crate::ui_state::UiStateStore;

/// Contact delivery never resolves faster than this.
pub const MIN_CONTACT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CONTACT_DELAY: Duration = Duration::from_millis(1500);

#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Runs one tool call. Always yields a result; unknown tools, bad
    /// arguments and handler failures come back as error-shaped results.
    async fn dispatch(&self, name: &str, args: &Value) -> ToolResult;
}

/// What a tool handler may touch.
pub struct ToolContext<'a> {
    pub store: &'a UiStateStore,
    pub contact: &'a dyn ContactChannel,
    pub contact_delay: Duration,
}

/// Dispatcher backed by the page state store. It is the only writer of
/// tool-driven state.
pub struct UiDispatcher {
    store: UiStateStore,
    contact: Arc<dyn ContactChannel>,
    contact_delay: Duration,
}

impl UiDispatcher {
    pub fn new(store: UiStateStore, contact: Arc<dyn ContactChannel>) -> Self {
        Self {
            store,
            contact,
            contact_delay: DEFAULT_CONTACT_DELAY,
        }
    }

    pub fn with_contact_delay(mut self, delay: Duration) -> Self {
        self.contact_delay = delay.max(MIN_CONTACT_DELAY);
        self
    }

    pub fn contact_delay(&self) -> Duration {
        self.contact_delay
    }

    pub async fn execute(&self, invocation: ToolInvocation) -> Result<String, ToolError> {
        let ctx = ToolContext {
            store: &self.store,
            contact: self.contact.as_ref(),
            contact_delay: self.contact_delay,
        };

        match invocation {
            ToolInvocation::NavigateToSection(input) => tools::navigate_to_section(input, &ctx).await,
            ToolInvocation::RunSystemDiagnostics(input) => {
                tools::run_system_diagnostics(input, &ctx).await
            }
            ToolInvocation::SendMessageToEric(input) => {
                tools::send_message_to_eric(input, &ctx).await
            }
            ToolInvocation::ModifyUiStyle(patch) => tools::modify_ui_style(patch, &ctx).await,
            ToolInvocation::GenerateArchitectureDiagram(input) => {
                tools::generate_architecture_diagram(input, &ctx).await
            }
            ToolInvocation::DeployDemoEnvironment(input) => {
                tools::deploy_demo_environment(input, &ctx).await
            }
        }
    }
}

#[async_trait]
impl ToolDispatcher for UiDispatcher {
    async fn dispatch(&self, name: &str, args: &Value) -> ToolResult {
        let invocation = match ToolInvocation::parse(name, args) {
            Ok(invocation) => invocation,
            Err(ToolError::UnknownTool(name)) => {
                warn!(tool = %name, "Model requested an unknown tool");
                return ToolResult::unknown_action();
            }
            Err(e) => {
                warn!(error = %e, "Rejected tool arguments");
                return ToolResult::error(e.to_string());
            }
        };

        let tool = invocation.name();
        debug!(tool = %tool, "Dispatching tool");
        match self.execute(invocation).await {
            Ok(content) => ToolResult::success(content),
            Err(e) => {
                warn!(tool = %tool, error = %e, "Tool failed");
                ToolResult::error(e.to_string())
            }
        }
    }
}
