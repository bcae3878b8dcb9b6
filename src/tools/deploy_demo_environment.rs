use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ToolDefinition, ToolError, ToolName, input_schema, parse_input};
use crate::dispatcher::ToolContext;
use crate::ui_state::{DeploymentStatus, EnvKind, OverlayKind};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeployInput {
    #[schemars(description = "The type of resource to deploy.")]
    pub env_type: EnvKind,
}

pub(super) fn parse(args: &Value) -> Result<DeployInput, ToolError> {
    parse_input(ToolName::DeployDemoEnvironment, args)
}

/// Opens the deployment console and returns immediately; the console's own
/// log playback moves the status along.
pub(crate) async fn run(input: DeployInput, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    ctx.store.set_overlay(Some(OverlayKind::DeploymentConsole {
        env: input.env_type,
        status: DeploymentStatus::Deploying,
    }));
    Ok(format!(
        "Initializing deployment simulation for {}...",
        input.env_type.as_str()
    ))
}

pub(super) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::DeployDemoEnvironment,
        description: "Simulates a live infrastructure deployment. Nothing is actually provisioned. Use this when the user wants to see DevOps skills, a deployment demo, or asks to spin up a server.",
        input_schema: input_schema::<DeployInput>(),
    }
}
