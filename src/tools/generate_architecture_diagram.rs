use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ToolDefinition, ToolError, ToolName, input_schema, parse_input};
use crate::dispatcher::ToolContext;
use crate::ui_state::{ArchitectureKind, OverlayKind};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArchitectureInput {
    #[schemars(description = "The specific system to visualize.")]
    pub system_type: ArchitectureKind,
}

pub(super) fn parse(args: &Value) -> Result<ArchitectureInput, ToolError> {
    parse_input(ToolName::GenerateArchitectureDiagram, args)
}

pub(crate) async fn run(
    input: ArchitectureInput,
    ctx: &ToolContext<'_>,
) -> Result<String, ToolError> {
    ctx.store.set_overlay(Some(OverlayKind::ArchitectureDiagram {
        system: input.system_type,
    }));
    Ok(format!(
        "Visualizing architecture for {}...",
        input.system_type.as_str()
    ))
}

pub(super) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::GenerateArchitectureDiagram,
        description: "Visualizes a technical architecture diagram. Use this when the user asks how the RAG pipeline works, wants to see the cloud setup, asks how the VoIP system was built, or asks how this site works.",
        input_schema: input_schema::<ArchitectureInput>(),
    }
}
