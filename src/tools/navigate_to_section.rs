use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ToolDefinition, ToolError, ToolName, input_schema, parse_input};
use crate::dispatcher::ToolContext;
use crate::ui_state::SectionId;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NavigateInput {
    #[schemars(description = "The ID of the section to scroll to.")]
    pub section_id: SectionId,
}

pub(super) fn parse(args: &Value) -> Result<NavigateInput, ToolError> {
    parse_input(ToolName::NavigateToSection, args)
}

pub(crate) async fn run(input: NavigateInput, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    ctx.store.request_scroll(input.section_id);
    Ok(format!("Navigated to {}", input.section_id.as_str()))
}

pub(super) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::NavigateToSection,
        description: "Scrolls the website to a specific section.",
        input_schema: input_schema::<NavigateInput>(),
    }
}
