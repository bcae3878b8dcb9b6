use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ToolDefinition, ToolError, ToolName, input_schema, parse_input};
use crate::dispatcher::ToolContext;
use crate::ui_state::OverlayKind;

const MAX_DURATION_SECS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiagnosticsInput {
    #[schemars(description = "Duration of the scan in seconds. Leave out for the standard four-second scan.")]
    #[serde(default)]
    pub duration: Option<f64>,
}

pub(super) fn parse(args: &Value) -> Result<DiagnosticsInput, ToolError> {
    let input: DiagnosticsInput = parse_input(ToolName::RunSystemDiagnostics, args)?;

    if let Some(duration) = input.duration {
        if !duration.is_finite() || duration <= 0.0 || duration > MAX_DURATION_SECS {
            return Err(ToolError::validation(
                ToolName::RunSystemDiagnostics,
                format!("duration must be between 0 and {MAX_DURATION_SECS} seconds, got {duration}"),
            ));
        }
    }

    Ok(input)
}

pub(crate) async fn run(
    input: DiagnosticsInput,
    ctx: &ToolContext<'_>,
) -> Result<String, ToolError> {
    // The overlay closes itself once its script finishes.
    ctx.store.set_overlay(Some(OverlayKind::Diagnostics {
        duration_secs: input.duration,
    }));
    Ok("Diagnostics overlay activated.".to_string())
}

pub(super) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::RunSystemDiagnostics,
        description: "Triggers a visual system diagnostic overlay. Use this when the user asks for a \"system check\", \"security scan\", \"status report\", or \"server health\".",
        input_schema: input_schema::<DiagnosticsInput>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_positive_or_huge_duration() {
        assert!(parse(&json!({"duration": 0})).is_err());
        assert!(parse(&json!({"duration": -3.5})).is_err());
        assert!(parse(&json!({"duration": 600})).is_err());
        assert_eq!(
            parse(&json!({"duration": 8})).map(|input| input.duration).ok(),
            Some(Some(8.0))
        );
    }
}
