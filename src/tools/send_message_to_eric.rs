use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{ToolDefinition, ToolError, ToolName, input_schema, parse_input};
use crate::contact::ContactMessage;
use crate::dispatcher::ToolContext;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactInput {
    #[schemars(description = "The content of the message to send.")]
    pub message: String,
    #[schemars(description = "The user's email or phone number so Eric can reply.")]
    #[serde(default)]
    pub contact_info: Option<String>,
}

pub(super) fn parse(args: &Value) -> Result<ContactInput, ToolError> {
    let input: ContactInput = parse_input(ToolName::SendMessageToEric, args)?;
    if input.message.trim().is_empty() {
        return Err(ToolError::validation(
            ToolName::SendMessageToEric,
            "message must not be empty",
        ));
    }
    Ok(input)
}

/// Waits out the configured delivery latency, then hands the message to the
/// contact channel. The default channel is a mock; nothing leaves the process.
pub(crate) async fn run(input: ContactInput, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    let message = ContactMessage {
        body: input.message,
        reply_to: input.contact_info.filter(|info| !info.trim().is_empty()),
    };

    info!(delay_ms = ctx.contact_delay.as_millis() as u64, "Delivering contact message");
    tokio::time::sleep(ctx.contact_delay).await;

    ctx.contact
        .deliver(&message)
        .await
        .map_err(|e| ToolError::execution(ToolName::SendMessageToEric, e.to_string()))?;

    Ok(format!(
        "Message sent successfully to {}'s private channel.",
        ctx.contact.recipient()
    ))
}

pub(super) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: ToolName::SendMessageToEric,
        description: "Sends a direct message to Eric. Use this when the user wants to hire Eric, say hello, or contact him.",
        input_schema: input_schema::<ContactInput>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_message_is_rejected() {
        assert!(parse(&json!({"message": "   "})).is_err());
        assert!(parse(&json!({"contactInfo": "me@example.com"})).is_err());
    }
}
