use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::inference::{InferenceReply, InferenceRequest, ToolCall, Turn};
use crate::tools::ToolDefinition;

// Keywords the function-declaration schema subset rejects.
const UNSUPPORTED_SCHEMA_KEYS: [&str; 4] = ["$schema", "title", "additionalProperties", "$defs"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<Content>,
    pub(crate) system_instruction: Content,
    pub(crate) tools: Vec<ToolSet>,
    pub(crate) generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) role: Option<String>,
    #[serde(default)]
    pub(crate) parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, part: Part) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![part],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum Part {
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    Text {
        text: String,
    },
    Other(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FunctionCall {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FunctionResponse {
    pub(crate) name: String,
    pub(crate) response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToolSet {
    pub(crate) function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FunctionDeclaration {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) parameters: Value,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerationConfig {
    pub(crate) temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub(crate) content: Option<Content>,
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProviderErrorResponse {
    pub(crate) error: ProviderError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProviderError {
    pub(crate) message: String,
}

pub(crate) fn build_request(request: &InferenceRequest<'_>, temperature: f32) -> GenerateContentRequest {
    let contents = request
        .turns
        .iter()
        .map(|turn| match turn {
            Turn::User(text) => Content::new("user", Part::Text { text: text.clone() }),
            Turn::Model(text) => Content::new("model", Part::Text { text: text.clone() }),
            Turn::ToolCall(call) => Content::new(
                "model",
                Part::FunctionCall {
                    function_call: FunctionCall {
                        name: call.name.clone(),
                        args: call.args.clone(),
                    },
                },
            ),
            Turn::ToolResponse { call, result } => {
                let mut response = json!({ "result": result.content });
                if result.is_error {
                    response["error"] = Value::Bool(true);
                }
                Content::new(
                    "user",
                    Part::FunctionResponse {
                        function_response: FunctionResponse {
                            name: call.name.clone(),
                            response,
                        },
                    },
                )
            }
        })
        .collect();

    GenerateContentRequest {
        contents,
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: request.system_instruction.to_string(),
            }],
        },
        tools: vec![ToolSet {
            function_declarations: request.tools.iter().map(declaration).collect(),
        }],
        generation_config: GenerationConfig { temperature },
    }
}

fn declaration(tool: &ToolDefinition) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name.as_str().to_string(),
        description: tool.description.to_string(),
        parameters: sanitize_schema(&tool.input_schema),
    }
}

fn sanitize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), sanitize_schema(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_schema).collect()),
        other => other.clone(),
    }
}

/// Picks the first function call of the first candidate if there is one,
/// otherwise the candidate's concatenated text.
pub(crate) fn reply_from_response(response: GenerateContentResponse) -> Result<InferenceReply, String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| "no candidates in response".to_string())?;

    let Some(content) = candidate.content else {
        return Err(format!(
            "candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ));
    };

    let mut text = String::new();
    for part in content.parts {
        match part {
            Part::FunctionCall { function_call } => {
                return Ok(InferenceReply::ToolCall(ToolCall {
                    id: format!("call_{}", Uuid::new_v4()),
                    name: function_call.name,
                    args: function_call.args,
                }));
            }
            Part::Text { text: chunk } => text.push_str(&chunk),
            Part::FunctionResponse { .. } | Part::Other(_) => {}
        }
    }

    Ok(InferenceReply::Text(text))
}
