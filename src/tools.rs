//! The static tool catalog and the typed invocations parsed from model output.

use schemars::JsonSchema;
use schemars::generate::SchemaSettings;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

use crate::ui_state::ThemePatch;

mod deploy_demo_environment;
mod generate_architecture_diagram;
mod modify_ui_style;
mod navigate_to_section;
mod run_system_diagnostics;
mod send_message_to_eric;

pub use deploy_demo_environment::DeployInput;
pub use generate_architecture_diagram::ArchitectureInput;
pub use navigate_to_section::NavigateInput;
pub use run_system_diagnostics::DiagnosticsInput;
pub use send_message_to_eric::ContactInput;

pub(crate) use deploy_demo_environment::run as deploy_demo_environment;
pub(crate) use generate_architecture_diagram::run as generate_architecture_diagram;
pub(crate) use modify_ui_style::run as modify_ui_style;
pub(crate) use navigate_to_section::run as navigate_to_section;
pub(crate) use run_system_diagnostics::run as run_system_diagnostics;
pub(crate) use send_message_to_eric::run as send_message_to_eric;

pub const UNKNOWN_ACTION: &str = "Unknown action";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    Validation { tool: ToolName, message: String },

    #[error("Tool {tool} failed: {message}")]
    Execution { tool: ToolName, message: String },
}

impl ToolError {
    pub(crate) fn validation(tool: ToolName, message: impl Into<String>) -> Self {
        ToolError::Validation {
            tool,
            message: message.into(),
        }
    }

    pub(crate) fn execution(tool: ToolName, message: impl Into<String>) -> Self {
        ToolError::Execution {
            tool,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    NavigateToSection,
    RunSystemDiagnostics,
    SendMessageToEric,
    ModifyUiStyle,
    GenerateArchitectureDiagram,
    DeployDemoEnvironment,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::NavigateToSection,
        ToolName::RunSystemDiagnostics,
        ToolName::SendMessageToEric,
        ToolName::ModifyUiStyle,
        ToolName::GenerateArchitectureDiagram,
        ToolName::DeployDemoEnvironment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::NavigateToSection => "navigate_to_section",
            ToolName::RunSystemDiagnostics => "run_system_diagnostics",
            ToolName::SendMessageToEric => "send_message_to_eric",
            ToolName::ModifyUiStyle => "modify_ui_style",
            ToolName::GenerateArchitectureDiagram => "generate_architecture_diagram",
            ToolName::DeployDemoEnvironment => "deploy_demo_environment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    Boolean,
    Enum(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

impl ToolDefinition {
    /// Flat view of the top-level parameters declared by `input_schema`.
    pub fn parameters(&self) -> Vec<ParamSpec> {
        let required: Vec<&str> = self
            .input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let Some(properties) = self
            .input_schema
            .get("properties")
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };

        properties
            .iter()
            .map(|(name, schema)| ParamSpec {
                name: name.clone(),
                kind: param_kind(schema),
                required: required.contains(&name.as_str()),
            })
            .collect()
    }
}

fn param_kind(schema: &Value) -> ParamKind {
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return ParamKind::Enum(
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        );
    }

    let ty = match schema.get("type") {
        Some(Value::String(ty)) => Some(ty.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ => None,
    };

    match ty {
        Some("number" | "integer") => ParamKind::Number,
        Some("boolean") => ParamKind::Boolean,
        _ => ParamKind::String,
    }
}

static CATALOG: LazyLock<Vec<ToolDefinition>> =
    LazyLock::new(|| ToolName::ALL.into_iter().map(definition).collect());

/// Every tool the assistant may call, in a fixed order.
pub fn list_tools() -> &'static [ToolDefinition] {
    &CATALOG
}

fn definition(tool: ToolName) -> ToolDefinition {
    match tool {
        ToolName::NavigateToSection => navigate_to_section::definition(),
        ToolName::RunSystemDiagnostics => run_system_diagnostics::definition(),
        ToolName::SendMessageToEric => send_message_to_eric::definition(),
        ToolName::ModifyUiStyle => modify_ui_style::definition(),
        ToolName::GenerateArchitectureDiagram => generate_architecture_diagram::definition(),
        ToolName::DeployDemoEnvironment => deploy_demo_environment::definition(),
    }
}

/// A tool call whose name and arguments have been checked against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    NavigateToSection(NavigateInput),
    RunSystemDiagnostics(DiagnosticsInput),
    SendMessageToEric(ContactInput),
    ModifyUiStyle(ThemePatch),
    GenerateArchitectureDiagram(ArchitectureInput),
    DeployDemoEnvironment(DeployInput),
}

impl ToolInvocation {
    pub fn parse(name: &str, args: &Value) -> Result<Self, ToolError> {
        let tool =
            ToolName::from_name(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        Ok(match tool {
            ToolName::NavigateToSection => {
                Self::NavigateToSection(navigate_to_section::parse(args)?)
            }
            ToolName::RunSystemDiagnostics => {
                Self::RunSystemDiagnostics(run_system_diagnostics::parse(args)?)
            }
            ToolName::SendMessageToEric => {
                Self::SendMessageToEric(send_message_to_eric::parse(args)?)
            }
            ToolName::ModifyUiStyle => Self::ModifyUiStyle(modify_ui_style::parse(args)?),
            ToolName::GenerateArchitectureDiagram => {
                Self::GenerateArchitectureDiagram(generate_architecture_diagram::parse(args)?)
            }
            ToolName::DeployDemoEnvironment => {
                Self::DeployDemoEnvironment(deploy_demo_environment::parse(args)?)
            }
        })
    }

    pub fn name(&self) -> ToolName {
        match self {
            Self::NavigateToSection(_) => ToolName::NavigateToSection,
            Self::RunSystemDiagnostics(_) => ToolName::RunSystemDiagnostics,
            Self::SendMessageToEric(_) => ToolName::SendMessageToEric,
            Self::ModifyUiStyle(_) => ToolName::ModifyUiStyle,
            Self::GenerateArchitectureDiagram(_) => ToolName::GenerateArchitectureDiagram,
            Self::DeployDemoEnvironment(_) => ToolName::DeployDemoEnvironment,
        }
    }
}

/// Outcome of a dispatched tool, handed back to the model as a function response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }

    pub fn unknown_action() -> Self {
        Self::error(UNKNOWN_ACTION)
    }
}

/// JSON schema with subschemas inlined and without null unions, which is the
/// subset function-calling providers accept.
pub(crate) fn input_schema<T: JsonSchema>() -> Value {
    let mut schema = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator()
        .into_root_schema_for::<T>()
        .to_value();
    strip_null_unions(&mut schema);
    schema
}

/// Rewrites the nullable forms schemars emits for `Option<T>` back to `T`:
/// `"type": [T, "null"]`, `null` enum members, `anyOf` with a null branch
/// and `"default": null`. Optional arguments are expressed by `required`.
fn strip_null_unions(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if map.get("default").is_some_and(Value::is_null) {
                map.remove("default");
            }
            if let Some(Value::Array(types)) = map.get_mut("type") {
                types.retain(|t| t != "null");
                if let [single] = types.as_slice() {
                    let single = single.clone();
                    map.insert("type".to_string(), single);
                }
            }
            if let Some(Value::Array(members)) = map.get_mut("enum") {
                members.retain(|m| !m.is_null());
            }
            if let Some(Value::Array(branches)) = map.get_mut("anyOf") {
                branches.retain(|b| b.get("type").is_none_or(|t| t != "null"));
                if let [single] = branches.as_slice()
                    && let Value::Object(inner) = single.clone()
                {
                    map.remove("anyOf");
                    for (key, value) in inner {
                        map.entry(key).or_insert(value);
                    }
                }
            }
            map.values_mut().for_each(strip_null_unions);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_null_unions),
        _ => {}
    }
}

pub(crate) fn parse_input<T: DeserializeOwned>(tool: ToolName, args: &Value) -> Result<T, ToolError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(args).map_err(|e| ToolError::validation(tool, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique_and_round_trip() {
        let names: HashSet<&str> = list_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), list_tools().len());
        assert_eq!(list_tools().len(), ToolName::ALL.len());

        for tool in list_tools() {
            assert_eq!(ToolName::from_name(tool.name.as_str()), Some(tool.name));
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn navigate_schema_declares_section_enum() {
        let tool = &list_tools()[0];
        assert_eq!(tool.name, ToolName::NavigateToSection);

        let params = tool.parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "sectionId");
        assert!(params[0].required);
        assert_eq!(
            params[0].kind,
            ParamKind::Enum(
                ["experience", "skills", "homelab", "contact", "hero"]
                    .map(str::to_string)
                    .to_vec()
            )
        );
    }

    #[test]
    fn modify_ui_style_advertises_required_subset() {
        let tool = list_tools()
            .iter()
            .find(|t| t.name == ToolName::ModifyUiStyle)
            .map(ToolDefinition::parameters)
            .unwrap_or_default();

        let mut required: Vec<String> = tool
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect();
        required.sort();
        assert_eq!(
            required,
            [
                "backgroundColor",
                "cardStyle",
                "fontFamily",
                "layout",
                "primaryColor",
                "textColor"
            ]
        );
        assert_eq!(tool.len(), 12);

        let opacity = tool.iter().find(|p| p.name == "opacity");
        assert_eq!(opacity.map(|p| &p.kind), Some(&ParamKind::Number));
    }

    #[test]
    fn optional_arguments_are_not_nullable() {
        for tool in list_tools() {
            let schema = tool.input_schema.to_string();
            assert!(!schema.contains("null"), "{} declares null: {schema}", tool.name);
        }

        let diagnostics = definition(ToolName::RunSystemDiagnostics);
        assert_eq!(
            diagnostics.input_schema["properties"]["duration"]["type"],
            "number"
        );
        assert!(diagnostics.input_schema["properties"]["duration"].get("default").is_none());
    }

    #[test]
    fn null_branches_collapse_to_the_remaining_schema() {
        let mut schema = json!({
            "properties": {
                "layout": {
                    "description": "Layout.",
                    "anyOf": [{"type": "string", "enum": ["grid", null]}, {"type": "null"}],
                    "default": null
                },
                "opacity": {"type": ["number", "null"]}
            }
        });

        strip_null_unions(&mut schema);

        assert_eq!(
            schema,
            json!({
                "properties": {
                    "layout": {"description": "Layout.", "type": "string", "enum": ["grid"]},
                    "opacity": {"type": "number"}
                }
            })
        );
    }

    #[test]
    fn parse_rejects_unknown_tool() {
        let err = ToolInvocation::parse("rm_rf", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "rm_rf"));
    }

    #[test]
    fn parse_rejects_out_of_enum_values() {
        let err = ToolInvocation::parse("deploy_demo_environment", &json!({"envType": "mainframe"}))
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::Validation {
                tool: ToolName::DeployDemoEnvironment,
                ..
            }
        ));
    }

    #[test]
    fn parse_rejects_missing_required_argument() {
        let err = ToolInvocation::parse("generate_architecture_diagram", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
    }

    #[test]
    fn parse_accepts_null_args_for_optional_only_tools() {
        let invocation = ToolInvocation::parse("run_system_diagnostics", &Value::Null).unwrap();
        assert_eq!(invocation.name(), ToolName::RunSystemDiagnostics);
    }
}
