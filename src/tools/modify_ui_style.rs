use serde_json::Value;

use super::{ToolDefinition, ToolError, ToolName, input_schema, parse_input};
use crate::dispatcher::ToolContext;
use crate::ui_state::ThemePatch;

// Advertised to the model. The dispatcher itself accepts any non-empty patch,
// since fields left out keep their current value.
const ADVERTISED_REQUIRED: [&str; 6] = [
    "layout",
    "primaryColor",
    "backgroundColor",
    "textColor",
    "fontFamily",
    "cardStyle",
];

pub(super) fn parse(args: &Value) -> Result<ThemePatch, ToolError> {
    let patch: ThemePatch = parse_input(ToolName::ModifyUiStyle, args)?;
    validate(&patch).map_err(|message| ToolError::validation(ToolName::ModifyUiStyle, message))?;
    Ok(patch)
}

fn validate(patch: &ThemePatch) -> Result<(), String> {
    if patch.is_empty() {
        return Err("at least one style field is required".to_string());
    }

    if let Some(opacity) = patch.opacity {
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(format!("opacity must be within 0.0..=1.0, got {opacity}"));
        }
    }

    let strings = [
        ("primaryColor", &patch.primary_color),
        ("secondaryColor", &patch.secondary_color),
        ("backgroundColor", &patch.background_color),
        ("surfaceColor", &patch.surface_color),
        ("textColor", &patch.text_color),
        ("borderRadius", &patch.border_radius),
        ("borderWidth", &patch.border_width),
    ];
    for (field, value) in strings {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(format!("{field} must not be empty"));
        }
    }

    Ok(())
}

pub(crate) async fn run(patch: ThemePatch, ctx: &ToolContext<'_>) -> Result<String, ToolError> {
    ctx.store.apply_theme_patch(&patch);
    Ok("UI Style successfully re-generated with new layout parameters.".to_string())
}

pub(super) fn definition() -> ToolDefinition {
    let mut schema = input_schema::<ThemePatch>();
    if let Some(object) = schema.as_object_mut() {
        object.insert(
            "required".to_string(),
            Value::from(ADVERTISED_REQUIRED.to_vec()),
        );
    }

    ToolDefinition {
        name: ToolName::ModifyUiStyle,
        description: "Completely redesigns the website layout and style. Act as a senior product designer: change layout, fonts, colors, and shapes to match the vibe the user asks for.",
        input_schema: schema,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn opacity_must_be_a_unit_fraction() {
        assert!(parse(&json!({"opacity": 1.5})).is_err());
        assert!(parse(&json!({"opacity": -0.1})).is_err());
        assert!(parse(&json!({"opacity": 0.5})).is_ok());
    }

    #[test]
    fn empty_patch_and_blank_colors_are_rejected() {
        assert!(parse(&json!({})).is_err());
        assert!(parse(&json!({"primaryColor": " "})).is_err());
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let err = parse(&json!({"layout": "carousel"})).unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(parse(&json!({"opacity": 0.5, "zIndex": 9})).is_err());
    }
}
