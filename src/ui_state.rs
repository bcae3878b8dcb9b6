//! Page state mutated by dispatched tools and read by the renderer.
//!
//! Every transition is a plain method on [`UiState`]; [`UiStateStore`] applies
//! them inside a single `watch` update so observers only ever see whole
//! transitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Standard,
    SplitScreen,
    MinimalCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NavPosition {
    Top,
    Left,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    Glass,
    Solid,
    Outline,
    Brutalist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Mono,
    Sans,
    Serif,
}

impl FontFamily {
    pub fn css_stack(self) -> &'static str {
        match self {
            FontFamily::Mono => "\"JetBrains Mono\", monospace",
            FontFamily::Sans => "\"Inter\", sans-serif",
            FontFamily::Serif => "Georgia, serif",
        }
    }
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Standard => "standard",
            Layout::SplitScreen => "split-screen",
            Layout::MinimalCenter => "minimal-center",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub layout: Layout,
    pub nav_position: NavPosition,
    pub card_style: CardStyle,
    pub primary_color: String,
    pub secondary_color: String,
    pub background_color: String,
    pub surface_color: String,
    pub text_color: String,
    pub font_family: FontFamily,
    pub border_radius: String,
    pub border_width: String,
    pub opacity: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            layout: Layout::Standard,
            nav_position: NavPosition::Top,
            card_style: CardStyle::Glass,
            primary_color: "#22d3ee".to_string(),
            secondary_color: "#a78bfa".to_string(),
            background_color: "#000000".to_string(),
            surface_color: "#09090b".to_string(),
            text_color: "#e4e4e7".to_string(),
            font_family: FontFamily::Mono,
            border_radius: "4px".to_string(),
            border_width: "1px".to_string(),
            opacity: 0.8,
        }
    }
}

impl Theme {
    /// Merges the fields present in `patch`; absent fields keep their value.
    pub fn apply(&mut self, patch: &ThemePatch) {
        if let Some(layout) = patch.layout {
            self.layout = layout;
        }
        if let Some(nav_position) = patch.nav_position {
            self.nav_position = nav_position;
        }
        if let Some(card_style) = patch.card_style {
            self.card_style = card_style;
        }
        if let Some(font_family) = patch.font_family {
            self.font_family = font_family;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }

        let strings = [
            (&mut self.primary_color, &patch.primary_color),
            (&mut self.secondary_color, &patch.secondary_color),
            (&mut self.background_color, &patch.background_color),
            (&mut self.surface_color, &patch.surface_color),
            (&mut self.text_color, &patch.text_color),
            (&mut self.border_radius, &patch.border_radius),
            (&mut self.border_width, &patch.border_width),
        ];
        for (field, value) in strings {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
    }

    /// CSS custom properties the page stylesheet reads.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--gen-primary", self.primary_color.clone()),
            ("--gen-secondary", self.secondary_color.clone()),
            ("--gen-bg", self.background_color.clone()),
            ("--gen-surface", self.surface_color.clone()),
            ("--gen-text", self.text_color.clone()),
            ("--gen-radius", self.border_radius.clone()),
            ("--gen-border-width", self.border_width.clone()),
            ("--gen-opacity", self.opacity.to_string()),
            ("--gen-font", self.font_family.css_stack().to_string()),
        ]
    }
}

/// Partial theme update. This is also the argument record of `modify_ui_style`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ThemePatch {
    #[schemars(description = "The overall page layout structure.")]
    pub layout: Option<Layout>,
    #[schemars(description = "Where the navigation bar should be.")]
    pub nav_position: Option<NavPosition>,
    #[schemars(description = "The visual style of content cards and containers.")]
    pub card_style: Option<CardStyle>,
    #[schemars(description = "Hex color for main accents")]
    pub primary_color: Option<String>,
    #[schemars(description = "Hex color for secondary accents")]
    pub secondary_color: Option<String>,
    #[schemars(description = "Hex color for the main background")]
    pub background_color: Option<String>,
    #[schemars(description = "Hex color for panels and cards")]
    pub surface_color: Option<String>,
    #[schemars(description = "Hex color for text")]
    pub text_color: Option<String>,
    #[schemars(description = "The font family to use")]
    pub font_family: Option<FontFamily>,
    #[schemars(description = "CSS border-radius value, e.g. \"0px\", \"12px\", \"2rem\"")]
    pub border_radius: Option<String>,
    #[schemars(description = "CSS border-width value, e.g. \"1px\", \"4px\"")]
    pub border_width: Option<String>,
    #[schemars(description = "Opacity of the glass effect, 0.0 to 1.0")]
    pub opacity: Option<f64>,
}

impl ThemePatch {
    pub fn is_empty(&self) -> bool {
        *self == ThemePatch::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Experience,
    Skills,
    Homelab,
    Contact,
    Hero,
}

impl SectionId {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionId::Experience => "experience",
            SectionId::Skills => "skills",
            SectionId::Homelab => "homelab",
            SectionId::Contact => "contact",
            SectionId::Hero => "hero",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ArchitectureKind {
    RagPipeline,
    HybridCloud,
    VoipStack,
    SiteArchitecture,
}

impl ArchitectureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArchitectureKind::RagPipeline => "rag_pipeline",
            ArchitectureKind::HybridCloud => "hybrid_cloud",
            ArchitectureKind::VoipStack => "voip_stack",
            ArchitectureKind::SiteArchitecture => "site_architecture",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvKind {
    Agent,
    Cluster,
    Database,
}

impl EnvKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EnvKind::Agent => "agent",
            EnvKind::Cluster => "cluster",
            EnvKind::Database => "database",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Deploying,
    Active,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayKind {
    Diagnostics {
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
    ArchitectureDiagram {
        system: ArchitectureKind,
    },
    DeploymentConsole {
        env: EnvKind,
        status: DeploymentStatus,
    },
}

impl OverlayKind {
    pub fn label(&self) -> String {
        match self {
            OverlayKind::Diagnostics { .. } => "diagnostics".to_string(),
            OverlayKind::ArchitectureDiagram { system } => format!("diagram:{}", system.as_str()),
            OverlayKind::DeploymentConsole { env, status } => {
                let status = match status {
                    DeploymentStatus::Deploying => "deploying",
                    DeploymentStatus::Active => "active",
                    DeploymentStatus::Complete => "complete",
                };
                format!("deploy:{} ({})", env.as_str(), status)
            }
        }
    }
}

/// An overlay currently on screen. `id` changes on every activation so that
/// scripted playback can tell whether it still owns the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveOverlay {
    pub id: u64,
    #[serde(flatten)]
    pub kind: OverlayKind,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    pub section: SectionId,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState {
    pub theme: Theme,
    pub overlay: Option<ActiveOverlay>,
    pub scroll: Option<ScrollRequest>,
    #[serde(skip)]
    next_overlay_id: u64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            overlay: None,
            scroll: None,
            next_overlay_id: 1,
        }
    }
}

impl UiState {
    pub fn apply_theme_patch(&mut self, patch: &ThemePatch) {
        self.theme.apply(patch);
    }

    /// Replaces whatever overlay is showing and returns the new overlay id.
    pub fn open_overlay(&mut self, kind: OverlayKind) -> u64 {
        let id = self.next_overlay_id;
        self.next_overlay_id += 1;
        self.overlay = Some(ActiveOverlay {
            id,
            kind,
            log: Vec::new(),
        });
        id
    }

    pub fn close_overlay(&mut self) -> bool {
        self.overlay.take().is_some()
    }

    pub fn close_overlay_if(&mut self, id: u64) -> bool {
        if self.overlay_id() == Some(id) {
            self.overlay = None;
            true
        } else {
            false
        }
    }

    pub fn request_scroll(&mut self, section: SectionId) -> u64 {
        let seq = self.scroll.map_or(1, |scroll| scroll.seq + 1);
        self.scroll = Some(ScrollRequest { section, seq });
        seq
    }

    pub fn overlay_id(&self) -> Option<u64> {
        self.overlay.as_ref().map(|overlay| overlay.id)
    }

    fn overlay_mut(&mut self, id: u64) -> Option<&mut ActiveOverlay> {
        self.overlay.as_mut().filter(|overlay| overlay.id == id)
    }

    pub fn append_overlay_log(&mut self, id: u64, line: String) -> bool {
        match self.overlay_mut(id) {
            Some(overlay) => {
                overlay.log.push(line);
                true
            }
            None => false,
        }
    }

    pub fn set_deployment_status(&mut self, id: u64, next: DeploymentStatus) -> bool {
        match self.overlay_mut(id).map(|overlay| &mut overlay.kind) {
            Some(OverlayKind::DeploymentConsole { status, .. }) if *status != next => {
                *status = next;
                true
            }
            _ => false,
        }
    }
}

/// Shared handle to the page state. The dispatcher writes through it, the
/// renderer and overlays subscribe to it.
#[derive(Clone)]
pub struct UiStateStore {
    state: Arc<watch::Sender<UiState>>,
}

impl UiStateStore {
    pub fn new() -> Self {
        Self::with_state(UiState::default())
    }

    pub fn with_state(state: UiState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            state: Arc::new(sender),
        }
    }

    pub fn get_state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn apply_theme_patch(&self, patch: &ThemePatch) {
        self.state.send_modify(|state| state.apply_theme_patch(patch));
    }

    /// `None` closes the current overlay. Returns the id of the opened overlay.
    pub fn set_overlay(&self, overlay: Option<OverlayKind>) -> Option<u64> {
        match overlay {
            Some(kind) => {
                let mut id = 0;
                self.state.send_modify(|state| id = state.open_overlay(kind));
                Some(id)
            }
            None => {
                self.close_overlay();
                None
            }
        }
    }

    pub fn close_overlay(&self) -> bool {
        self.state.send_if_modified(UiState::close_overlay)
    }

    pub fn request_scroll(&self, section: SectionId) -> u64 {
        let mut seq = 0;
        self.state
            .send_modify(|state| seq = state.request_scroll(section));
        seq
    }

    // Overlay playback writes go through these; each is a no-op once the
    // overlay with `id` is gone.

    pub(crate) fn append_overlay_log(&self, id: u64, line: String) -> bool {
        self.state
            .send_if_modified(|state| state.append_overlay_log(id, line))
    }

    pub(crate) fn set_deployment_status(&self, id: u64, status: DeploymentStatus) -> bool {
        self.state
            .send_if_modified(|state| state.set_deployment_status(id, status))
    }

    pub(crate) fn close_overlay_if(&self, id: u64) -> bool {
        self.state.send_if_modified(|state| state.close_overlay_if(id))
    }
}

impl Default for UiStateStore {
    fn default() -> Self {
        Self::new()
    }
}
