use clap::Args;
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::dispatcher::MIN_CONTACT_DELAY;

/// Resume the assistant answers from when no `--resume` file is given.
pub const DEFAULT_RESUME: &str = include_str!("../resume/default.txt");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read resume {path}: {source}")]
    Resume {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("resume {0} is empty")]
    EmptyResume(PathBuf),
}

/// Settings shared by every front end. Each option can also come from the
/// environment (or a `.env` file).
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// API key for the Gemini inference service. Without it the assistant
    /// answers every message with a system error.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(
        long,
        env = "PORTFOLIO_MODEL",
        default_value = "gemini-2.5-flash",
        global = true
    )]
    pub model: String,

    #[arg(
        long,
        env = "PORTFOLIO_API_BASE",
        default_value = "https://generativelanguage.googleapis.com/v1beta",
        global = true
    )]
    pub api_base: String,

    #[arg(long, env = "PORTFOLIO_TEMPERATURE", default_value_t = 0.7, global = true)]
    pub temperature: f32,

    /// Simulated latency of the contact tool, in milliseconds (at least 1000).
    #[arg(
        long,
        env = "PORTFOLIO_CONTACT_DELAY_MS",
        default_value_t = 1500,
        global = true
    )]
    pub contact_delay_ms: u64,

    /// Name the assistant speaks for and the contact tool delivers to.
    #[arg(long, env = "PORTFOLIO_OWNER", default_value = "Eric", global = true)]
    pub owner: String,

    /// Plain-text resume the assistant answers questions from. Defaults to
    /// the built-in one.
    #[arg(long, env = "PORTFOLIO_RESUME", global = true)]
    pub resume: Option<PathBuf>,

    /// Write logs here. The chat UI otherwise discards them.
    #[arg(long, env = "PORTFOLIO_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    pub fn contact_delay(&self) -> Duration {
        Duration::from_millis(self.contact_delay_ms).max(MIN_CONTACT_DELAY)
    }

    pub fn resume(&self) -> Result<Cow<'static, str>, ConfigError> {
        let Some(path) = &self.resume else {
            return Ok(Cow::Borrowed(DEFAULT_RESUME));
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Resume {
            path: path.clone(),
            source,
        })?;
        if text.trim().is_empty() {
            return Err(ConfigError::EmptyResume(path.clone()));
        }
        Ok(Cow::Owned(text))
    }

    pub fn system_instruction(&self, resume: &str) -> String {
        let owner = &self.owner;
        let resume = resume.trim();
        format!(
            "You are the AI agent embedded in {owner}'s portfolio site, a terminal-styled \
             resume. Answer questions about {owner}'s background, skills and experience \
             STRICTLY on the context provided below.\n\
             \n\
             Persona:\n\
             - Professional with a deep-tech flavor: old-school Linux roots and modern AI \
             get equal respect.\n\
             - Present {owner} as a bug hunter who finds what others miss by understanding \
             the OS underneath, and as someone who stands up complex cloud infrastructure \
             with ease.\n\
             - If asked for contact details, give the email and phone number from the \
             resume.\n\
             \n\
             Context:\n\
             {resume}\n\
             \n\
             Rules:\n\
             - If a question is not covered by the resume, say you don't have that data, \
             joke that {owner} probably runs on coffee and clean code, then pivot back to \
             {owner}'s skills.\n\
             - Emphasize {owner}'s years of experience as the resume states them.\n\
             - Keep replies under three sentences unless asked for a detailed summary.\n\
             \n\
             Capabilities (you have root access to the page):\n\
             1. Navigation: navigate_to_section scrolls to a section.\n\
             2. Diagnostics: run_system_diagnostics.\n\
             3. Generative UI: modify_ui_style. For a look or mood, pick a complete \
             palette and layout rather than changing one field.\n\
             4. Architecture: generate_architecture_diagram, including site_architecture \
             for this website.\n\
             5. Deployment: deploy_demo_environment simulates DevOps tasks.\n\
             6. Contact: send_message_to_eric passes a message to {owner}.\n\
             Use only one tool per turn. Deployments and messages are simulations; never \
             claim otherwise when asked."
        )
    }
}
