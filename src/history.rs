//! Input-surface helpers: recall of submitted commands and Tab completion.
//! Neither touches the conversation history.

pub const COMMAND_SUGGESTIONS: [&str; 7] = [
    "Run system diagnostics",
    "How does this site work?",
    "Switch layout to Split-Screen",
    "Make it clean, white, minimal",
    "Deploy a demo agent",
    "Contact Eric",
    "Show me the Hybrid Cloud setup",
];

/// Cursor over previously submitted texts.
///
/// `previous` steps back and clamps at the oldest entry. `next` steps
/// forward; stepping past the newest entry yields an empty draft and leaves
/// the cursor detached.
#[derive(Debug, Default)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, text: impl Into<String>) {
        self.entries.push(text.into());
        self.cursor = None;
    }

    pub fn previous_entry(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => self.entries.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(index);
        Some(&self.entries[index])
    }

    pub fn next_entry(&mut self) -> Option<&str> {
        let current = self.cursor?;
        if current + 1 < self.entries.len() {
            self.cursor = Some(current + 1);
            Some(&self.entries[current + 1])
        } else {
            self.cursor = None;
            Some("")
        }
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }
}

/// First suggestion starting with `prefix`, ignoring case. An empty prefix
/// matches the first suggestion.
pub fn complete(prefix: &str) -> Option<&'static str> {
    let prefix = prefix.trim_start().to_lowercase();
    COMMAND_SUGGESTIONS
        .iter()
        .copied()
        .find(|s| s.to_lowercase().starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(entries: &[&str]) -> CommandHistory {
        let mut history = CommandHistory::new();
        for entry in entries {
            history.record(*entry);
        }
        history
    }

    #[test]
    fn previous_clamps_at_oldest() {
        let mut h = history(&["a", "b"]);
        assert_eq!(h.previous_entry(), Some("b"));
        assert_eq!(h.previous_entry(), Some("a"));
        assert_eq!(h.previous_entry(), Some("a"));
    }

    #[test]
    fn next_steps_forward_then_wraps_to_empty_draft() {
        let mut h = history(&["a", "b"]);
        h.previous_entry();
        h.previous_entry();
        assert_eq!(h.next_entry(), Some("b"));
        assert_eq!(h.next_entry(), Some(""));
        assert!(!h.is_browsing());
        assert_eq!(h.next_entry(), None);
    }

    #[test]
    fn recording_resets_cursor() {
        let mut h = history(&["a"]);
        h.previous_entry();
        h.record("b");
        assert!(!h.is_browsing());
        assert_eq!(h.previous_entry(), Some("b"));
    }

    #[test]
    fn empty_history_has_nothing_to_recall() {
        let mut h = CommandHistory::new();
        assert_eq!(h.previous_entry(), None);
        assert_eq!(h.next_entry(), None);
    }

    #[test]
    fn completion_is_case_insensitive_prefix() {
        assert_eq!(complete("run"), Some("Run system diagnostics"));
        assert_eq!(complete("DEPLOY"), Some("Deploy a demo agent"));
        assert_eq!(complete("show me"), Some("Show me the Hybrid Cloud setup"));
        assert_eq!(complete("xyz"), None);
    }

    #[test]
    fn empty_input_completes_to_first_suggestion() {
        assert_eq!(complete(""), Some(COMMAND_SUGGESTIONS[0]));
        assert_eq!(complete("  "), Some("Run system diagnostics"));
    }
}
