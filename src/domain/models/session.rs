#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;

use super::Author;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionName {
    pub session_id: String,
    pub chat_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub total_messages: u64,
    pub recent_sessions_24h: u64,
}

impl SessionStats {
    pub fn format(&self) -> String {
        return format!(
            "Session Statistics\n\n- Total Sessions: {}\n- Total Messages: {}\n- Active (24h): {}",
            self.total_sessions, self.total_messages, self.recent_sessions_24h
        );
    }
}

/// One line of a stored conversation, as returned by the history endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub author: Author,
    pub text: String,
}

impl HistoryEntry {
    /// Lines starting with `Human:` belong to the user, everything else to the
    /// assistant. A single leading `Human: ` or `AI: ` is stripped.
    pub fn parse(line: &str) -> HistoryEntry {
        let mut author = Author::Assistant;
        if line.starts_with("Human:") {
            author = Author::User;
        }

        let text = line
            .strip_prefix("Human: ")
            .or_else(|| return line.strip_prefix("AI: "))
            .unwrap_or(line)
            .to_string();

        return HistoryEntry { author, text };
    }

    pub fn label(&self) -> &'static str {
        if self.author == Author::User {
            return "You";
        }
        return "Bot";
    }
}
