#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;

use super::HistoryEntry;
use super::SessionName;
use super::SessionStats;

pub const ERROR_NO_RESPONSE: &str = "No response.";
pub const ERROR_SERVER: &str = "Error: Unable to get response from server.";
pub const ERROR_CONNECT: &str = "Error: Unable to connect to server.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendPrompt {
    pub text: String,
    pub session_id: String,
}

impl BackendPrompt {
    pub fn new(text: &str, session_id: &str) -> BackendPrompt {
        return BackendPrompt {
            text: text.trim().to_string(),
            session_id: session_id.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendResponse {
    /// Session the prompt was sent under, used to discard replies that arrive
    /// after the user started a new chat.
    pub session_id: String,
    pub text: String,
    pub message_type: Option<String>,
    pub code: Option<String>,
    pub failed: bool,
}

impl BackendResponse {
    pub fn failure(session_id: &str, text: &str) -> BackendResponse {
        return BackendResponse {
            session_id: session_id.to_string(),
            text: text.to_string(),
            message_type: None,
            code: None,
            failed: true,
        };
    }
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify the assistant API can be reached.
    async fn health_check(&self) -> Result<()>;

    /// Sends a prompt scoped to a session and returns the assistant reply.
    /// Failures never surface as errors, they are converted to a reply with
    /// `failed` set and a user facing text.
    async fn generate(&self, prompt: BackendPrompt) -> BackendResponse;

    async fn session_stats(&self) -> Result<SessionStats>;

    /// Deletes every session older than `days_old` days, returning the number
    /// deleted.
    async fn cleanup_sessions(&self, days_old: u32) -> Result<u64>;

    async fn session_names(&self) -> Result<Vec<SessionName>>;

    async fn history(&self, session_id: &str) -> Result<Vec<HistoryEntry>>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
