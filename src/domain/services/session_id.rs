#[cfg(test)]
#[path = "session_id_test.rs"]
mod tests;

use anyhow::Result;
use uuid::Uuid;

use crate::domain::models::StoreBox;

pub const SESSION_ID_KEY: &str = "session_id";

/// The conversation id sent with every prompt. It is persisted so restarting
/// the client resumes the same server side session until a new chat starts.
pub struct SessionIdentity {
    store: StoreBox,
    current: String,
}

impl SessionIdentity {
    pub async fn new(store: StoreBox) -> Result<SessionIdentity> {
        let current = match store.get(SESSION_ID_KEY).await? {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                let id = SessionIdentity::create_id();
                store.set(SESSION_ID_KEY, &id).await?;
                tracing::debug!(session_id = id, "Created session id");
                id
            }
        };

        return Ok(SessionIdentity { store, current });
    }

    pub fn create_id() -> String {
        return Uuid::new_v4().to_string();
    }

    pub fn current(&self) -> &str {
        return &self.current;
    }

    pub async fn regenerate(&mut self) -> Result<String> {
        let id = SessionIdentity::create_id();
        self.store.set(SESSION_ID_KEY, &id).await?;
        tracing::debug!(session_id = id, "Regenerated session id");
        self.current = id.to_string();

        return Ok(id);
    }
}
