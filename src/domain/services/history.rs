#[cfg(test)]
#[path = "history_test.rs"]
mod tests;

use crate::domain::models::HistoryEntry;
use crate::domain::models::SessionName;

pub struct HistoryView {
    pub session_id: String,
    pub entries: Vec<HistoryEntry>,
}

/// State behind the history overlay: the list of past sessions, and the one
/// currently being read, if any.
#[derive(Default)]
pub struct HistoryBrowser {
    visible: bool,
    sessions: Vec<SessionName>,
    viewing: Option<HistoryView>,
}

impl HistoryBrowser {
    pub fn is_visible(&self) -> bool {
        return self.visible;
    }

    pub fn sessions(&self) -> &[SessionName] {
        return &self.sessions;
    }

    pub fn viewing(&self) -> Option<&HistoryView> {
        return self.viewing.as_ref();
    }

    pub fn open(&mut self) {
        self.visible = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.viewing = None;
    }

    pub fn back(&mut self) {
        self.viewing = None;
    }

    pub fn set_sessions(&mut self, sessions: Vec<SessionName>) {
        self.sessions = sessions;
    }

    pub fn view(&mut self, session_id: &str, entries: Vec<HistoryEntry>) {
        self.viewing = Some(HistoryView {
            session_id: session_id.to_string(),
            entries,
        });
    }

    /// Looks a session up by its 1-based position in the listing.
    pub fn session_at(&self, index: usize) -> Option<&SessionName> {
        if index == 0 {
            return None;
        }
        return self.sessions.get(index - 1);
    }

    pub fn remove_session(&mut self, session_id: &str) {
        self.sessions.retain(|e| return e.session_id != session_id);

        let is_viewed = self
            .viewing
            .as_ref()
            .map(|view| return view.session_id == session_id)
            .unwrap_or(false);
        if is_viewed {
            self.viewing = None;
        }
    }

    pub fn list_lines(&self) -> Vec<String> {
        if self.sessions.is_empty() {
            return vec!["No history found.".to_string()];
        }

        return self
            .sessions
            .iter()
            .enumerate()
            .map(|(idx, session)| return format!("({}) {}", idx + 1, session.chat_name))
            .collect();
    }

    pub fn title(&self) -> String {
        if let Some(view) = &self.viewing {
            let name = self
                .sessions
                .iter()
                .find(|e| return e.session_id == view.session_id)
                .map(|e| return e.chat_name.to_string())
                .unwrap_or_else(|| return view.session_id.to_string());
            return format!("{name} (/back, /close)");
        }

        return "History (/open N, /delete N, /close)".to_string();
    }

    /// Lines shown in the overlay: the viewed conversation, or the session
    /// listing when nothing is open.
    pub fn overlay_lines(&self) -> Vec<String> {
        let view = match &self.viewing {
            Some(view) => view,
            None => return self.list_lines(),
        };

        if view.entries.is_empty() {
            return vec!["No messages found.".to_string()];
        }

        return view
            .entries
            .iter()
            .map(|entry| return format!("{}: {}", entry.label(), entry.text))
            .collect();
    }
}
