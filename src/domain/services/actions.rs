#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::clipboard::ClipboardService;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::infrastructure::dictation::Dictation;

pub const ERROR_DELETE_SESSION: &str = "Error deleting session.";
pub const ERROR_CLEANUP_SESSIONS: &str = "Error cleaning up sessions";

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new (/n) - Start a new chat with a fresh session.
- /mute (/m) - Toggle spoken replies on or off.
- /voice (/v) - Speak your message. Runs the configured dictation command and sends what it hears.
- /history (/hi) - Show previous chat sessions.
- /open (/o) [NUMBER] - Read a session from the history list.
- /back (/b) - Return from a session to the history list.
- /close - Close the history list.
- /delete (/d) [NUMBER] - Delete a session from the history list, after confirming.
- /stats (/s) - Show session statistics from the server.
- /cleanup [DAYS?] - Delete every session older than DAYS days, 30 by default, after confirming.
- /copy (/c) [CODE_NUMBER?] - Copy a code attachment to your clipboard. Without a number the latest one is copied.
- /quit /exit (/q) - Exit Natter.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+N - Start a new chat.
- CTRL+S - Toggle spoken replies.
- ESC - Close the history list.
- CTRL+C - Interrupt waiting for a response if in progress, otherwise exit.
        "#;

    return text.trim().to_string();
}

fn app_message(text: &str) -> Event {
    return Event::BackendMessage(Message::new(Author::Natter, text));
}

fn app_error(text: &str) -> Event {
    return Event::BackendMessage(Message::new_with_type(
        Author::Natter,
        MessageType::Error,
        text,
    ));
}

/// Transport failures read differently than a server refusing the request.
fn failure_text(err: &anyhow::Error, transport_text: &str) -> String {
    if err.downcast_ref::<reqwest::Error>().is_some() {
        return transport_text.to_string();
    }
    return err.to_string();
}

fn spawn_action<F>(name: &'static str, action: F)
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = action.await {
            tracing::error!(error = ?err, action = name, "Action failed");
        }
    });
}

async fn generate(
    backend: Arc<BackendBox>,
    prompt: BackendPrompt,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let res = backend.generate(prompt).await;
    tx.send(Event::BackendPromptResponse(res))?;
    return Ok(());
}

async fn cleanup_sessions(
    backend: Arc<BackendBox>,
    days_old: u32,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    match backend.cleanup_sessions(days_old).await {
        Ok(deleted_count) => {
            tx.send(app_message(&format!(
                "Successfully cleaned up {deleted_count} old sessions."
            )))?;
        }
        Err(err) => {
            tracing::error!(error = ?err, "Failed to cleanup sessions");
            tx.send(app_error(&failure_text(&err, ERROR_CLEANUP_SESSIONS)))?;
            return Ok(());
        }
    }

    let sessions = backend.session_names().await.unwrap_or_default();
    tx.send(Event::SessionNames(sessions))?;
    return Ok(());
}

async fn delete_session(
    backend: Arc<BackendBox>,
    session_id: String,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    if let Err(err) = backend.delete_session(&session_id).await {
        tracing::error!(error = ?err, session_id = session_id, "Failed to delete session");
        tx.send(app_error(&failure_text(&err, ERROR_DELETE_SESSION)))?;
        return Ok(());
    }

    tx.send(Event::SessionDeleted(session_id))?;
    return Ok(());
}

async fn dictate(tx: mpsc::UnboundedSender<Event>) -> Result<()> {
    match Dictation::default().listen().await {
        Ok(transcript) => tx.send(Event::DictationResult(transcript))?,
        Err(err) => tx.send(Event::DictationFailed(err.to_string()))?,
    }

    return Ok(());
}

async fn fetch_history(
    backend: Arc<BackendBox>,
    session_id: String,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let entries = match backend.history(&session_id).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::error!(error = ?err, session_id = session_id, "Failed to fetch history");
            vec![]
        }
    };

    tx.send(Event::SessionHistory(session_id, entries))?;
    return Ok(());
}

async fn fetch_session_names(
    backend: Arc<BackendBox>,
    tx: mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let sessions = match backend.session_names().await {
        Ok(sessions) => sessions,
        Err(err) => {
            tracing::error!(error = ?err, "Failed to fetch session names");
            vec![]
        }
    };

    tx.send(Event::SessionNames(sessions))?;
    return Ok(());
}

async fn fetch_stats(backend: Arc<BackendBox>, tx: mpsc::UnboundedSender<Event>) -> Result<()> {
    match backend.session_stats().await {
        Ok(stats) => tx.send(app_message(&stats.format()))?,
        Err(err) => {
            tracing::error!(error = ?err, "Failed to fetch session stats");
            tx.send(app_error(&failure_text(
                &err,
                "Error fetching session stats",
            )))?;
        }
    }

    return Ok(());
}

fn copy_code(code: String, tx: &mpsc::UnboundedSender<Event>) -> Result<()> {
    if let Err(err) = ClipboardService::set(code) {
        tx.send(app_error(&err.to_string()))?;
        return Ok(());
    }

    tx.send(app_message("Copied code to clipboard."))?;
    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    /// Runs backend calls off the UI loop. Only the generate request is
    /// abortable, every other action runs to completion.
    pub async fn start(
        backend: BackendBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let backend = Arc::new(backend);

        // Lazy default.
        let mut worker: JoinHandle<Result<()>> = tokio::spawn(async {
            return Ok(());
        });

        while let Some(action) = rx.recv().await {
            let worker_tx = tx.clone();
            let worker_backend = backend.clone();

            match action {
                Action::BackendAbort() => {
                    worker.abort();
                }
                Action::BackendRequest(prompt) => {
                    worker.abort();
                    worker = tokio::spawn(generate(worker_backend, prompt, worker_tx));
                }
                Action::CleanupSessions(days_old) => {
                    spawn_action(
                        "cleanup-sessions",
                        cleanup_sessions(worker_backend, days_old, worker_tx),
                    );
                }
                Action::CopyCode(code) => {
                    copy_code(code, &tx)?;
                }
                Action::DeleteSession(session_id) => {
                    spawn_action(
                        "delete-session",
                        delete_session(worker_backend, session_id, worker_tx),
                    );
                }
                Action::Dictate() => {
                    spawn_action("dictate", dictate(worker_tx));
                }
                Action::FetchHistory(session_id) => {
                    spawn_action(
                        "fetch-history",
                        fetch_history(worker_backend, session_id, worker_tx),
                    );
                }
                Action::FetchSessionNames() => {
                    spawn_action(
                        "fetch-session-names",
                        fetch_session_names(worker_backend, worker_tx),
                    );
                }
                Action::FetchStats() => {
                    spawn_action("fetch-stats", fetch_stats(worker_backend, worker_tx));
                }
            }
        }

        worker.abort();
        return Ok(());
    }
}
