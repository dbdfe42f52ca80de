#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::actions::help_text;
use super::BubbleList;
use super::CodeBlocks;
use super::HistoryBrowser;
use super::Lifecycle;
use super::Scroll;
use super::SessionIdentity;
use super::SpeechCoordinator;
use super::SpeechSettings;
use super::Themes;
use crate::domain::models::Action;
use crate::domain::models::Author;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::HistoryEntry;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::SessionName;
use crate::domain::models::SlashCommand;
use crate::domain::models::SpeechBox;
use crate::domain::models::StoreBox;
use crate::domain::models::Voice;

pub const DEFAULT_CLEANUP_DAYS: u32 = 30;

/// A destructive action waiting for the user to answer `y` or `yes`.
pub enum Confirmation {
    DeleteSession(SessionName),
    CleanupSessions(u32),
}

pub struct AppStateProps {
    pub backend: BackendBox,
    pub speech: Option<SpeechBox>,
    pub speech_settings: SpeechSettings,
    pub store: StoreBox,
    pub theme_name: String,
}

pub struct AppState {
    pub bubble_list: BubbleList,
    pub codeblocks: CodeBlocks,
    pub history: HistoryBrowser,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub listening: bool,
    pub messages: Vec<Message>,
    pub pending_confirmation: Option<Confirmation>,
    pub scroll: Scroll,
    pub session: SessionIdentity,
    pub speech: SpeechCoordinator,
    pub waiting_for_backend: bool,
}

impl AppState {
    pub async fn new(props: AppStateProps) -> Result<AppState> {
        let theme = Themes::get(&props.theme_name)?;

        let mut speech_available = true;
        if let Some(engine) = &props.speech {
            if let Err(err) = engine.health_check().await {
                tracing::warn!(error = ?err, engine = %engine.name(), "Speech engine is unavailable, spoken replies are disabled");
                speech_available = false;
            }
        }
        let speech = props.speech.filter(|_| return speech_available);

        let mut app_state = AppState {
            bubble_list: BubbleList::new(theme),
            codeblocks: CodeBlocks::default(),
            history: HistoryBrowser::default(),
            last_known_height: 0,
            last_known_width: 0,
            listening: false,
            messages: vec![Message::welcome()],
            pending_confirmation: None,
            scroll: Scroll::default(),
            session: SessionIdentity::new(props.store).await?,
            speech: SpeechCoordinator::new(speech, props.speech_settings),
            waiting_for_backend: false,
        };

        if let Err(err) = props.backend.health_check().await {
            app_state.messages.push(Message::new_with_type(
                Author::Natter,
                MessageType::Error,
                &format!("Hey, it looks like the chatbot API isn't reachable. You should double check that it's running before we start talking.\n\nError: {err}"),
            ));
        }

        app_state.speech.mount();

        return Ok(app_state);
    }

    /// Speech state shown in the input box title.
    pub fn speech_status(&self) -> &'static str {
        if self.speech.is_degraded() {
            return "off";
        }
        if self.speech.is_muted() {
            return "muted";
        }
        return "on";
    }

    /// Handles a line submitted from the input box. Returns true when the app
    /// should exit.
    pub async fn submit(&mut self, input: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        if let Some(confirmation) = self.pending_confirmation.take() {
            self.resolve_confirmation(confirmation, input, tx)?;
            return Ok(false);
        }

        if input.trim().is_empty() {
            return Ok(false);
        }

        let (should_break, should_continue) = self.handle_slash_commands(input, tx).await?;
        if should_break {
            return Ok(true);
        }
        if should_continue {
            return Ok(false);
        }

        self.send_prompt(input, tx)?;
        return Ok(false);
    }

    fn send_prompt(&mut self, text: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        self.speech.cancel();
        self.add_message(Message::new(Author::User, text.trim()));
        self.waiting_for_backend = true;
        self.scroll.last();

        tx.send(Action::BackendRequest(BackendPrompt::new(
            text,
            self.session.current(),
        )))?;

        return Ok(());
    }

    fn notice(&mut self, text: &str) {
        self.add_message(Message::new(Author::Natter, text));
    }

    fn notice_error(&mut self, text: &str) {
        self.add_message(Message::new_with_type(
            Author::Natter,
            MessageType::Error,
            text,
        ));
    }

    /// Returns `(should_break, should_continue)`. Input that isn't a command
    /// returns `(false, false)` and is sent to the backend.
    pub async fn handle_slash_commands(
        &mut self,
        input: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        let command = match SlashCommand::parse(input) {
            Some(command) => command,
            None => return Ok((false, false)),
        };

        if command.is_quit() {
            return Ok((true, false));
        }

        if command.is_new_chat() {
            self.new_chat(tx).await?;
        } else if command.is_mute() {
            self.speech.toggle_mute();
        } else if command.is_history() {
            self.history.open();
            tx.send(Action::FetchSessionNames())?;
        } else if command.is_open() {
            self.open_session(command.number_arg(), tx)?;
        } else if command.is_back() {
            self.history.back();
        } else if command.is_close() {
            self.history.close();
        } else if command.is_delete() {
            self.confirm_delete(command.number_arg());
        } else if command.is_stats() {
            tx.send(Action::FetchStats())?;
        } else if command.is_cleanup() {
            self.confirm_cleanup(command.args.first());
        } else if command.is_voice() {
            self.start_dictation(tx)?;
        } else if command.is_copy() {
            match self.codeblocks.get(command.number_arg()) {
                Ok(code) => tx.send(Action::CopyCode(code))?,
                Err(err) => self.notice_error(&err.to_string()),
            }
        } else if command.is_help() {
            self.notice(&help_text());
        }

        return Ok((false, true));
    }

    fn open_session(
        &mut self,
        number: Option<usize>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        let session_id = match number.and_then(|idx| return self.history.session_at(idx)) {
            Some(session) => session.session_id.to_string(),
            None => {
                self.notice_error("Pick a session number from /history, such as /open 1.");
                return Ok(());
            }
        };

        self.history.open();
        tx.send(Action::FetchHistory(session_id))?;
        return Ok(());
    }

    fn confirm_delete(&mut self, number: Option<usize>) {
        let session = match number.and_then(|idx| return self.history.session_at(idx)) {
            Some(session) => session.clone(),
            None => {
                self.notice_error("Pick a session number from /history, such as /delete 1.");
                return;
            }
        };

        self.notice(&format!(
            "Delete \"{}\"? This action cannot be undone. Continue? (y/N)",
            session.chat_name
        ));
        self.pending_confirmation = Some(Confirmation::DeleteSession(session));
    }

    /// Cleanup is destructive, so an argument that isn't a day count in range
    /// is rejected rather than replaced.
    fn confirm_cleanup(&mut self, arg: Option<&String>) {
        let days = match arg.map(|e| return e.parse::<u32>()) {
            None => DEFAULT_CLEANUP_DAYS,
            Some(Ok(days)) => days,
            Some(Err(_)) => {
                self.notice_error(&format!(
                    "Cleanup takes a number of days up to {}.",
                    u32::MAX
                ));
                return;
            }
        };

        self.pending_confirmation = Some(Confirmation::CleanupSessions(days));
        self.notice(&format!("This will delete all sessions older than {days} days. This action cannot be undone. Continue? (y/N)"));
    }

    fn resolve_confirmation(
        &mut self,
        confirmation: Confirmation,
        input: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        let answer = input.trim().to_lowercase();
        if answer != "y" && answer != "yes" {
            self.notice("Cancelled.");
            return Ok(());
        }

        match confirmation {
            Confirmation::DeleteSession(session) => {
                tx.send(Action::DeleteSession(session.session_id))?;
            }
            Confirmation::CleanupSessions(days) => {
                tx.send(Action::CleanupSessions(days))?;
            }
        }

        return Ok(());
    }

    fn start_dictation(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.listening {
            return Ok(());
        }

        self.speech.cancel();
        self.listening = true;
        tx.send(Action::Dictate())?;
        return Ok(());
    }

    /// Resets to a fresh conversation under a new session id. A reply still in
    /// flight is aborted, and any that slips through is dropped by its old
    /// session id.
    pub async fn new_chat(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        // Also drops a reply from this chat still waiting on the voice list.
        self.speech.cancel();
        if self.waiting_for_backend {
            tx.send(Action::BackendAbort())?;
            self.waiting_for_backend = false;
        }

        self.pending_confirmation = None;
        self.messages = vec![Message::welcome()];
        self.codeblocks.replace_from_messages(&self.messages);
        self.session.regenerate().await?;
        self.speech.set_muted(false);

        self.sync_dependants();
        self.scroll.last();

        return Ok(());
    }

    /// CTRL+C interrupts a pending reply first, and exits when nothing is
    /// pending. Returns true when the app should exit.
    pub fn handle_interrupt(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        if !self.waiting_for_backend {
            return Ok(true);
        }

        tx.send(Action::BackendAbort())?;
        self.waiting_for_backend = false;
        return Ok(false);
    }

    pub fn handle_backend_response(&mut self, res: BackendResponse) {
        if res.session_id != self.session.current() {
            tracing::debug!(
                session_id = res.session_id,
                "Dropping reply for a previous session"
            );
            return;
        }
        if !self.waiting_for_backend {
            tracing::debug!(
                session_id = res.session_id,
                "Dropping reply that arrived after an interrupt"
            );
            return;
        }

        self.waiting_for_backend = false;

        let mut mtype = MessageType::Normal;
        if res.failed {
            mtype = MessageType::Error;
        }
        let message = Message::new_with_type(Author::Assistant, mtype, &res.text)
            .with_reply_details(res.message_type, res.code);

        self.add_message(message.clone());
        self.codeblocks.replace_from_messages(&self.messages);
        self.speech.assistant_message(&message);
    }

    pub fn handle_dictation(
        &mut self,
        transcript: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        self.listening = false;
        if transcript.trim().is_empty() {
            return Ok(());
        }

        return self.send_prompt(transcript, tx);
    }

    pub fn handle_dictation_failed(&mut self, err: &str) {
        self.listening = false;
        self.notice_error(err);
    }

    pub fn handle_session_names(&mut self, sessions: Vec<SessionName>) {
        self.history.set_sessions(sessions);
    }

    pub fn handle_session_history(&mut self, session_id: &str, entries: Vec<HistoryEntry>) {
        if !self.history.is_visible() {
            return;
        }
        self.history.view(session_id, entries);
    }

    pub fn handle_session_deleted(&mut self, session_id: &str) {
        self.history.remove_session(session_id);
        self.notice("Session deleted.");
    }

    pub fn handle_voices_loaded(&mut self, voices: Vec<Voice>) {
        self.speech.voices_loaded(voices);
    }

    pub fn handle_focus_lost(&mut self) {
        self.speech.lifecycle(Lifecycle::Blur);
    }

    pub async fn handle_exit(&mut self) {
        self.speech.shutdown().await;
    }

    pub fn toggle_mute(&mut self) {
        self.speech.toggle_mute();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.sync_dependants();
        self.scroll.last();
    }

    fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(&self.messages, self.last_known_width.into());

        self.scroll.set_state(
            u16::try_from(self.bubble_list.len()).unwrap_or(u16::MAX),
            self.last_known_height,
        );

        if self.waiting_for_backend {
            self.scroll.last();
        }
    }
}
