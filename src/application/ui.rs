use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableFocusChange;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableFocusChange;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::SpeechName;
use crate::domain::models::TextArea;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;
use crate::domain::services::AppStateProps;
use crate::domain::services::SpeechSettings;
use crate::infrastructure::backends::BackendManager;
use crate::infrastructure::speech::SpeechManager;
use crate::infrastructure::storage::file::FileStore;

/// Centered area covering most of the chat, used by the history overlay.
fn overlay_rect(area: Rect) -> Rect {
    let width = area.width.saturating_mul(4) / 5;
    let height = area.height.saturating_mul(4) / 5;

    return Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
}

fn render_history(frame: &mut Frame, app_state: &AppState, area: Rect) {
    let rect = overlay_rect(area);
    let lines = app_state
        .history
        .overlay_lines()
        .into_iter()
        .map(Line::from)
        .collect::<Vec<Line>>();

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(app_state.history.title()),
            )
            .wrap(Wrap { trim: false }),
        rect,
    );
}

fn insert_paste(textarea: &mut tui_textarea::TextArea, text: &str) {
    for char in text.replace("\r\n", "\n").chars() {
        if char == '\n' {
            textarea.insert_newline();
        } else {
            textarea.insert_char(char);
        }
    }
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    event_rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(event_rx);
    let mut textarea = TextArea::default();
    let loading = Loading::default();

    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Min(1), Constraint::Max(4)])
                .split(frame.size());

            if layout[0].width != app_state.last_known_width
                || layout[0].height != app_state.last_known_height
            {
                app_state.set_rect(layout[0]);
            }

            app_state
                .bubble_list
                .render(frame, layout[0], app_state.scroll.position);

            if app_state.history.is_visible() {
                render_history(frame, app_state, layout[0]);
            }

            if app_state.waiting_for_backend {
                loading.render(frame, layout[1], "Thinking...");
            } else if app_state.listening {
                loading.render(frame, layout[1], "Listening...");
            } else {
                textarea.set_block(TextArea::block(app_state.speech_status()));
                frame.render_widget(textarea.widget(), layout[1]);
            }
        })?;

        let accepts_input = !app_state.waiting_for_backend && !app_state.listening;

        match events.next().await? {
            Event::BackendMessage(msg) => {
                app_state.add_message(msg);
            }
            Event::BackendPromptResponse(res) => {
                app_state.handle_backend_response(res);
            }
            Event::DictationFailed(err) => {
                app_state.handle_dictation_failed(&err);
            }
            Event::DictationResult(transcript) => {
                app_state.handle_dictation(&transcript, &tx)?;
            }
            Event::KeyboardCharInput(input) => {
                if accepts_input {
                    textarea.input(input);
                }
            }
            Event::KeyboardCTRLC() => {
                if app_state.handle_interrupt(&tx)? {
                    break;
                }
            }
            Event::KeyboardCTRLN() => {
                app_state.new_chat(&tx).await?;
            }
            Event::KeyboardCTRLS() => {
                app_state.toggle_mute();
            }
            Event::KeyboardEnter() => {
                if !accepts_input {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                textarea = TextArea::default();
                if app_state.submit(&input_str, &tx).await? {
                    break;
                }
            }
            Event::KeyboardEsc() => {
                app_state.history.close();
            }
            Event::KeyboardPaste(text) => {
                if accepts_input {
                    insert_paste(&mut textarea, &text);
                }
            }
            Event::SessionDeleted(session_id) => {
                app_state.handle_session_deleted(&session_id);
            }
            Event::SessionHistory(session_id, entries) => {
                app_state.handle_session_history(&session_id, entries);
            }
            Event::SessionNames(sessions) => {
                app_state.handle_session_names(sessions);
            }
            Event::SpeechEnded(utterance_id) => {
                app_state.speech.utterance_ended(utterance_id);
            }
            Event::SpeechFailed(utterance_id, err) => {
                app_state.speech.utterance_failed(utterance_id, &err);
            }
            Event::SpeechVoicesLoaded(voices) => {
                app_state.handle_voices_loaded(voices);
            }
            Event::UIFocusLost() => {
                app_state.handle_focus_lost();
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UITick() => {}
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let speech_name =
        SpeechName::parse(Config::get(ConfigKey::Speech)).unwrap_or(SpeechName::None);
    let speech_settings = SpeechSettings {
        preferred_voice: Config::get(ConfigKey::Voice),
        rate: Config::speech_rate(),
        ..SpeechSettings::default()
    };

    let mut app_state = AppState::new(AppStateProps {
        backend: BackendManager::get(),
        speech: SpeechManager::get(speech_name, event_tx),
        speech_settings,
        store: Box::<FileStore>::default(),
        theme_name: Config::get(ConfigKey::Theme),
    })
    .await?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    // Speech is stopped on every way out of the loop, errors included.
    let res = start_loop(&mut terminal, &mut app_state, tx, event_rx).await;
    app_state.handle_exit().await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return res;
}
