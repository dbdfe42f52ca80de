use tui_textarea::Input;

use super::BackendResponse;
use super::HistoryEntry;
use super::Message;
use super::SessionName;
use super::Voice;

pub enum Event {
    BackendMessage(Message),
    BackendPromptResponse(BackendResponse),
    DictationFailed(String),
    DictationResult(String),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLN(),
    KeyboardCTRLS(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardPaste(String),
    SessionDeleted(String),
    SessionHistory(String, Vec<HistoryEntry>),
    SessionNames(Vec<SessionName>),
    SpeechEnded(u64),
    SpeechFailed(u64, String),
    SpeechVoicesLoaded(Vec<Voice>),
    UIFocusLost(),
    UIScrollDown(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UIScrollUp(),
    UITick(),
}
