use super::BackendPrompt;

pub enum Action {
    BackendAbort(),
    BackendRequest(BackendPrompt),
    CleanupSessions(u32),
    CopyCode(String),
    DeleteSession(String),
    Dictate(),
    FetchHistory(String),
    FetchSessionNames(),
    FetchStats(),
}
