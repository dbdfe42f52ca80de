use test_utils::history_fixture;

use super::HistoryEntry;
use super::SessionName;
use super::SessionStats;
use crate::domain::models::Author;

#[test]
fn it_parses_human_lines() {
    let entry = HistoryEntry::parse("Human: What is the capital of France?");
    assert_eq!(entry.author, Author::User);
    assert_eq!(entry.text, "What is the capital of France?");
    assert_eq!(entry.label(), "You");
}

#[test]
fn it_parses_ai_lines() {
    let entry = HistoryEntry::parse("AI: Paris.");
    assert_eq!(entry.author, Author::Assistant);
    assert_eq!(entry.text, "Paris.");
    assert_eq!(entry.label(), "Bot");
}

#[test]
fn it_keeps_unprefixed_lines() {
    let entry = HistoryEntry::parse("System: something else");
    assert_eq!(entry.author, Author::Assistant);
    assert_eq!(entry.text, "System: something else");
}

#[test]
fn it_only_strips_one_prefix() {
    let entry = HistoryEntry::parse("Human: AI: are you there?");
    assert_eq!(entry.author, Author::User);
    assert_eq!(entry.text, "AI: are you there?");
}

#[test]
fn it_parses_fixture() {
    let entries = history_fixture()
        .iter()
        .map(|line| return HistoryEntry::parse(line))
        .collect::<Vec<HistoryEntry>>();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].author, Author::User);
    assert_eq!(entries[1].author, Author::Assistant);
    assert_eq!(entries[3].text, "Madrid.");
}

#[test]
fn it_deserializes_session_names_without_created_at() {
    let names: Vec<SessionName> =
        serde_json::from_str(r#"[{"session_id": "abc", "chat_name": "Hello"}]"#).unwrap();
    assert_eq!(names[0].session_id, "abc");
    assert_eq!(names[0].chat_name, "Hello");
    assert!(names[0].created_at.is_none());
}

#[test]
fn it_formats_stats() {
    let stats = SessionStats {
        total_sessions: 3,
        total_messages: 42,
        recent_sessions_24h: 1,
    };

    insta::assert_snapshot!(stats.format(), @r###"
    Session Statistics

    - Total Sessions: 3
    - Total Messages: 42
    - Active (24h): 1
    "###);
}
