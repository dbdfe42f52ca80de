use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    assert!(SlashCommand::parse("").is_none());
}

#[test]
fn it_parse_space_only() {
    assert!(SlashCommand::parse(" ").is_none());
}

#[test]
fn it_parse_single_slash() {
    assert!(SlashCommand::parse("/").is_none());
}

#[test]
fn it_parse_invalid_prefix() {
    assert!(SlashCommand::parse("!q").is_none());
}

#[test]
fn it_parse_regular_prompt() {
    assert!(SlashCommand::parse("what is /quit for?").is_none());
}

#[test]
fn it_parse_valid_prefix() {
    let cmd = SlashCommand::parse("/q");
    assert!(cmd.is_some());
    assert_eq!(cmd.unwrap().command, "/q");
}

#[test]
fn it_is_quit() {
    for text in ["/q", "/quit", "/exit"] {
        assert!(SlashCommand::parse(text).unwrap().is_quit());
    }
}

#[test]
fn it_is_new_chat() {
    assert!(SlashCommand::parse("/n").unwrap().is_new_chat());
    assert!(SlashCommand::parse("/new").unwrap().is_new_chat());
    assert!(!SlashCommand::parse("/m").unwrap().is_new_chat());
}

#[test]
fn it_is_mute() {
    assert!(SlashCommand::parse("/m").unwrap().is_mute());
    assert!(SlashCommand::parse("/mute").unwrap().is_mute());
}

#[test]
fn it_is_history() {
    assert!(SlashCommand::parse("/hi").unwrap().is_history());
    assert!(SlashCommand::parse("/history").unwrap().is_history());
    assert!(!SlashCommand::parse("/h").unwrap().is_history());
}

#[test]
fn it_is_open_with_number() {
    let cmd = SlashCommand::parse("/open 2").unwrap();
    assert!(cmd.is_open());
    assert_eq!(cmd.number_arg(), Some(2));
}

#[test]
fn it_is_open_without_number() {
    let cmd = SlashCommand::parse("/o abc").unwrap();
    assert!(cmd.is_open());
    assert_eq!(cmd.number_arg(), None);
}

#[test]
fn it_ignores_repeated_spaces() {
    let cmd = SlashCommand::parse("/delete    3").unwrap();
    assert!(cmd.is_delete());
    assert_eq!(cmd.args, vec!["3".to_string()]);
}

#[test]
fn it_is_back_and_close() {
    assert!(SlashCommand::parse("/b").unwrap().is_back());
    assert!(SlashCommand::parse("/back").unwrap().is_back());
    assert!(SlashCommand::parse("/close").unwrap().is_close());
}

#[test]
fn it_is_stats() {
    assert!(SlashCommand::parse("/s").unwrap().is_stats());
    assert!(SlashCommand::parse("/stats").unwrap().is_stats());
}

#[test]
fn it_is_cleanup() {
    let cmd = SlashCommand::parse("/cleanup 7").unwrap();
    assert!(cmd.is_cleanup());
    assert_eq!(cmd.number_arg(), Some(7));
}

#[test]
fn it_is_voice() {
    assert!(SlashCommand::parse("/v").unwrap().is_voice());
    assert!(SlashCommand::parse("/voice").unwrap().is_voice());
}

#[test]
fn it_is_copy() {
    assert!(SlashCommand::parse("/c").unwrap().is_copy());
    assert!(SlashCommand::parse("/copy 1").unwrap().is_copy());
}

#[test]
fn it_is_help() {
    assert!(SlashCommand::parse("/h").unwrap().is_help());
    assert!(SlashCommand::parse("/help").unwrap().is_help());
    assert!(!SlashCommand::parse("/hi").unwrap().is_help());
}
