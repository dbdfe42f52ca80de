pub fn list_reply_fixture() -> &'static str {
    return r#"
Here are a few ways to stay focused while working from home.

- Keep a dedicated workspace
- Take short breaks every hour
- Turn off notifications

If you want a routine, try this order:
1. Plan the day the night before
2. Start with the hardest task
3. Review what you finished

Good luck!
"#
    .trim();
}

pub fn history_fixture() -> Vec<String> {
    return vec![
        "Human: What is the capital of France?".to_string(),
        "AI: The capital of France is Paris.".to_string(),
        "Human: And of Spain?".to_string(),
        "AI: Madrid.".to_string(),
    ];
}
