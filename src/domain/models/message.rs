#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use uuid::Uuid;

use super::Author;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
    Normal,
    Error,
}

pub const WELCOME_ID: &str = "welcome";
pub const WELCOME_TEXT: &str = "Hi! I'm your AI assistant. How can I help you today?";

/// A single entry in the chat transcript. Messages are never edited after
/// creation, a new reply is always a new message.
#[derive(Clone, Debug)]
pub struct Message {
    pub id: String,
    pub author: Author,
    pub text: String,
    pub timestamp: DateTime<Local>,
    /// Reply kind reported by the backend, such as `conversation`.
    pub message_type: Option<String>,
    /// Code extracted by the backend from the reply, rendered separately from
    /// the text.
    pub code: Option<String>,
    mtype: MessageType,
}

impl Message {
    pub fn new(author: Author, text: &str) -> Message {
        return Message {
            id: Uuid::new_v4().to_string(),
            author,
            text: text.to_string().replace('\t', "  "),
            timestamp: Local::now(),
            message_type: None,
            code: None,
            mtype: MessageType::Normal,
        };
    }

    pub fn new_with_type(author: Author, mtype: MessageType, text: &str) -> Message {
        let mut msg = Message::new(author, text);
        msg.mtype = mtype;
        return msg;
    }

    pub fn welcome() -> Message {
        let mut msg = Message::new(Author::Assistant, WELCOME_TEXT);
        msg.id = WELCOME_ID.to_string();
        return msg;
    }

    pub fn with_reply_details(mut self, message_type: Option<String>, code: Option<String>) -> Message {
        self.message_type = message_type;
        self.code = code.filter(|e| return !e.trim().is_empty());
        return self;
    }

    pub fn message_type(&self) -> MessageType {
        return self.mtype;
    }

    pub fn is_user(&self) -> bool {
        return self.author == Author::User;
    }

    pub fn is_assistant(&self) -> bool {
        return self.author == Author::Assistant;
    }

    /// Wraps text on spaces so no line exceeds `line_max_width` unless a single
    /// word is longer than the width.
    pub fn wrap_line(line: &str, line_max_width: usize) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        if line.trim().is_empty() {
            lines.push("".to_string());
            return lines;
        }

        let mut char_count = 0;
        let mut current_lines: Vec<&str> = vec![];

        for word in line.split(' ') {
            let word_len = word.chars().count();
            if !current_lines.is_empty() && word_len + char_count > line_max_width {
                lines.push(current_lines.join(" ").trim_end().to_string());
                current_lines = vec![word];
                char_count = word_len + 1;
            } else {
                current_lines.push(word);
                char_count += word_len + 1;
            }
        }
        if !current_lines.is_empty() {
            lines.push(current_lines.join(" ").trim_end().to_string());
        }

        return lines;
    }
}
