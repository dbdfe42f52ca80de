#[cfg(test)]
#[path = "code_blocks_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;

use crate::domain::models::Message;

/// Code attachments in transcript order, numbered from 1 as shown next to
/// each bubble.
#[derive(Default)]
pub struct CodeBlocks {
    codeblocks: Vec<String>,
}

impl CodeBlocks {
    pub fn replace_from_messages(&mut self, messages: &[Message]) {
        self.codeblocks = messages
            .iter()
            .filter_map(|msg| return msg.code.clone())
            .collect();
    }

    pub fn len(&self) -> usize {
        return self.codeblocks.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.codeblocks.is_empty();
    }

    /// Returns attachment `number`, or the latest one when no number is given.
    pub fn get(&self, number: Option<usize>) -> Result<String> {
        if self.codeblocks.is_empty() {
            return Err(anyhow!("There is no code to copy."));
        }

        let index = match number {
            Some(number) => number.checked_sub(1),
            None => Some(self.codeblocks.len() - 1),
        };

        if let Some(code) = index.and_then(|idx| return self.codeblocks.get(idx)) {
            return Ok(code.to_string());
        }

        return Err(anyhow!(format!(
            "Code block {} does not exist.",
            number.unwrap_or_default()
        )));
    }
}
