#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use syntect::highlighting::Theme;

use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Message;

struct BubbleCacheEntry {
    message_id: String,
    lines: Vec<Line<'static>>,
}

/// Rendered transcript lines, cached per message since messages never change
/// once created.
pub struct BubbleList {
    cache: HashMap<usize, BubbleCacheEntry>,
    line_width: usize,
    lines_len: usize,
    theme: Theme,
}

impl BubbleList {
    pub fn new(theme: Theme) -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            line_width: 0,
            lines_len: 0,
            theme,
        };
    }

    pub fn set_messages(&mut self, messages: &[Message], line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }
        self.cache.retain(|idx, _| return *idx < messages.len());

        let mut codeblock_counter = 0;
        self.lines_len = messages
            .iter()
            .enumerate()
            .map(|(idx, message)| {
                if message.code.is_some() {
                    codeblock_counter += 1;
                }

                if let Some(cache_entry) = self.cache.get(&idx) {
                    if cache_entry.message_id == message.id {
                        return cache_entry.lines.len();
                    }
                }

                let mut align = BubbleAlignment::Left;
                if message.is_user() {
                    align = BubbleAlignment::Right;
                }

                let lines = Bubble::new(message, align, line_width, codeblock_counter)
                    .as_lines(&self.theme);
                let bubble_line_len = lines.len();

                self.cache.insert(
                    idx,
                    BubbleCacheEntry {
                        message_id: message.id.to_string(),
                        lines,
                    },
                );

                return bubble_line_len;
            })
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn render(&self, frame: &mut Frame, rect: Rect, scroll: u16) {
        let mut indexes: Vec<usize> = self.cache.keys().cloned().collect();
        indexes.sort();
        let lines: Vec<Line> = indexes
            .iter()
            .filter_map(|idx| return self.cache.get(idx))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect();

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
