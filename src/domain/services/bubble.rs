#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::Theme;

use super::formatter::format_text;
use super::formatter::render_blocks;
use super::Syntaxes;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

#[derive(PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

pub struct Bubble<'a> {
    alignment: BubbleAlignment,
    message: &'a Message,
    window_max_width: usize,
    codeblock_number: usize,
}

pub struct BubbleConfig {
    pub bubble_padding: usize,
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

fn width(text: &str) -> usize {
    return text.chars().count();
}

fn padding(count: usize) -> String {
    return " ".repeat(count);
}

/// Hard splits highlighted code so no chunk is wider than `max_line_length`,
/// keeping each character's style.
fn split_spans(spans: Vec<Span<'static>>, max_line_length: usize) -> Vec<Vec<Span<'static>>> {
    let mut chunks = vec![];
    let mut current = vec![];
    let mut current_width = 0;

    for span in spans {
        let mut text = String::new();
        for ch in span.content.chars() {
            if current_width == max_line_length {
                if !text.is_empty() {
                    current.push(Span::styled(text, span.style));
                    text = String::new();
                }
                chunks.push(current);
                current = vec![];
                current_width = 0;
            }

            text.push(ch);
            current_width += 1;
        }

        if !text.is_empty() {
            current.push(Span::styled(text, span.style));
        }
    }

    chunks.push(current);
    return chunks;
}

impl<'a> Bubble<'a> {
    pub fn new(
        message: &'a Message,
        alignment: BubbleAlignment,
        window_max_width: usize,
        codeblock_number: usize,
    ) -> Bubble<'a> {
        return Bubble {
            alignment,
            message,
            window_max_width,
            codeblock_number,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            // Unicode character border + padding.
            bubble_padding: 8,
            // left border + left padding + (text, not counted) + right padding + right border +
            // scrollbar.
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    fn code_title(&self) -> String {
        return format!("Code ({})", self.codeblock_number);
    }

    fn code_lines(&self) -> Vec<String> {
        return self
            .message
            .code
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(|line| return line.replace('\t', "    "))
            .collect();
    }

    /// Renders the message into bordered lines followed by its timestamp.
    pub fn as_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let text_lines = render_blocks(&format_text(&self.message.text));
        let code_lines = self.code_lines();
        let max_line_length = self.get_max_line_length(&text_lines, &code_lines);

        let mut lines = vec![];
        for line in text_lines.iter() {
            for wrapped in Message::wrap_line(line, max_line_length) {
                lines.push(self.spans_to_line(vec![Span::from(wrapped)], max_line_length));
            }
        }

        if self.message.code.is_some() {
            lines.push(self.spans_to_line(vec![], max_line_length));
            lines.push(self.spans_to_line(
                vec![Span::styled(
                    self.code_title(),
                    Style {
                        fg: Some(Color::White),
                        ..Style::default()
                    },
                )],
                max_line_length,
            ));

            let mut highlight = HighlightLines::new(Syntaxes::code(), theme);
            for code_line in code_lines.iter() {
                let spans = self.highlight_code(&mut highlight, code_line);
                for chunk in split_spans(spans, max_line_length) {
                    lines.push(self.spans_to_line(chunk, max_line_length));
                }
            }
        }

        let mut res = self.wrap_lines_in_bubble(lines, max_line_length);
        res.push(self.timestamp_line(max_line_length));
        return res;
    }

    fn highlight_code(&self, highlight: &mut HighlightLines, line: &str) -> Vec<Span<'static>> {
        // Highlighting doesn't work accurately unless each line is postfixed with '\n',
        // especially when dealing with multi-line strings.
        let line_nl = format!("{line}\n");
        let highlighted = match highlight.highlight_line(&line_nl, Syntaxes::load()) {
            Ok(highlighted) => highlighted,
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to highlight code line");
                return vec![Span::from(line.to_string())];
            }
        };

        return highlighted
            .iter()
            .map(|(style, content)| {
                return Span::styled(
                    content.trim_end_matches('\n').to_string(),
                    Style {
                        fg: Syntaxes::translate_colour(style.foreground),
                        ..Style::default()
                    },
                );
            })
            .filter(|span| return !span.content.is_empty())
            .collect();
    }

    fn outer_padding(&self, max_line_length: usize) -> String {
        return padding(
            self.window_max_width
                .saturating_sub(max_line_length + Bubble::style_config().bubble_padding),
        );
    }

    fn spans_to_line(&self, mut spans: Vec<Span<'static>>, max_line_length: usize) -> Line<'static> {
        let line_str_len: usize = spans.iter().map(|e| return width(&e.content)).sum();
        let fill = padding(max_line_length.saturating_sub(line_str_len));

        let mut wrapped_spans = vec![self.highlight_span("│ ".to_string())];
        wrapped_spans.append(&mut spans);
        wrapped_spans.push(self.highlight_span(format!("{fill} │")));

        let outer_bubble_padding = self.outer_padding(max_line_length);

        if self.alignment == BubbleAlignment::Left {
            wrapped_spans.push(Span::from(outer_bubble_padding));
            return Line::from(wrapped_spans);
        }

        let mut line_spans = vec![Span::from(outer_bubble_padding)];
        line_spans.extend(wrapped_spans);

        return Line::from(line_spans);
    }

    fn get_max_line_length(&self, text_lines: &[String], code_lines: &[String]) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        // Border elements + minimum bubble padding.
        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;

        let mut max_line_length = text_lines
            .iter()
            .chain(code_lines.iter())
            .map(|line| return width(line))
            .max()
            .unwrap_or(0);

        if self.message.code.is_some() {
            max_line_length = max_line_length.max(width(&self.code_title()));
        }

        let available = self.window_max_width.saturating_sub(line_border_width);
        if max_line_length > available {
            max_line_length = available;
        }

        let username = self.message.author.to_string();
        if max_line_length < width(&username) {
            max_line_length = width(&username);
        }

        return max_line_length;
    }

    fn wrap_lines_in_bubble(
        &self,
        lines: Vec<Line<'static>>,
        max_line_length: usize,
    ) -> Vec<Line<'static>> {
        let username = self.message.author.to_string();
        // Add 2 for the vertical bars.
        let top_bar = format!(
            "╭{username}{}╮",
            "─".repeat((max_line_length + 2).saturating_sub(width(&username)))
        );
        let bottom_bar = format!("╰{}╯", "─".repeat(max_line_length + 2));
        let bar_bubble_padding = self.outer_padding(max_line_length);

        if self.alignment == BubbleAlignment::Left {
            let mut res = vec![self.highlight_line(format!("{top_bar}{bar_bubble_padding}"))];
            res.extend(lines);
            res.push(self.highlight_line(format!("{bottom_bar}{bar_bubble_padding}")));
            return res;
        }

        let mut res = vec![self.highlight_line(format!("{bar_bubble_padding}{top_bar}"))];
        res.extend(lines);
        res.push(self.highlight_line(format!("{bar_bubble_padding}{bottom_bar}")));
        return res;
    }

    fn timestamp_line(&self, max_line_length: usize) -> Line<'static> {
        let time = self.message.timestamp.format("%H:%M").to_string();
        let bubble_width = max_line_length + 4;
        let style = Style {
            fg: Some(Color::DarkGray),
            ..Style::default()
        };
        let outer_bubble_padding = self.outer_padding(max_line_length);

        if self.alignment == BubbleAlignment::Left {
            let text = format!(" {time}");
            let fill = padding(bubble_width.saturating_sub(width(&text)));
            return Line::from(vec![
                Span::styled(text, style),
                Span::from(format!("{fill}{outer_bubble_padding}")),
            ]);
        }

        let text = format!("{time} ");
        let fill = padding(bubble_width.saturating_sub(width(&text)));
        return Line::from(vec![
            Span::from(format!("{outer_bubble_padding}{fill}")),
            Span::styled(text, style),
        ]);
    }

    fn highlight_span(&self, text: String) -> Span<'static> {
        if self.message.message_type() == MessageType::Error {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Red),
                    ..Style::default()
                },
            );
        } else if self.message.author == Author::Natter {
            return Span::styled(
                text,
                Style {
                    fg: Some(Color::Rgb(138, 85, 63)), // Brown
                    ..Style::default()
                },
            );
        }

        return Span::from(text);
    }

    fn highlight_line(&self, text: String) -> Line<'static> {
        return Line::from(self.highlight_span(text));
    }
}
