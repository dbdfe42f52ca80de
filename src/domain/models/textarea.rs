use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn default() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(TextArea::block("on"));

        return textarea;
    }

    /// Input box border, with the speech status in the title.
    pub fn block(speech_status: &str) -> Block<'a> {
        return Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .title(format!(
                "Type your message, or /voice to speak (speech: {speech_status})"
            ))
            .padding(Padding::new(1, 1, 0, 0));
    }
}
