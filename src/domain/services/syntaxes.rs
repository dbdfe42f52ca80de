use once_cell::sync::Lazy;
use ratatui::style::Color;
use syntect::parsing::SyntaxReference;
use syntect::parsing::SyntaxSet;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

pub struct Syntaxes {}

impl Syntaxes {
    pub fn load() -> &'static SyntaxSet {
        return &SYNTAXES;
    }

    /// Code attachments from the backend are Python snippets, with plain text
    /// as the fallback.
    pub fn code() -> &'static SyntaxReference {
        return SYNTAXES
            .find_syntax_by_token("python")
            .unwrap_or_else(|| return SYNTAXES.find_syntax_plain_text());
    }

    pub fn translate_colour(syntect_color: syntect::highlighting::Color) -> Option<Color> {
        if syntect_color.a == 0 {
            return None;
        }

        return Some(Color::Rgb(syntect_color.r, syntect_color.g, syntect_color.b));
    }
}
