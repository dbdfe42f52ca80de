pub mod actions;
mod app_state;
mod bubble;
mod bubble_list;
pub mod clipboard;
mod code_blocks;
pub mod events;
mod formatter;
mod history;
mod scroll;
mod session_id;
mod speech;
mod syntaxes;
mod themes;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use code_blocks::*;
pub use history::*;
pub use scroll::*;
pub use session_id::*;
pub use speech::*;
pub use syntaxes::*;
pub use themes::*;
