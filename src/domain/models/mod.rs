mod action;
mod author;
mod backend;
mod block;
mod event;
mod loading;
mod message;
mod session;
mod slash_commands;
mod speech;
mod storage;
mod textarea;

pub use action::*;
pub use author::*;
pub use backend::*;
pub use block::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use session::*;
pub use slash_commands::*;
pub use speech::*;
pub use storage::*;
pub use textarea::*;
