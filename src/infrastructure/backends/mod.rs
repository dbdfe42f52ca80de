pub mod chatbot;

use crate::domain::models::BackendBox;

pub struct BackendManager {}

impl BackendManager {
    pub fn get() -> BackendBox {
        return Box::<chatbot::Chatbot>::default();
    }
}
