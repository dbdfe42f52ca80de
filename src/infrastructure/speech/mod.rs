pub mod command;

use tokio::sync::mpsc;

use crate::domain::models::Event;
use crate::domain::models::SpeechBox;
use crate::domain::models::SpeechName;

pub struct SpeechManager {}

impl SpeechManager {
    /// Returns `None` when speech is turned off, which leaves the coordinator
    /// in its silent degraded mode.
    pub fn get(name: SpeechName, tx: mpsc::UnboundedSender<Event>) -> Option<SpeechBox> {
        if name == SpeechName::None {
            return None;
        }

        return Some(Box::new(command::CommandSpeech::new(name, tx)));
    }
}
