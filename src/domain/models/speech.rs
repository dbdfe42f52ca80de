#[cfg(test)]
#[path = "speech_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SpeechName {
    Say,
    Espeak,
    None,
}

impl SpeechName {
    pub fn parse(text: String) -> Option<SpeechName> {
        return SpeechName::iter().find(|e| return e.to_string() == text);
    }

    pub fn platform_default() -> SpeechName {
        if cfg!(target_os = "macos") {
            return SpeechName::Say;
        }
        return SpeechName::Espeak;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub lang: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub voice: Option<Voice>,
    /// Relative speaking rate, 1.0 being the engine's normal speed.
    pub rate: f32,
    pub pitch: f32,
    /// 0.0 to 1.0. Zero volume utterances are used to warm the engine up.
    pub volume: f32,
}

impl Utterance {
    pub fn warmup(id: u64) -> Utterance {
        return Utterance {
            id,
            text: " ".to_string(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
            volume: 0.0,
        };
    }

    pub fn is_silent(&self) -> bool {
        return self.volume <= 0.0 || self.text.trim().is_empty();
    }
}

#[async_trait]
pub trait SpeechEngine {
    /// Returns the name of the speech engine.
    fn name(&self) -> SpeechName;

    /// Used at startup to verify the engine is available on this machine.
    async fn health_check(&self) -> Result<()>;

    /// Begins speaking an utterance without waiting for it to finish. The
    /// engine reports the outcome with `Event::SpeechEnded` or
    /// `Event::SpeechFailed` carrying the utterance id.
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    /// Stops the current utterance and drops anything queued behind it.
    fn cancel(&mut self);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Stops speech for good and returns once nothing is audible, so the
    /// process can exit without leaving a synthesizer running.
    async fn shutdown(&mut self);

    /// Starts loading the available voices. The list arrives later as
    /// `Event::SpeechVoicesLoaded`.
    fn request_voices(&mut self) -> Result<()>;
}

pub type SpeechBox = Box<dyn SpeechEngine + Send + Sync>;
