#[cfg(test)]
#[path = "speech_test.rs"]
mod tests;

use super::formatter::blocks_to_text;
use super::formatter::format_text;
use crate::domain::models::Message;
use crate::domain::models::SpeechBox;
use crate::domain::models::Utterance;
use crate::domain::models::Voice;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    VoicesLoading,
    Ready,
    Speaking,
}

/// Reasons the application asks speech to stop without the user muting it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Hidden,
    Blur,
    Unload,
}

pub struct SpeechSettings {
    pub preferred_voice: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechSettings {
    fn default() -> SpeechSettings {
        return SpeechSettings {
            preferred_voice: "".to_string(),
            rate: 0.9,
            pitch: 1.0,
        };
    }
}

/// Owns the speech engine and guarantees a single audible utterance. Every
/// path that starts or stops speech goes through here, which keeps the
/// engine's own queue empty.
pub struct SpeechCoordinator {
    engine: Option<SpeechBox>,
    settings: SpeechSettings,
    state: SpeechState,
    muted: bool,
    voices: Vec<Voice>,
    last_spoken_id: Option<String>,
    pending: Option<Message>,
    current_utterance: Option<u64>,
    next_utterance_id: u64,
}

impl SpeechCoordinator {
    pub fn new(engine: Option<SpeechBox>, settings: SpeechSettings) -> SpeechCoordinator {
        return SpeechCoordinator {
            engine,
            settings,
            state: SpeechState::Idle,
            muted: false,
            voices: vec![],
            last_spoken_id: None,
            pending: None,
            current_utterance: None,
            next_utterance_id: 1,
        };
    }

    pub fn state(&self) -> SpeechState {
        return self.state;
    }

    pub fn is_muted(&self) -> bool {
        return self.muted;
    }

    pub fn is_degraded(&self) -> bool {
        return self.engine.is_none();
    }

    pub fn voices(&self) -> &[Voice] {
        return &self.voices;
    }

    pub fn last_spoken_id(&self) -> Option<&str> {
        return self.last_spoken_id.as_deref();
    }

    fn take_utterance_id(&mut self) -> u64 {
        let id = self.next_utterance_id;
        self.next_utterance_id += 1;
        return id;
    }

    /// Warms the engine up with a silent utterance and asks for the voice
    /// list. Without an engine the coordinator goes straight to a permanent
    /// ready state that never speaks.
    pub fn mount(&mut self) {
        if self.state != SpeechState::Idle {
            return;
        }

        if self.engine.is_none() {
            tracing::info!("No speech engine available, spoken replies are disabled");
            self.state = SpeechState::Ready;
            return;
        }

        self.silence();
        let warmup = Utterance::warmup(self.take_utterance_id());
        if let Some(engine) = self.engine.as_mut() {
            if let Err(err) = engine.speak(warmup) {
                tracing::warn!(error = ?err, "Speech warm-up failed");
            }

            if let Err(err) = engine.request_voices() {
                tracing::error!(error = ?err, "Failed to request speech voices");
                self.state = SpeechState::Ready;
                return;
            }
        }

        self.state = SpeechState::VoicesLoading;
    }

    pub fn voices_loaded(&mut self, voices: Vec<Voice>) {
        tracing::debug!(count = voices.len(), "Speech voices loaded");
        self.voices = voices;
        if self.state != SpeechState::VoicesLoading {
            return;
        }

        self.state = SpeechState::Ready;
        if let Some(message) = self.pending.take() {
            self.assistant_message(&message);
        }
    }

    /// Picks the configured voice by exact name, falling back to the first
    /// voice the engine offers.
    pub fn select_voice(&self) -> Option<Voice> {
        if let Some(voice) = self
            .voices
            .iter()
            .find(|voice| return voice.name == self.settings.preferred_voice)
        {
            return Some(voice.clone());
        }

        return self.voices.first().cloned();
    }

    /// Speaks a freshly received assistant reply. Anything already playing is
    /// cut off first, so a newer reply always replaces an older one.
    pub fn assistant_message(&mut self, message: &Message) {
        if !message.is_assistant() || self.muted || self.engine.is_none() {
            return;
        }
        if self.last_spoken_id.as_deref() == Some(message.id.as_str()) {
            return;
        }

        match self.state {
            SpeechState::Idle => return,
            SpeechState::VoicesLoading => {
                self.pending = Some(message.clone());
                return;
            }
            SpeechState::Ready | SpeechState::Speaking => {}
        }

        self.silence();

        let utterance = Utterance {
            id: self.take_utterance_id(),
            text: blocks_to_text(&format_text(&message.text)),
            voice: self.select_voice(),
            rate: self.settings.rate,
            pitch: self.settings.pitch,
            volume: 1.0,
        };
        let utterance_id = utterance.id;
        self.last_spoken_id = Some(message.id.to_string());

        if let Some(engine) = self.engine.as_mut() {
            if let Err(err) = engine.speak(utterance) {
                tracing::error!(error = ?err, "Speech error");
                return;
            }
        }

        self.current_utterance = Some(utterance_id);
        self.state = SpeechState::Speaking;
    }

    pub fn utterance_ended(&mut self, utterance_id: u64) {
        if self.current_utterance != Some(utterance_id) {
            return;
        }

        tracing::debug!(utterance_id, "Speech ended");
        self.current_utterance = None;
        self.state = SpeechState::Ready;
    }

    pub fn utterance_failed(&mut self, utterance_id: u64, err: &str) {
        if self.current_utterance != Some(utterance_id) {
            return;
        }

        tracing::error!(utterance_id, error = err, "Speech error");
        self.current_utterance = None;
        self.state = SpeechState::Ready;
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.silence();
        self.muted = muted;
        if muted {
            self.pending = None;
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        return self.muted;
    }

    /// Stops speech ahead of user input, such as sending a prompt or starting
    /// dictation. A reply waiting on the voice list is dropped too.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.silence();
    }

    /// Silences speech on the way out and waits for the engine to stop.
    pub async fn shutdown(&mut self) {
        self.pending = None;
        if let Some(engine) = self.engine.as_mut() {
            engine.shutdown().await;
        }
        self.lifecycle(Lifecycle::Unload);
    }

    pub fn lifecycle(&mut self, event: Lifecycle) {
        tracing::debug!(event = ?event, "Speech lifecycle");
        self.silence();
    }

    /// Stops all speech. Engines may hold queued utterances that survive a
    /// single cancel, so the queue is cancelled, cycled through pause and
    /// resume, then cancelled again. Safe to call in any state.
    pub fn silence(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.cancel();
            engine.pause();
            engine.resume();
            engine.cancel();
        }

        self.current_utterance = None;
        if self.state == SpeechState::Speaking {
            self.state = SpeechState::Ready;
        }
    }
}
