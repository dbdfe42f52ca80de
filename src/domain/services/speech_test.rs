use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use super::Lifecycle;
use super::SpeechCoordinator;
use super::SpeechSettings;
use super::SpeechState;
use crate::domain::models::Author;
use crate::domain::models::Message;
use crate::domain::models::SpeechEngine;
use crate::domain::models::SpeechName;
use crate::domain::models::Utterance;
use crate::domain::models::Voice;

#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    spoken: Vec<Utterance>,
    audible: Option<u64>,
    max_audible: usize,
}

#[derive(Clone, Default)]
struct MockSpeech {
    recorder: Arc<Mutex<Recorder>>,
    fail_voices: bool,
}

impl MockSpeech {
    fn calls(&self) -> Vec<String> {
        return self.recorder.lock().unwrap().calls.clone();
    }

    fn spoken(&self) -> Vec<Utterance> {
        return self.recorder.lock().unwrap().spoken.clone();
    }

    fn audible(&self) -> Option<u64> {
        return self.recorder.lock().unwrap().audible;
    }

    fn max_audible(&self) -> usize {
        return self.recorder.lock().unwrap().max_audible;
    }
}

#[async_trait]
impl SpeechEngine for MockSpeech {
    fn name(&self) -> SpeechName {
        return SpeechName::None;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        let mut recorder = self.recorder.lock().unwrap();
        recorder.calls.push(format!("speak:{}", utterance.text));
        if !utterance.is_silent() {
            let already_audible = usize::from(recorder.audible.is_some());
            recorder.max_audible = recorder.max_audible.max(already_audible + 1);
            recorder.audible = Some(utterance.id);
        }
        recorder.spoken.push(utterance);
        return Ok(());
    }

    fn cancel(&mut self) {
        let mut recorder = self.recorder.lock().unwrap();
        recorder.calls.push("cancel".to_string());
        recorder.audible = None;
    }

    fn pause(&mut self) {
        self.recorder.lock().unwrap().calls.push("pause".to_string());
    }

    fn resume(&mut self) {
        self.recorder.lock().unwrap().calls.push("resume".to_string());
    }

    #[allow(clippy::implicit_return)]
    async fn shutdown(&mut self) {
        self.recorder
            .lock()
            .unwrap()
            .calls
            .push("shutdown".to_string());
        self.recorder.lock().unwrap().audible = None;
    }

    fn request_voices(&mut self) -> Result<()> {
        self.recorder
            .lock()
            .unwrap()
            .calls
            .push("request_voices".to_string());
        if self.fail_voices {
            bail!("voices unavailable");
        }
        return Ok(());
    }
}

fn voices() -> Vec<Voice> {
    return vec![
        Voice {
            name: "Alex".to_string(),
            lang: "en_US".to_string(),
        },
        Voice {
            name: "Google UK English Female".to_string(),
            lang: "en_GB".to_string(),
        },
    ];
}

fn settings(preferred_voice: &str) -> SpeechSettings {
    return SpeechSettings {
        preferred_voice: preferred_voice.to_string(),
        ..SpeechSettings::default()
    };
}

fn ready_coordinator(preferred_voice: &str) -> (SpeechCoordinator, MockSpeech) {
    let engine = MockSpeech::default();
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), settings(preferred_voice));
    coordinator.mount();
    coordinator.voices_loaded(voices());
    return (coordinator, engine);
}

fn reply(text: &str) -> Message {
    return Message::new(Author::Assistant, text);
}

#[test]
fn it_starts_idle() {
    let coordinator = SpeechCoordinator::new(None, SpeechSettings::default());
    assert_eq!(coordinator.state(), SpeechState::Idle);
    assert!(!coordinator.is_muted());
}

#[test]
fn it_warms_up_and_loads_voices_on_mount() {
    let engine = MockSpeech::default();
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), SpeechSettings::default());
    coordinator.mount();

    assert_eq!(coordinator.state(), SpeechState::VoicesLoading);
    let spoken = engine.spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].volume, 0.0);
    assert!(engine.calls().contains(&"request_voices".to_string()));
    assert_eq!(engine.audible(), None);
}

#[test]
fn it_becomes_ready_when_voices_load() {
    let (coordinator, _engine) = ready_coordinator("");
    assert_eq!(coordinator.state(), SpeechState::Ready);
    assert_eq!(coordinator.voices().len(), 2);
}

#[test]
fn it_is_ready_when_voices_cannot_be_requested() {
    let engine = MockSpeech {
        fail_voices: true,
        ..MockSpeech::default()
    };
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), SpeechSettings::default());
    coordinator.mount();
    assert_eq!(coordinator.state(), SpeechState::Ready);
}

#[test]
fn it_speaks_assistant_messages() {
    let (mut coordinator, engine) = ready_coordinator("");
    let msg = reply("Hello there");
    coordinator.assistant_message(&msg);

    assert_eq!(coordinator.state(), SpeechState::Speaking);
    assert_eq!(coordinator.last_spoken_id(), Some(msg.id.as_str()));

    let spoken = engine.spoken();
    let last = spoken.last().unwrap();
    assert_eq!(last.text, "Hello there");
    assert_eq!(last.volume, 1.0);
    assert_eq!(last.rate, 0.9);
    assert_eq!(last.pitch, 1.0);
}

#[test]
fn it_cancels_before_speaking() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("Hello there"));

    let calls = engine.calls();
    let tail = &calls[calls.len() - 5..];
    assert_eq!(
        tail,
        &[
            "cancel".to_string(),
            "pause".to_string(),
            "resume".to_string(),
            "cancel".to_string(),
            "speak:Hello there".to_string(),
        ]
    );
}

#[test]
fn it_ignores_user_messages() {
    let (mut coordinator, engine) = ready_coordinator("");
    let before = engine.spoken().len();
    coordinator.assistant_message(&Message::new(Author::User, "Hi"));
    coordinator.assistant_message(&Message::new(Author::Natter, "Copied."));

    assert_eq!(engine.spoken().len(), before);
    assert_eq!(coordinator.state(), SpeechState::Ready);
}

#[test]
fn it_never_speaks_the_same_message_twice() {
    let (mut coordinator, engine) = ready_coordinator("");
    let msg = reply("Only once");
    coordinator.assistant_message(&msg);
    coordinator.utterance_ended(engine.spoken().last().unwrap().id);
    coordinator.assistant_message(&msg);

    let count = engine
        .spoken()
        .iter()
        .filter(|e| return e.text == "Only once")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn it_selects_preferred_voice() {
    let (mut coordinator, engine) = ready_coordinator("Google UK English Female");
    coordinator.assistant_message(&reply("Cheerio"));

    let voice = engine.spoken().last().unwrap().voice.clone().unwrap();
    assert_eq!(voice.name, "Google UK English Female");
}

#[test]
fn it_falls_back_to_first_voice() {
    let (mut coordinator, engine) = ready_coordinator("Nonexistent Voice");
    coordinator.assistant_message(&reply("Howdy"));

    let voice = engine.spoken().last().unwrap().voice.clone().unwrap();
    assert_eq!(voice.name, "Alex");
}

#[test]
fn it_speaks_without_voice_when_none_are_available() {
    let engine = MockSpeech::default();
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), SpeechSettings::default());
    coordinator.mount();
    coordinator.voices_loaded(vec![]);
    coordinator.assistant_message(&reply("Hello"));

    assert!(engine.spoken().last().unwrap().voice.is_none());
    assert_eq!(coordinator.state(), SpeechState::Speaking);
}

#[test]
fn it_returns_to_ready_when_utterance_ends() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("Hello"));
    let id = engine.spoken().last().unwrap().id;

    coordinator.utterance_ended(id);
    assert_eq!(coordinator.state(), SpeechState::Ready);
}

#[test]
fn it_returns_to_ready_when_utterance_fails() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("Hello"));
    let id = engine.spoken().last().unwrap().id;

    coordinator.utterance_failed(id, "synthesis-failed");
    assert_eq!(coordinator.state(), SpeechState::Ready);
}

#[test]
fn it_ignores_stale_utterance_events() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("First"));
    let first_id = engine.spoken().last().unwrap().id;
    coordinator.assistant_message(&reply("Second"));

    coordinator.utterance_ended(first_id);
    assert_eq!(coordinator.state(), SpeechState::Speaking);
}

#[test]
fn it_only_speaks_the_last_of_two_rapid_replies() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("First"));
    coordinator.assistant_message(&reply("Second"));

    assert_eq!(engine.max_audible(), 1);
    let audible = engine.audible().unwrap();
    let spoken = engine.spoken();
    let current = spoken.iter().find(|e| return e.id == audible).unwrap();
    assert_eq!(current.text, "Second");
}

#[test]
fn it_keeps_only_the_latest_reply_while_voices_load() {
    let engine = MockSpeech::default();
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), SpeechSettings::default());
    coordinator.mount();
    coordinator.assistant_message(&reply("First"));
    coordinator.assistant_message(&reply("Second"));
    assert_eq!(coordinator.state(), SpeechState::VoicesLoading);

    coordinator.voices_loaded(voices());

    let texts = engine
        .spoken()
        .iter()
        .filter(|e| return !e.is_silent())
        .map(|e| return e.text.to_string())
        .collect::<Vec<String>>();
    assert_eq!(texts, vec!["Second".to_string()]);
    assert_eq!(coordinator.state(), SpeechState::Speaking);
}

#[test]
fn it_silences_when_muted_while_speaking() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("A long answer"));
    assert_eq!(coordinator.state(), SpeechState::Speaking);

    assert!(coordinator.toggle_mute());
    assert!(coordinator.is_muted());
    assert_eq!(coordinator.state(), SpeechState::Ready);
    assert_eq!(engine.audible(), None);

    let spoken_before = engine.spoken().len();
    coordinator.assistant_message(&reply("Another answer"));
    assert_eq!(engine.spoken().len(), spoken_before);
    assert_eq!(engine.audible(), None);
}

#[test]
fn it_does_not_replay_when_unmuted() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("A long answer"));
    coordinator.set_muted(true);
    let spoken_before = engine.spoken().len();

    coordinator.set_muted(false);
    assert_eq!(engine.spoken().len(), spoken_before);
    assert_eq!(engine.audible(), None);

    coordinator.assistant_message(&reply("Fresh answer"));
    assert_eq!(engine.spoken().last().unwrap().text, "Fresh answer");
    assert!(engine.audible().is_some());
}

#[test]
fn it_drops_pending_replies_when_muted() {
    let engine = MockSpeech::default();
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), SpeechSettings::default());
    coordinator.mount();
    coordinator.assistant_message(&reply("Queued"));
    coordinator.set_muted(true);
    coordinator.set_muted(false);
    coordinator.voices_loaded(voices());

    assert!(engine.spoken().iter().all(|e| return e.text != "Queued"));
}

#[test]
fn it_silences_on_lifecycle_events() {
    for event in [Lifecycle::Hidden, Lifecycle::Blur, Lifecycle::Unload] {
        let (mut coordinator, engine) = ready_coordinator("");
        coordinator.assistant_message(&reply("Talking"));
        coordinator.lifecycle(event);

        assert_eq!(coordinator.state(), SpeechState::Ready);
        assert_eq!(engine.audible(), None);
        assert!(!coordinator.is_muted());
    }
}

#[test]
fn it_silences_idempotently() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.silence();
    coordinator.silence();

    assert_eq!(coordinator.state(), SpeechState::Ready);
    assert_eq!(engine.audible(), None);
}

#[test]
fn it_degrades_without_an_engine() {
    let mut coordinator = SpeechCoordinator::new(None, SpeechSettings::default());
    coordinator.mount();
    assert!(coordinator.is_degraded());
    assert_eq!(coordinator.state(), SpeechState::Ready);

    coordinator.assistant_message(&reply("Hello"));
    assert_eq!(coordinator.state(), SpeechState::Ready);
    assert!(coordinator.last_spoken_id().is_none());

    assert!(coordinator.toggle_mute());
    assert!(!coordinator.toggle_mute());
    assert_eq!(coordinator.state(), SpeechState::Ready);
}

#[test]
fn it_cancels_before_user_input() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("Still talking"));
    coordinator.cancel();

    assert_eq!(coordinator.state(), SpeechState::Ready);
    assert_eq!(engine.audible(), None);
    assert!(!coordinator.is_muted());
}

#[test]
fn it_drops_pending_replies_when_a_new_chat_starts() {
    let engine = MockSpeech::default();
    let mut coordinator =
        SpeechCoordinator::new(Some(Box::new(engine.clone())), SpeechSettings::default());
    coordinator.mount();
    coordinator.assistant_message(&reply("Reply from the old chat"));

    coordinator.cancel();
    coordinator.set_muted(false);
    coordinator.voices_loaded(voices());

    assert!(engine.spoken().iter().all(|e| return e.is_silent()));
    assert_eq!(engine.audible(), None);
    assert_eq!(coordinator.state(), SpeechState::Ready);
}

#[tokio::test]
async fn it_waits_for_the_engine_on_shutdown() {
    let (mut coordinator, engine) = ready_coordinator("");
    coordinator.assistant_message(&reply("Talking"));

    coordinator.shutdown().await;

    assert!(engine.calls().contains(&"shutdown".to_string()));
    assert_eq!(engine.audible(), None);
    assert_eq!(coordinator.state(), SpeechState::Ready);
}
