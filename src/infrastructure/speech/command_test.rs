use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use tokio::sync::mpsc;

use super::parse_espeak_voices;
use super::parse_say_voices;
use super::utterance_args;
use super::CommandSpeech;
use crate::domain::models::Event;
use crate::domain::models::SpeechEngine;
use crate::domain::models::SpeechName;
use crate::domain::models::Utterance;
use crate::domain::models::Voice;

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn utterance(voice: Option<Voice>) -> Utterance {
    return Utterance {
        id: 7,
        text: "- hello".to_string(),
        voice,
        rate: 0.9,
        pitch: 1.0,
        volume: 1.0,
    };
}

#[test]
fn it_parses_say_voices() {
    let output = [
        "Alex                en_US    # Most people recognize me by my voice.",
        "Bad News            en_US    # The light you see at the end of the tunnel is the headlamp.",
        "Amélie              fr_CA    # Bonjour, je m’appelle Amélie.",
        "",
    ]
    .join("\n");

    let voices = parse_say_voices(&output);
    assert_eq!(voices.len(), 3);
    assert_eq!(voices[0].name, "Alex");
    assert_eq!(voices[0].lang, "en_US");
    assert_eq!(voices[1].name, "Bad News");
    assert_eq!(voices[2].name, "Amélie");
    assert_eq!(voices[2].lang, "fr_CA");
}

#[test]
fn it_parses_espeak_voices() {
    let output = [
        "Pty Language       Age/Gender VoiceName          File                 Other Languages",
        " 5  af              --/M      Afrikaans          gmw/af",
        " 2  en-gb           --/M      English_(Great_Britain) gmw/en         (en 2)",
        " 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)",
    ]
    .join("\n");

    let voices = parse_espeak_voices(&output);
    assert_eq!(voices.len(), 3);
    assert_eq!(voices[0].name, "af");
    assert_eq!(voices[1].name, "en-gb");
    assert_eq!(voices[2].lang, "en-us");
}

#[test]
fn it_builds_say_args() {
    let args = utterance_args(
        SpeechName::Say,
        &utterance(Some(Voice {
            name: "Samantha".to_string(),
            lang: "en_US".to_string(),
        })),
    );
    assert_eq!(args, vec!["-v", "Samantha", "-r", "158"]);
}

#[test]
fn it_builds_espeak_args() {
    let args = utterance_args(SpeechName::Espeak, &utterance(None));
    assert_eq!(
        args,
        vec!["--stdin", "-s", "158", "-a", "100", "-p", "50"]
    );
}

#[tokio::test]
async fn it_completes_silent_utterances_immediately() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut engine = CommandSpeech::new(SpeechName::Espeak, tx);
    engine.speak(Utterance::warmup(3))?;

    match rx.recv().await {
        Some(Event::SpeechEnded(id)) => assert_eq!(id, 3),
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[test]
fn it_tracks_pause_and_resume() {
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut engine = CommandSpeech::new(SpeechName::Say, tx);
    engine.pause();
    assert!(engine.is_paused());
    engine.resume();
    assert!(!engine.is_paused());
    engine.cancel();
}

#[test]
fn it_holds_utterances_until_resumed() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut engine = CommandSpeech::new(SpeechName::Espeak, tx);

    engine.pause();
    engine.speak(Utterance::warmup(4))?;
    assert!(rx.try_recv().is_err());

    engine.resume();
    match rx.try_recv() {
        Ok(Event::SpeechEnded(id)) => assert_eq!(id, 4),
        _ => bail!("Wrong event"),
    }

    return Ok(());
}

#[test]
fn it_drops_held_utterances_on_cancel() -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut engine = CommandSpeech::new(SpeechName::Espeak, tx);

    engine.pause();
    engine.speak(Utterance::warmup(5))?;
    engine.cancel();
    engine.resume();
    assert!(rx.try_recv().is_err());

    return Ok(());
}

#[tokio::test]
async fn it_stops_the_worker_before_shutdown_returns() {
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut engine = CommandSpeech::new(SpeechName::Espeak, tx);
    let dropped = Arc::new(AtomicBool::new(false));
    let flag = DropFlag(dropped.clone());
    engine.worker = Some(tokio::spawn(async move {
        let _flag = flag;
        tokio::time::sleep(Duration::from_secs(60)).await;
    }));

    engine.shutdown().await;

    assert!(dropped.load(Ordering::SeqCst));
    assert!(engine.worker.is_none());
}
