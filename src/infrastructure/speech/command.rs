#[cfg(test)]
#[path = "command_test.rs"]
mod tests;

use std::process::Stdio;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::models::Event;
use crate::domain::models::SpeechEngine;
use crate::domain::models::SpeechName;
use crate::domain::models::Utterance;
use crate::domain::models::Voice;

/// Words per minute both `say` and `espeak` use at a rate of 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

fn program(name: SpeechName) -> &'static str {
    match name {
        SpeechName::Say => return "say",
        SpeechName::Espeak => return "espeak",
        SpeechName::None => return "",
    }
}

fn voice_list_args(name: SpeechName) -> Vec<String> {
    match name {
        SpeechName::Say => return vec!["-v".to_string(), "?".to_string()],
        _ => return vec!["--voices".to_string()],
    }
}

/// Arguments for speaking an utterance. The text itself is written to stdin so
/// replies starting with a dash are never read as flags.
pub fn utterance_args(name: SpeechName, utterance: &Utterance) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round() as u32;
    let mut args = vec![];

    if name == SpeechName::Espeak {
        args.push("--stdin".to_string());
    }

    if let Some(voice) = &utterance.voice {
        args.push("-v".to_string());
        args.push(voice.name.to_string());
    }

    if name == SpeechName::Say {
        args.push("-r".to_string());
        args.push(words_per_minute.to_string());
        return args;
    }

    let amplitude = (utterance.volume.clamp(0.0, 2.0) * 100.0).round() as u32;
    let pitch = (utterance.pitch.clamp(0.0, 2.0) * 50.0).round().min(99.0) as u32;
    args.extend(vec![
        "-s".to_string(),
        words_per_minute.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
        "-p".to_string(),
        pitch.to_string(),
    ]);

    return args;
}

/// Parses `say -v ?` output, where each line is the voice name, the locale,
/// then a `#` sample sentence.
pub fn parse_say_voices(output: &str) -> Vec<Voice> {
    return output
        .lines()
        .filter_map(|line| {
            let description = line.split('#').next()?.trim();
            let (name, lang) = description.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }

            return Some(Voice {
                name: name.to_string(),
                lang: lang.trim().to_string(),
            });
        })
        .collect();
}

/// Parses the `espeak --voices` table. Voices are selected by their language
/// column, so that column becomes the voice name.
pub fn parse_espeak_voices(output: &str) -> Vec<Voice> {
    return output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let columns = line.split_whitespace().collect::<Vec<&str>>();
            if columns.len() < 4 {
                return None;
            }

            return Some(Voice {
                name: columns[1].to_string(),
                lang: columns[1].to_string(),
            });
        })
        .collect();
}

async fn run_utterance(name: SpeechName, args: Vec<String>, text: String) -> Result<()> {
    let mut child = Command::new(program(name))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        bail!(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }

    return Ok(());
}

async fn list_voices(name: SpeechName) -> Result<Vec<Voice>> {
    let output = Command::new(program(name))
        .args(voice_list_args(name))
        .output()
        .await?;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if name == SpeechName::Say {
        return Ok(parse_say_voices(&stdout));
    }
    return Ok(parse_espeak_voices(&stdout));
}

/// Speaks through the platform's command line synthesizer, one child process
/// per utterance.
pub struct CommandSpeech {
    name: SpeechName,
    tx: mpsc::UnboundedSender<Event>,
    worker: Option<JoinHandle<()>>,
    paused: bool,
    held: Option<Utterance>,
}

impl CommandSpeech {
    pub fn new(name: SpeechName, tx: mpsc::UnboundedSender<Event>) -> CommandSpeech {
        return CommandSpeech {
            name,
            tx,
            worker: None,
            paused: false,
            held: None,
        };
    }

    pub fn is_paused(&self) -> bool {
        return self.paused;
    }

    fn start(&mut self, utterance: Utterance) -> Result<()> {
        if utterance.is_silent() {
            self.tx.send(Event::SpeechEnded(utterance.id))?;
            return Ok(());
        }

        let name = self.name;
        let tx = self.tx.clone();
        let args = utterance_args(name, &utterance);
        let utterance_id = utterance.id;
        let text = utterance.text;

        self.worker = Some(tokio::spawn(async move {
            let res = run_utterance(name, args, text).await;
            let event = match res {
                Ok(()) => Event::SpeechEnded(utterance_id),
                Err(err) => Event::SpeechFailed(utterance_id, err.to_string()),
            };

            if tx.send(event).is_err() {
                tracing::debug!(utterance_id, "Speech finished after the UI closed");
            }
        }));

        return Ok(());
    }
}

impl Drop for CommandSpeech {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

#[async_trait]
impl SpeechEngine for CommandSpeech {
    fn name(&self) -> SpeechName {
        return self.name;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = Command::new(program(self.name))
            .args(voice_list_args(self.name))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if let Err(err) = res {
            tracing::error!(error = ?err, program = program(self.name), "Speech engine is not available");
            bail!(format!("{} is not installed", program(self.name)));
        }

        return Ok(());
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.cancel();

        // While paused the utterance waits for resume.
        if self.is_paused() {
            self.held = Some(utterance);
            return Ok(());
        }

        return self.start(utterance);
    }

    fn cancel(&mut self) {
        self.held = None;
        if let Some(worker) = self.worker.take() {
            // Dropping the child inside the aborted task kills the process.
            worker.abort();
        }
    }

    #[allow(clippy::implicit_return)]
    async fn shutdown(&mut self) {
        self.held = None;
        self.paused = false;
        if let Some(worker) = self.worker.take() {
            worker.abort();
            // Resolves after the task, and the child it owns, are dropped.
            if let Err(err) = worker.await {
                if !err.is_cancelled() {
                    tracing::error!(error = ?err, "Speech worker failed during shutdown");
                }
            }
        }
    }

    // A running synthesizer process can't be suspended portably, so pausing
    // only holds back the next utterance.
    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
        if let Some(utterance) = self.held.take() {
            if let Err(err) = self.start(utterance) {
                tracing::error!(error = ?err, "Failed to resume speech");
            }
        }
    }

    fn request_voices(&mut self) -> Result<()> {
        let name = self.name;
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let voices = match list_voices(name).await {
                Ok(voices) => voices,
                Err(err) => {
                    tracing::error!(error = ?err, "Failed to list speech voices");
                    vec![]
                }
            };

            if tx.send(Event::SpeechVoicesLoaded(voices)).is_err() {
                tracing::debug!("Speech voices loaded after the UI closed");
            }
        });

        return Ok(());
    }
}
