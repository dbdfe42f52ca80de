#[cfg(test)]
#[path = "dictation_test.rs"]
mod tests;

use std::process::Stdio;

use anyhow::bail;
use anyhow::Result;
use tokio::process::Command;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

pub const ERROR_NOT_CONFIGURED: &str =
    "Speech recognition is not configured. Set dictation-command to enable voice input.";
pub const ERROR_NO_SPEECH: &str = "No speech was detected. Please try again.";

/// Voice input through an external transcription command. The command records
/// from the microphone and prints what it heard to stdout.
pub struct Dictation {
    command: String,
}

impl Default for Dictation {
    fn default() -> Dictation {
        return Dictation {
            command: Config::get(ConfigKey::DictationCommand),
        };
    }
}

impl Dictation {
    pub fn new(command: &str) -> Dictation {
        return Dictation {
            command: command.to_string(),
        };
    }

    pub fn is_configured(&self) -> bool {
        return !self.command.trim().is_empty();
    }

    /// Runs the command to completion. Errors carry the text shown to the user.
    pub async fn listen(&self) -> Result<String> {
        if !self.is_configured() {
            bail!(ERROR_NOT_CONFIGURED);
        }

        #[cfg(not(target_os = "windows"))]
        let mut cmd = Command::new("sh");
        #[cfg(not(target_os = "windows"))]
        cmd.arg("-c");
        #[cfg(target_os = "windows")]
        let mut cmd = Command::new("cmd");
        #[cfg(target_os = "windows")]
        cmd.arg("/C");

        let res = cmd
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match res {
            Ok(output) => output,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to start dictation command");
                bail!(format!("Speech recognition error: {err}"));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = ?output.status, stderr = stderr, "Dictation command failed");

            let mut reason = stderr;
            if reason.is_empty() {
                reason = output.status.to_string();
            }
            bail!(format!("Speech recognition error: {reason}"));
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            bail!(ERROR_NO_SPEECH);
        }

        return Ok(transcript);
    }
}
