use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;

static SENDER: OnceCell<mpsc::UnboundedSender<String>> = OnceCell::new();

/// Owns the system clipboard on a background task. Code attachments copied
/// with `/copy` are queued here.
pub struct ClipboardService {}

impl ClipboardService {
    pub async fn start() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if SENDER.set(tx).is_err() {
            return Err(anyhow!("Clipboard service is already running."));
        }
        let mut clipboard = arboard::Clipboard::new()?;

        while let Some(text) = rx.recv().await {
            clipboard.set_text(text)?;
        }

        return Ok(());
    }

    pub fn healthcheck() -> Result<()> {
        if SENDER.get().is_some() {
            return Ok(());
        }

        arboard::Clipboard::new()?;
        return Ok(());
    }

    pub fn set(text: String) -> Result<()> {
        if let Some(tx) = SENDER.get() {
            tx.send(text)?;
            return Ok(());
        }

        return Err(anyhow!("Clipboard is not available."));
    }
}
