//! Optional system clipboard. Headless sessions simply report it unavailable.

use anyhow::{Result, anyhow, bail};

/// Somewhere exported palette text can be copied to.
pub trait TextClipboard {
    fn available(&self) -> bool;
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The OS clipboard via `arboard`, if one could be opened.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn detect() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clip) => Some(clip),
            Err(e) => {
                log::warn!("system clipboard unavailable: {e}");
                None
            }
        };
        Self { inner }
    }
}

impl TextClipboard for SystemClipboard {
    fn available(&self) -> bool {
        self.inner.is_some()
    }

    fn copy(&mut self, text: &str) -> Result<()> {
        let Some(clip) = self.inner.as_mut() else {
            bail!("clipboard not available");
        };
        clip.set_text(text.to_string()).map_err(|e| anyhow!(e))
    }
}
