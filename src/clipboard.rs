//! Clipboard output for the copy actions.

use std::io;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use crossterm::clipboard::CopyToClipboard;
use crossterm::execute;

/// Somewhere copied text can go.
pub trait ClipboardSink: Send {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Writes to the system clipboard with an OSC 52 escape sequence.
///
/// Works over SSH as long as the terminal emulator honors OSC 52.
#[derive(Debug, Default, Clone, Copy)]
pub struct Osc52Clipboard;

impl ClipboardSink for Osc52Clipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        execute!(io::stdout(), CopyToClipboard::to_clipboard_from(text))?;
        Ok(())
    }
}

/// Keeps copied text in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    copied: Arc<Mutex<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything copied so far, oldest first.
    pub fn contents(&self) -> Vec<String> {
        self.copied.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// The most recently copied text.
    pub fn last(&self) -> Option<String> {
        self.contents().pop()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.copied
            .lock()
            .map_err(|_| anyhow!("clipboard buffer poisoned"))?
            .push(text.to_string());
        Ok(())
    }
}
