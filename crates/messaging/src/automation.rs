//! Desktop automation used by the scripted dispatcher
//!
//! A real implementation opens the browser, writes to the OS clipboard and
//! injects keystrokes. [`DryRunAutomation`] only records the steps.

use crate::{DispatchError, Result};
use std::path::Path;
use std::time::Duration;

/// Keystrokes the dispatcher sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    /// The platform paste chord, Ctrl+V or Cmd+V
    Paste,
}

/// Operations a chat client is driven with
pub trait UiAutomation {
    /// Open `url` in the default browser
    fn open_url(&mut self, url: &str) -> Result<()>;

    /// Put `text` on the clipboard
    fn copy_text(&mut self, text: &str) -> Result<()>;

    /// Put a file on the clipboard so it pastes as an attachment
    fn copy_file(&mut self, path: &Path) -> Result<()>;

    fn press(&mut self, key: Key) -> Result<()>;

    /// Block while the client catches up
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records each step instead of performing it
#[derive(Debug, Default)]
pub struct DryRunAutomation {
    steps: Vec<String>,
    waited: Duration,
}

impl DryRunAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps in the order they were requested
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Total time the dispatcher asked to wait
    pub fn waited(&self) -> Duration {
        self.waited
    }

    fn record(&mut self, step: String) {
        log::info!("dry run: {step}");
        self.steps.push(step);
    }
}

impl UiAutomation for DryRunAutomation {
    fn open_url(&mut self, url: &str) -> Result<()> {
        self.record(format!("open {url}"));
        Ok(())
    }

    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.record(format!("copy text ({} chars)", text.chars().count()));
        Ok(())
    }

    fn copy_file(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(DispatchError::Automation(format!(
                "cannot copy {} to the clipboard",
                path.display()
            )));
        }
        self.record(format!("copy file {}", path.display()));
        Ok(())
    }

    fn press(&mut self, key: Key) -> Result<()> {
        self.record(format!("press {key:?}"));
        Ok(())
    }

    fn wait(&mut self, duration: Duration) {
        self.waited += duration;
        self.record(format!("wait {}ms", duration.as_millis()));
    }
}
