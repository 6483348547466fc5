//! Dispatcher configuration loaded from JSON

use crate::phone::DEFAULT_COUNTRY_CODE;
use crate::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pauses between scripted steps, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Chat page load before a text-only message
    pub page_load_ms: u64,
    /// Chat page load before a message with an attachment
    pub attachment_page_load_ms: u64,
    /// After the text is sent, before the file is pasted
    pub after_text_ms: u64,
    /// Attachment preview load
    pub attachment_preview_ms: u64,
    /// Client load before pasting into a group chat
    pub group_load_ms: u64,
    /// Between pasting into a group chat and pressing Enter
    pub group_paste_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            page_load_ms: 15_000,
            attachment_page_load_ms: 25_000,
            after_text_ms: 5_000,
            attachment_preview_ms: 3_000,
            group_load_ms: 10_000,
            group_paste_ms: 500,
        }
    }
}

impl Timings {
    /// All pauses zero, for tests and dry runs
    pub fn none() -> Self {
        Self {
            page_load_ms: 0,
            attachment_page_load_ms: 0,
            after_text_ms: 0,
            attachment_preview_ms: 0,
            group_load_ms: 0,
            group_paste_ms: 0,
        }
    }

    pub(crate) fn page_load(&self, with_attachment: bool) -> Duration {
        if with_attachment {
            Duration::from_millis(self.attachment_page_load_ms)
        } else {
            Duration::from_millis(self.page_load_ms)
        }
    }

    pub(crate) fn after_text(&self) -> Duration {
        Duration::from_millis(self.after_text_ms)
    }

    pub(crate) fn attachment_preview(&self) -> Duration {
        Duration::from_millis(self.attachment_preview_ms)
    }

    pub(crate) fn group_load(&self) -> Duration {
        Duration::from_millis(self.group_load_ms)
    }

    pub(crate) fn group_paste(&self) -> Duration {
        Duration::from_millis(self.group_paste_ms)
    }
}

/// Country code and timings for the scripted dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Prefixed to numbers typed without `+`
    pub country_code: String,
    pub timings: Timings,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            timings: Timings::default(),
        }
    }
}

impl DispatcherConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DispatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        let code = &self.country_code;
        let digits = code.strip_prefix('+').unwrap_or("");
        if digits.is_empty() || digits.len() > 3 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(DispatchError::Config(format!(
                "country_code must look like +91, got '{code}'"
            )));
        }
        Ok(())
    }
}
