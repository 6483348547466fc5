//! Messaging - delivering reports over a chat client
//!
//! This crate provides:
//! - Phone number normalization with a default country code
//! - Group invite code parsing
//! - The [`Deliver`] capability used by callers that send reports
//! - A scripted dispatcher that drives a chat web client through
//!   [`UiAutomation`]
//!
//! # Example
//!
//! ```ignore
//! use messaging::{DispatcherConfig, DryRunAutomation, Message, ScriptedWebDispatcher};
//!
//! let config = DispatcherConfig::from_file("dispatcher.json")?;
//! let mut dispatcher = ScriptedWebDispatcher::new(DryRunAutomation::new(), &config);
//! let outcome = dispatcher.send_to_phone(
//!     "98765 43210",
//!     &Message::new("Your report is ready").with_attachment("report.pdf"),
//! );
//! println!("{}", outcome.status);
//! ```

mod automation;
mod config;
mod group;
mod phone;
mod scripted;

pub use automation::{DryRunAutomation, Key, UiAutomation};
pub use config::{DispatcherConfig, Timings};
pub use group::GroupId;
pub use phone::{PhoneNumber, DEFAULT_COUNTRY_CODE};
pub use scripted::ScriptedWebDispatcher;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while preparing or sending a message
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Invalid group id: {0}")]
    InvalidGroupId(String),

    #[error("PDF file not found")]
    AttachmentNotFound(PathBuf),

    #[error("{0}")]
    Automation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for messaging operations
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Where a message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Phone(PhoneNumber),
    Group(GroupId),
}

/// Text plus an optional file to attach
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub attachment: Option<PathBuf>,
}

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

/// Result of one delivery attempt, shown to the user as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub delivered: bool,
    pub status: String,
}

impl DeliveryOutcome {
    pub fn delivered(status: impl Into<String>) -> Self {
        Self {
            delivered: true,
            status: status.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            delivered: false,
            status: reason.into(),
        }
    }
}

/// Something that can send a message to a recipient
///
/// Implementations never panic on delivery problems; every failure comes
/// back as an outcome with `delivered == false`.
pub trait Deliver {
    fn deliver(&mut self, recipient: &Recipient, message: &Message) -> DeliveryOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_outcome_constructors() {
        assert_eq!(
            DeliveryOutcome::failed("PDF file not found"),
            DeliveryOutcome {
                delivered: false,
                status: "PDF file not found".to_string(),
            }
        );
        assert!(DeliveryOutcome::delivered("Message sent").delivered);
    }

    #[test]
    fn test_attachment_error_message() {
        let err = DispatchError::AttachmentNotFound(PathBuf::from("/tmp/x.pdf"));
        assert_eq!(err.to_string(), "PDF file not found");
    }

    #[test]
    fn test_message_builder() {
        let message = Message::new("hello").with_attachment("report.pdf");
        assert_eq!(message.text, "hello");
        assert_eq!(message.attachment, Some(PathBuf::from("report.pdf")));
    }
}
