//! Delivery by scripting the chat web client

use crate::automation::{Key, UiAutomation};
use crate::config::{DispatcherConfig, Timings};
use crate::group::GroupId;
use crate::phone::PhoneNumber;
use crate::{Deliver, DeliveryOutcome, DispatchError, Message, Recipient, Result};

const CHAT_URL: &str = "https://web.whatsapp.com";

const MESSAGE_SENT: &str = "Message sent";
const MESSAGE_AND_PDF_SENT: &str = "Message and PDF sent successfully (Tab left open)";
const ATTACH_MANUALLY: &str =
    "Message sent, but failed to copy PDF to clipboard. Please attach manually.";
const GROUP_SENT: &str = "Message pasted and sent! Please ensure the correct group chat was open.";
const GROUP_ERROR: &str = "WhatsApp Group Error";
const INVALID_PHONE: &str = "Invalid phone number";

/// Sends messages by driving the web client through fixed steps
///
/// There is no delivery confirmation and nothing is retried. A group
/// message is pasted into whichever chat is open once the client loads.
pub struct ScriptedWebDispatcher<A: UiAutomation> {
    automation: A,
    country_code: String,
    timings: Timings,
}

impl<A: UiAutomation> ScriptedWebDispatcher<A> {
    pub fn new(automation: A, config: &DispatcherConfig) -> Self {
        Self {
            automation,
            country_code: config.country_code.clone(),
            timings: config.timings.clone(),
        }
    }

    pub fn automation(&self) -> &A {
        &self.automation
    }

    pub fn into_automation(self) -> A {
        self.automation
    }

    /// Normalize `raw` and send to it
    pub fn send_to_phone(&mut self, raw: &str, message: &Message) -> DeliveryOutcome {
        match PhoneNumber::parse(raw, &self.country_code) {
            Ok(phone) => self.deliver(&Recipient::Phone(phone), message),
            Err(e) => {
                log::warn!("{e}");
                DeliveryOutcome::failed(INVALID_PHONE)
            }
        }
    }

    /// Parse an invite code or link and send to the group
    pub fn send_to_group(&mut self, raw: &str, message: &Message) -> DeliveryOutcome {
        match GroupId::parse(raw) {
            Ok(group) => self.deliver(&Recipient::Group(group), message),
            Err(e) => DeliveryOutcome::failed(format!("{GROUP_ERROR}: {e}")),
        }
    }

    fn phone(&mut self, phone: &PhoneNumber, message: &Message) -> Result<&'static str> {
        let attachment = match &message.attachment {
            Some(path) if !path.is_file() => {
                return Err(DispatchError::AttachmentNotFound(path.clone()))
            }
            other => other.as_deref(),
        };

        log::info!("sending message to {phone}");
        let ui = &mut self.automation;
        ui.open_url(&format!("{CHAT_URL}/send?phone={}", phone.digits()))?;
        ui.wait(self.timings.page_load(attachment.is_some()));
        ui.copy_text(&message.text)?;
        ui.press(Key::Paste)?;
        ui.press(Key::Enter)?;

        let Some(path) = attachment else {
            return Ok(MESSAGE_SENT);
        };

        ui.wait(self.timings.after_text());
        if let Err(e) = ui.copy_file(path) {
            log::warn!("could not copy {} to the clipboard: {e}", path.display());
            return Ok(ATTACH_MANUALLY);
        }
        ui.press(Key::Paste)?;
        ui.wait(self.timings.attachment_preview());
        ui.press(Key::Enter)?;
        Ok(MESSAGE_AND_PDF_SENT)
    }

    fn group(&mut self, group: &GroupId, message: &Message) -> Result<()> {
        log::info!("sending message to group {group}");
        if message.attachment.is_some() {
            log::warn!("group messages are sent without their attachment");
        }

        let ui = &mut self.automation;
        ui.copy_text(&message.text)?;
        ui.open_url(CHAT_URL)?;
        ui.wait(self.timings.group_load());
        ui.press(Key::Paste)?;
        ui.wait(self.timings.group_paste());
        ui.press(Key::Enter)
    }
}

impl<A: UiAutomation> Deliver for ScriptedWebDispatcher<A> {
    fn deliver(&mut self, recipient: &Recipient, message: &Message) -> DeliveryOutcome {
        match recipient {
            Recipient::Phone(phone) => match self.phone(phone, message) {
                Ok(status) => DeliveryOutcome::delivered(status),
                Err(e) => {
                    log::warn!("delivery to {phone} failed: {e}");
                    DeliveryOutcome::failed(e.to_string())
                }
            },
            Recipient::Group(group) => match self.group(group, message) {
                Ok(()) => DeliveryOutcome::delivered(GROUP_SENT),
                Err(e) => {
                    log::warn!("delivery to group {group} failed: {e}");
                    DeliveryOutcome::failed(format!("{GROUP_ERROR}: {e}"))
                }
            },
        }
    }
}
