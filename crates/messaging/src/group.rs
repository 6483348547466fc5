//! Group invite codes

use crate::{DispatchError, Result};
use std::fmt;

const INVITE_HOST: &str = "chat.whatsapp.com/";

/// A chat group, identified by its invite code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId(String);

impl GroupId {
    /// Accept a bare invite code or a full invite link
    ///
    /// For a link, everything after `chat.whatsapp.com/` up to an optional
    /// query string or trailing slash is the code.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let code = match raw.rfind(INVITE_HOST) {
            Some(at) => &raw[at + INVITE_HOST.len()..],
            None => raw,
        };
        let code = code.split(['?', '#']).next().unwrap_or("").trim_end_matches('/');

        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DispatchError::InvalidGroupId(raw.to_string()));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
