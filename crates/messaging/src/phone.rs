//! Phone number normalization

use crate::{DispatchError, Result};
use std::fmt;

/// Country code added to numbers written without a leading `+`
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Separators people type inside phone numbers
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | '.' | '(' | ')')
}

/// An international phone number: `+` followed by digits only
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize a typed number
    ///
    /// Separators are dropped and `country_code` is prefixed when the
    /// number has no `+` of its own.
    ///
    /// ```ignore
    /// let phone = PhoneNumber::parse("98765 43210", "+91")?;
    /// assert_eq!(phone.as_str(), "+919876543210");
    /// ```
    pub fn parse(raw: &str, country_code: &str) -> Result<Self> {
        let compact: String = raw.trim().chars().filter(|c| !is_separator(*c)).collect();
        if compact.is_empty() {
            return Err(DispatchError::InvalidPhoneNumber(raw.to_string()));
        }

        let number = if compact.starts_with('+') {
            compact
        } else {
            format!("{country_code}{compact}")
        };
        let valid = matches!(
            number.strip_prefix('+'),
            Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        );
        if !valid {
            return Err(DispatchError::InvalidPhoneNumber(raw.to_string()));
        }
        Ok(Self(number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number without its leading `+`, as used in chat links
    pub fn digits(&self) -> &str {
        &self.0[1..]
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
