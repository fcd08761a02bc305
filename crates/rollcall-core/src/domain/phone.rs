use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_COUNTRY_CODE: &str = "1";

/// A phone number reduced to an optional leading `+` followed by ASCII digits.
///
/// Construction goes through [`Normalizer`], which never fails: the digit
/// count and country code are not validated. Deserialization only accepts
/// values already in that form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PhoneNumber(String);

impl TryFrom<String> for PhoneNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('+').unwrap_or(&value);
        if value.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidPhoneNumber(value));
        }
        Ok(Self(value))
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl PhoneNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    country_code: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `"44"` or `"+44"`; anything other than 1-3 ASCII digits is rejected.
    pub fn with_country_code(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || digits.len() > 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidCountryCode(raw.to_string()));
        }
        Ok(Self {
            country_code: digits.to_string(),
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn normalize(&self, raw: &str) -> PhoneNumber {
        let stripped = strip_formatting(raw);
        if stripped.starts_with('+') {
            return PhoneNumber(stripped);
        }

        let mut out = String::with_capacity(stripped.len() + self.country_code.len() + 1);
        out.push('+');
        out.push_str(&self.country_code);
        out.push_str(&stripped);
        PhoneNumber(out)
    }
}

/// Normalizes with the default `+1` country code.
pub fn normalize_phone_number(raw: &str) -> PhoneNumber {
    Normalizer::default().normalize(raw)
}

// A `+` survives only while no digit has been kept yet.
fn strip_formatting(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut saw_plus = false;
    let mut saw_digit = false;

    for ch in trimmed.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
            saw_digit = true;
        } else if ch == '+' && !saw_plus && !saw_digit {
            out.push('+');
            saw_plus = true;
        }
    }

    out
}
