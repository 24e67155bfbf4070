//! Validated currency identifiers.

use crate::core::error::RateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 3-letter ISO 4217 style currency code, stored uppercased.
///
/// Construction goes through [`FromStr`], so a value of this type always
/// holds three ASCII letters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        // Always valid ASCII per the FromStr validation.
        std::str::from_utf8(&self.0).unwrap()
    }
}

impl FromStr for CurrencyCode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RateError::InvalidRequest(format!(
                "currency code must be exactly 3 letters, got '{s}'"
            )));
        }
        let mut bytes = [0u8; 3];
        for (i, b) in trimmed.bytes().enumerate() {
            bytes[i] = b.to_ascii_uppercase();
        }
        Ok(CurrencyCode(bytes))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.as_str().to_string()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}
