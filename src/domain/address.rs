// Copyright (c) 2025 - Cowboy AI, Inc.
//! Address Value Object
//!
//! Chain addresses are the identity of every record this crate writes, so
//! they are normalized once at the boundary: a `0x` prefix followed by 40
//! lowercase hex digits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Address validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is missing the 0x prefix: {0}")]
    MissingPrefix(String),

    #[error("Address must have 40 hex digits, found {0}")]
    InvalidLength(usize),

    #[error("Invalid character in address: {0}")]
    InvalidCharacter(char),
}

/// A 20-byte chain address in canonical lowercase hex form
///
/// # Examples
///
/// ```rust
/// use dataunion_stats::domain::Address;
///
/// let union = Address::new("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap();
/// assert_eq!(union.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
///
/// assert!(Address::new("abcdef").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Number of hex digits after the prefix
    pub const HEX_DIGITS: usize = 40;

    /// Validate and normalize an address
    pub fn new(address: impl Into<String>) -> Result<Self, AddressError> {
        let address = address.into();

        let digits = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(address.clone()))?;

        if digits.len() != Self::HEX_DIGITS {
            return Err(AddressError::InvalidLength(digits.len()));
        }

        if let Some(c) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidCharacter(c));
        }

        Ok(Self(format!("0x{}", digits.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
