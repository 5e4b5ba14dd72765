// crates/sendgrid-template-transport/src/mime/address.rs
// ============================================================================
// Module: Mail Address
// Description: Email address with an optional display name.
// Purpose: Identify senders and recipients independent of presentation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`Address`] pairs an email value with a cosmetic display name. Parsing
//! accepts `user@example.com` and `Display Name <user@example.com>`; it does
//! not attempt RFC 5322 validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::str::FromStr;

use crate::error::TransportError;

// ============================================================================
// SECTION: Address
// ============================================================================

/// Email address with an optional display name.
///
/// # Invariants
/// - Equality and hashing use the email value only.
/// - An empty display name is stored as `None`.
#[derive(Debug, Clone, Eq)]
pub struct Address {
    /// Email value, e.g. `user@example.com`.
    email: String,
    /// Optional display name.
    name: Option<String>,
}

impl Address {
    /// Creates an address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates an address with a display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            email: email.into(),
            name: if name.is_empty() { None } else { Some(name) },
        }
    }

    /// Returns the email value.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.email.hash(state);
    }
}

impl From<&str> for Address {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

impl From<String> for Address {
    fn from(email: String) -> Self {
        Self::new(email)
    }
}

impl FromStr for Address {
    type Err = TransportError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let invalid = || TransportError::Validation(format!("Invalid address: \"{raw}\"."));
        let (email, name) = match trimmed.strip_suffix('>') {
            Some(rest) => {
                let (name, email) = rest.rsplit_once('<').ok_or_else(invalid)?;
                (email.trim(), name.trim().trim_matches('"').trim())
            }
            None => (trimmed, ""),
        };
        if email.is_empty() || !email.contains('@') || email.contains(char::is_whitespace) {
            return Err(invalid());
        }
        Ok(Self::with_name(email, name))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "\"{name}\" <{}>", self.email),
            None => f.write_str(&self.email),
        }
    }
}
