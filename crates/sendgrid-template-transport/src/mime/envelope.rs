// crates/sendgrid-template-transport/src/mime/envelope.rs
// ============================================================================
// Module: Delivery Envelope
// Description: SMTP-level sender and recipients used for delivery.
// Purpose: Separate actual delivery targets from declared message headers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! An [`Envelope`] names who the provider delivers to and on whose behalf. It
//! may differ from the message's declared `From`/`To` (bounce handling,
//! redirection). When no envelope is supplied, one is derived from the message.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::TransportError;
use crate::mime::address::Address;
use crate::mime::message::Message;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Delivery sender and recipients.
///
/// # Invariants
/// - `recipients` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Delivery sender.
    sender: Address,
    /// Delivery recipients.
    recipients: Vec<Address>,
}

impl Envelope {
    /// Creates an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Validation`] when `recipients` is empty.
    pub fn new(sender: Address, recipients: Vec<Address>) -> Result<Self, TransportError> {
        if recipients.is_empty() {
            return Err(TransportError::Validation(
                "An envelope must have at least one recipient.".to_string(),
            ));
        }
        Ok(Self {
            sender,
            recipients,
        })
    }

    /// Derives an envelope from a message.
    ///
    /// The sender is the explicit message sender, else the first `from`
    /// address. Recipients are `to`, then `cc`, then `bcc`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Validation`] when the message has no sender
    /// or no recipients.
    pub fn from_message(message: &Message) -> Result<Self, TransportError> {
        let sender = message.sender().or_else(|| message.from().first()).cloned().ok_or_else(|| {
            TransportError::Validation("Cannot send message without a sender address.".to_string())
        })?;
        let recipients: Vec<Address> = message
            .to()
            .iter()
            .chain(message.cc())
            .chain(message.bcc())
            .cloned()
            .collect();
        if recipients.is_empty() {
            return Err(TransportError::Validation(
                "Cannot send message without a recipient address.".to_string(),
            ));
        }
        Self::new(sender, recipients)
    }

    /// Returns the delivery sender.
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.sender
    }

    /// Returns the delivery recipients.
    #[must_use]
    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }
}
