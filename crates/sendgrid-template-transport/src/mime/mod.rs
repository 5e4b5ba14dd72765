// crates/sendgrid-template-transport/src/mime/mod.rs
// ============================================================================
// Module: Message Model
// Description: Read-only message, envelope, and attachment abstractions.
// Purpose: Provide the accessors the payload builder consumes.
// Dependencies: base64, serde_json
// ============================================================================

//! ## Overview
//! The message model is deliberately small: it is not a MIME encoder. It holds
//! the addresses, bodies, attachments and custom headers of an outbound
//! [`Message`] and the [`Envelope`] that names the actual delivery sender and
//! recipients.
//! Invariants:
//! - [`Address`] equality compares the email value only.
//! - Header lookups are case-insensitive and iteration preserves insertion order.
//! - Envelopes always carry at least one recipient.

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod address;
pub mod attachment;
pub mod envelope;
pub mod headers;
pub mod message;

pub use address::Address;
pub use attachment::Attachment;
pub use attachment::Disposition;
pub use envelope::Envelope;
pub use headers::HeaderList;
pub use message::Message;
pub use message::MessageBuilder;
