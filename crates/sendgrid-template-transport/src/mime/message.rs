// crates/sendgrid-template-transport/src/mime/message.rs
// ============================================================================
// Module: Outbound Message
// Description: Message abstraction consumed by the payload builder.
// Purpose: Hold addresses, bodies, attachments, headers, and template options.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`Message`] is immutable once built; use [`Message::builder`] to assemble
//! one. Building never fails: delivery requirements such as a sender or at
//! least one recipient are checked when an [`crate::mime::Envelope`] is derived.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::mime::address::Address;
use crate::mime::attachment::Attachment;
use crate::mime::headers::HeaderList;
use crate::template::TemplateData;
use crate::template::TemplateId;
use crate::template::TemplateOptions;

// ============================================================================
// SECTION: Message
// ============================================================================

/// Outbound email message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    /// Explicit sender, overriding the first `from` address for the envelope.
    sender: Option<Address>,
    /// Declared author addresses.
    from: Vec<Address>,
    /// Primary recipients.
    to: Vec<Address>,
    /// Carbon copy recipients.
    cc: Vec<Address>,
    /// Blind carbon copy recipients.
    bcc: Vec<Address>,
    /// Reply-to addresses.
    reply_to: Vec<Address>,
    /// Subject line.
    subject: Option<String>,
    /// Plain-text body.
    text: Option<String>,
    /// HTML body.
    html: Option<String>,
    /// Attached parts.
    attachments: Vec<Attachment>,
    /// Custom headers in insertion order.
    headers: HeaderList,
    /// Typed dynamic template controls.
    template: TemplateOptions,
}

impl Message {
    /// Returns a builder for a new message.
    #[must_use]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Returns the explicit sender, if any.
    #[must_use]
    pub const fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    /// Returns the declared author addresses.
    #[must_use]
    pub fn from(&self) -> &[Address] {
        &self.from
    }

    /// Returns the primary recipients.
    #[must_use]
    pub fn to(&self) -> &[Address] {
        &self.to
    }

    /// Returns the carbon copy recipients.
    #[must_use]
    pub fn cc(&self) -> &[Address] {
        &self.cc
    }

    /// Returns the blind carbon copy recipients.
    #[must_use]
    pub fn bcc(&self) -> &[Address] {
        &self.bcc
    }

    /// Returns the reply-to addresses.
    #[must_use]
    pub fn reply_to(&self) -> &[Address] {
        &self.reply_to
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Returns the plain-text body.
    #[must_use]
    pub fn text_body(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the HTML body.
    #[must_use]
    pub fn html_body(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Returns the attachments.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns the custom headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderList {
        &self.headers
    }

    /// Returns the typed template options.
    #[must_use]
    pub const fn template_options(&self) -> &TemplateOptions {
        &self.template
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for [`Message`] values.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    /// Message under construction.
    message: Message,
}

impl MessageBuilder {
    /// Sets the explicit envelope sender.
    #[must_use]
    pub fn sender(mut self, address: impl Into<Address>) -> Self {
        self.message.sender = Some(address.into());
        self
    }

    /// Adds an author address.
    #[must_use]
    pub fn from(mut self, address: impl Into<Address>) -> Self {
        self.message.from.push(address.into());
        self
    }

    /// Adds a primary recipient.
    #[must_use]
    pub fn to(mut self, address: impl Into<Address>) -> Self {
        self.message.to.push(address.into());
        self
    }

    /// Adds a carbon copy recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<Address>) -> Self {
        self.message.cc.push(address.into());
        self
    }

    /// Adds a blind carbon copy recipient.
    #[must_use]
    pub fn bcc(mut self, address: impl Into<Address>) -> Self {
        self.message.bcc.push(address.into());
        self
    }

    /// Adds a reply-to address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<Address>) -> Self {
        self.message.reply_to.push(address.into());
        self
    }

    /// Sets the subject line.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = Some(subject.into());
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.message.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.message.html = Some(html.into());
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.message.attachments.push(attachment);
        self
    }

    /// Appends a custom header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.message.headers.push(name, value);
        self
    }

    /// Selects a dynamic template.
    #[must_use]
    pub fn template_id(mut self, template_id: TemplateId) -> Self {
        self.message.template.template_id = Some(template_id);
        self
    }

    /// Sets the dynamic template data.
    #[must_use]
    pub fn template_data(mut self, data: TemplateData) -> Self {
        self.message.template.data = Some(data);
        self
    }

    /// Enables or disables SendGrid sandbox mode.
    #[must_use]
    pub const fn sandbox_mode(mut self, enabled: bool) -> Self {
        self.message.template.sandbox_mode = enabled;
        self
    }

    /// Finishes the message.
    #[must_use]
    pub fn build(self) -> Message {
        self.message
    }
}
