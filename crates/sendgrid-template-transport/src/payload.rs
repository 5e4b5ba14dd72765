// crates/sendgrid-template-transport/src/payload.rs
// ============================================================================
// Module: Mail Send Payload
// Description: Translation of messages into SendGrid v3 Mail Send JSON.
// Purpose: Build the provider payload from a message and its envelope.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`build_payload`] is a pure function of a [`Message`] and an [`Envelope`].
//! It assembles independent fragments (addresses, content, attachments, header
//! directives, template options) and combines them once into an immutable
//! [`Payload`].
//! Invariants:
//! - `from` and `personalizations[*].to` come from the envelope.
//! - `content` lists `text/plain` before `text/html`, each only when present.
//! - Reserved header names never appear under `headers`, regardless of case.
//! - Template data is merged into every personalization.
//! - Attachment content is base64 without any CRLF sequence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;
use crate::mime::Address;
use crate::mime::Attachment;
use crate::mime::Envelope;
use crate::mime::HeaderList;
use crate::mime::Message;
use crate::template::TemplateData;
use crate::template::TemplateId;
use crate::template::TemplateOptions;
use crate::template::parse_template_data;

// ============================================================================
// SECTION: Header Dispatch
// ============================================================================

/// Handling applied to a message header, keyed by its lower-cased name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRule {
    /// Provider-reserved or structurally represented; never forwarded.
    Bypass,
    /// Selects the dynamic template.
    TemplateId,
    /// Carries dynamic template data as a JSON object.
    TemplateData,
    /// Enables sandbox mode by its presence alone.
    SandboxMode,
    /// Forwarded verbatim under `headers`.
    PassThrough,
}

/// Lookup table from lower-cased header name to its handling.
///
/// Reserved names cannot be overwritten through the Mail Send API; the address
/// and subject headers are already represented structurally.
const HEADER_RULES: &[(&str, HeaderRule)] = &[
    ("x-sg-id", HeaderRule::Bypass),
    ("x-sg-eid", HeaderRule::Bypass),
    ("received", HeaderRule::Bypass),
    ("dkim-signature", HeaderRule::Bypass),
    ("content-transfer-encoding", HeaderRule::Bypass),
    ("from", HeaderRule::Bypass),
    ("to", HeaderRule::Bypass),
    ("cc", HeaderRule::Bypass),
    ("bcc", HeaderRule::Bypass),
    ("subject", HeaderRule::Bypass),
    ("content-type", HeaderRule::Bypass),
    ("reply-to", HeaderRule::Bypass),
    ("x-template-id", HeaderRule::TemplateId),
    ("x-dynamic-template-data", HeaderRule::TemplateData),
    ("x-sandbox-mode", HeaderRule::SandboxMode),
];

impl HeaderRule {
    /// Returns the rule for a lower-cased header name.
    #[must_use]
    pub fn for_name(lowercase_name: &str) -> Self {
        HEADER_RULES
            .iter()
            .find(|(name, _)| *name == lowercase_name)
            .map_or(Self::PassThrough, |(_, rule)| *rule)
    }
}

/// Template controls and passthrough headers extracted from message headers.
#[derive(Debug, Default)]
struct HeaderDirectives {
    /// Template options discovered in headers.
    options: TemplateOptions,
    /// Headers forwarded to the provider, keyed by lower-cased name.
    passthrough: BTreeMap<String, String>,
}

impl HeaderDirectives {
    /// Walks the headers once, in order, applying each header's rule.
    fn collect(headers: &HeaderList) -> Result<Self, TransportError> {
        let mut directives = Self::default();
        for (name, value) in headers.iter() {
            let name = name.to_ascii_lowercase();
            match HeaderRule::for_name(&name) {
                HeaderRule::Bypass => {}
                HeaderRule::TemplateId => {
                    directives.options.template_id = Some(TemplateId::parse(value)?);
                }
                HeaderRule::TemplateData => {
                    directives.options.data = Some(parse_template_data(value)?);
                }
                HeaderRule::SandboxMode => directives.options.sandbox_mode = true,
                HeaderRule::PassThrough => {
                    directives.passthrough.insert(name, value.to_string());
                }
            }
        }
        Ok(directives)
    }
}

// ============================================================================
// SECTION: Payload Types
// ============================================================================

/// Address object as accepted by the Mail Send API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadAddress {
    /// Email value.
    pub email: String,
    /// Display name, omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&Address> for PayloadAddress {
    fn from(address: &Address) -> Self {
        Self {
            email: address.email().to_string(),
            name: address.name().map(str::to_string),
        }
    }
}

/// Per-recipient delivery block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Personalization {
    /// Primary recipients; never empty.
    pub to: Vec<PayloadAddress>,
    /// Subject line, serialized as `null` when absent.
    pub subject: Option<String>,
    /// Carbon copy recipients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<Vec<PayloadAddress>>,
    /// Blind carbon copy recipients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Vec<PayloadAddress>>,
    /// Substitutions for the dynamic template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_template_data: Option<TemplateData>,
}

/// Body part of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    /// MIME type, `text/plain` or `text/html`.
    #[serde(rename = "type")]
    pub content_type: &'static str,
    /// Body text.
    pub value: String,
}

/// Attachment object as accepted by the Mail Send API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadAttachment {
    /// Base64 content without line breaks.
    pub content: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Attachment filename.
    pub filename: String,
    /// `attachment` or `inline`.
    pub disposition: String,
    /// Content id for inline parts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// Sandbox mode toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SandboxMode {
    /// Always `true` when present.
    pub enable: bool,
}

/// Mail settings block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MailSettings {
    /// Sandbox mode toggle.
    pub sandbox_mode: SandboxMode,
}

/// SendGrid v3 Mail Send request body.
///
/// # Invariants
/// - Exactly one personalization is produced by [`build_payload`].
/// - Optional blocks are omitted from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    /// Delivery blocks.
    personalizations: Vec<Personalization>,
    /// Envelope sender.
    from: PayloadAddress,
    /// Body parts; may be empty.
    content: Vec<Content>,
    /// First reply-to address.
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<PayloadAddress>,
    /// Attachments.
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<PayloadAttachment>>,
    /// Dynamic template identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    template_id: Option<TemplateId>,
    /// Passthrough custom headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    headers: Option<BTreeMap<String, String>>,
    /// Mail settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    mail_settings: Option<MailSettings>,
}

impl Payload {
    /// Returns the dynamic template identifier.
    #[must_use]
    pub const fn template_id(&self) -> Option<&TemplateId> {
        self.template_id.as_ref()
    }

    /// Returns true when sandbox mode is enabled.
    #[must_use]
    pub const fn sandbox_mode(&self) -> bool {
        self.mail_settings.is_some()
    }

    /// Serializes the payload into a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Internal`] when serialization fails.
    pub fn to_json(&self) -> Result<Value, TransportError> {
        serde_json::to_value(self).map_err(|err| TransportError::Internal(err.to_string()))
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds the Mail Send payload for a message and its envelope.
///
/// # Errors
///
/// Returns [`TransportError::Validation`] for a malformed template id or
/// template data header, or when no `to` recipient remains, and
/// [`TransportError::Internal`] when an attachment lacks required MIME headers
/// or an inline part has no filename.
pub fn build_payload(message: &Message, envelope: &Envelope) -> Result<Payload, TransportError> {
    let attachments = build_attachments(message.attachments())?;
    let directives = HeaderDirectives::collect(message.headers())?;
    let options = directives.options.overlay(message.template_options());

    let mut personalizations = vec![build_personalization(message, envelope)?];
    if let Some(data) = options.non_empty_data() {
        for personalization in &mut personalizations {
            personalization.dynamic_template_data = Some(data.clone());
        }
    }

    Ok(Payload {
        personalizations,
        from: PayloadAddress::from(envelope.sender()),
        content: build_content(message),
        reply_to: message.reply_to().first().map(PayloadAddress::from),
        attachments: (!attachments.is_empty()).then_some(attachments),
        template_id: options.template_id,
        headers: (!directives.passthrough.is_empty()).then_some(directives.passthrough),
        mail_settings: options.sandbox_mode.then_some(MailSettings {
            sandbox_mode: SandboxMode {
                enable: true,
            },
        }),
    })
}

/// Builds the single personalization block.
///
/// Envelope recipients that are also cc or bcc addresses are delivered through
/// those lists and are left out of `to`.
fn build_personalization(
    message: &Message,
    envelope: &Envelope,
) -> Result<Personalization, TransportError> {
    let to: Vec<PayloadAddress> = envelope
        .recipients()
        .iter()
        .filter(|&recipient| {
            !message.cc().contains(recipient) && !message.bcc().contains(recipient)
        })
        .map(PayloadAddress::from)
        .collect();
    if to.is_empty() {
        return Err(TransportError::Validation(
            "A personalization requires at least one \"to\" recipient outside cc and bcc."
                .to_string(),
        ));
    }
    Ok(Personalization {
        to,
        subject: message.subject().map(str::to_string),
        cc: address_list(message.cc()),
        bcc: address_list(message.bcc()),
        dynamic_template_data: None,
    })
}

/// Converts a non-empty address list.
fn address_list(addresses: &[Address]) -> Option<Vec<PayloadAddress>> {
    (!addresses.is_empty()).then(|| addresses.iter().map(PayloadAddress::from).collect())
}

/// Builds the ordered body parts.
fn build_content(message: &Message) -> Vec<Content> {
    [("text/plain", message.text_body()), ("text/html", message.html_body())]
        .into_iter()
        .filter_map(|(content_type, body)| {
            body.map(|value| Content {
                content_type,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Builds attachment objects from prepared MIME headers.
fn build_attachments(attachments: &[Attachment]) -> Result<Vec<PayloadAttachment>, TransportError> {
    attachments.iter().map(build_attachment).collect()
}

/// Builds one attachment object.
fn build_attachment(attachment: &Attachment) -> Result<PayloadAttachment, TransportError> {
    let headers = attachment.prepared_headers();
    let disposition = headers.body("Content-Disposition").ok_or_else(|| {
        TransportError::Internal("attachment is missing a Content-Disposition header".to_string())
    })?;
    let filename = headers.parameter("Content-Disposition", "filename").ok_or_else(|| {
        TransportError::Internal("attachment Content-Disposition has no filename".to_string())
    })?;
    let content_type = headers.body("Content-Type").ok_or_else(|| {
        TransportError::Internal("attachment is missing a Content-Type header".to_string())
    })?;
    let inline = disposition == "inline";
    if inline && filename.is_empty() {
        return Err(TransportError::Internal(
            "inline attachment requires a filename for its content id".to_string(),
        ));
    }
    let content_id = inline.then(|| filename.clone());
    Ok(PayloadAttachment {
        content: strip_line_breaks(&attachment.body_to_string()),
        content_type: content_type.to_string(),
        filename,
        disposition: disposition.to_string(),
        content_id,
    })
}

/// Removes every CRLF sequence from transfer-encoded content.
pub(crate) fn strip_line_breaks(encoded: &str) -> String {
    encoded.replace("\r\n", "")
}
