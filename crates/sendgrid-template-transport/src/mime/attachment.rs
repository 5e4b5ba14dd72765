// crates/sendgrid-template-transport/src/mime/attachment.rs
// ============================================================================
// Module: Mail Attachments
// Description: Binary message parts with prepared MIME headers.
// Purpose: Expose attachment bytes and headers in the form a MIME layer emits.
// Dependencies: base64
// ============================================================================

//! ## Overview
//! An [`Attachment`] is a binary body plus the MIME headers that describe it.
//! Attachments built with [`Attachment::new`] or [`Attachment::inline`] derive
//! their headers from a filename, content type and [`Disposition`]; parts that
//! already carry headers are wrapped with [`Attachment::from_prepared`].
//! [`Attachment::body_to_string`] returns the transfer-encoded body exactly as a
//! MIME writer would: base64 wrapped at 76 columns with CRLF line breaks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::mime::headers::HeaderList;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content type used when none is supplied.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
/// Maximum encoded line length for base64 transfer encoding.
const ENCODED_LINE_LENGTH: usize = 76;

// ============================================================================
// SECTION: Disposition
// ============================================================================

/// Presentation of an attachment in the rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Downloadable attachment.
    Attachment,
    /// Embedded part referenced by content id.
    Inline,
}

impl Disposition {
    /// Returns the header token for the disposition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

// ============================================================================
// SECTION: Attachment
// ============================================================================

/// Header source for an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PartHeaders {
    /// Headers derived from descriptive fields.
    Described {
        /// Attachment filename, doubling as content id for inline parts.
        filename: String,
        /// MIME content type.
        content_type: String,
        /// Attachment disposition.
        disposition: Disposition,
    },
    /// Headers supplied verbatim by the caller.
    Prepared(HeaderList),
}

/// Binary message part with MIME headers.
///
/// # Invariants
/// - Inline parts need a non-empty filename; it is their content id and an
///   empty one is rejected when a payload is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Raw attachment bytes.
    body: Vec<u8>,
    /// Header source.
    headers: PartHeaders,
}

impl Attachment {
    /// Creates a downloadable attachment with the default content type.
    pub fn new(body: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self::described(body.into(), filename.into(), Disposition::Attachment)
    }

    /// Creates an inline part; the filename becomes its content id.
    pub fn inline(body: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self::described(body.into(), filename.into(), Disposition::Inline)
    }

    /// Wraps a part whose MIME headers were prepared elsewhere.
    ///
    /// No header is required at construction; missing `Content-Type` or
    /// `Content-Disposition` headers are reported when a payload is built.
    pub fn from_prepared(body: impl Into<Vec<u8>>, headers: HeaderList) -> Self {
        Self {
            body: body.into(),
            headers: PartHeaders::Prepared(headers),
        }
    }

    /// Sets the content type of a described part.
    ///
    /// Prepared parts keep their own `Content-Type` header.
    #[must_use]
    pub fn with_content_type(mut self, value: impl Into<String>) -> Self {
        if let PartHeaders::Described {
            content_type, ..
        } = &mut self.headers
        {
            *content_type = value.into();
        }
        self
    }

    /// Builds a described part.
    const fn described(body: Vec<u8>, filename: String, disposition: Disposition) -> Self {
        Self {
            body,
            headers: PartHeaders::Described {
                filename,
                content_type: String::new(),
                disposition,
            },
        }
    }

    /// Returns the raw attachment bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the MIME headers for this part.
    #[must_use]
    pub fn prepared_headers(&self) -> HeaderList {
        match &self.headers {
            PartHeaders::Prepared(headers) => headers.clone(),
            PartHeaders::Described {
                filename,
                content_type,
                disposition,
            } => {
                let content_type =
                    if content_type.is_empty() { DEFAULT_CONTENT_TYPE } else { content_type };
                let quoted = quote(filename);
                let mut headers = HeaderList::new();
                headers.push("Content-Type", format!("{content_type}; name={quoted}"));
                headers.push("Content-Transfer-Encoding", "base64");
                headers.push(
                    "Content-Disposition",
                    format!("{}; name={quoted}; filename={quoted}", disposition.as_str()),
                );
                headers
            }
        }
    }

    /// Returns the base64 transfer encoding of the body with CRLF line breaks.
    #[must_use]
    pub fn body_to_string(&self) -> String {
        wrap_lines(&BASE64.encode(&self.body))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Quotes a header parameter value, escaping `\` and `"`.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Splits ASCII text into CRLF-terminated lines of the encoded line length.
pub(crate) fn wrap_lines(encoded: &str) -> String {
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / ENCODED_LINE_LENGTH * 2);
    for chunk in encoded.as_bytes().chunks(ENCODED_LINE_LENGTH) {
        wrapped.extend(chunk.iter().copied().map(char::from));
        wrapped.push_str("\r\n");
    }
    wrapped
}
