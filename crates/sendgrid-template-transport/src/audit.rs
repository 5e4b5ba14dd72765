// crates/sendgrid-template-transport/src/audit.rs
// ============================================================================
// Module: Send Audit Logging
// Description: Structured audit events for mail send attempts.
// Purpose: Emit redacted JSON-line records without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every send attempt produces one [`MailAuditEvent`] handed to an
//! [`AuditSink`]. Events carry counts, outcome and provider identifiers only;
//! addresses, subjects, bodies and API keys are never recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendOutcome {
    /// The provider accepted the message.
    Sent,
    /// The attempt failed before or after reaching the provider.
    Failed,
}

/// Mail send audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Transport identity (`scheme://host[:port]`).
    pub transport: String,
    /// Attempt outcome.
    pub outcome: SendOutcome,
    /// Provider status code when a response was received.
    pub status_code: Option<u16>,
    /// Provider-assigned message id on success.
    pub message_id: Option<String>,
    /// Normalized error kind label on failure.
    pub error_kind: Option<&'static str>,
    /// Number of envelope recipients.
    pub recipient_count: usize,
    /// Number of attachments.
    pub attachment_count: usize,
    /// Dynamic template id when one was selected.
    pub template_id: Option<String>,
    /// Whether sandbox mode was requested.
    pub sandbox: bool,
}

/// Inputs required to construct an audit event.
pub struct MailAuditEventParams {
    /// Transport identity.
    pub transport: String,
    /// Attempt outcome.
    pub outcome: SendOutcome,
    /// Provider status code when a response was received.
    pub status_code: Option<u16>,
    /// Provider-assigned message id on success.
    pub message_id: Option<String>,
    /// Normalized error kind label on failure.
    pub error_kind: Option<&'static str>,
    /// Number of envelope recipients.
    pub recipient_count: usize,
    /// Number of attachments.
    pub attachment_count: usize,
    /// Dynamic template id when one was selected.
    pub template_id: Option<String>,
    /// Whether sandbox mode was requested.
    pub sandbox: bool,
}

impl MailAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: MailAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "mail_send",
            timestamp_ms,
            transport: params.transport,
            outcome: params.outcome,
            status_code: params.status_code,
            message_id: params.message_id,
            error_kind: params.error_kind,
            recipient_count: params.recipient_count,
            attachment_count: params.attachment_count,
            template_id: params.template_id,
            sandbox: params.sandbox,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for mail send events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &MailAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &MailAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &MailAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &MailAuditEvent) {}
}
