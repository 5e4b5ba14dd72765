// crates/sendgrid-template-transport/src/transport.rs
// ============================================================================
// Module: SendGrid Template Transport
// Description: Delivery of messages through the SendGrid v3 Mail Send API.
// Purpose: Build payloads, POST them, and classify provider responses.
// Dependencies: serde_json, url
// ============================================================================

//! ## Overview
//! [`SendgridTemplateTransport`] performs one blocking HTTPS request per
//! [`SendgridTemplateTransport::send`] call. Configuration (API key, host,
//! port) is fixed at construction; the HTTP client and audit sink are shared
//! handles, so concurrent sends on one transport do not interfere.
//! Invariants:
//! - Payload validation errors are returned before any request is issued.
//! - HTTP 202 is the only success status.
//! - Exactly one audit event is recorded per send attempt.
//!
//! No retries are attempted; callers decide whether to send again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::audit::AuditSink;
use crate::audit::MailAuditEvent;
use crate::audit::MailAuditEventParams;
use crate::audit::NoopAuditSink;
use crate::audit::SendOutcome;
use crate::error::TransportError;
use crate::http::HttpClient;
use crate::http::HttpRequest;
use crate::http::HttpResponse;
use crate::mime::Envelope;
use crate::mime::Message;
use crate::payload::Payload;
use crate::payload::build_payload;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// DSN scheme and identity prefix of this transport.
pub const SCHEME: &str = "sendgrid+template";
/// Public SendGrid API host used when none is configured.
pub const DEFAULT_HOST: &str = "api.sendgrid.com";
/// Mail Send endpoint path.
const MAIL_SEND_PATH: &str = "/v3/mail/send";
/// The only status code the provider returns for an accepted message.
const ACCEPTED_STATUS: u16 = 202;
/// Response header carrying the provider-assigned message id.
const MESSAGE_ID_HEADER: &str = "x-message-id";

// ============================================================================
// SECTION: Sent Message
// ============================================================================

/// Handle describing a message accepted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Provider-assigned message id, when the response carried one.
    message_id: Option<String>,
    /// Envelope the message was delivered with.
    envelope: Envelope,
    /// Status code of the accepting response.
    status: u16,
}

impl SentMessage {
    /// Returns the provider-assigned message id.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Returns the delivery envelope.
    #[must_use]
    pub const fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the status code of the accepting response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Mail transport for SendGrid dynamic templates.
///
/// # Invariants
/// - Configuration is read-only after construction.
/// - The API key is never rendered by `Display` or `Debug`.
#[derive(Clone)]
pub struct SendgridTemplateTransport {
    /// SendGrid API key used as bearer token.
    key: String,
    /// Host override; `None` selects [`DEFAULT_HOST`].
    host: Option<String>,
    /// Port override; `None` uses the scheme default.
    port: Option<u16>,
    /// HTTP client used for requests.
    client: Arc<dyn HttpClient>,
    /// Sink receiving one event per send attempt.
    audit: Arc<dyn AuditSink>,
}

impl SendgridTemplateTransport {
    /// Creates a transport for the default host without audit logging.
    pub fn new(key: impl Into<String>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            key: key.into(),
            host: None,
            port: None,
            client,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Sets the host; `None` or an empty string selects the default host.
    #[must_use]
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host.filter(|host| !host.is_empty());
        self
    }

    /// Sets the port; `None` or `0` selects the scheme default.
    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port.filter(|port| *port != 0);
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the configured host override.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the configured port override.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns `host[:port]` for requests and identity rendering.
    #[must_use]
    pub fn endpoint(&self) -> String {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    /// Builds the payload this transport would send, without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the envelope cannot be derived or the
    /// payload fails validation.
    pub fn preview(
        &self,
        message: &Message,
        envelope: Option<&Envelope>,
    ) -> Result<Payload, TransportError> {
        let envelope = resolve_envelope(message, envelope)?;
        build_payload(message, &envelope)
    }

    /// Sends a message.
    ///
    /// When `envelope` is `None` it is derived from the message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Validation`] or [`TransportError::Internal`]
    /// when the payload cannot be built, [`TransportError::Network`] when the
    /// provider cannot be reached, and [`TransportError::Send`] when the
    /// provider rejects the message.
    pub fn send(
        &self,
        message: &Message,
        envelope: Option<&Envelope>,
    ) -> Result<SentMessage, TransportError> {
        let resolved = resolve_envelope(message, envelope);
        let recipient_count = resolved.as_ref().map_or(0, |envelope| envelope.recipients().len());
        let built = resolved.and_then(|envelope| {
            build_payload(message, &envelope).map(|payload| (envelope, payload))
        });
        let payload = built.as_ref().ok().map(|(_, payload)| payload);
        let result = match &built {
            Ok((envelope, payload)) => self.deliver(envelope, payload),
            Err(err) => Err(err.clone()),
        };
        self.record(message, recipient_count, payload, &result);
        result
    }

    /// Posts a built payload and interprets the response.
    fn deliver(&self, envelope: &Envelope, payload: &Payload) -> Result<SentMessage, TransportError> {
        let request = HttpRequest {
            url: self.mail_send_url()?,
            bearer_token: self.key.clone(),
            body: payload.to_json()?,
        };
        let response = self.client.post_json(&request).map_err(|err| TransportError::Network {
            endpoint: self.endpoint(),
            reason: err.to_string(),
        })?;
        let message_id = interpret_response(&response)?;
        Ok(SentMessage {
            message_id,
            envelope: envelope.clone(),
            status: response.status(),
        })
    }

    /// Returns the Mail Send URL for the configured endpoint.
    fn mail_send_url(&self) -> Result<Url, TransportError> {
        let raw = format!("https://{}{MAIL_SEND_PATH}", self.endpoint());
        Url::parse(&raw).map_err(|err| {
            TransportError::Validation(format!("Invalid Sendgrid endpoint \"{raw}\": {err}."))
        })
    }

    /// Records the audit event for a send attempt.
    ///
    /// Template fields come from the built payload; when the payload could not
    /// be built only the typed message options are reported.
    fn record(
        &self,
        message: &Message,
        recipient_count: usize,
        payload: Option<&Payload>,
        result: &Result<SentMessage, TransportError>,
    ) {
        let options = message.template_options();
        let template_id = payload.map_or(options.template_id.as_ref(), Payload::template_id);
        let sandbox = payload.map_or(options.sandbox_mode, Payload::sandbox_mode);
        let (outcome, status_code, message_id, error_kind) = match result {
            Ok(sent) => {
                (SendOutcome::Sent, Some(sent.status), sent.message_id.clone(), None)
            }
            Err(err) => (SendOutcome::Failed, err.status(), None, Some(err.kind())),
        };
        let event = MailAuditEvent::new(MailAuditEventParams {
            transport: self.to_string(),
            outcome,
            status_code,
            message_id,
            error_kind,
            recipient_count,
            attachment_count: message.attachments().len(),
            template_id: template_id.map(ToString::to_string),
            sandbox,
        });
        self.audit.record(&event);
    }
}

impl fmt::Display for SendgridTemplateTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{}", self.endpoint())
    }
}

impl fmt::Debug for SendgridTemplateTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendgridTemplateTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the explicit envelope or derives one from the message.
fn resolve_envelope(
    message: &Message,
    envelope: Option<&Envelope>,
) -> Result<Envelope, TransportError> {
    envelope.map_or_else(|| Envelope::from_message(message), |envelope| Ok(envelope.clone()))
}

/// Classifies a provider response, returning the message id on success.
///
/// # Errors
///
/// Returns [`TransportError::Send`] for any status other than 202. The message
/// joins the provider's `errors[*].message` entries with `; ` when the body
/// decodes as such, and falls back to the raw body text otherwise.
pub(crate) fn interpret_response(response: &HttpResponse) -> Result<Option<String>, TransportError> {
    let status = response.status();
    if status != ACCEPTED_STATUS {
        let detail = response
            .json()
            .ok()
            .and_then(|body| provider_error_messages(&body))
            .unwrap_or_else(|| response.text());
        return Err(TransportError::Send {
            message: format!("Unable to send an email: {detail} (code {status})."),
            status,
        });
    }
    Ok(response.header(MESSAGE_ID_HEADER).map(str::to_string))
}

/// Joins the `message` fields of a provider `errors` list.
fn provider_error_messages(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    let messages: Vec<&str> =
        errors.iter().filter_map(|error| error.get("message").and_then(Value::as_str)).collect();
    Some(messages.join("; "))
}
