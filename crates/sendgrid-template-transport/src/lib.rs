// crates/sendgrid-template-transport/src/lib.rs
// ============================================================================
// Module: SendGrid Template Transport Library
// Description: Mail transport adapter for the SendGrid v3 Mail Send API.
// Purpose: Translate messages into provider payloads and deliver them over HTTPS.
// Dependencies: base64, reqwest, serde, serde_json, thiserror, toml, url
// ============================================================================

//! ## Overview
//! `sendgrid-template-transport` converts an in-memory [`Message`] plus its
//! delivery [`Envelope`] into the JSON [`Payload`] accepted by the SendGrid
//! Mail Send endpoint, submits it through an [`HttpClient`], and maps the
//! provider response into a [`SentMessage`] or a [`TransportError`].
//! Transports are created directly or from a `sendgrid+template://` [`Dsn`] via
//! [`SendgridTemplateTransportFactory`].
//! Invariants:
//! - Payload sender and recipients always come from the envelope.
//! - Validation failures surface before any network request is issued.
//! - HTTP 202 is the only success status.
//! - Transports hold no per-call mutable state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod dsn;
pub mod error;
pub mod factory;
pub mod http;
pub mod mime;
pub mod payload;
pub mod template;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::MailAuditEvent;
pub use audit::MailAuditEventParams;
pub use audit::NoopAuditSink;
pub use audit::SendOutcome;
pub use audit::StderrAuditSink;
pub use config::AuditConfig;
pub use config::AuditSinkKind;
pub use config::ConfigError;
pub use config::SendgridTemplateConfig;
pub use config::TransportConfig;
pub use dsn::Dsn;
pub use error::TransportError;
pub use factory::SendgridTemplateTransportFactory;
pub use http::HttpClient;
pub use http::HttpClientError;
pub use http::HttpClientSettings;
pub use http::HttpRequest;
pub use http::HttpResponse;
pub use http::ReqwestHttpClient;
pub use mime::Address;
pub use mime::Attachment;
pub use mime::Disposition;
pub use mime::Envelope;
pub use mime::HeaderList;
pub use mime::Message;
pub use mime::MessageBuilder;
pub use payload::Payload;
pub use payload::build_payload;
pub use template::TemplateData;
pub use template::TemplateId;
pub use template::TemplateOptions;
pub use transport::SendgridTemplateTransport;
pub use transport::SentMessage;
