// crates/sendgrid-template-transport/src/factory.rs
// ============================================================================
// Module: Transport Factory
// Description: DSN-driven construction of SendGrid template transports.
// Purpose: Validate the scheme and credentials, then configure a transport.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`SendgridTemplateTransportFactory`] recognizes the `sendgrid+template`
//! scheme. The DSN user is the API key, a host of `default` selects the public
//! API host, and the port is passed through unchanged. Every transport the
//! factory creates shares its HTTP client and audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::audit::AuditSink;
use crate::audit::NoopAuditSink;
use crate::dsn::Dsn;
use crate::error::TransportError;
use crate::http::HttpClient;
use crate::transport::SCHEME;
use crate::transport::SendgridTemplateTransport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schemes handled by this factory.
const SUPPORTED_SCHEMES: &[&str] = &[SCHEME];
/// Host sentinel meaning "use the built-in host".
const DEFAULT_HOST_SENTINEL: &str = "default";

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Creates [`SendgridTemplateTransport`] values from DSNs.
pub struct SendgridTemplateTransportFactory {
    /// HTTP client shared by created transports.
    client: Arc<dyn HttpClient>,
    /// Audit sink shared by created transports.
    audit: Arc<dyn AuditSink>,
}

impl SendgridTemplateTransportFactory {
    /// Creates a factory without audit logging.
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Sets the audit sink handed to created transports.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the schemes this factory handles.
    #[must_use]
    pub const fn supported_schemes() -> &'static [&'static str] {
        SUPPORTED_SCHEMES
    }

    /// Returns true when the DSN scheme is handled by this factory.
    #[must_use]
    pub fn supports(dsn: &Dsn) -> bool {
        SUPPORTED_SCHEMES.contains(&dsn.scheme())
    }

    /// Checks that a DSN can produce a transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnsupportedScheme`] for unknown schemes and
    /// [`TransportError::IncompleteDsn`] when the API key is missing.
    pub fn validate(dsn: &Dsn) -> Result<(), TransportError> {
        if !Self::supports(dsn) {
            return Err(TransportError::UnsupportedScheme {
                scheme: dsn.scheme().to_string(),
                supported: SUPPORTED_SCHEMES.iter().map(ToString::to_string).collect(),
            });
        }
        if dsn.user().is_none() {
            return Err(TransportError::IncompleteDsn {
                dsn: dsn.redacted(),
                missing: "user",
            });
        }
        Ok(())
    }

    /// Creates a configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::UnsupportedScheme`] for unknown schemes and
    /// [`TransportError::IncompleteDsn`] when the API key is missing.
    pub fn create(&self, dsn: &Dsn) -> Result<SendgridTemplateTransport, TransportError> {
        Self::validate(dsn)?;
        let key = dsn.user().unwrap_or_default();
        let host = (dsn.host() != DEFAULT_HOST_SENTINEL).then(|| dsn.host().to_string());
        Ok(SendgridTemplateTransport::new(key, Arc::clone(&self.client))
            .with_host(host)
            .with_port(dsn.port())
            .with_audit_sink(Arc::clone(&self.audit)))
    }
}
