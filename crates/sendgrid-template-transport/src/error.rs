// crates/sendgrid-template-transport/src/error.rs
// ============================================================================
// Module: Transport Errors
// Description: Error classification for payload building, delivery, and DSNs.
// Purpose: Give callers stable variants for programmatic handling.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`TransportError`] is the single error type returned by the payload builder,
//! the transport, and the factory. No variant is retried at this layer; each
//! failure is terminal for the attempt that produced it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Errors emitted by the SendGrid template transport.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - [`TransportError::Validation`] and [`TransportError::Internal`] are raised
///   before any network request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Caller-supplied input failed validation.
    #[error("{0}")]
    Validation(String),
    /// The message layer violated its contract (for example missing MIME headers).
    #[error("internal error: {0}")]
    Internal(String),
    /// The HTTP layer could not reach the provider.
    #[error("Could not reach the remote Sendgrid server ({endpoint}): {reason}")]
    Network {
        /// Endpoint that could not be reached (`host[:port]`).
        endpoint: String,
        /// Underlying transport fault.
        reason: String,
    },
    /// The provider answered with a non-success status.
    #[error("{message}")]
    Send {
        /// Rendered failure message, including the status code.
        message: String,
        /// HTTP status code returned by the provider.
        status: u16,
    },
    /// The DSN scheme is not handled by this factory.
    #[error(
        "The \"{scheme}\" scheme is not supported; supported schemes for mailer \"sendgrid\" are: \"{}\".",
        .supported.join("\", \"")
    )]
    UnsupportedScheme {
        /// Scheme found in the DSN.
        scheme: String,
        /// Schemes the factory accepts.
        supported: Vec<String>,
    },
    /// The DSN is missing a component required by the transport.
    #[error("Invalid \"{dsn}\" mailer DSN: {missing} is not set.")]
    IncompleteDsn {
        /// Scheme and host of the offending DSN (credentials omitted).
        dsn: String,
        /// Name of the missing component.
        missing: &'static str,
    },
    /// The DSN string could not be parsed.
    #[error("{0}")]
    InvalidDsn(String),
}

impl TransportError {
    /// Returns a stable label for the error kind, suitable for audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
            Self::Network {
                ..
            } => "network",
            Self::Send {
                ..
            } => "send",
            Self::UnsupportedScheme {
                ..
            } => "unsupported_scheme",
            Self::IncompleteDsn {
                ..
            } => "incomplete_dsn",
            Self::InvalidDsn(_) => "invalid_dsn",
        }
    }

    /// Returns the provider status code when the failure came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Send {
                status, ..
            } => Some(*status),
            _ => None,
        }
    }
}
