// crates/sendgrid-template-transport/src/template.rs
// ============================================================================
// Module: Dynamic Template Options
// Description: Typed template id, template data, and sandbox settings.
// Purpose: Validate template controls when a message is constructed.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! SendGrid dynamic templates are selected by a [`TemplateId`] and filled with
//! [`TemplateData`]. [`TemplateOptions`] carries both plus the sandbox flag on
//! the message itself, so the controls are validated at construction instead of
//! being discovered in header values at send time. The legacy
//! `X-Template-ID`, `X-Dynamic-Template-Data` and `X-Sandbox-Mode` headers are
//! still honored by [`crate::payload::build_payload`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Required prefix of dynamic template identifiers.
const TEMPLATE_ID_PREFIX: &str = "d-";
/// Number of characters following the prefix.
const TEMPLATE_ID_SUFFIX_LEN: usize = 32;

// ============================================================================
// SECTION: Template Data
// ============================================================================

/// Substitution data handed to a dynamic template.
pub type TemplateData = Map<String, Value>;

/// Parses a JSON document into template data.
///
/// # Errors
///
/// Returns [`TransportError::Validation`] when the text is not a JSON object.
pub fn parse_template_data(raw: &str) -> Result<TemplateData, TransportError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(TransportError::Validation(format!(
            "Invalid dynamic template data: expected a JSON object. Got: \"{raw}\"."
        ))),
        Err(err) => Err(TransportError::Validation(format!(
            "Invalid dynamic template data: {err}. Got: \"{raw}\"."
        ))),
    }
}

// ============================================================================
// SECTION: Template Id
// ============================================================================

/// Validated SendGrid dynamic template identifier.
///
/// # Invariants
/// - Matches `^d-[a-z0-9]{32}$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Validates and wraps a template identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Validation`] carrying the offending value when
    /// the identifier does not match `d-` followed by 32 lowercase alphanumerics.
    pub fn parse(value: &str) -> Result<Self, TransportError> {
        let valid = value.strip_prefix(TEMPLATE_ID_PREFIX).is_some_and(|suffix| {
            suffix.len() == TEMPLATE_ID_SUFFIX_LEN
                && suffix.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit())
        });
        if !valid {
            return Err(TransportError::Validation(format!(
                "Invalid TemplateID. Got: \"{value}\"."
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TemplateId {
    type Err = TransportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Template Options
// ============================================================================

/// Dynamic template controls attached to a message.
///
/// # Invariants
/// - `template_id` is always a validated identifier.
/// - Empty `data` is treated as absent when payloads are built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateOptions {
    /// Template to render.
    pub template_id: Option<TemplateId>,
    /// Substitutions merged into every personalization.
    pub data: Option<TemplateData>,
    /// Route the message through SendGrid sandbox mode.
    pub sandbox_mode: bool,
}

impl TemplateOptions {
    /// Returns options with values from `overrides` replacing those in `self`.
    ///
    /// Sandbox mode stays enabled when either side enables it.
    #[must_use]
    pub fn overlay(self, overrides: &Self) -> Self {
        Self {
            template_id: overrides.template_id.clone().or(self.template_id),
            data: overrides.data.clone().or(self.data),
            sandbox_mode: self.sandbox_mode || overrides.sandbox_mode,
        }
    }

    /// Returns the template data when it holds at least one entry.
    #[must_use]
    pub fn non_empty_data(&self) -> Option<&TemplateData> {
        self.data.as_ref().filter(|data| !data.is_empty())
    }
}
