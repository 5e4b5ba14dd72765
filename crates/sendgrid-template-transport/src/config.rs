// crates/sendgrid-template-transport/src/config.rs
// ============================================================================
// Module: Transport Configuration
// Description: TOML configuration loading and validation.
// Purpose: Provide strict, fail-closed wiring of DSN, HTTP client, and audit sink.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is read from a TOML file with size and path limits. The path
//! comes from the caller, then `SENDGRID_TEMPLATE_CONFIG`, then
//! `sendgrid-template.toml`. `MAILER_DSN` overrides `transport.dsn` so API keys
//! can stay out of files. Invalid configuration fails closed.
//!
//! ```toml
//! [transport]
//! dsn = "sendgrid+template://KEY@default"
//! timeout_ms = 30000
//!
//! [audit]
//! sink = "file"
//! path = "mail-audit.jsonl"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::dsn::Dsn;
use crate::error::TransportError;
use crate::factory::SendgridTemplateTransportFactory;
use crate::http::HttpClientSettings;
use crate::http::ReqwestHttpClient;
use crate::transport::SendgridTemplateTransport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sendgrid-template.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SENDGRID_TEMPLATE_CONFIG";
/// Environment variable used to override the transport DSN.
pub const DSN_ENV_VAR: &str = "MAILER_DSN";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum DSN length.
const MAX_DSN_LENGTH: usize = 2048;
/// Maximum user agent length.
const MAX_USER_AGENT_LENGTH: usize = 256;
/// Minimum request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// The configured DSN cannot produce a transport.
    #[error("invalid config: {0}")]
    Transport(#[from] TransportError),
}

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendgridTemplateConfig {
    /// Transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Audit logging settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Mailer DSN, e.g. `sendgrid+template://KEY@default`.
    #[serde(default)]
    pub dsn: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent for outbound requests.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

/// Default request timeout for serde.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    None,
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// Audit logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path, required for [`AuditSinkKind::File`].
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl SendgridTemplateConfig {
    /// Loads and validates configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.apply_dsn_override(env::var(DSN_ENV_VAR).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Replaces the DSN with a non-empty override.
    pub fn apply_dsn_override(&mut self, dsn: Option<String>) {
        if let Some(dsn) = dsn.filter(|dsn| !dsn.trim().is_empty()) {
            self.transport.dsn = dsn;
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transport.validate()?;
        self.audit.validate()
    }

    /// Returns the parsed DSN.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Transport`] when the DSN does not parse.
    pub fn dsn(&self) -> Result<Dsn, ConfigError> {
        Ok(self.transport.dsn.parse::<Dsn>()?)
    }

    /// Returns the HTTP client settings.
    #[must_use]
    pub fn http_settings(&self) -> HttpClientSettings {
        let defaults = HttpClientSettings::default();
        HttpClientSettings {
            timeout: Duration::from_millis(self.transport.timeout_ms),
            user_agent: self.transport.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Arc<dyn AuditSink>, ConfigError> {
        match (self.audit.sink, &self.audit.path) {
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => FileAuditSink::new(path)
                .map(|sink| Arc::new(sink) as Arc<dyn AuditSink>)
                .map_err(|err| ConfigError::Io(err.to_string())),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
        }
    }

    /// Builds a transport wired with the configured client and audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the DSN is unusable, the HTTP client cannot
    /// be built, or the audit sink cannot be opened.
    pub fn build_transport(&self) -> Result<SendgridTemplateTransport, ConfigError> {
        let dsn = self.dsn()?;
        let client = ReqwestHttpClient::new(&self.http_settings())
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        let factory = SendgridTemplateTransportFactory::new(Arc::new(client))
            .with_audit_sink(self.audit_sink()?);
        Ok(factory.create(&dsn)?)
    }
}

impl TransportConfig {
    /// Validates transport settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let dsn = self.dsn.trim();
        if dsn.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "transport.dsn must be set (or provide {DSN_ENV_VAR})"
            )));
        }
        if dsn.len() > MAX_DSN_LENGTH {
            return Err(ConfigError::Invalid("transport.dsn exceeds max length".to_string()));
        }
        let parsed = dsn.parse::<Dsn>()?;
        SendgridTemplateTransportFactory::validate(&parsed)?;
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "transport.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if let Some(user_agent) = &self.user_agent
            && (user_agent.trim().is_empty() || user_agent.len() > MAX_USER_AGENT_LENGTH)
        {
            return Err(ConfigError::Invalid(
                "transport.user_agent must be non-empty and at most 256 bytes".to_string(),
            ));
        }
        Ok(())
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path(path),
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with the file sink".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid("path must be non-empty".to_string()));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}
