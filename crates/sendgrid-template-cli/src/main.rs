// crates/sendgrid-template-cli/src/main.rs
// ============================================================================
// Module: SendGrid Template CLI Entry Point
// Description: Command dispatcher for previewing and sending template mail.
// Purpose: Build messages from flags and drive the SendGrid template transport.
// Dependencies: clap, sendgrid-template-transport, serde_json, thiserror.
// ============================================================================

//! ## Overview
//! `sendgrid-template` assembles a message from command-line flags and either
//! prints the Mail Send payload it would produce (`preview`), delivers it
//! through the configured transport (`send`), or validates configuration
//! (`check-config`). Inputs are untrusted: addresses, template ids and template
//! data are validated before any request, and attachment reads are bounded.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use sendgrid_template_transport::Address;
use sendgrid_template_transport::Attachment;
use sendgrid_template_transport::Envelope;
use sendgrid_template_transport::Message;
use sendgrid_template_transport::SendgridTemplateConfig;
use sendgrid_template_transport::TemplateId;
use sendgrid_template_transport::build_payload;
use sendgrid_template_transport::template::parse_template_data;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a single attachment file.
const MAX_ATTACHMENT_BYTES: usize = 20 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sendgrid-template", disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to sendgrid-template.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the Mail Send payload for a message without sending it.
    Preview(MessageArgs),
    /// Send a message through the configured transport.
    Send(MessageArgs),
    /// Validate the configuration and print the transport identity.
    CheckConfig,
}

/// Message assembly flags shared by `preview` and `send`.
#[derive(Args, Debug, Default)]
struct MessageArgs {
    /// From address (`email` or `Name <email>`); repeatable.
    #[arg(long, value_name = "ADDRESS")]
    from: Vec<String>,
    /// Explicit sender address used for the envelope.
    #[arg(long, value_name = "ADDRESS")]
    sender: Option<String>,
    /// Recipient address; repeatable.
    #[arg(long, value_name = "ADDRESS")]
    to: Vec<String>,
    /// Carbon copy address; repeatable.
    #[arg(long, value_name = "ADDRESS")]
    cc: Vec<String>,
    /// Blind carbon copy address; repeatable.
    #[arg(long, value_name = "ADDRESS")]
    bcc: Vec<String>,
    /// Reply-to address; only the first is delivered.
    #[arg(long = "reply-to", value_name = "ADDRESS")]
    reply_to: Vec<String>,
    /// Subject line.
    #[arg(long)]
    subject: Option<String>,
    /// Plain-text body.
    #[arg(long)]
    text: Option<String>,
    /// HTML body.
    #[arg(long)]
    html: Option<String>,
    /// File to attach; repeatable.
    #[arg(long, value_name = "PATH")]
    attach: Vec<PathBuf>,
    /// File to embed inline (content id = file name); repeatable.
    #[arg(long, value_name = "PATH")]
    inline: Vec<PathBuf>,
    /// Custom header as `Name: value`; repeatable.
    #[arg(long, value_name = "HEADER")]
    header: Vec<String>,
    /// Dynamic template id (`d-` followed by 32 lowercase alphanumerics).
    #[arg(long = "template-id", value_name = "ID")]
    template_id: Option<String>,
    /// Dynamic template data as a JSON object.
    #[arg(long = "template-data", value_name = "JSON")]
    template_data: Option<String>,
    /// Enable SendGrid sandbox mode.
    #[arg(long, action = ArgAction::SetTrue)]
    sandbox: bool,
    /// Envelope sender overriding the message-derived one.
    #[arg(long = "envelope-from", value_name = "ADDRESS")]
    envelope_from: Option<String>,
    /// Envelope recipient overriding the message-derived list; repeatable.
    #[arg(long = "envelope-to", value_name = "ADDRESS")]
    envelope_to: Vec<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<sendgrid_template_transport::TransportError> for CliError {
    fn from(err: sendgrid_template_transport::TransportError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<sendgrid_template_transport::ConfigError> for CliError {
    fn from(err: sendgrid_template_transport::ConfigError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => command_preview(&args),
        Commands::Send(args) => command_send(cli.config.as_deref(), &args),
        Commands::CheckConfig => command_check_config(cli.config.as_deref()),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Prints the payload for a message.
fn command_preview(args: &MessageArgs) -> CliResult<ExitCode> {
    let message = build_message(args)?;
    let envelope = resolve_envelope(args, &message)?;
    let payload = build_payload(&message, &envelope)?;
    let rendered = serde_json::to_string_pretty(&payload)
        .map_err(|err| CliError::new(format!("failed to render payload: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

/// Sends a message through the configured transport.
fn command_send(config_path: Option<&Path>, args: &MessageArgs) -> CliResult<ExitCode> {
    let config = SendgridTemplateConfig::load(config_path)?;
    let transport = config.build_transport()?;
    let message = build_message(args)?;
    let envelope = resolve_envelope(args, &message)?;
    let sent = transport.send(&message, Some(&envelope))?;
    let summary = json!({
        "transport": transport.to_string(),
        "message_id": sent.message_id(),
        "status": sent.status(),
    });
    write_stdout_line(&summary.to_string()).map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

/// Validates configuration and prints the transport identity.
fn command_check_config(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let config = SendgridTemplateConfig::load(config_path)?;
    let transport = config.build_transport()?;
    write_stdout_line(&format!("config ok: {transport}"))
        .map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Message Assembly
// ============================================================================

/// Builds a message from command-line flags.
fn build_message(args: &MessageArgs) -> CliResult<Message> {
    let mut builder = Message::builder();
    for raw in &args.from {
        builder = builder.from(parse_address(raw)?);
    }
    if let Some(raw) = &args.sender {
        builder = builder.sender(parse_address(raw)?);
    }
    for raw in &args.to {
        builder = builder.to(parse_address(raw)?);
    }
    for raw in &args.cc {
        builder = builder.cc(parse_address(raw)?);
    }
    for raw in &args.bcc {
        builder = builder.bcc(parse_address(raw)?);
    }
    for raw in &args.reply_to {
        builder = builder.reply_to(parse_address(raw)?);
    }
    if let Some(subject) = &args.subject {
        builder = builder.subject(subject.clone());
    }
    if let Some(text) = &args.text {
        builder = builder.text(text.clone());
    }
    if let Some(html) = &args.html {
        builder = builder.html(html.clone());
    }
    for path in &args.attach {
        let (body, filename) = read_attachment(path)?;
        builder = builder.attach(Attachment::new(body, filename));
    }
    for path in &args.inline {
        let (body, filename) = read_attachment(path)?;
        builder = builder.attach(Attachment::inline(body, filename));
    }
    for raw in &args.header {
        let (name, value) = parse_header(raw)?;
        builder = builder.header(name, value);
    }
    if let Some(raw) = &args.template_id {
        builder = builder.template_id(TemplateId::parse(raw)?);
    }
    if let Some(raw) = &args.template_data {
        builder = builder.template_data(parse_template_data(raw)?);
    }
    Ok(builder.sandbox_mode(args.sandbox).build())
}

/// Resolves the delivery envelope from overrides or the message.
fn resolve_envelope(args: &MessageArgs, message: &Message) -> CliResult<Envelope> {
    if args.envelope_from.is_none() && args.envelope_to.is_empty() {
        return Ok(Envelope::from_message(message)?);
    }
    let sender = match &args.envelope_from {
        Some(raw) => parse_address(raw)?,
        None => Envelope::from_message(message)?.sender().clone(),
    };
    let recipients = if args.envelope_to.is_empty() {
        Envelope::from_message(message)?.recipients().to_vec()
    } else {
        args.envelope_to.iter().map(|raw| parse_address(raw)).collect::<CliResult<Vec<_>>>()?
    };
    Ok(Envelope::new(sender, recipients)?)
}

/// Parses an address flag.
fn parse_address(raw: &str) -> CliResult<Address> {
    Ok(raw.parse::<Address>()?)
}

/// Splits a `Name: value` header flag.
fn parse_header(raw: &str) -> CliResult<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::new(format!("invalid header \"{raw}\": expected `Name: value`")))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(CliError::new(format!("invalid header name in \"{raw}\"")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Reads an attachment file and returns its bytes and file name.
fn read_attachment(path: &Path) -> CliResult<(Vec<u8>, String)> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::new(format!("attachment path has no file name: {}", path.display())))?;
    let body = read_bytes_with_limit(path, MAX_ATTACHMENT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read attachment {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "attachment {} is {size} bytes; limit is {limit} bytes",
            path.display()
        )),
    })?;
    Ok((body, filename))
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write to {stream}: {error}"))
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
