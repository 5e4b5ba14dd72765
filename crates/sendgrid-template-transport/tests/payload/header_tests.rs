// crates/sendgrid-template-transport/tests/payload/header_tests.rs
// ============================================================================
// Module: Payload Header Tests
// Description: Reserved, control, and passthrough header handling.
// Purpose: Validate header dispatch into the payload.
// Dependencies: sendgrid-template-transport, serde_json
// ============================================================================

//! ## Overview
//! Exercises header dispatch of [`sendgrid_template_transport::build_payload`].

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use sendgrid_template_transport::payload::HeaderRule;
use serde_json::json;

use super::common::basic_builder;
use super::common::basic_message;
use super::common::payload_json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header names the provider must never receive, in mixed case.
const RESERVED: &[&str] = &[
    "X-SG-ID",
    "x-sg-eid",
    "Received",
    "DKIM-Signature",
    "Content-Transfer-Encoding",
    "From",
    "TO",
    "Cc",
    "bcc",
    "Subject",
    "Content-Type",
    "Reply-To",
];

// ============================================================================
// SECTION: Reserved Headers
// ============================================================================

/// Tests reserved headers are dropped regardless of case.
#[test]
fn reserved_headers_are_never_forwarded() {
    let mut builder = basic_builder();
    for name in RESERVED {
        builder = builder.header(*name, "ignored");
    }
    let message = builder.build();

    let json = payload_json(&message);

    assert!(json.get("headers").is_none(), "unexpected headers: {}", json["headers"]);
}

/// Tests every reserved name maps to the bypass rule.
#[test]
fn reserved_names_map_to_bypass_rule() {
    for name in RESERVED {
        assert_eq!(HeaderRule::for_name(&name.to_ascii_lowercase()), HeaderRule::Bypass, "{name}");
    }
    assert_eq!(HeaderRule::for_name("x-custom"), HeaderRule::PassThrough);
}

// ============================================================================
// SECTION: Passthrough Headers
// ============================================================================

/// Tests custom headers are forwarded under lower-cased names.
#[test]
fn custom_headers_are_forwarded_lowercased() {
    let message = basic_builder()
        .header("X-Campaign", "spring")
        .header("List-Unsubscribe", "<mailto:unsub@example.com>")
        .build();

    let json = payload_json(&message);

    assert_eq!(
        json["headers"],
        json!({"x-campaign": "spring", "list-unsubscribe": "<mailto:unsub@example.com>"})
    );
}

/// Tests a later duplicate header wins.
#[test]
fn later_duplicate_header_wins() {
    let message = basic_builder().header("X-Tag", "one").header("x-tag", "two").build();

    let json = payload_json(&message);

    assert_eq!(json["headers"], json!({"x-tag": "two"}));
}

/// Tests control headers are consumed, not forwarded.
#[test]
fn control_headers_are_not_forwarded() {
    let message = basic_builder()
        .header("X-Template-ID", "d-0aac27809ad64ae98d5ebaf896ea8b33")
        .header("X-Dynamic-Template-Data", "{\"a\":1}")
        .header("X-Sandbox-Mode", "")
        .build();

    let json = payload_json(&message);

    assert!(json.get("headers").is_none());
}

// ============================================================================
// SECTION: Sandbox Mode
// ============================================================================

/// Tests sandbox header presence enables sandbox mode.
#[test]
fn sandbox_header_enables_sandbox_mode() {
    for value in ["", "true", "false"] {
        let message = basic_builder().header("X-Sandbox-Mode", value).build();

        let json = payload_json(&message);

        assert_eq!(json["mail_settings"], json!({"sandbox_mode": {"enable": true}}), "{value}");
    }
}

/// Tests absence of sandbox controls omits mail settings.
#[test]
fn no_sandbox_header_omits_mail_settings() {
    let json = payload_json(&basic_message());

    assert!(json.get("mail_settings").is_none());
}

/// Tests the typed sandbox flag enables sandbox mode.
#[test]
fn typed_sandbox_flag_enables_sandbox_mode() {
    let message = basic_builder().sandbox_mode(true).build();

    let json = payload_json(&message);

    assert_eq!(json["mail_settings"]["sandbox_mode"]["enable"], json!(true));
}
