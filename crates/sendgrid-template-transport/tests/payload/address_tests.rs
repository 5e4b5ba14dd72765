// crates/sendgrid-template-transport/tests/payload/address_tests.rs
// ============================================================================
// Module: Payload Address Tests
// Description: Sender, recipient, and reply-to placement in payloads.
// Purpose: Validate that envelopes drive from/to and cc/bcc are kept apart.
// Dependencies: sendgrid-template-transport, serde_json
// ============================================================================

//! ## Overview
//! Exercises address handling of [`sendgrid_template_transport::build_payload`].

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

use sendgrid_template_transport::Address;
use sendgrid_template_transport::Envelope;
use sendgrid_template_transport::Message;
use sendgrid_template_transport::TransportError;
use sendgrid_template_transport::build_payload;
use serde_json::json;

use super::common::basic_builder;
use super::common::basic_message;
use super::common::payload_json;

// ============================================================================
// SECTION: Envelope Precedence
// ============================================================================

/// Tests envelope sender and recipients populate from and to.
#[test]
fn envelope_overrides_message_addresses() {
    let message = basic_message();
    let envelope = Envelope::new(
        Address::with_name("bounce@example.net", "Bounces"),
        vec![Address::new("rerouted@example.net")],
    )
    .expect("envelope");

    let json = build_payload(&message, &envelope).expect("payload").to_json().expect("json");

    assert_eq!(json["from"], json!({"email": "bounce@example.net", "name": "Bounces"}));
    assert_eq!(json["personalizations"][0]["to"], json!([{"email": "rerouted@example.net"}]));
}

/// Tests the explicit message sender wins over the first from address.
#[test]
fn derived_envelope_prefers_sender() {
    let message = basic_builder().sender("return@example.com").build();

    let json = payload_json(&message);

    assert_eq!(json["from"], json!({"email": "return@example.com"}));
}

/// Tests display names are omitted when empty.
#[test]
fn empty_display_name_is_omitted() {
    let message = Message::builder()
        .from(Address::with_name("sender@example.com", ""))
        .to(Address::with_name("recipient@example.com", "Recipient"))
        .build();

    let json = payload_json(&message);

    assert_eq!(json["from"], json!({"email": "sender@example.com"}));
    assert_eq!(
        json["personalizations"][0]["to"],
        json!([{"email": "recipient@example.com", "name": "Recipient"}])
    );
}

// ============================================================================
// SECTION: Copy Recipients
// ============================================================================

/// Tests cc and bcc recipients are listed separately from to.
#[test]
fn cc_and_bcc_are_excluded_from_to() {
    let message = basic_builder().cc("copy@example.com").bcc("blind@example.com").build();

    let json = payload_json(&message);
    let personalization = &json["personalizations"][0];

    assert_eq!(personalization["to"], json!([{"email": "recipient@example.com"}]));
    assert_eq!(personalization["cc"], json!([{"email": "copy@example.com"}]));
    assert_eq!(personalization["bcc"], json!([{"email": "blind@example.com"}]));
}

/// Tests absent cc and bcc lists are omitted entirely.
#[test]
fn missing_cc_and_bcc_are_omitted() {
    let json = payload_json(&basic_message());
    let personalization = json["personalizations"][0].as_object().expect("object");

    assert!(!personalization.contains_key("cc"));
    assert!(!personalization.contains_key("bcc"));
    assert_eq!(personalization["subject"], json!(null));
}

/// Tests a build fails when every recipient is a copy recipient.
#[test]
fn only_copy_recipients_is_validation_error() {
    let message =
        Message::builder().from("sender@example.com").bcc("blind@example.com").build();

    let envelope = Envelope::from_message(&message).expect("envelope");
    let err = build_payload(&message, &envelope).expect_err("no to recipient");

    assert!(matches!(err, TransportError::Validation(_)));
}

// ============================================================================
// SECTION: Reply-To
// ============================================================================

/// Tests only the first reply-to address is kept.
#[test]
fn reply_to_keeps_first_address() {
    let message = basic_builder()
        .reply_to(Address::with_name("first@example.com", "First"))
        .reply_to("second@example.com")
        .build();

    let json = payload_json(&message);

    assert_eq!(json["reply_to"], json!({"email": "first@example.com", "name": "First"}));
}

/// Tests reply_to is omitted when absent.
#[test]
fn reply_to_is_omitted_when_absent() {
    let json = payload_json(&basic_message());

    assert!(json.get("reply_to").is_none());
}

// ============================================================================
// SECTION: Address Parsing
// ============================================================================

/// Tests named and bare address forms parse.
#[test]
fn address_parses_named_and_bare_forms() {
    let named: Address = "\"Ms. Foo Bar\" <foo@example.com>".parse().expect("named");
    let bare: Address = "foo@example.com".parse().expect("bare");

    assert_eq!(named.email(), "foo@example.com");
    assert_eq!(named.name(), Some("Ms. Foo Bar"));
    assert_eq!(bare.name(), None);
    assert_eq!(named, bare);
}

/// Tests malformed addresses are rejected.
#[test]
fn address_rejects_malformed_input() {
    let err = "Foo <not-an-address>".parse::<Address>().expect_err("invalid");

    assert_eq!(err.to_string(), "Invalid address: \"Foo <not-an-address>\".");
}

/// Tests envelopes require at least one recipient.
#[test]
fn envelope_requires_recipients() {
    let err = Envelope::new(Address::new("sender@example.com"), Vec::new()).expect_err("empty");

    assert!(matches!(err, TransportError::Validation(_)));
}

/// Tests envelope derivation fails without a sender.
#[test]
fn derived_envelope_requires_sender() {
    let message = Message::builder().to("recipient@example.com").build();

    let err = Envelope::from_message(&message).expect_err("no sender");

    assert_eq!(err.to_string(), "Cannot send message without a sender address.");
}
