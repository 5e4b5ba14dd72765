// crates/sendgrid-template-transport/tests/payload/content_tests.rs
// ============================================================================
// Module: Payload Content Tests
// Description: Body part ordering and the end-to-end payload shape.
// Purpose: Validate content entries and the exact JSON for a reference message.
// Dependencies: sendgrid-template-transport, serde_json
// ============================================================================

//! ## Overview
//! Exercises body handling of [`sendgrid_template_transport::build_payload`].

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
use sendgrid_template_transport::Message;
use serde_json::json;

use super::common::basic_builder;
use super::common::basic_message;
use super::common::payload_json;

// ============================================================================
// SECTION: Content Ordering
// ============================================================================

/// Tests text and html bodies appear text first.
#[test]
fn text_precedes_html() {
    let message = basic_builder().html("<p>hello</p>").text("hello").build();

    let json = payload_json(&message);

    assert_eq!(
        json["content"],
        json!([
            {"type": "text/plain", "value": "hello"},
            {"type": "text/html", "value": "<p>hello</p>"}
        ])
    );
}

/// Tests a message without bodies yields an empty content list.
#[test]
fn no_bodies_yield_empty_content() {
    let json = payload_json(&basic_message());

    assert_eq!(json["content"], json!([]));
}

/// Tests an html-only message yields a single html entry.
#[test]
fn html_only_yields_single_entry() {
    let message = basic_builder().html("<b>x</b>").build();

    let json = payload_json(&message);

    assert_eq!(json["content"], json!([{"type": "text/html", "value": "<b>x</b>"}]));
}

/// Tests the subject is carried on the personalization.
#[test]
fn subject_is_set_on_personalization() {
    let message = basic_builder().subject("Greetings").build();

    let json = payload_json(&message);

    assert_eq!(json["personalizations"][0]["subject"], json!("Greetings"));
}

// ============================================================================
// SECTION: End-to-End Shape
// ============================================================================

/// Tests the full payload for a reference message matches exactly.
#[test]
fn reference_message_payload_matches_exactly() {
    let message = Message::builder()
        .from(Address::with_name("foo@example.com", "Ms. Foo Bar"))
        .to(Address::with_name("bar@example.com", "Mr. Recipient"))
        .bcc("baz@example.com")
        .text("content")
        .build();

    let json = payload_json(&message);

    assert_eq!(
        json,
        json!({
            "personalizations": [{
                "to": [{"email": "bar@example.com", "name": "Mr. Recipient"}],
                "subject": null,
                "bcc": [{"email": "baz@example.com"}]
            }],
            "from": {"email": "foo@example.com", "name": "Ms. Foo Bar"},
            "content": [{"type": "text/plain", "value": "content"}]
        })
    );
}
