// crates/sendgrid-template-transport/tests/payload/attachment_tests.rs
// ============================================================================
// Module: Payload Attachment Tests
// Description: Attachment encoding and MIME header extraction.
// Purpose: Validate attachment objects and contract violations.
// Dependencies: sendgrid-template-transport, serde_json
// ============================================================================

//! ## Overview
//! Exercises attachment handling of [`sendgrid_template_transport::build_payload`].

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

use sendgrid_template_transport::Attachment;
use sendgrid_template_transport::HeaderList;
use sendgrid_template_transport::TransportError;
use sendgrid_template_transport::build_payload;
use serde_json::json;

use super::common::basic_builder;
use super::common::basic_message;
use super::common::envelope_for;
use super::common::payload_json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Body whose base64 encoding exceeds one 76-column line.
const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod";
/// Base64 of [`LOREM`] without line breaks.
const LOREM_BASE64: &str =
    "TG9yZW0gaXBzdW0gZG9sb3Igc2l0IGFtZXQsIGNvbnNlY3RldHVyIGFkaXBpc2NpbmcgZWxpdCwgc2VkIGRvIGVpdXNtb2Q=";

// ============================================================================
// SECTION: Described Attachments
// ============================================================================

/// Tests a plain attachment serializes with stripped base64 content.
#[test]
fn attachment_content_has_no_line_breaks() {
    let attachment = Attachment::new(LOREM.as_bytes(), "lorem.txt");
    assert!(attachment.body_to_string().contains("\r\n"));
    let message = basic_builder().attach(attachment).build();

    let json = payload_json(&message);

    assert_eq!(
        json["attachments"],
        json!([{
            "content": LOREM_BASE64,
            "type": "application/octet-stream",
            "filename": "lorem.txt",
            "disposition": "attachment"
        }])
    );
}

/// Tests inline attachments carry a content id equal to the filename.
#[test]
fn inline_attachment_has_content_id() {
    let attachment = Attachment::inline(b"\x89PNG".to_vec(), "logo.png").with_content_type("image/png");
    let message = basic_builder().attach(attachment).build();

    let json = payload_json(&message);
    let entry = &json["attachments"][0];

    assert_eq!(entry["type"], json!("image/png"));
    assert_eq!(entry["disposition"], json!("inline"));
    assert_eq!(entry["content_id"], json!("logo.png"));
}

/// Tests attachments are omitted when none exist.
#[test]
fn attachments_are_omitted_when_absent() {
    let json = payload_json(&basic_message());

    assert!(json.get("attachments").is_none());
}

/// Tests filenames with quotes survive header round-tripping.
#[test]
fn quoted_filename_is_preserved() {
    let attachment = Attachment::new(b"x".to_vec(), "the \"final\"; v2.txt");
    let message = basic_builder().attach(attachment).build();

    let json = payload_json(&message);

    assert_eq!(json["attachments"][0]["filename"], json!("the \"final\"; v2.txt"));
}

/// Tests filenames with backslashes survive header round-tripping.
#[test]
fn backslash_filenames_are_preserved() {
    for filename in ["report\\", "a\\\"b.txt", "dir\\sub\\c.txt"] {
        let message = basic_builder().attach(Attachment::new(b"x".to_vec(), filename)).build();

        let json = payload_json(&message);

        assert_eq!(json["attachments"][0]["filename"], json!(filename));
    }
}

/// Tests an inline part without a filename cannot produce a content id.
#[test]
fn inline_attachment_without_filename_is_internal_error() {
    let message = basic_builder().attach(Attachment::inline(b"x".to_vec(), "")).build();

    let err = build_payload(&message, &envelope_for(&message)).expect_err("empty inline filename");

    assert!(matches!(err, TransportError::Internal(_)));
}

/// Tests a plain attachment with an empty filename is still sent.
#[test]
fn plain_attachment_allows_empty_filename() {
    let message = basic_builder().attach(Attachment::new(b"x".to_vec(), "")).build();

    let json = payload_json(&message);

    assert_eq!(json["attachments"][0]["filename"], json!(""));
    assert!(json["attachments"][0].get("content_id").is_none());
}

// ============================================================================
// SECTION: Prepared Attachments
// ============================================================================

/// Tests prepared headers drive type, disposition, and filename.
#[test]
fn prepared_headers_are_read() {
    let headers: HeaderList = [
        ("Content-Type", "text/csv; charset=utf-8; name=report.csv"),
        ("Content-Disposition", "attachment; filename=\"report.csv\""),
    ]
    .into_iter()
    .collect();
    let message = basic_builder().attach(Attachment::from_prepared(b"a,b".to_vec(), headers)).build();

    let json = payload_json(&message);
    let entry = &json["attachments"][0];

    assert_eq!(entry["type"], json!("text/csv"));
    assert_eq!(entry["filename"], json!("report.csv"));
    assert_eq!(entry["content"], json!("YSxi"));
}

/// Tests missing Content-Disposition is an internal error.
#[test]
fn missing_disposition_is_internal_error() {
    let headers: HeaderList = [("Content-Type", "text/plain")].into_iter().collect();
    let message = basic_builder().attach(Attachment::from_prepared(b"x".to_vec(), headers)).build();

    let err = build_payload(&message, &envelope_for(&message)).expect_err("missing header");

    assert!(matches!(err, TransportError::Internal(_)));
}

/// Tests missing Content-Type is an internal error.
#[test]
fn missing_content_type_is_internal_error() {
    let headers: HeaderList =
        [("Content-Disposition", "attachment; filename=a.txt")].into_iter().collect();
    let message = basic_builder().attach(Attachment::from_prepared(b"x".to_vec(), headers)).build();

    let err = build_payload(&message, &envelope_for(&message)).expect_err("missing header");

    assert!(matches!(err, TransportError::Internal(_)));
}

/// Tests a disposition without filename is an internal error.
#[test]
fn missing_filename_is_internal_error() {
    let headers: HeaderList =
        [("Content-Type", "text/plain"), ("Content-Disposition", "attachment")].into_iter().collect();
    let message = basic_builder().attach(Attachment::from_prepared(b"x".to_vec(), headers)).build();

    let err = build_payload(&message, &envelope_for(&message)).expect_err("missing filename");

    assert!(matches!(err, TransportError::Internal(_)));
}
