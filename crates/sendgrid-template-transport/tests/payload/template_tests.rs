// crates/sendgrid-template-transport/tests/payload/template_tests.rs
// ============================================================================
// Module: Payload Template Tests
// Description: Dynamic template id and data handling.
// Purpose: Validate template controls from headers and typed options.
// Dependencies: sendgrid-template-transport, serde_json
// ============================================================================

//! ## Overview
//! Exercises template handling of [`sendgrid_template_transport::build_payload`]
//! and [`sendgrid_template_transport::TemplateId`].

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

use sendgrid_template_transport::TemplateData;
use sendgrid_template_transport::TemplateId;
use sendgrid_template_transport::TransportError;
use sendgrid_template_transport::build_payload;
use serde_json::Value;
use serde_json::json;

use super::common::TEMPLATE_ID;
use super::common::basic_builder;
use super::common::envelope_for;
use super::common::payload_json;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a JSON object literal into template data.
fn data(value: &Value) -> TemplateData {
    value.as_object().cloned().expect("object")
}

// ============================================================================
// SECTION: Header Controls
// ============================================================================

/// Tests header template id and data populate the payload.
#[test]
fn header_template_id_and_data_populate_payload() {
    let message = basic_builder()
        .header("X-Template-ID", "d-0aac27809ad64ae98d5ebaf896ea8b33")
        .header("X-Dynamic-Template-Data", "{\"foo\":\"bar\"}")
        .build();

    let json = payload_json(&message);

    assert_eq!(json["template_id"], json!("d-0aac27809ad64ae98d5ebaf896ea8b33"));
    let personalizations = json["personalizations"].as_array().expect("array");
    assert!(!personalizations.is_empty());
    for personalization in personalizations {
        assert_eq!(personalization["dynamic_template_data"], json!({"foo": "bar"}));
    }
}

/// Tests a malformed header template id fails with the offending value.
#[test]
fn malformed_header_template_id_is_rejected() {
    let message = basic_builder().header("x-template-id", "d-abcd").build();

    let err = build_payload(&message, &envelope_for(&message)).expect_err("invalid id");

    assert_eq!(err, TransportError::Validation("Invalid TemplateID. Got: \"d-abcd\".".to_string()));
}

/// Tests non-object template data is rejected.
#[test]
fn non_object_template_data_is_rejected() {
    for raw in ["[1,2]", "not json", "\"text\""] {
        let message = basic_builder().header("X-Dynamic-Template-Data", raw).build();

        let err = build_payload(&message, &envelope_for(&message)).expect_err("invalid data");

        assert!(matches!(err, TransportError::Validation(_)), "{raw}");
        assert!(err.to_string().contains(raw), "{err}");
    }
}

/// Tests empty template data is not merged.
#[test]
fn empty_template_data_is_not_merged() {
    let message = basic_builder().header("X-Dynamic-Template-Data", "{}").build();

    let json = payload_json(&message);

    assert!(json["personalizations"][0].get("dynamic_template_data").is_none());
}

/// Tests template_id is omitted without a template.
#[test]
fn template_id_is_omitted_without_template() {
    let json = payload_json(&basic_builder().build());

    assert!(json.get("template_id").is_none());
}

// ============================================================================
// SECTION: Typed Options
// ============================================================================

/// Tests typed options produce the same payload as headers.
#[test]
fn typed_options_match_header_controls() {
    let typed = basic_builder()
        .template_id(TemplateId::parse(TEMPLATE_ID).expect("id"))
        .template_data(data(&json!({"name": "Ada"})))
        .sandbox_mode(true)
        .build();
    let headers = basic_builder()
        .header("X-Template-ID", TEMPLATE_ID)
        .header("X-Dynamic-Template-Data", "{\"name\":\"Ada\"}")
        .header("X-Sandbox-Mode", "1")
        .build();

    assert_eq!(payload_json(&typed), payload_json(&headers));
}

/// Tests typed options take precedence over header values.
#[test]
fn typed_options_override_headers() {
    let message = basic_builder()
        .header("X-Template-ID", "d-0aac27809ad64ae98d5ebaf896ea8b33")
        .header("X-Dynamic-Template-Data", "{\"source\":\"header\"}")
        .template_id(TemplateId::parse(TEMPLATE_ID).expect("id"))
        .template_data(data(&json!({"source": "typed"})))
        .build();

    let json = payload_json(&message);

    assert_eq!(json["template_id"], json!(TEMPLATE_ID));
    assert_eq!(json["personalizations"][0]["dynamic_template_data"], json!({"source": "typed"}));
}

// ============================================================================
// SECTION: Template Id Parsing
// ============================================================================

/// Tests template id validation boundaries.
#[test]
fn template_id_parse_boundaries() {
    assert!(TemplateId::parse(TEMPLATE_ID).is_ok());
    assert!("d-0aac27809ad64ae98d5ebaf896ea8b33".parse::<TemplateId>().is_ok());

    for invalid in [
        "",
        "d-",
        "d-0AAC27809AD64AE98D5EBAF896EA8B33",
        "x-0aac27809ad64ae98d5ebaf896ea8b33",
        "d-0aac27809ad64ae98d5ebaf896ea8b3",
        "d-0aac27809ad64ae98d5ebaf896ea8b333",
        "d-0aac27809ad64ae98d5ebaf896ea8b3-",
        " d-0aac27809ad64ae98d5ebaf896ea8b33",
    ] {
        let err = TemplateId::parse(invalid).expect_err(invalid);
        assert_eq!(err.to_string(), format!("Invalid TemplateID. Got: \"{invalid}\"."));
    }
}
