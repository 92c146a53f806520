// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON codec behavior under configuration changes.
//!
//! Every test here touches or depends on the process-wide configuration, so
//! the whole suite is serialized and each mutating test restores defaults.

use serde_json::{json, Value};
use serial_test::serial;
use std::io;
use wirefault::params::{with_id, with_resource};
use wirefault::{catalog, configure, json, CodecError, Config, Fault, Param};

struct ResetConfig;

impl Drop for ResetConfig {
    fn drop(&mut self) {
        configure(|config| *config = Config::default());
    }
}

#[test]
#[serial]
fn round_trip_preserves_code_message_and_params() {
    let fault = Fault::new(
        &catalog::NOT_FOUND,
        [with_resource("User"), with_id("user-1")],
    );
    let wire = json::to_string(&fault).expect("encodes");
    let back = json::from_str(&wire).expect("decodes");
    assert_eq!(back.code(), fault.code());
    assert_eq!(back.message(), fault.message());
    assert_eq!(back.params().to_map(), fault.params().to_map());
}

#[test]
#[serial]
fn round_trip_never_preserves_stack_identity() {
    let fault = Fault::new(&catalog::NOT_FOUND, []);
    let original = fault.stack_trace().expect("captured by default").clone();
    let wire = json::to_string(&fault).expect("encodes");
    let back = json::from_str(&wire).expect("decodes");
    // Present because capture is enabled, but taken at the decode site.
    let fresh = back.stack_trace().expect("fresh capture");
    assert_ne!(original, *fresh);
}

#[test]
#[serial]
fn disabled_capture_leaves_decoded_errors_without_stacks() {
    let _reset = ResetConfig;
    configure(|config| config.collect_stack_trace = false);
    let fault = Fault::new(&catalog::NOT_FOUND, []);
    assert!(fault.stack_trace().is_none());
    let back = json::from_str(&json::to_string(&fault).expect("encodes")).expect("decodes");
    assert!(back.stack_trace().is_none());
}

#[test]
#[serial]
fn privacy_excludes_lowercase_params_from_output_only() {
    let fault = Fault::new(
        &catalog::NOT_FOUND,
        [with_resource("User"), Param::new("traceId", "t-9")],
    );
    let wire = json::encode(&fault).expect("encodes");
    assert!(wire.get("traceId").is_none());
    assert_eq!(wire["resource"], json!("User"));
    // Still observable through the in-process accessors.
    assert_eq!(fault.params().to_map()["traceId"], json!("t-9"));
}

#[test]
#[serial]
fn missing_mandatory_fields_fail_by_name() {
    match json::from_str(r#"{"message": "m"}"#) {
        Err(CodecError::MissingField { field }) => assert_eq!(field, "Code"),
        other => panic!("expected missing Code, got {other:?}"),
    }
    match json::from_str(r#"{"code": "NotFound"}"#) {
        Err(CodecError::MissingField { field }) => assert_eq!(field, "Message"),
        other => panic!("expected missing Message, got {other:?}"),
    }
}

#[test]
#[serial]
fn cause_is_gated_by_the_marshal_flag() {
    let _reset = ResetConfig;
    let db_err = io::Error::other("connection refused");
    let fault = Fault::wrap(db_err, &catalog::INTERNAL_ERROR, []);

    let wire = json::encode(&fault).expect("encodes");
    assert!(wire.get("cause").is_none());

    configure(|config| config.marshal_cause = true);
    let wire = json::encode(&fault).expect("encodes");
    assert_eq!(wire["cause"], json!("connection refused"));
}

#[test]
#[serial]
fn fault_causes_encode_recursively() {
    let _reset = ResetConfig;
    configure(|config| config.marshal_cause = true);

    let inner = Fault::new(&catalog::TIMEOUT, []);
    let outer = Fault::wrap(inner, &catalog::INTERNAL_ERROR, []);
    let wire = json::encode(&outer).expect("encodes");
    assert_eq!(wire["cause"]["code"], json!("Timeout"));
    assert_eq!(wire["cause"]["message"], json!("Timeout"));

    let back = json::decode(&wire).expect("decodes");
    let cause = back.cause().expect("cause");
    let nested = cause.downcast_ref::<Fault>().expect("nested fault");
    assert_eq!(nested.code().as_str(), "Timeout");
}

#[test]
#[serial]
fn unwrap_still_reaches_the_original_cause() {
    let db_err = io::Error::other("connection refused");
    let fault = Fault::wrap(db_err, &catalog::INTERNAL_ERROR, []);
    let source = std::error::Error::source(&fault).expect("source");
    assert_eq!(source.to_string(), "connection refused");
}

#[test]
#[serial]
fn stack_trace_emission_is_gated_and_bounded() {
    let _reset = ResetConfig;
    configure(|config| config.marshal_stack_trace = true);

    let fault = Fault::new(&catalog::NOT_FOUND, []);
    let wire = json::encode(&fault).expect("encodes");
    let frames = wire["stackTrace"].as_array().expect("frame list");
    assert!(!frames.is_empty());
    assert!(frames.len() <= wirefault::MAX_DEPTH);
    let first = frames[0].as_str().expect("rendered frame");
    // "<function> <file>:<line>" with a resolvable function up top.
    let function = first.split(' ').next().expect("function part");
    assert!(!function.is_empty());
    assert!(first.contains(':'));
}

#[test]
#[serial]
fn custom_key_casing_applies_to_both_directions() {
    let _reset = ResetConfig;
    configure(|config| {
        config.json_encode_key = std::sync::Arc::new(str::to_owned);
        config.json_decode_key = std::sync::Arc::new(str::to_owned);
    });
    let fault = Fault::new(&catalog::NOT_FOUND, [with_resource("User")]);
    let wire = json::encode(&fault).expect("encodes");
    assert_eq!(wire["Code"], json!("NotFound"));
    assert_eq!(wire["Resource"], json!("User"));
    let back = json::decode(&wire).expect("decodes");
    assert_eq!(back.params().to_map()["Resource"], json!("User"));
}

#[test]
#[serial]
fn registered_encoder_failures_name_the_field() {
    let _reset = ResetConfig;
    configure(|config| {
        config.json_encoders.insert(
            "Resource".to_owned(),
            std::sync::Arc::new(|_value: &Value| {
                Err(CodecError::WrongType {
                    field: "Resource".to_owned(),
                })
            }),
        );
    });
    let fault = Fault::new(&catalog::NOT_FOUND, [with_resource("User")]);
    match json::encode(&fault) {
        Err(CodecError::EncodeField { field, source }) => {
            assert_eq!(field, "Resource");
            assert_eq!(source.to_string(), "field Resource has the wrong type");
        }
        other => panic!("expected a field encode failure, got {other:?}"),
    }
}

#[test]
#[serial]
fn decoded_reserved_fields_do_not_leak_into_params() {
    let wire = json!({
        "code": "NotFound",
        "message": "User not found",
        "cause": "gone",
        "stackTrace": ["f a:1"],
        "resource": "User",
    });
    let back = json::decode(&wire).expect("decodes");
    let params = back.params().to_map();
    assert_eq!(params.len(), 1);
    assert_eq!(params["Resource"], json!("User"));
}
