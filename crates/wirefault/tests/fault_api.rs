// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public-surface behavior of the error value and the param-extension
//! convention.

use serde_json::json;
use std::io;
use wirefault::params::{
    get_id, get_precondition, get_reason, get_resource, get_validation_errors, with_id,
    with_precondition, with_reason, with_resource, with_validation_errors,
};
use wirefault::{catalog, Fault, FieldRef, Param, Template, KEY_CODE, KEY_MESSAGE};

#[test]
fn new_always_carries_the_template_code() {
    for template in [
        &*catalog::NOT_FOUND,
        &*catalog::TIMEOUT,
        &*catalog::INTERNAL_ERROR,
        &*catalog::VALIDATION_ERROR,
    ] {
        let fault = Fault::new(template, [with_id("x")]);
        assert_eq!(fault.code(), template.code());
    }
}

#[test]
fn is_compares_codes_not_identity() {
    let fault = Fault::new(&catalog::NOT_FOUND, []);
    let same_code = Template::new("NotFound", "elsewhere");
    let other_code = Template::new("SomethingElse", "elsewhere");
    assert!(Fault::is(&fault, &same_code));
    assert!(!Fault::is(&fault, &other_code));
}

#[test]
fn accessors_return_present_params() {
    let fault = Fault::new(
        &catalog::VALIDATION_ERROR,
        [
            with_id("user-1"),
            with_resource("User"),
            with_reason("bad input"),
            with_precondition("If-Match"),
            with_validation_errors([("field1", "required"), ("field2", "too long")]),
        ],
    );
    assert_eq!(get_id(&fault).as_deref(), Some("user-1"));
    assert_eq!(get_resource(&fault).as_deref(), Some("User"));
    assert_eq!(get_reason(&fault).as_deref(), Some("bad input"));
    assert_eq!(get_precondition(&fault).as_deref(), Some("If-Match"));
    let errors = get_validation_errors(&fault).expect("map retained");
    assert_eq!(errors["field1"], "required");
    assert_eq!(errors["field2"], "too long");
}

#[test]
fn accessors_return_none_when_absent_or_mistyped() {
    let fault = Fault::new(&catalog::NOT_FOUND, [Param::new("Id", 7)]);
    // Present but not a string.
    assert_eq!(get_id(&fault), None);
    // Absent entirely.
    assert_eq!(get_precondition(&fault), None);
    assert_eq!(get_validation_errors(&fault), None);
}

#[test]
fn display_is_the_message_alone() {
    let fault = Fault::new(&catalog::NOT_FOUND, [with_resource("Order")]);
    assert_eq!(fault.to_string(), "Order not found");
    assert!(!fault.to_string().contains("NotFound"));
}

#[test]
fn wrap_builds_a_walkable_chain() {
    let root = io::Error::other("disk on fire");
    let mid = Fault::wrap(root, &catalog::TIMEOUT, []);
    let outer = Fault::wrap(mid, &catalog::INTERNAL_ERROR, []);

    let mut depth = 0;
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(&outer);
    let mut last = String::new();
    while let Some(error) = current {
        last = error.to_string();
        current = error.source();
        depth += 1;
    }
    assert_eq!(depth, 3);
    assert_eq!(last, "disk on fire");
}

#[test]
fn get_reserves_the_fixed_keys() {
    let fault = Fault::new(
        &catalog::NOT_FOUND,
        [Param::new("Message", "impostor"), with_resource("User")],
    );
    match fault.get(KEY_MESSAGE) {
        Some(FieldRef::Message(message)) => assert_eq!(message, "User not found"),
        other => panic!("expected the reserved message, got {other:?}"),
    }
    match fault.get(KEY_CODE) {
        Some(FieldRef::Code(code)) => assert_eq!(code.as_str(), "NotFound"),
        other => panic!("expected the reserved code, got {other:?}"),
    }
    // The shadowed param is still visible through the params snapshot.
    assert_eq!(fault.params().to_map()["Message"], json!("impostor"));
}

#[test]
fn params_snapshot_is_the_merged_bag() {
    let template = Template::new("Labelled", "{Label}").with_defaults([Param::new("Label", "d")]);
    let fault = Fault::new(&template, [Param::new("Label", "caller"), with_id("i-1")]);
    let map = fault.params().to_map();
    assert_eq!(map.len(), 2);
    assert_eq!(map["Label"], json!("caller"));
    assert_eq!(map["Id"], json!("i-1"));
}
