// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP status mapping for [`wirefault`] errors.
//!
//! This crate consumes only the core's public accessors and the
//! param-extension convention: the `httpStatus` param carries an explicit
//! status override, and [`status`] falls back to a per-code default for the
//! built-in catalog. Call [`register`] once at startup to teach the core
//! codecs how to (de)serialize the `httpStatus` field.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use http::StatusCode;
use serde_json::Value;
use std::sync::{Arc, Once};
use wirefault::xml::{self, XmlStart};
use wirefault::{configure, CodecError, Fault, FieldRef, Param, XmlReader, XmlWriter};

/// Key of the explicit HTTP status param.
///
/// The lower-case first letter makes it private under the default privacy
/// predicate, so it never leaks into serialized output.
pub const KEY_STATUS: &str = "httpStatus";

/// Attaches an explicit HTTP status to an error, overriding the code-based
/// default in [`status`].
#[must_use]
pub fn with_status(status: StatusCode) -> Param {
    Param::new(KEY_STATUS, status.as_u16())
}

/// Reads the explicit HTTP status back, if present and a valid status number.
#[must_use]
pub fn get_status(error: &(dyn std::error::Error + 'static)) -> Option<StatusCode> {
    let fault = error.downcast_ref::<Fault>()?;
    let FieldRef::Param(value) = fault.get(KEY_STATUS)? else {
        return None;
    };
    let status = u16::try_from(value.as_u64()?).ok()?;
    StatusCode::from_u16(status).ok()
}

/// Maps an error to the HTTP status it should be reported with.
///
/// Non-[`Fault`] errors and unknown codes map to 500; an explicit
/// [`with_status`] param wins over the code-based default.
#[must_use]
pub fn status(error: &(dyn std::error::Error + 'static)) -> StatusCode {
    let Some(fault) = error.downcast_ref::<Fault>() else {
        return StatusCode::INTERNAL_SERVER_ERROR;
    };
    if let Some(explicit) = get_status(error) {
        return explicit;
    }
    match fault.code().as_str() {
        "ValidationError" | "BlockingLink" | "ChecksumError" => StatusCode::BAD_REQUEST,
        "Unauthorized" => StatusCode::UNAUTHORIZED,
        "Forbidden" => StatusCode::FORBIDDEN,
        "NotFound" => StatusCode::NOT_FOUND,
        "Timeout" => StatusCode::REQUEST_TIMEOUT,
        "AlreadyExists" | "AlreadyInProgress" | "IllegalState" => StatusCode::CONFLICT,
        "PreconditionFailed" => StatusCode::PRECONDITION_FAILED,
        "PreconditionRequired" => StatusCode::PRECONDITION_REQUIRED,
        "TooManyRequests" => StatusCode::TOO_MANY_REQUESTS,
        "NotImplemented" => StatusCode::NOT_IMPLEMENTED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

static REGISTER: Once = Once::new();

/// Registers per-field codecs for the `httpStatus` param with the core
/// configuration, coercing the value to an integer on decode.
///
/// Idempotent; call during process initialization.
pub fn register() {
    REGISTER.call_once(|| {
        configure(|config| {
            config.json_encoders.insert(
                KEY_STATUS.to_owned(),
                Arc::new(|value: &Value| Ok(value.clone())),
            );
            config.json_decoders.insert(
                KEY_STATUS.to_owned(),
                Arc::new(|value: &Value| {
                    value
                        .as_i64()
                        .map(Value::from)
                        .ok_or_else(|| CodecError::WrongType {
                            field: KEY_STATUS.to_owned(),
                        })
                }),
            );
            config.xml_encoders.insert(
                KEY_STATUS.to_owned(),
                Arc::new(|writer: &mut XmlWriter, tag: &str, value: &Value| {
                    xml::write_value_element(writer, tag, value)
                }),
            );
            config.xml_decoders.insert(
                KEY_STATUS.to_owned(),
                Arc::new(|reader: &mut XmlReader<'_>, _start: &XmlStart<'_>| {
                    let text = xml::read_element_text(reader)?;
                    text.trim()
                        .parse::<i64>()
                        .map(Value::from)
                        .map_err(|_| CodecError::WrongType {
                            field: KEY_STATUS.to_owned(),
                        })
                }),
            );
        });
        tracing::debug!("registered httpStatus field codecs");
    });
}
