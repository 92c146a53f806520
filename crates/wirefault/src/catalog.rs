// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in error templates.
//!
//! A fixed vocabulary of codes with uniform messages. Templates whose message
//! depends on a param's presence branch in a closure; the rest compile a
//! plain pattern.

use crate::error::Code;
use crate::params::{KEY_PRECONDITION, KEY_REASON, KEY_RESOURCE};
use crate::template::{display_value, Template};
use std::sync::LazyLock;

/// Code of [`VALIDATION_ERROR`].
pub const CODE_VALIDATION_ERROR: Code = Code::from_static("ValidationError");
/// Code of [`BLOCKING_LINK`].
pub const CODE_BLOCKING_LINK: Code = Code::from_static("BlockingLink");
/// Code of [`CHECKSUM_ERROR`].
pub const CODE_CHECKSUM_ERROR: Code = Code::from_static("ChecksumError");
/// Code of [`UNAUTHORIZED`].
pub const CODE_UNAUTHORIZED: Code = Code::from_static("Unauthorized");
/// Code of [`FORBIDDEN`].
pub const CODE_FORBIDDEN: Code = Code::from_static("Forbidden");
/// Code of [`NOT_FOUND`].
pub const CODE_NOT_FOUND: Code = Code::from_static("NotFound");
/// Code of [`TIMEOUT`].
pub const CODE_TIMEOUT: Code = Code::from_static("Timeout");
/// Code of [`ALREADY_EXISTS`].
pub const CODE_ALREADY_EXISTS: Code = Code::from_static("AlreadyExists");
/// Code of [`ALREADY_IN_PROGRESS`].
pub const CODE_ALREADY_IN_PROGRESS: Code = Code::from_static("AlreadyInProgress");
/// Code of [`ILLEGAL_STATE`].
pub const CODE_ILLEGAL_STATE: Code = Code::from_static("IllegalState");
/// Code of [`PRECONDITION_FAILED`].
pub const CODE_PRECONDITION_FAILED: Code = Code::from_static("PreconditionFailed");
/// Code of [`PRECONDITION_REQUIRED`].
pub const CODE_PRECONDITION_REQUIRED: Code = Code::from_static("PreconditionRequired");
/// Code of [`TOO_MANY_REQUESTS`].
pub const CODE_TOO_MANY_REQUESTS: Code = Code::from_static("TooManyRequests");
/// Code of [`INTERNAL_ERROR`].
pub const CODE_INTERNAL_ERROR: Code = Code::from_static("InternalError");
/// Code of [`NOT_IMPLEMENTED`].
pub const CODE_NOT_IMPLEMENTED: Code = Code::from_static("NotImplemented");

/// A resource failed validation.
pub static VALIDATION_ERROR: LazyLock<Template> = LazyLock::new(|| {
    Template::from_fn(CODE_VALIDATION_ERROR, |params| {
        match params.get(KEY_RESOURCE) {
            Some(resource) => format!("{} validation error", display_value(resource)),
            None => "Resource validation error".to_owned(),
        }
    })
});

/// The resource cannot be removed while links to it exist.
pub static BLOCKING_LINK: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_BLOCKING_LINK, "There are links to this resource"));

/// A checksum comparison failed.
pub static CHECKSUM_ERROR: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_CHECKSUM_ERROR, "Checksum does not match"));

/// The caller is not authenticated.
pub static UNAUTHORIZED: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_UNAUTHORIZED, "Unauthorized"));

/// The caller is authenticated but not allowed.
pub static FORBIDDEN: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_FORBIDDEN, "Forbidden"));

/// The named resource does not exist.
pub static NOT_FOUND: LazyLock<Template> = LazyLock::new(|| {
    Template::from_fn(CODE_NOT_FOUND, |params| match params.get(KEY_RESOURCE) {
        Some(resource) => format!("{} not found", display_value(resource)),
        None => "Resource not found".to_owned(),
    })
});

/// An operation ran out of time.
pub static TIMEOUT: LazyLock<Template> = LazyLock::new(|| Template::new(CODE_TIMEOUT, "Timeout"));

/// The named resource already exists.
pub static ALREADY_EXISTS: LazyLock<Template> = LazyLock::new(|| {
    Template::from_fn(CODE_ALREADY_EXISTS, |params| {
        match params.get(KEY_RESOURCE) {
            Some(resource) => format!("{} already exists", display_value(resource)),
            None => "Resource already exists".to_owned(),
        }
    })
});

/// The operation is already running.
pub static ALREADY_IN_PROGRESS: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_ALREADY_IN_PROGRESS, "Already in progress"));

/// The system is in a state the operation cannot proceed from.
pub static ILLEGAL_STATE: LazyLock<Template> = LazyLock::new(|| {
    Template::from_fn(CODE_ILLEGAL_STATE, |params| match params.get(KEY_REASON) {
        Some(reason) => format!("Illegal state: {}", display_value(reason)),
        None => "Illegal state".to_owned(),
    })
});

/// A named precondition did not hold.
pub static PRECONDITION_FAILED: LazyLock<Template> = LazyLock::new(|| {
    Template::from_fn(CODE_PRECONDITION_FAILED, |params| {
        match params.get(KEY_PRECONDITION) {
            Some(precondition) => format!("Precondition {} failed", display_value(precondition)),
            None => "Precondition failed".to_owned(),
        }
    })
});

/// A named precondition must be supplied.
pub static PRECONDITION_REQUIRED: LazyLock<Template> = LazyLock::new(|| {
    Template::from_fn(CODE_PRECONDITION_REQUIRED, |params| {
        match params.get(KEY_PRECONDITION) {
            Some(precondition) => format!("Precondition {} required", display_value(precondition)),
            None => "Precondition required".to_owned(),
        }
    })
});

/// The caller exceeded its request rate.
pub static TOO_MANY_REQUESTS: LazyLock<Template> = LazyLock::new(|| {
    Template::new(
        CODE_TOO_MANY_REQUESTS,
        "Too many requests, please reduce your request rate",
    )
});

/// An unexpected internal failure.
pub static INTERNAL_ERROR: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_INTERNAL_ERROR, "Internal error"));

/// The requested operation is not implemented.
pub static NOT_IMPLEMENTED: LazyLock<Template> =
    LazyLock::new(|| Template::new(CODE_NOT_IMPLEMENTED, "Not implemented"));
