// SPDX-License-Identifier: MIT OR Apache-2.0

//! The structured error value.

use crate::config;
use crate::params::{Param, Params};
use crate::stack::{self, StackTrace};
use crate::template::Template;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved lookup key for the error code.
pub const KEY_CODE: &str = "Code";
/// Reserved lookup key for the rendered message.
pub const KEY_MESSAGE: &str = "Message";
/// Reserved lookup key for the wrapped cause.
pub const KEY_CAUSE: &str = "Cause";
/// Reserved lookup key for the captured stack trace.
pub const KEY_STACK_TRACE: &str = "StackTrace";

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// Code
// ---------------------------------------------------------------------------

/// Stable, machine-readable category identifier for an error.
///
/// Codes are compared for programmatic matching and never used for display.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Code(Cow<'static, str>);

impl Code {
    /// Builds a code from a static string, usable in `const` items.
    #[must_use]
    pub const fn from_static(code: &'static str) -> Self {
        Self(Cow::Borrowed(code))
    }

    /// Builds a code from an owned string.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Code {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for Code {
    fn from(code: String) -> Self {
        Self(Cow::Owned(code))
    }
}

// ---------------------------------------------------------------------------
// FieldRef
// ---------------------------------------------------------------------------

/// A borrowed view of one field of a [`Fault`], as returned by [`Fault::get`].
///
/// The reserved keys resolve to the typed fields; everything else resolves to
/// a param value.
#[derive(Clone, Copy)]
pub enum FieldRef<'a> {
    /// The error code, under [`KEY_CODE`].
    Code(&'a Code),
    /// The rendered message, under [`KEY_MESSAGE`].
    Message(&'a str),
    /// The wrapped cause, under [`KEY_CAUSE`].
    Cause(&'a (dyn std::error::Error + 'static)),
    /// The captured stack trace, under [`KEY_STACK_TRACE`].
    StackTrace(&'a StackTrace),
    /// A named param.
    Param(&'a Value),
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => f.debug_tuple("Code").field(code).finish(),
            Self::Message(message) => f.debug_tuple("Message").field(message).finish(),
            Self::Cause(cause) => f.debug_tuple("Cause").field(&cause.to_string()).finish(),
            Self::StackTrace(trace) => f.debug_tuple("StackTrace").field(&trace.len()).finish(),
            Self::Param(value) => f.debug_tuple("Param").field(value).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fault
// ---------------------------------------------------------------------------

/// A structured error: stable code, eagerly rendered message, optional
/// wrapped cause, named params, and an optional captured stack trace.
///
/// Immutable once constructed. The display form is exactly the rendered
/// message.
///
/// ```
/// use wirefault::{catalog, params, Fault};
///
/// let err = Fault::new(&catalog::NOT_FOUND, [params::with_resource("User")]);
/// assert_eq!(err.to_string(), "User not found");
/// assert!(Fault::is(&err, &catalog::NOT_FOUND));
/// ```
pub struct Fault {
    code: Code,
    message: String,
    cause: Option<BoxError>,
    params: BTreeMap<String, Value>,
    stack_trace: Option<StackTrace>,
}

impl Fault {
    /// Builds an error from a template and call-site params.
    ///
    /// Template defaults merge under the call-site params (caller wins), the
    /// message renders eagerly, and a stack trace is captured iff the
    /// process-wide configuration enables it. Never fails.
    #[must_use]
    pub fn new(template: &Template, params: impl IntoIterator<Item = Param>) -> Self {
        Self::build(template, None, params.into_iter().collect())
    }

    /// Builds an error wrapping `cause`, which becomes the head of the
    /// wrapped chain exposed through [`Fault::cause`] and `source()`.
    #[must_use]
    pub fn wrap<E>(cause: E, template: &Template, params: impl IntoIterator<Item = Param>) -> Self
    where
        E: Into<BoxError>,
    {
        Self::build(template, Some(cause.into()), params.into_iter().collect())
    }

    /// True iff `error` is a [`Fault`] carrying the template's code.
    ///
    /// Any other error type yields `false`; this never panics.
    #[must_use]
    pub fn is(error: &(dyn std::error::Error + 'static), template: &Template) -> bool {
        error
            .downcast_ref::<Fault>()
            .is_some_and(|fault| fault.code == *template.code())
    }

    fn build(template: &Template, cause: Option<BoxError>, params: Params) -> Self {
        let stack_trace = config::with(|config| config.collect_stack_trace)
            .then(|| stack::capture(2));
        let mut merged = template.defaults().to_map();
        merged.extend(params.to_map());
        let message = template.render(&merged);
        Self {
            code: template.code().clone(),
            message,
            cause,
            params: merged,
            stack_trace,
        }
    }

    pub(crate) fn from_parts(
        code: Code,
        message: String,
        cause: Option<BoxError>,
        params: BTreeMap<String, Value>,
        stack_trace: Option<StackTrace>,
    ) -> Self {
        Self {
            code,
            message,
            cause,
            params,
            stack_trace,
        }
    }

    /// The stable code.
    #[must_use]
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// The message rendered at construction time.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }

    /// Generic keyed lookup over the error's fields.
    ///
    /// The reserved keys ([`KEY_CODE`], [`KEY_MESSAGE`], [`KEY_CAUSE`],
    /// [`KEY_STACK_TRACE`]) always win over identically-named params.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<FieldRef<'_>> {
        match key {
            KEY_CODE => Some(FieldRef::Code(&self.code)),
            KEY_MESSAGE => Some(FieldRef::Message(&self.message)),
            KEY_CAUSE => self.cause().map(FieldRef::Cause),
            KEY_STACK_TRACE => self.stack_trace.as_ref().map(FieldRef::StackTrace),
            _ => self.params.get(key).map(FieldRef::Param),
        }
    }

    /// A snapshot of the merged params, in name order.
    #[must_use]
    pub fn params(&self) -> Params {
        self.params
            .iter()
            .map(|(name, value)| Param::new(name.clone(), value.clone()))
            .collect()
    }

    /// The stack trace captured at construction or decode time, if enabled.
    #[must_use]
    pub fn stack_trace(&self) -> Option<&StackTrace> {
        self.stack_trace.as_ref()
    }

    pub(crate) fn params_map(&self) -> &BTreeMap<String, Value> {
        &self.params
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Fault");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref cause) = self.cause {
            d.field("cause", &cause.to_string());
        }
        if !self.params.is_empty() {
            d.field("params", &self.params);
        }
        if let Some(ref stack_trace) = self.stack_trace {
            d.field("stack_frames", &stack_trace.len());
        }
        d.finish()
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::params::{with_reason, with_resource};
    use serde_json::json;
    use std::io;

    #[test]
    fn new_carries_the_template_code() {
        let fault = Fault::new(&catalog::NOT_FOUND, []);
        assert_eq!(fault.code(), &catalog::CODE_NOT_FOUND);
    }

    #[test]
    fn display_is_exactly_the_rendered_message() {
        let fault = Fault::new(&catalog::NOT_FOUND, [with_resource("User")]);
        assert_eq!(fault.to_string(), "User not found");
        assert_eq!(format!("{fault}"), fault.message());
    }

    #[test]
    fn caller_params_override_template_defaults() {
        let template = Template::new("Spare", "{Reason} happened")
            .with_defaults([with_reason("nothing")]);
        let fault = Fault::new(&template, [with_reason("everything")]);
        assert_eq!(fault.to_string(), "everything happened");

        let defaulted = Fault::new(&template, []);
        assert_eq!(defaulted.to_string(), "nothing happened");
    }

    #[test]
    fn is_matches_on_code_alone() {
        let fault = Fault::new(&catalog::NOT_FOUND, []);
        assert!(Fault::is(&fault, &catalog::NOT_FOUND));
        assert!(!Fault::is(&fault, &catalog::FORBIDDEN));

        let same_code = Template::new(catalog::CODE_NOT_FOUND, "gone");
        assert!(Fault::is(&fault, &same_code));
    }

    #[test]
    fn is_rejects_foreign_errors() {
        let foreign = io::Error::new(io::ErrorKind::NotFound, "no file");
        assert!(!Fault::is(&foreign, &catalog::NOT_FOUND));
    }

    #[test]
    fn wrap_exposes_the_cause() {
        let inner = io::Error::new(io::ErrorKind::BrokenPipe, "pipe broke");
        let fault = Fault::wrap(inner, &catalog::INTERNAL_ERROR, []);
        let cause = fault.cause().expect("cause retained");
        assert_eq!(cause.to_string(), "pipe broke");
        let source = std::error::Error::source(&fault).expect("source retained");
        assert_eq!(source.to_string(), "pipe broke");
    }

    #[test]
    fn reserved_keys_shadow_params() {
        let fault = Fault::new(&catalog::NOT_FOUND, [Param::new("Code", "sneaky")]);
        match fault.get(KEY_CODE) {
            Some(FieldRef::Code(code)) => assert_eq!(code, &catalog::CODE_NOT_FOUND),
            other => panic!("expected the reserved code, got {other:?}"),
        }
        // The shadowed param is still stored.
        assert_eq!(fault.params_map()["Code"], json!("sneaky"));
    }

    #[test]
    fn get_falls_through_to_params() {
        let fault = Fault::new(&catalog::NOT_FOUND, [with_resource("User")]);
        match fault.get("Resource") {
            Some(FieldRef::Param(value)) => assert_eq!(value, &json!("User")),
            other => panic!("expected a param, got {other:?}"),
        }
        assert!(fault.get("Absent").is_none());
    }

    #[test]
    fn get_cause_absent_without_wrapping() {
        let fault = Fault::new(&catalog::NOT_FOUND, []);
        assert!(fault.get(KEY_CAUSE).is_none());
    }

    #[test]
    fn params_snapshot_reflects_the_merge() {
        let fault = Fault::new(&catalog::NOT_FOUND, [with_resource("User")]);
        let params = fault.params();
        assert_eq!(params.len(), 1);
        assert_eq!(params.to_map()["Resource"], json!("User"));
    }
}
