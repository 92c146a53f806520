// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured, wire-serializable error values.
//!
//! Every fault carries a stable machine-readable [`Code`], a message rendered
//! eagerly from a [`Template`], an optional wrapped cause, an open-ended bag
//! of named params, and — when enabled — a captured call stack. The JSON and
//! XML codecs serialize the same field set under a process-wide [`Config`]
//! that controls field-name casing, param privacy, and per-field codec
//! overrides.
//!
//! ```
//! use wirefault::{catalog, json, params, Fault};
//!
//! let err = Fault::new(&catalog::NOT_FOUND, [params::with_resource("User")]);
//! assert_eq!(err.to_string(), "User not found");
//! assert!(Fault::is(&err, &catalog::NOT_FOUND));
//!
//! let wire = json::encode(&err).unwrap();
//! assert_eq!(wire["code"], "NotFound");
//! ```
//!
//! Domain attributes follow the param-extension convention: a key constant,
//! a `with_x` constructor, and a `get_x` accessor, layered outside [`Fault`]
//! itself — see [`params`] and the HTTP status adapter crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
mod codec;
mod config;
mod error;
pub mod json;
pub mod params;
mod stack;
mod template;
pub mod xml;

pub use codec::CodecError;
pub use config::{
    configure, lower_first, upper_first, Config, JsonDecodeFn, JsonEncodeFn, KeyFn, PrivacyFn,
    XmlDecodeFn, XmlEncodeFn, XmlReader, XmlWriter,
};
pub use error::{Code, Fault, FieldRef, KEY_CAUSE, KEY_CODE, KEY_MESSAGE, KEY_STACK_TRACE};
pub use params::{Param, Params};
pub use stack::{capture, Frame, StackTrace, MAX_DEPTH};
pub use template::{ParamMap, Pattern, Template};
