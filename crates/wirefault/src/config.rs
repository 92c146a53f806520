// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide codec configuration.
//!
//! A single [`Config`] drives every marshal/unmarshal call: which params are
//! private, how field names are cased per format, which per-field codecs
//! override the generic ones, and whether causes and stack traces are emitted.
//!
//! The configuration is guarded by a read-write lock: reads are taken per
//! codec call, writes go through [`configure`] alone. Configure before
//! concurrent use — the expected pattern is a handful of [`configure`] calls
//! during process initialization, then concurrent readers only. Registered
//! override functions are called with the lock held and must not call back
//! into the codecs.

use crate::codec::CodecError;
use crate::params::KEY_VALIDATION_ERRORS;
use crate::xml;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, RwLock};

/// Field-name casing transform.
pub type KeyFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Predicate deciding whether a param is excluded from serialized output.
pub type PrivacyFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Per-field JSON encoder: canonical param value in, JSON tree out.
pub type JsonEncodeFn = Arc<dyn Fn(&Value) -> Result<Value, CodecError> + Send + Sync>;

/// Per-field JSON decoder: raw JSON tree in, canonical param value out.
pub type JsonDecodeFn = Arc<dyn Fn(&Value) -> Result<Value, CodecError> + Send + Sync>;

/// Writer handed to XML encoders.
pub type XmlWriter = quick_xml::Writer<Vec<u8>>;

/// Reader handed to XML decoders.
pub type XmlReader<'a> = quick_xml::Reader<&'a [u8]>;

/// Per-field XML encoder: writes one element for the given tag and value.
pub type XmlEncodeFn =
    Arc<dyn Fn(&mut XmlWriter, &str, &Value) -> Result<(), CodecError> + Send + Sync>;

/// Per-field XML decoder: consumes the element opened by `start` and returns
/// the canonical param value.
pub type XmlDecodeFn = Arc<
    dyn Fn(&mut XmlReader<'_>, &quick_xml::events::BytesStart<'_>) -> Result<Value, CodecError>
        + Send
        + Sync,
>;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// The process-wide codec configuration.
///
/// All fields are public; mutate them through [`configure`].
pub struct Config {
    /// Capture a stack trace on every fault construction and decode.
    pub collect_stack_trace: bool,

    /// Params matching this predicate are excluded from serialized output.
    /// Default: names whose first letter is lower-case.
    pub is_private_param: PrivacyFn,

    /// Casing applied to field names on JSON encode. Default lower-cases the
    /// first letter.
    pub json_encode_key: KeyFn,
    /// Casing applied to raw keys on JSON decode to recover the canonical
    /// name. Default upper-cases the first letter.
    pub json_decode_key: KeyFn,

    /// Casing applied to element tags on XML encode. Default upper-cases the
    /// first letter.
    pub xml_encode_key: KeyFn,
    /// Casing applied to element tags on XML decode. Default is the identity
    /// transform — asymmetric with encode, preserved as observed in the wire
    /// contract.
    pub xml_decode_key: KeyFn,

    /// Per-field JSON encoders, keyed by canonical field name.
    pub json_encoders: BTreeMap<String, JsonEncodeFn>,
    /// Per-field JSON decoders, keyed by canonical field name.
    pub json_decoders: BTreeMap<String, JsonDecodeFn>,
    /// Per-field XML encoders, keyed by canonical field name.
    pub xml_encoders: BTreeMap<String, XmlEncodeFn>,
    /// Per-field XML decoders, keyed by canonical field name.
    pub xml_decoders: BTreeMap<String, XmlDecodeFn>,

    /// Emit the wrapped cause when serializing.
    pub marshal_cause: bool,
    /// Emit the captured stack trace when serializing.
    pub marshal_stack_trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        let mut xml_encoders: BTreeMap<String, XmlEncodeFn> = BTreeMap::new();
        xml_encoders.insert(
            KEY_VALIDATION_ERRORS.to_owned(),
            Arc::new(xml::encode_validation_errors),
        );
        let mut xml_decoders: BTreeMap<String, XmlDecodeFn> = BTreeMap::new();
        xml_decoders.insert(
            KEY_VALIDATION_ERRORS.to_owned(),
            Arc::new(xml::decode_validation_errors),
        );
        Self {
            collect_stack_trace: true,
            is_private_param: Arc::new(|name: &str| {
                name.chars().next().is_some_and(char::is_lowercase)
            }),
            json_encode_key: Arc::new(lower_first),
            json_decode_key: Arc::new(upper_first),
            xml_encode_key: Arc::new(upper_first),
            xml_decode_key: Arc::new(str::to_owned),
            json_encoders: BTreeMap::new(),
            json_decoders: BTreeMap::new(),
            xml_encoders,
            xml_decoders,
            marshal_cause: false,
            marshal_stack_trace: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("collect_stack_trace", &self.collect_stack_trace)
            .field("marshal_cause", &self.marshal_cause)
            .field("marshal_stack_trace", &self.marshal_stack_trace)
            .field(
                "json_encoders",
                &self.json_encoders.keys().collect::<Vec<_>>(),
            )
            .field(
                "json_decoders",
                &self.json_decoders.keys().collect::<Vec<_>>(),
            )
            .field("xml_encoders", &self.xml_encoders.keys().collect::<Vec<_>>())
            .field("xml_decoders", &self.xml_decoders.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

/// Applies a patch to the process-wide configuration.
///
/// This is the only mutation entry point. Call it during process
/// initialization, before codecs run concurrently.
pub fn configure<F>(patch: F)
where
    F: FnOnce(&mut Config),
{
    let mut config = CONFIG.write().expect("codec configuration lock poisoned");
    patch(&mut config);
    tracing::debug!("codec configuration updated");
}

pub(crate) fn with<T>(read: impl FnOnce(&Config) -> T) -> T {
    read(&CONFIG.read().expect("codec configuration lock poisoned"))
}

// ---------------------------------------------------------------------------
// Casing helpers
// ---------------------------------------------------------------------------

/// Lower-cases the first letter of `name`, leaving the rest untouched.
#[must_use]
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        _ => name.to_owned(),
    }
}

/// Upper-cases the first letter of `name`, leaving the rest untouched.
#[must_use]
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        _ => name.to_owned(),
    }
}
