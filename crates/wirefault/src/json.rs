// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON codec.
//!
//! Encoding produces a flat object: every non-private param, the mandatory
//! `code` and `message`, and — when the configuration enables them — the
//! wrapped `cause` (recursively, when it is itself a [`Fault`]) and the
//! `stackTrace` as an array of `"<function> <file>:<line>"` strings. Field
//! names pass through the configured casing transforms, and each field first
//! consults the per-field registry before the generic structural encoding.
//!
//! [`Fault`] also implements `Serialize` / `Deserialize` by delegating to
//! [`encode`] / [`decode`], so it slots into any serde pipeline.

use crate::codec::CodecError;
use crate::config::{self, Config};
use crate::error::{BoxError, Code, Fault, KEY_CAUSE, KEY_CODE, KEY_MESSAGE, KEY_STACK_TRACE};
use crate::stack::{self, StackTrace};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encodes `fault` into a JSON tree under the current configuration.
pub fn encode(fault: &Fault) -> Result<Value, CodecError> {
    config::with(|config| encode_with(config, fault))
}

/// Encodes `fault` into a JSON string under the current configuration.
pub fn to_string(fault: &Fault) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&encode(fault)?)?)
}

fn encode_with(config: &Config, fault: &Fault) -> Result<Value, CodecError> {
    let mut data = Map::new();
    for (name, value) in fault.params_map() {
        if (config.is_private_param)(name) {
            continue;
        }
        let encoded = encode_param(config, name, value)
            .map_err(|source| encode_field_error(name, source))?;
        data.insert((config.json_encode_key)(name), encoded);
    }
    data.insert(
        (config.json_encode_key)(KEY_CODE),
        Value::String(fault.code().as_str().to_owned()),
    );
    data.insert(
        (config.json_encode_key)(KEY_MESSAGE),
        Value::String(fault.message().to_owned()),
    );
    if config.marshal_cause {
        if let Some(cause) = fault.cause() {
            let encoded = encode_cause(config, cause)
                .map_err(|source| encode_field_error(KEY_CAUSE, source))?;
            data.insert((config.json_encode_key)(KEY_CAUSE), encoded);
        }
    }
    if config.marshal_stack_trace {
        if let Some(stack_trace) = fault.stack_trace() {
            data.insert(
                (config.json_encode_key)(KEY_STACK_TRACE),
                encode_stack_trace(stack_trace),
            );
        }
    }
    Ok(Value::Object(data))
}

fn encode_param(config: &Config, name: &str, value: &Value) -> Result<Value, CodecError> {
    match config.json_encoders.get(name) {
        Some(encoder) => encoder(value),
        None => Ok(value.clone()),
    }
}

fn encode_cause(
    config: &Config,
    cause: &(dyn std::error::Error + 'static),
) -> Result<Value, CodecError> {
    match cause.downcast_ref::<Fault>() {
        Some(nested) => encode_with(config, nested),
        None => Ok(Value::String(cause.to_string())),
    }
}

fn encode_stack_trace(stack_trace: &StackTrace) -> Value {
    Value::Array(
        stack_trace
            .frames()
            .iter()
            .map(|frame| {
                Value::String(format!(
                    "{} {}:{}",
                    frame.function(),
                    frame.file(),
                    frame.line()
                ))
            })
            .collect(),
    )
}

fn encode_field_error(field: &str, source: CodecError) -> CodecError {
    CodecError::EncodeField {
        field: field.to_owned(),
        source: Box::new(source),
    }
}

fn decode_field_error(field: &str, source: CodecError) -> CodecError {
    CodecError::DecodeField {
        field: field.to_owned(),
        source: Box::new(source),
    }
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decodes a JSON tree back into a [`Fault`] under the current configuration.
///
/// `code` and `message` are mandatory; a serialized stack trace is dropped
/// and, when capture is enabled, replaced by one taken at the decode site.
pub fn decode(value: &Value) -> Result<Fault, CodecError> {
    config::with(|config| decode_with(config, value))
}

/// Parses and decodes a JSON string.
pub fn from_str(input: &str) -> Result<Fault, CodecError> {
    decode(&serde_json::from_str::<Value>(input)?)
}

/// Parses and decodes JSON bytes.
pub fn from_slice(input: &[u8]) -> Result<Fault, CodecError> {
    decode(&serde_json::from_slice::<Value>(input)?)
}

fn decode_with(config: &Config, value: &Value) -> Result<Fault, CodecError> {
    let data = value.as_object().ok_or(CodecError::NotAnObject)?;

    // Reserved fields are looked up under the key the encoder writes them as.
    let code_key = (config.json_encode_key)(KEY_CODE);
    let message_key = (config.json_encode_key)(KEY_MESSAGE);
    let cause_key = (config.json_encode_key)(KEY_CAUSE);
    let stack_key = (config.json_encode_key)(KEY_STACK_TRACE);

    let code = decode_text_field(config, data, &code_key, KEY_CODE)?;
    let code = Code::new(code);
    let message = decode_text_field(config, data, &message_key, KEY_MESSAGE)?;

    let cause = data.get(&cause_key).map(|raw| decode_cause(config, raw));
    if data.contains_key(&stack_key) {
        tracing::trace!("dropping serialized stack trace during json decode");
    }

    let mut params = BTreeMap::new();
    for (raw_key, raw_value) in data {
        if raw_key == &code_key
            || raw_key == &message_key
            || raw_key == &cause_key
            || raw_key == &stack_key
        {
            continue;
        }
        let name = (config.json_decode_key)(raw_key);
        let value = decode_param(config, &name, raw_value)
            .map_err(|source| decode_field_error(&name, source))?;
        params.insert(name, value);
    }

    let stack_trace = config.collect_stack_trace.then(|| stack::capture(1));
    Ok(Fault::from_parts(code, message, cause, params, stack_trace))
}

fn decode_text_field(
    config: &Config,
    data: &Map<String, Value>,
    raw_key: &str,
    field: &str,
) -> Result<String, CodecError> {
    let raw = data.get(raw_key).ok_or_else(|| CodecError::MissingField {
        field: field.to_owned(),
    })?;
    let value = decode_param(config, field, raw)
        .map_err(|source| decode_field_error(field, source))?;
    match value.as_str() {
        Some(text) => Ok(text.to_owned()),
        None => Err(CodecError::WrongType {
            field: field.to_owned(),
        }),
    }
}

fn decode_param(config: &Config, name: &str, raw: &Value) -> Result<Value, CodecError> {
    match config.json_decoders.get(name) {
        Some(decoder) => decoder(raw),
        None => Ok(raw.clone()),
    }
}

// A cause payload never fails to decode: a nested object is tried as a fault,
// then the payload degrades to its string form wrapped as an opaque error.
fn decode_cause(config: &Config, raw: &Value) -> BoxError {
    if raw.is_object() {
        if let Ok(nested) = decode_with(config, raw) {
            return Box::new(nested);
        }
    }
    match raw.as_str() {
        Some(text) => text.to_owned().into(),
        None => raw.to_string().into(),
    }
}

// ---------------------------------------------------------------------------
// Serde bridge
// ---------------------------------------------------------------------------

impl Serialize for Fault {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        encode(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fault {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        decode(&value).map_err(serde::de::Error::custom)
    }
}
