// SPDX-License-Identifier: MIT OR Apache-2.0

//! XML codec.
//!
//! A serialized error is one `<Error>` element whose children are the cased
//! field elements: `Code`, `Message`, optional `Cause` (a nested error
//! element, or text for a foreign cause), optional `StackTrace` (a single
//! text blob), and one element per non-private param. Decoding streams
//! sequential start-elements from the body and dispatches each by its
//! casing-transformed tag; unrecognized tags become generic string params.
//!
//! The helpers at the bottom are the toolkit for registered per-field XML
//! codecs — see [`Config::xml_encoders`](crate::Config) and the validation
//! map entry pre-registered by the default configuration.

use crate::codec::CodecError;
use crate::config::{self, Config, XmlReader, XmlWriter};
use crate::error::{BoxError, Code, Fault, KEY_CAUSE, KEY_CODE, KEY_MESSAGE, KEY_STACK_TRACE};
use crate::stack;
use crate::template::display_value;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;
use std::collections::BTreeMap;

pub use quick_xml::events::BytesStart as XmlStart;

const ROOT_TAG: &str = "Error";

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encodes `fault` into an XML string under the current configuration.
pub fn to_string(fault: &Fault) -> Result<String, CodecError> {
    config::with(|config| {
        let mut writer = Writer::new(Vec::new());
        write_fault(config, &mut writer, ROOT_TAG, fault)?;
        Ok(String::from_utf8(writer.into_inner())?)
    })
}

fn write_fault(
    config: &Config,
    writer: &mut XmlWriter,
    tag: &str,
    fault: &Fault,
) -> Result<(), CodecError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    write_text_element(
        writer,
        &(config.xml_encode_key)(KEY_CODE),
        fault.code().as_str(),
    )
    .map_err(|source| encode_field_error(KEY_CODE, source))?;
    write_text_element(
        writer,
        &(config.xml_encode_key)(KEY_MESSAGE),
        fault.message(),
    )
    .map_err(|source| encode_field_error(KEY_MESSAGE, source))?;
    if config.marshal_cause {
        if let Some(cause) = fault.cause() {
            let cause_tag = (config.xml_encode_key)(KEY_CAUSE);
            let written = match cause.downcast_ref::<Fault>() {
                Some(nested) => write_fault(config, writer, &cause_tag, nested),
                None => write_text_element(writer, &cause_tag, &cause.to_string()),
            };
            written.map_err(|source| encode_field_error(KEY_CAUSE, source))?;
        }
    }
    if config.marshal_stack_trace {
        if let Some(stack_trace) = fault.stack_trace() {
            write_text_element(
                writer,
                &(config.xml_encode_key)(KEY_STACK_TRACE),
                &stack_trace.to_string(),
            )
            .map_err(|source| encode_field_error(KEY_STACK_TRACE, source))?;
        }
    }
    for (name, value) in fault.params_map() {
        if (config.is_private_param)(name) {
            continue;
        }
        let param_tag = (config.xml_encode_key)(name);
        let written = match config.xml_encoders.get(name) {
            Some(encoder) => encoder(writer, &param_tag, value),
            None => write_value_element(writer, &param_tag, value),
        };
        written.map_err(|source| encode_field_error(name, source))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
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

/// Decodes an XML document back into a [`Fault`] under the current
/// configuration.
///
/// `Code` and `Message` children are mandatory; a serialized stack trace is
/// dropped and, when capture is enabled, replaced by one taken at the decode
/// site. The root element's own tag is not inspected.
pub fn from_str(input: &str) -> Result<Fault, CodecError> {
    config::with(|config| {
        let mut reader = Reader::from_str(input);
        loop {
            match reader.read_event()? {
                Event::Start(_) => return read_fault(config, &mut reader),
                Event::Empty(_) => return FieldAcc::default().into_fault(config),
                Event::Eof => return Err(CodecError::MissingRoot),
                _ => continue,
            }
        }
    })
}

#[derive(Default)]
struct FieldAcc {
    code: Option<Code>,
    message: Option<String>,
    cause: Option<BoxError>,
    params: BTreeMap<String, Value>,
}

impl FieldAcc {
    fn into_fault(self, config: &Config) -> Result<Fault, CodecError> {
        let code = self.code.ok_or_else(|| CodecError::MissingField {
            field: KEY_CODE.to_owned(),
        })?;
        let message = self.message.ok_or_else(|| CodecError::MissingField {
            field: KEY_MESSAGE.to_owned(),
        })?;
        let stack_trace = config.collect_stack_trace.then(|| stack::capture(1));
        Ok(Fault::from_parts(
            code,
            message,
            self.cause,
            self.params,
            stack_trace,
        ))
    }
}

fn read_fault(config: &Config, reader: &mut XmlReader<'_>) -> Result<Fault, CodecError> {
    let mut acc = FieldAcc::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => read_field(config, reader, &element, &mut acc)?,
            Event::Empty(element) => read_empty_field(config, &element, &mut acc),
            Event::End(_) | Event::Eof => break,
            _ => continue,
        }
    }
    acc.into_fault(config)
}

fn read_field(
    config: &Config,
    reader: &mut XmlReader<'_>,
    element: &BytesStart<'_>,
    acc: &mut FieldAcc,
) -> Result<(), CodecError> {
    let raw = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
    let key = (config.xml_decode_key)(&raw);
    match key.as_str() {
        KEY_CODE => {
            let text = read_element_text(reader)
                .map_err(|source| decode_field_error(KEY_CODE, source))?;
            acc.code = Some(Code::new(text));
        }
        KEY_MESSAGE => {
            let text = read_element_text(reader)
                .map_err(|source| decode_field_error(KEY_MESSAGE, source))?;
            acc.message = Some(text);
        }
        KEY_CAUSE => {
            let cause = read_cause(config, reader)
                .map_err(|source| decode_field_error(KEY_CAUSE, source))?;
            acc.cause = Some(cause);
        }
        KEY_STACK_TRACE => {
            tracing::trace!("dropping serialized stack trace during xml decode");
            skip_element(reader)?;
        }
        _ => {
            let value = match config.xml_decoders.get(key.as_str()) {
                Some(decoder) => decoder(reader, element),
                None => read_element_text(reader).map(Value::String),
            }
            .map_err(|source| decode_field_error(&key, source))?;
            acc.params.insert(key, value);
        }
    }
    Ok(())
}

fn read_empty_field(config: &Config, element: &BytesStart<'_>, acc: &mut FieldAcc) {
    let raw = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
    let key = (config.xml_decode_key)(&raw);
    match key.as_str() {
        KEY_CODE => acc.code = Some(Code::new(String::new())),
        KEY_MESSAGE => acc.message = Some(String::new()),
        KEY_CAUSE => acc.cause = Some(String::new().into()),
        KEY_STACK_TRACE => {}
        _ => {
            acc.params.insert(key, Value::String(String::new()));
        }
    }
}

// A cause element holding child elements decodes as a nested fault; plain
// text decodes as an opaque error. Structural failures of a nested cause
// propagate to the caller.
fn read_cause(config: &Config, reader: &mut XmlReader<'_>) -> Result<BoxError, CodecError> {
    let mut acc = FieldAcc::default();
    let mut nested = false;
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                nested = true;
                read_field(config, reader, &element, &mut acc)?;
            }
            Event::Empty(element) => {
                nested = true;
                read_empty_field(config, &element, &mut acc);
            }
            Event::Text(t) => text.push_str(&t.unescape().map_err(CodecError::from)?),
            Event::End(_) | Event::Eof => break,
            _ => continue,
        }
    }
    if nested {
        Ok(Box::new(acc.into_fault(config)?))
    } else {
        Ok(text.trim().to_owned().into())
    }
}

fn skip_element(reader: &mut XmlReader<'_>) -> Result<(), CodecError> {
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => continue,
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Element helpers for registered per-field codecs
// ---------------------------------------------------------------------------

/// Writes `<tag>text</tag>`, with an empty element for empty text.
pub fn write_text_element(
    writer: &mut XmlWriter,
    tag: &str,
    text: &str,
) -> Result<(), CodecError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Generic structural encoding of a param value: scalars become element text,
/// objects become nested elements keyed by entry name, arrays become repeated
/// `<Item>` children.
pub fn write_value_element(
    writer: &mut XmlWriter,
    tag: &str,
    value: &Value,
) -> Result<(), CodecError> {
    match value {
        Value::Object(entries) => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            for (child_tag, child_value) in entries {
                write_value_element(writer, child_tag, child_value)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
            Ok(())
        }
        Value::Array(items) => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            for item in items {
                write_value_element(writer, "Item", item)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
            Ok(())
        }
        scalar => write_text_element(writer, tag, &display_value(scalar)),
    }
}

/// Reads the text content of the element currently open on `reader`, through
/// its matching end tag. Nested markup is skipped; only text accumulates.
pub fn read_element_text(reader: &mut XmlReader<'_>) -> Result<String, CodecError> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape().map_err(CodecError::from)?),
            Event::CData(t) => text.push_str(&String::from_utf8_lossy(&t.into_inner())),
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => continue,
        }
    }
    Ok(text)
}

// Default codecs for the validation map: a container element with one child
// per entry, child tag = map key, child text = map value. Registered under
// the `Errors` field name by `Config::default`.

pub(crate) fn encode_validation_errors(
    writer: &mut XmlWriter,
    tag: &str,
    value: &Value,
) -> Result<(), CodecError> {
    let Some(entries) = value.as_object() else {
        return write_value_element(writer, tag, value);
    };
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    for (field, message) in entries {
        write_text_element(writer, field, &display_value(message))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

pub(crate) fn decode_validation_errors(
    reader: &mut XmlReader<'_>,
    _element: &BytesStart<'_>,
) -> Result<Value, CodecError> {
    let mut entries = serde_json::Map::new();
    loop {
        match reader.read_event()? {
            Event::Start(child) => {
                let field = String::from_utf8_lossy(child.local_name().as_ref()).into_owned();
                let message = read_element_text(reader)?;
                entries.insert(field, Value::String(message));
            }
            Event::Empty(child) => {
                let field = String::from_utf8_lossy(child.local_name().as_ref()).into_owned();
                entries.insert(field, Value::String(String::new()));
            }
            Event::End(_) | Event::Eof => break,
            _ => continue,
        }
    }
    Ok(Value::Object(entries))
}
