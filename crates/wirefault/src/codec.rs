// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure taxonomy shared by the JSON and XML codecs.

/// Errors produced while encoding or decoding a [`Fault`](crate::Fault).
///
/// Constructing a fault never fails; only (de)serialization can, and always
/// with a field-qualified reason. Per-field failures keep the underlying
/// failure reachable through [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A mandatory field was absent from the serialized input.
    #[error("missing field {field}")]
    MissingField {
        /// Canonical name of the absent field.
        field: String,
    },

    /// A field decoded to a value of the wrong dynamic type.
    #[error("field {field} has the wrong type")]
    WrongType {
        /// Canonical name of the offending field.
        field: String,
    },

    /// A per-field encoder (registered or generic) failed.
    #[error("failed to encode field {field}")]
    EncodeField {
        /// Canonical name of the field being encoded.
        field: String,
        /// The underlying failure.
        #[source]
        source: Box<CodecError>,
    },

    /// A per-field decoder (registered or generic) failed.
    #[error("failed to decode field {field}")]
    DecodeField {
        /// Canonical name of the field being decoded.
        field: String,
        /// The underlying failure.
        #[source]
        source: Box<CodecError>,
    },

    /// The top-level JSON value is not an object.
    #[error("serialized error is not a json object")]
    NotAnObject,

    /// The XML document ended before a root element was seen.
    #[error("serialized error has no root element")]
    MissingRoot,

    /// The input is not well-formed JSON.
    #[error("invalid json document")]
    Json {
        /// Parser failure.
        #[from]
        source: serde_json::Error,
    },

    /// The input is not well-formed XML.
    #[error("invalid xml document")]
    Xml {
        /// Parser failure.
        #[from]
        source: quick_xml::Error,
    },

    /// An XML text node carried an invalid escape sequence.
    #[error("invalid xml escape sequence")]
    XmlEscape {
        /// Escape failure.
        #[from]
        source: quick_xml::escape::EscapeError,
    },

    /// Writing the serialized form failed.
    #[error("failed to write serialized error")]
    Io {
        /// Write failure.
        #[from]
        source: std::io::Error,
    },

    /// The serialized form is not valid UTF-8.
    #[error("serialized error is not valid utf-8")]
    Utf8 {
        /// Decoding failure.
        #[from]
        source: std::string::FromUtf8Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn missing_field_names_the_field() {
        let err = CodecError::MissingField {
            field: "Code".to_owned(),
        };
        assert_eq!(err.to_string(), "missing field Code");
    }

    #[test]
    fn field_failures_preserve_the_cause() {
        let err = CodecError::DecodeField {
            field: "Errors".to_owned(),
            source: Box::new(CodecError::WrongType {
                field: "Errors".to_owned(),
            }),
        };
        assert_eq!(err.to_string(), "failed to decode field Errors");
        let source = err.source().expect("source retained");
        assert_eq!(source.to_string(), "field Errors has the wrong type");
    }
}
