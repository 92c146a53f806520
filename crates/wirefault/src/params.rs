// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named, dynamically-typed error attributes.
//!
//! Every domain-specific attribute is a `(key, constructor, accessor)` triple
//! layered outside [`Fault`](crate::Fault): the error type itself knows
//! nothing about these names. New attributes are added by following the same
//! convention — see the HTTP status param in the companion adapter crate.

use crate::error::{Fault, FieldRef};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Param / Params
// ---------------------------------------------------------------------------

/// A single named attribute attached to an error.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    /// Canonical attribute name.
    pub name: String,
    /// Attribute value.
    pub value: Value,
}

impl Param {
    /// Builds a param from anything convertible into a JSON value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered sequence of params.
///
/// Converting to a map discards order and de-duplicates by name; the last
/// insertion wins, deterministically.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(Vec<Param>);

impl Params {
    /// Collapses the sequence into a name-keyed map, last insertion winning.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        for param in &self.0 {
            map.insert(param.name.clone(), param.value.clone());
        }
        map
    }

    /// Number of params in the sequence, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the sequence holds no params.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the params in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }
}

impl From<Vec<Param>> for Params {
    fn from(params: Vec<Param>) -> Self {
        Self(params)
    }
}

impl FromIterator<Param> for Params {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Params {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Built-in attribute triples
// ---------------------------------------------------------------------------

fn string_param(fault: &Fault, key: &str) -> Option<String> {
    match fault.get(key)? {
        FieldRef::Param(value) => value.as_str().map(str::to_owned),
        _ => None,
    }
}

/// Key of the identifier attribute.
pub const KEY_ID: &str = "Id";

/// Attaches an identifier to an error.
#[must_use]
pub fn with_id(id: impl Into<String>) -> Param {
    Param::new(KEY_ID, id.into())
}

/// Reads the identifier attribute back, if present and string-valued.
#[must_use]
pub fn get_id(fault: &Fault) -> Option<String> {
    string_param(fault, KEY_ID)
}

/// Key of the resource attribute.
pub const KEY_RESOURCE: &str = "Resource";

/// Names the resource an error is about.
#[must_use]
pub fn with_resource(resource: impl Into<String>) -> Param {
    Param::new(KEY_RESOURCE, resource.into())
}

/// Reads the resource attribute back, if present and string-valued.
#[must_use]
pub fn get_resource(fault: &Fault) -> Option<String> {
    string_param(fault, KEY_RESOURCE)
}

/// Key of the reason attribute.
pub const KEY_REASON: &str = "Reason";

/// Attaches a human-readable reason to an error.
#[must_use]
pub fn with_reason(reason: impl Into<String>) -> Param {
    Param::new(KEY_REASON, reason.into())
}

/// Reads the reason attribute back, if present and string-valued.
#[must_use]
pub fn get_reason(fault: &Fault) -> Option<String> {
    string_param(fault, KEY_REASON)
}

/// Key of the precondition attribute.
pub const KEY_PRECONDITION: &str = "Precondition";

/// Names the precondition that failed or is required.
#[must_use]
pub fn with_precondition(precondition: impl Into<String>) -> Param {
    Param::new(KEY_PRECONDITION, precondition.into())
}

/// Reads the precondition attribute back, if present and string-valued.
#[must_use]
pub fn get_precondition(fault: &Fault) -> Option<String> {
    string_param(fault, KEY_PRECONDITION)
}

/// Key of the validation-errors attribute.
pub const KEY_VALIDATION_ERRORS: &str = "Errors";

/// Attaches a field → message validation map to an error.
#[must_use]
pub fn with_validation_errors<I, K, V>(errors: I) -> Param
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let entries: serde_json::Map<String, Value> = errors
        .into_iter()
        .map(|(field, message)| (field.into(), Value::String(message.into())))
        .collect();
    Param::new(KEY_VALIDATION_ERRORS, Value::Object(entries))
}

/// Reads the validation map back; `None` unless every entry is string-valued.
#[must_use]
pub fn get_validation_errors(fault: &Fault) -> Option<BTreeMap<String, String>> {
    let FieldRef::Param(value) = fault.get(KEY_VALIDATION_ERRORS)? else {
        return None;
    };
    let entries = value.as_object()?;
    let mut errors = BTreeMap::new();
    for (field, message) in entries {
        errors.insert(field.clone(), message.as_str()?.to_owned());
    }
    Some(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_map_keeps_the_last_duplicate() {
        let params: Params = [
            Param::new("Id", "first"),
            Param::new("Reason", "because"),
            Param::new("Id", "second"),
        ]
        .into_iter()
        .collect();
        let map = params.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["Id"], json!("second"));
        assert_eq!(map["Reason"], json!("because"));
    }

    #[test]
    fn validation_errors_build_an_object() {
        let param = with_validation_errors([("field1", "required"), ("field2", "too long")]);
        assert_eq!(param.name, KEY_VALIDATION_ERRORS);
        assert_eq!(
            param.value,
            json!({"field1": "required", "field2": "too long"})
        );
    }
}
