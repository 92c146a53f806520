// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message templates.
//!
//! A [`Template`] pairs a stable [`Code`] with a message renderer and a set of
//! default params. Renderers are built once, at template definition time,
//! either from a compiled text [`Pattern`] or from an arbitrary closure for
//! messages that branch on param presence.

use crate::error::Code;
use crate::params::{Param, Params};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Params as seen by a message renderer: merged defaults and call-site values.
pub type ParamMap = BTreeMap<String, Value>;

type RenderFn = Arc<dyn Fn(&ParamMap) -> String + Send + Sync>;

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A message pattern compiled into literal and placeholder segments.
///
/// Syntax: `{Name}` substitutes the named param, `{Name|fallback}` substitutes
/// the fallback text when the param is absent or null, and `{{` / `}}` escape
/// literal braces. A missing param without a fallback renders as the empty
/// string, never an error.
///
/// Compilation panics on malformed input: patterns are developer-authored
/// constants, not user input.
#[derive(Clone, Debug)]
pub struct Pattern {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Placeholder {
        name: String,
        fallback: Option<String>,
    },
}

impl Pattern {
    /// Compiles `pattern` into a reusable renderer.
    ///
    /// # Panics
    ///
    /// Panics on an unclosed placeholder, a stray `}`, or an empty
    /// placeholder name.
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    assert!(closed, "unclosed placeholder in message pattern {pattern:?}");
                    let (name, fallback) = match body.split_once('|') {
                        Some((name, fallback)) => (name.trim(), Some(fallback.to_owned())),
                        None => (body.trim(), None),
                    };
                    assert!(
                        !name.is_empty(),
                        "empty placeholder name in message pattern {pattern:?}"
                    );
                    segments.push(Segment::Placeholder {
                        name: name.to_owned(),
                        fallback,
                    });
                }
                '}' => panic!("stray '}}' in message pattern {pattern:?}"),
                c => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Self { segments }
    }

    /// Renders the pattern against `params`.
    #[must_use]
    pub fn render(&self, params: &ParamMap) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, fallback } => match params.get(name) {
                    None | Some(Value::Null) => {
                        if let Some(fallback) = fallback {
                            out.push_str(fallback);
                        }
                    }
                    Some(value) => out.push_str(&display_value(value)),
                },
            }
        }
        out
    }
}

/// Bare-text rendering of a param value for message insertion: strings
/// unquoted, null empty, everything else in its compact JSON form.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A (code, message renderer, default params) triple used to construct
/// [`Fault`](crate::Fault)s uniformly.
#[derive(Clone)]
pub struct Template {
    code: Code,
    render: RenderFn,
    defaults: Params,
}

impl Template {
    /// Builds a template whose message is the compiled `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is malformed; see [`Pattern::compile`].
    #[must_use]
    pub fn new(code: impl Into<Code>, pattern: &str) -> Self {
        let compiled = Pattern::compile(pattern);
        Self {
            code: code.into(),
            render: Arc::new(move |params| compiled.render(params)),
            defaults: Params::default(),
        }
    }

    /// Builds a template with an arbitrary renderer, for messages that branch
    /// on param presence.
    #[must_use]
    pub fn from_fn<F>(code: impl Into<Code>, render: F) -> Self
    where
        F: Fn(&ParamMap) -> String + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            render: Arc::new(render),
            defaults: Params::default(),
        }
    }

    /// Replaces the default params merged under call-site params.
    #[must_use]
    pub fn with_defaults(mut self, defaults: impl IntoIterator<Item = Param>) -> Self {
        self.defaults = defaults.into_iter().collect();
        self
    }

    /// The stable code errors built from this template carry.
    #[must_use]
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Default params, merged under call-site params on construction.
    #[must_use]
    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// Renders the message for `params`.
    #[must_use]
    pub fn render(&self, params: &ParamMap) -> String {
        (self.render)(params)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}
