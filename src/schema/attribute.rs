//! Attributes and attribute declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An attribute as delivered by the reader.
///
/// The name is absent for a minimized attribute, where only the value was
/// written (`<doc b>`). Validation rewrites minimized attributes to their
/// named form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: Option<String>,
    pub value: String,
}

impl Attribute {
    /// A named attribute. The name is lower-cased.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.to_lowercase()),
            value: value.into(),
        }
    }

    /// A minimized attribute, a bare value.
    pub fn minimized(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn is_minimized(&self) -> bool {
        self.name.is_none()
    }

    /// Value of the first attribute called `name` in `attributes`.
    pub fn value_of<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
        attributes
            .iter()
            .find(|attr| {
                attr.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|attr| attr.value.as_str())
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}={}", Quoted(&self.value)),
            None => f.write_str(&self.value),
        }
    }
}

/// True if the reader reads `value` back unquoted as a single token.
fn reads_bare(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with(['"', '\''])
        && !value
            .chars()
            .any(|c| c <= ' ' || matches!(c, '<' | '>' | '[' | ']' | ';' | '=' | '/'))
}

/// Renders a value in double quotes, or single quotes if it contains a
/// double quote. A value holding both quote kinds cannot be quoted and is
/// written bare.
pub(crate) struct Quoted<'a>(pub &'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.contains('"'), self.0.contains('\'')) {
            (true, true) => f.write_str(self.0),
            (true, false) => write!(f, "'{}'", self.0),
            _ => write!(f, "\"{}\"", self.0),
        }
    }
}

/// Renders a value bare when the reader would read it back as one token,
/// quoted otherwise.
pub(crate) struct Bare<'a>(pub &'a str);

impl fmt::Display for Bare<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if reads_bare(self.0) && !self.0.contains(['"', '\'']) {
            f.write_str(self.0)
        } else {
            write!(f, "{}", Quoted(self.0))
        }
    }
}

/// Declaration of an attribute permitted on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    name: String,
    values: Vec<String>,
    default: String,
    required: bool,
}

impl AttributeDecl {
    /// An optional, unconstrained attribute without default.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            values: Vec::new(),
            default: String::new(),
            required: false,
        }
    }

    /// Restrict the attribute to the given values (compared case-insensitively).
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.values = values
            .into_iter()
            .map(|value| value.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Value implied when the attribute is not given.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// True if the attribute has a list of permitted values.
    pub fn is_constrained(&self) -> bool {
        !self.values.is_empty()
    }

    /// True if `value` is one of the permitted values, or is empty and the
    /// attribute is optional.
    ///
    /// Used to resolve minimized attributes, so an unconstrained declaration
    /// never claims a bare value.
    pub fn has_value(&self, value: &str) -> bool {
        if !self.required && value.is_empty() {
            return true;
        }
        let value = value.to_lowercase();
        self.values.iter().any(|permitted| *permitted == value)
    }

    /// True if `value` is valid for this attribute.
    pub fn permits(&self, value: &str) -> bool {
        !self.is_constrained() || self.has_value(value)
    }
}

impl fmt::Display for AttributeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<attribute name={}", Bare(&self.name))?;
        if self.is_constrained() {
            write!(f, " values={}", Quoted(&self.values.join(",")))?;
        }
        if !self.default.is_empty() {
            write!(f, " default={}", Quoted(&self.default))?;
        }
        if self.required {
            f.write_str(" required")?;
        }
        f.write_str(">")
    }
}
