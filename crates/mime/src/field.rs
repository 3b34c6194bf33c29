//! Form field trees and their flattening into bracketed names.
//!
//! A [`Fields`] collection is an ordered list of `(key, value)` entries where a
//! value is a scalar, a ready-made [`BodyPart`], or another collection.
//! [`flatten`] walks the tree depth-first in declaration order and names every
//! leaf the way HTML form submission does:
//!
//! ```text
//! foo                      -> foo
//! bar { baz [ V0, qux: V1 ] } -> bar[baz][0], bar[baz][qux]
//! ```
//!
//! Positional keys always render their index; they are never collapsed to `[]`.

use crate::ensure;
use crate::part::BodyPart;
use crate::protocol::MultipartError;
use std::fmt;

/// Key of a collection entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// array-like position
    Index(usize),
    /// map-like name
    Name(String),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Index(i) => write!(f, "{i}"),
            FieldKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        FieldKey::Index(index)
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        FieldKey::Name(name.to_owned())
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Name(name)
    }
}

/// A node of the field tree.
///
/// Scalars are text: they are sent as `text/plain; charset=utf-8`. Binary
/// values belong in a [`BodyPart::data`] leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(String),
    Leaf(BodyPart),
    Collection(Fields),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<BodyPart> for FieldValue {
    fn from(part: BodyPart) -> Self {
        FieldValue::Leaf(part)
    }
}

impl From<Fields> for FieldValue {
    fn from(fields: Fields) -> Self {
        FieldValue::Collection(fields)
    }
}

impl TryFrom<serde_json::Value> for FieldValue {
    type Error = MultipartError;

    /// Strings, numbers and booleans become scalars, arrays and objects become
    /// collections; `null` has no form representation and is rejected.
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Err(MultipartError::invalid_field("null has no form-data representation")),
            Value::Bool(b) => Ok(FieldValue::from(b.to_string())),
            Value::Number(n) => Ok(FieldValue::from(n.to_string())),
            Value::String(s) => Ok(FieldValue::from(s)),
            v @ (Value::Array(_) | Value::Object(_)) => Fields::try_from(v).map(FieldValue::Collection),
        }
    }
}

/// An ordered collection of form fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields {
    entries: Vec<(FieldKey, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends an entry under an explicit key
    pub fn with(mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Appends an entry under the next free position, like `$array[] = ...`
    pub fn with_item(mut self, value: impl Into<FieldValue>) -> Self {
        self.push(value);
        self
    }

    pub fn insert(&mut self, key: impl Into<FieldKey>, value: impl Into<FieldValue>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn push(&mut self, value: impl Into<FieldValue>) {
        let next = self
            .entries
            .iter()
            .filter_map(|(key, _)| match key {
                FieldKey::Index(i) => Some(i + 1),
                FieldKey::Name(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.entries.push((FieldKey::Index(next), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<K: Into<FieldKey>, V: Into<FieldValue>> FromIterator<(K, V)> for Fields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

impl IntoIterator for Fields {
    type Item = (FieldKey, FieldValue);
    type IntoIter = std::vec::IntoIter<(FieldKey, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl TryFrom<serde_json::Value> for Fields {
    type Error = MultipartError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        let mut fields = Fields::new();
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    fields.insert(key, FieldValue::try_from(value)?);
                }
            }
            Value::Array(values) => {
                for (i, value) in values.into_iter().enumerate() {
                    fields.insert(i, FieldValue::try_from(value)?);
                }
            }
            other => {
                return Err(MultipartError::invalid_field(format!("expected an object or an array, found `{other}`")));
            }
        }
        Ok(fields)
    }
}

/// A flattened leaf: either a plain value or a prebuilt part.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldLeaf {
    Scalar(String),
    Part(BodyPart),
}

/// Flattens `fields` into `(name, leaf)` pairs in traversal order.
///
/// Fails with [`MultipartError::InvalidField`] when a key is empty or contains
/// a line break or NUL, since such a name cannot be carried in a header.
pub fn flatten(fields: Fields) -> Result<Vec<(String, FieldLeaf)>, MultipartError> {
    let mut out = Vec::with_capacity(fields.len());
    flatten_into(fields, None, &mut out)?;
    Ok(out)
}

fn flatten_into(fields: Fields, prefix: Option<&str>, out: &mut Vec<(String, FieldLeaf)>) -> Result<(), MultipartError> {
    for (key, value) in fields {
        if let FieldKey::Name(name) = &key {
            ensure!(!name.is_empty(), MultipartError::invalid_field(format!("empty key under `{}`", prefix.unwrap_or(""))));
            ensure!(
                !name.contains(['\r', '\n', '\0']),
                MultipartError::invalid_field(format!("key {name:?} contains a control character"))
            );
        }

        let name = match prefix {
            Some(prefix) => format!("{prefix}[{key}]"),
            None => key.to_string(),
        };

        match value {
            FieldValue::Scalar(bytes) => out.push((name, FieldLeaf::Scalar(bytes))),
            FieldValue::Leaf(part) => out.push((name, FieldLeaf::Part(part))),
            FieldValue::Collection(children) => flatten_into(children, Some(&name), out)?,
        }
    }
    Ok(())
}
