//! Field descriptor sets and the record marshaller.
//!
//! # Responsibility
//! - Describe how one output record is produced from one entity.
//! - Evaluate descriptors in declaration order into an ordered JSON map.
//!
//! # Invariants
//! - `marshal` output has exactly the descriptor set's keys, in order.
//! - Descriptor evaluation is pure; entries share no mutable state.
//! - Post-processors are skipped when the path walk short-circuits.

use crate::api::path::{format_iso8601, read, walk, Attr, AttrPath, Resolve, Walk};
use chrono::NaiveTime;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ordered output record.
pub type Record = Map<String, Value>;

/// Converts a resolved attribute into an output value.
pub type PostProcessor = for<'a> fn(Attr<'a>) -> Result<Value, FieldError>;

/// Descriptor evaluation failure.
///
/// Every variant points at a malformed descriptor or an entity that does not
/// expose what a descriptor expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    UnknownAttribute {
        path: String,
        entity: &'static str,
        segment: String,
    },
    NotTraversable {
        path: String,
        segment: String,
        found: &'static str,
    },
    NotScalar {
        path: String,
        found: &'static str,
    },
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAttribute {
                path,
                entity,
                segment,
            } => write!(f, "{entity} has no attribute `{segment}` (path `{path}`)"),
            Self::NotTraversable {
                path,
                segment,
                found,
            } => write!(f, "cannot read `{segment}` off a {found} value (path `{path}`)"),
            Self::NotScalar { path, found } => {
                write!(f, "path `{path}` resolved to a {found}, expected a scalar")
            }
            Self::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "field `{key}` expected {expected}, found {found}"),
        }
    }
}

impl Error for FieldError {}

/// Scalar coercion applied by typed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// Null coerces to `0`.
    Integer,
    String,
    /// ISO-8601 without offset.
    DateTime,
}

/// One descriptor rule.
#[derive(Clone)]
pub enum Field {
    /// Fixed value, the entity is not read.
    Constant(Value),
    /// Attribute named like the output key, coerced to a scalar type.
    Typed(Scalar),
    /// Resolved path, emitted verbatim.
    Path(AttrPath),
    /// Resolved path passed through a post-processor.
    PathWith(AttrPath, PostProcessor),
    /// Attribute named like the output key, marshalled with another set.
    Nested(&'static FieldSet),
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Typed(scalar) => f.debug_tuple("Typed").field(scalar).finish(),
            Self::Path(path) => f.debug_tuple("Path").field(&path.as_str()).finish(),
            Self::PathWith(path, _) => f.debug_tuple("PathWith").field(&path.as_str()).finish(),
            Self::Nested(set) => f.debug_tuple("Nested").field(&set.name()).finish(),
        }
    }
}

/// Named, ordered mapping from output key to descriptor rule.
#[derive(Debug, Clone)]
pub struct FieldSet {
    name: &'static str,
    fields: Vec<(&'static str, Field)>,
}

impl FieldSet {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Output keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, field)| field)
    }

    /// Appends a descriptor. A repeated key replaces the earlier rule in place.
    pub fn field(mut self, key: &'static str, field: Field) -> Self {
        match self.fields.iter_mut().find(|(candidate, _)| *candidate == key) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((key, field)),
        }
        self
    }

    pub fn constant(self, key: &'static str, value: Value) -> Self {
        self.field(key, Field::Constant(value))
    }

    pub fn integer(self, key: &'static str) -> Self {
        self.field(key, Field::Typed(Scalar::Integer))
    }

    pub fn string(self, key: &'static str) -> Self {
        self.field(key, Field::Typed(Scalar::String))
    }

    pub fn datetime(self, key: &'static str) -> Self {
        self.field(key, Field::Typed(Scalar::DateTime))
    }

    pub fn path(self, key: &'static str, path: &str) -> Self {
        self.field(key, Field::Path(AttrPath::new(path)))
    }

    pub fn path_with(self, key: &'static str, path: &str, post: PostProcessor) -> Self {
        self.field(key, Field::PathWith(AttrPath::new(path), post))
    }

    pub fn nested(self, key: &'static str, set: &'static FieldSet) -> Self {
        self.field(key, Field::Nested(set))
    }
}

/// Applies `set` to `object`, producing one ordered record.
///
/// # Errors
/// Returns the first `FieldError` raised by a malformed descriptor.
pub fn marshal(set: &FieldSet, object: &dyn Resolve) -> Result<Record, FieldError> {
    let mut record = Record::new();
    for (key, field) in &set.fields {
        let value = evaluate(key, field, object)?;
        record.insert((*key).to_string(), value);
    }
    Ok(record)
}

/// Applies `set` to every object in order.
pub fn marshal_all<'a, T, I>(set: &FieldSet, objects: I) -> Result<Vec<Value>, FieldError>
where
    T: Resolve + 'a,
    I: IntoIterator<Item = &'a T>,
{
    objects
        .into_iter()
        .map(|object| marshal(set, object).map(Value::Object))
        .collect()
}

fn evaluate(key: &str, field: &Field, object: &dyn Resolve) -> Result<Value, FieldError> {
    match field {
        Field::Constant(value) => Ok(value.clone()),
        Field::Typed(scalar) => {
            let path = AttrPath::new(key);
            let value = read(&path, object, key)?;
            coerce(key, *scalar, value)
        }
        Field::Path(path) => match walk(path, object)? {
            Walk::Reached(value) => value.to_json(path),
            Walk::ShortCircuited => Ok(Value::Null),
        },
        Field::PathWith(path, post) => match walk(path, object)? {
            Walk::Reached(value) => post(value),
            Walk::ShortCircuited => Ok(Value::Null),
        },
        Field::Nested(set) => {
            let path = AttrPath::new(key);
            match read(&path, object, key)? {
                Attr::Null => Ok(Value::Null),
                Attr::Node(node) => marshal(set, node).map(Value::Object),
                Attr::List(items) => items
                    .into_iter()
                    .map(|item| marshal(set, item).map(Value::Object))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                other => Err(FieldError::TypeMismatch {
                    key: key.to_string(),
                    expected: "object",
                    found: other.kind(),
                }),
            }
        }
    }
}

fn coerce(key: &str, scalar: Scalar, value: Attr<'_>) -> Result<Value, FieldError> {
    let mismatch = |expected: &'static str, found: &Attr<'_>| FieldError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.kind(),
    };

    match scalar {
        Scalar::Integer => match value {
            Attr::Null => Ok(Value::from(0)),
            Attr::Int(number) => Ok(Value::from(number)),
            Attr::Bool(flag) => Ok(Value::from(i64::from(flag))),
            Attr::Str(text) => text
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| mismatch("integer", &value)),
            other => Err(mismatch("integer", &other)),
        },
        Scalar::String => match value {
            Attr::Null => Ok(Value::Null),
            Attr::Str(text) => Ok(Value::String(text.to_string())),
            Attr::Int(number) => Ok(Value::String(number.to_string())),
            Attr::Bool(flag) => Ok(Value::String(flag.to_string())),
            Attr::Date(_) | Attr::Time(_) | Attr::DateTime(_) => {
                value.to_json(&AttrPath::new(key))
            }
            other => Err(mismatch("string", &other)),
        },
        Scalar::DateTime => match value {
            Attr::Null => Ok(Value::Null),
            Attr::DateTime(stamp) => Ok(Value::String(format_iso8601(stamp))),
            Attr::Date(date) => Ok(Value::String(format_iso8601(date.and_time(NaiveTime::MIN)))),
            other => Err(mismatch("datetime", &other)),
        },
    }
}
