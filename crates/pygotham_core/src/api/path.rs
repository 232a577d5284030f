//! Attribute access and dotted-path resolution.
//!
//! # Responsibility
//! - Define the `Resolve` contract every serializable entity implements.
//! - Walk dotted attribute paths with null short-circuit semantics.
//!
//! # Invariants
//! - Paths are split once, when the descriptor that owns them is built.
//! - A null reached before the last segment ends the walk with null.
//! - Unknown attributes are reported as `FieldError`, never as null.

use crate::api::fields::FieldError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde_json::Value;

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
const ISO_TIME_FORMAT: &str = "%H:%M:%S";
const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const ISO_DATETIME_MICROS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Explicit attribute interface for entities exposed through field sets.
pub trait Resolve {
    /// Entity name used in diagnostics.
    fn entity_name(&self) -> &'static str;

    /// Reads one attribute by name.
    ///
    /// Returns `None` when the entity has no attribute called `name`.
    fn attr(&self, name: &str) -> Option<Attr<'_>>;
}

/// Attribute value read off an entity.
#[derive(Clone)]
pub enum Attr<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'a str),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Related entity, traversable by further path segments.
    Node(&'a dyn Resolve),
    /// Related collection.
    List(Vec<&'a dyn Resolve>),
}

impl std::fmt::Debug for Attr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::Str(value) => f.debug_tuple("Str").field(value).finish(),
            Self::Date(value) => f.debug_tuple("Date").field(value).finish(),
            Self::Time(value) => f.debug_tuple("Time").field(value).finish(),
            Self::DateTime(value) => f.debug_tuple("DateTime").field(value).finish(),
            Self::Node(node) => f.debug_tuple("Node").field(&node.entity_name()).finish(),
            Self::List(items) => f.debug_tuple("List").field(&items.len()).finish(),
        }
    }
}

impl<'a> Attr<'a> {
    /// Wraps an optional relation.
    pub fn node<T: Resolve>(value: Option<&'a T>) -> Self {
        match value {
            Some(node) => Self::Node(node),
            None => Self::Null,
        }
    }

    /// Wraps a loaded collection.
    pub fn list<T: Resolve>(items: &'a [T]) -> Self {
        Self::List(items.iter().map(|item| item as &dyn Resolve).collect())
    }

    /// Wraps an optional string column.
    pub fn opt_str(value: Option<&'a str>) -> Self {
        value.map_or(Self::Null, Self::Str)
    }

    /// Wraps an optional boolean column.
    pub fn opt_bool(value: Option<bool>) -> Self {
        value.map_or(Self::Null, Self::Bool)
    }

    /// Wraps an optional integer column.
    pub fn opt_int(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Int)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type label for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
            Self::Date(_) => "date",
            Self::Time(_) => "time",
            Self::DateTime(_) => "datetime",
            Self::Node(_) => "object",
            Self::List(_) => "list",
        }
    }

    /// Converts a scalar attribute into its JSON form.
    ///
    /// Relations have no verbatim JSON form and are rejected.
    pub fn to_json(&self, path: &AttrPath) -> Result<Value, FieldError> {
        match self {
            Self::Null => Ok(Value::Null),
            Self::Bool(value) => Ok(Value::Bool(*value)),
            Self::Int(value) => Ok(Value::from(*value)),
            Self::Str(value) => Ok(Value::String((*value).to_string())),
            Self::Date(value) => Ok(Value::String(format_iso_date(*value))),
            Self::Time(value) => Ok(Value::String(value.format(ISO_TIME_FORMAT).to_string())),
            Self::DateTime(value) => Ok(Value::String(format_iso8601(*value))),
            Self::Node(_) | Self::List(_) => Err(FieldError::NotScalar {
                path: path.as_str().to_string(),
                found: self.kind(),
            }),
        }
    }
}

/// Dotted attribute path, split into segments at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPath {
    raw: String,
    segments: Vec<String>,
}

impl AttrPath {
    pub fn new(path: &str) -> Self {
        Self {
            raw: path.to_string(),
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// Outcome of a path walk that keeps short-circuits distinguishable.
pub(crate) enum Walk<'a> {
    /// Every segment was read; the last read value (possibly null).
    Reached(Attr<'a>),
    /// An intermediate segment was null.
    ShortCircuited,
}

/// Resolves `path` against `root`.
///
/// Returns `Attr::Null` when any segment before the last yields null.
///
/// # Errors
/// - `FieldError::UnknownAttribute` when a segment names no attribute.
/// - `FieldError::NotTraversable` when a segment is read off a scalar.
pub fn resolve<'a>(path: &AttrPath, root: &'a dyn Resolve) -> Result<Attr<'a>, FieldError> {
    match walk(path, root)? {
        Walk::Reached(value) => Ok(value),
        Walk::ShortCircuited => Ok(Attr::Null),
    }
}

pub(crate) fn walk<'a>(path: &AttrPath, root: &'a dyn Resolve) -> Result<Walk<'a>, FieldError> {
    let (first, rest) = match path.segments().split_first() {
        Some(parts) => parts,
        None => return Err(unknown(path, root, "")),
    };

    let mut value = read(path, root, first)?;
    for segment in rest {
        value = match value {
            Attr::Null => return Ok(Walk::ShortCircuited),
            Attr::Node(node) => read(path, node, segment)?,
            other => {
                return Err(FieldError::NotTraversable {
                    path: path.as_str().to_string(),
                    segment: segment.clone(),
                    found: other.kind(),
                })
            }
        };
    }

    Ok(Walk::Reached(value))
}

/// Reads a single attribute off `node`.
pub(crate) fn read<'a>(
    path: &AttrPath,
    node: &'a dyn Resolve,
    segment: &str,
) -> Result<Attr<'a>, FieldError> {
    node.attr(segment)
        .ok_or_else(|| unknown(path, node, segment))
}

fn unknown(path: &AttrPath, node: &dyn Resolve, segment: &str) -> FieldError {
    FieldError::UnknownAttribute {
        path: path.as_str().to_string(),
        entity: node.entity_name(),
        segment: segment.to_string(),
    }
}

/// Formats a timestamp as ISO-8601 without offset.
///
/// Whole seconds print as `YYYY-MM-DDTHH:MM:SS`; any fraction prints as
/// exactly six digits (`.ffffff`).
pub fn format_iso8601(value: NaiveDateTime) -> String {
    let format = if value.nanosecond() == 0 {
        ISO_DATETIME_FORMAT
    } else {
        ISO_DATETIME_MICROS_FORMAT
    };
    value.format(format).to_string()
}

pub(crate) fn format_iso_date(value: NaiveDate) -> String {
    value.format(ISO_DATE_FORMAT).to_string()
}
