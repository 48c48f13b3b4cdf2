//! Records shown by list components and the dotted field paths used to bind them.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while preparing bindings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("empty field path")]
    EmptyPath,

    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),

    #[error("unclosed placeholder in template '{0}'")]
    UnclosedPlaceholder(String),

    #[error("unmatched '}}' in template '{0}'")]
    UnmatchedBrace(String),
}

/// A parsed `a.b.c` style lookup path into a record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path
    pub fn parse(path: &str) -> Result<Self, BindingError> {
        let path = path.trim();
        if path.is_empty() {
            return Err(BindingError::EmptyPath);
        }

        let segments: Vec<String> = path.split('.').map(|s| s.trim().to_string()).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(BindingError::EmptySegment(path.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl FromStr for FieldPath {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Capabilities an item needs to be paginated, bound and selected.
///
/// Selection compares records by value rather than identity because the
/// backing data may be reloaded between a click and its resolution.
pub trait Record: Clone + Send + Sync {
    /// Project a field into display text, `None` when the path does not resolve
    fn lookup(&self, path: &FieldPath) -> Option<String>;

    /// Deep value equality
    fn same_record(&self, other: &Self) -> bool;

    /// Serialized identity stamped on the slot the record is bound to
    fn identity(&self) -> String;
}

impl Record for Value {
    fn lookup(&self, path: &FieldPath) -> Option<String> {
        let mut current = self;
        for segment in path.segments() {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(values) => values.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        match current {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn same_record(&self, other: &Self) -> bool {
        self == other
    }

    fn identity(&self) -> String {
        self.to_string()
    }
}
