//! # Document Instances
//!
//! A `DocumentInstance` is the caller's snapshot of one document: a JSON
//! object whose members are the document's top-level fields. The engine only
//! ever reads it.
//!
//! Members whose names start with `_` (`_id`, `_type`, `_rev`, ...) are
//! system keys owned by the hosting application; they are never schema
//! fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DocumentError;
use crate::path::{FieldPath, PathSegment};

/// An in-memory document snapshot supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct DocumentInstance {
    members: Map<String, Value>,
}

impl DocumentInstance {
    /// Wrap an already-parsed JSON object.
    pub fn new(members: Map<String, Value>) -> Self {
        Self { members }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(members) => Ok(Self { members }),
            other => Err(DocumentError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }

    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DocumentError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    /// The document's members.
    pub fn members(&self) -> &Map<String, Value> {
        &self.members
    }

    /// The document identity (`_id`), if present.
    pub fn id(&self) -> Option<&str> {
        self.members.get("_id").and_then(Value::as_str)
    }

    /// The declared document type (`_type`), if present.
    pub fn type_name(&self) -> Option<&str> {
        self.members.get("_type").and_then(Value::as_str)
    }

    /// Raw value at `path`, without applying any schema defaults.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.segments().iter();
        let first = match segments.next()? {
            PathSegment::Field(name) => self.members.get(name)?,
            PathSegment::Index(_) => return None,
        };
        segments.try_fold(first, |value, segment| match segment {
            PathSegment::Field(name) => value.as_object()?.get(name),
            PathSegment::Index(index) => value.as_array()?.get(*index),
        })
    }

    /// Consume the instance, returning the underlying object.
    pub fn into_members(self) -> Map<String, Value> {
        self.members
    }
}

impl TryFrom<Value> for DocumentInstance {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<DocumentInstance> for Value {
    fn from(doc: DocumentInstance) -> Self {
        Value::Object(doc.members)
    }
}

impl From<Map<String, Value>> for DocumentInstance {
    fn from(members: Map<String, Value>) -> Self {
        Self::new(members)
    }
}

/// Whether a member name is a system key rather than a schema field.
pub fn is_system_key(name: &str) -> bool {
    name.starts_with('_')
}

/// Human-readable name of a JSON value's type.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
