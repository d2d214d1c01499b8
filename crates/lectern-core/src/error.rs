//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types shared across Lectern. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Schema definition errors are raised only while document types are being
//!   built at startup. Each names the offending field path.
//! - Validation failures are not errors: they are findings returned as data
//!   by the validation engine.
//! - Missing data during preview projection degrades to fallbacks and never
//!   surfaces here.

use thiserror::Error;

/// Top-level error type for Lectern.
#[derive(Error, Debug)]
pub enum LecternError {
    /// A document type could not be built.
    #[error("schema definition error: {0}")]
    SchemaDefinition(#[from] SchemaDefinitionError),

    /// A field path could not be parsed.
    #[error("path error: {0}")]
    Path(#[from] PathError),

    /// A document instance was malformed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A schema declaration violated a construction-time constraint.
///
/// The `path` of each variant is the dotted field path from the document
/// type name, e.g. `doctor.contactInfo.email`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaDefinitionError {
    /// A field was declared without a name.
    #[error("{path}: field name must not be empty")]
    EmptyName {
        /// Path of the enclosing object.
        path: String,
    },

    /// A field name is not an identifier, or uses the reserved `_` prefix.
    #[error("{path}: invalid field name {name:?}")]
    InvalidName {
        /// Path of the enclosing object.
        path: String,
        /// The rejected name.
        name: String,
    },

    /// Two siblings share a name.
    #[error("{path}: duplicate field name {name:?}")]
    DuplicateField {
        /// Path of the enclosing object or array.
        path: String,
        /// The repeated name.
        name: String,
    },

    /// The declared kind is not part of the vocabulary.
    #[error("{path}: unknown field kind {kind:?}")]
    UnknownKind {
        /// Path of the offending field.
        path: String,
        /// The unrecognised kind name.
        kind: String,
    },

    /// Children were declared on a kind that cannot hold them.
    #[error("{path}: {kind} fields cannot declare {what}")]
    ChildrenNotAllowed {
        /// Path of the offending field.
        path: String,
        /// The field's kind.
        kind: String,
        /// Which declaration was misplaced (`fields`, `of`, `to`).
        what: &'static str,
    },

    /// An object field declared no members.
    #[error("{path}: object fields must declare at least one field")]
    EmptyObject {
        /// Path of the offending field.
        path: String,
    },

    /// An array field declared no item variants.
    #[error("{path}: array fields must declare at least one item variant")]
    EmptyArrayVariants {
        /// Path of the offending field.
        path: String,
    },

    /// A reference field named no target document types.
    #[error("{path}: reference fields must name at least one target type")]
    MissingReferenceTargets {
        /// Path of the offending field.
        path: String,
    },

    /// A reference names a document type that is not registered.
    #[error("{path}: reference target {target:?} is not a registered document type")]
    UnknownReferenceTarget {
        /// Path of the offending field.
        path: String,
        /// The unregistered type name.
        target: String,
    },

    /// A kind option is malformed or does not apply to the kind.
    #[error("{path}: invalid option: {reason}")]
    InvalidOption {
        /// Path of the offending field.
        path: String,
        /// What is wrong with the option.
        reason: String,
    },

    /// A validation rule does not apply to the field's kind.
    #[error("{path}: invalid rule: {reason}")]
    InvalidRule {
        /// Path of the offending field.
        path: String,
        /// What is wrong with the rule.
        reason: String,
    },

    /// A visibility predicate is malformed.
    #[error("{path}: invalid visibility predicate: {reason}")]
    InvalidPredicate {
        /// Path of the offending field.
        path: String,
        /// What is wrong with the predicate.
        reason: String,
    },

    /// The initial value does not fit the field's kind.
    #[error("{path}: invalid initial value: {reason}")]
    InvalidInitialValue {
        /// Path of the offending field.
        path: String,
        /// What is wrong with the value.
        reason: String,
    },

    /// A preview selection path does not resolve in the tree.
    #[error("{type_name}: preview {role} path {path:?} does not resolve: {reason}")]
    InvalidPreview {
        /// The document type being defined.
        type_name: String,
        /// Which role (`title`, `subtitle`, `media`).
        role: &'static str,
        /// The selection path as written.
        path: String,
        /// Why it does not resolve.
        reason: String,
    },

    /// Two document types share a name.
    #[error("duplicate document type {name:?}")]
    DuplicateType {
        /// The repeated type name.
        name: String,
    },

    /// A registration name differs from the tree's own name.
    #[error("document type registered as {registered:?} is named {actual:?}")]
    TypeNameMismatch {
        /// Name the tree was registered under.
        registered: String,
        /// Name the tree was defined with.
        actual: String,
    },
}

/// A field path string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("field path must not be empty")]
    Empty,

    /// A segment was neither a field name nor an index.
    #[error("invalid segment {segment:?} in field path {path:?}")]
    InvalidSegment {
        /// The full path string.
        path: String,
        /// The segment that failed to parse.
        segment: String,
    },
}

/// A document instance was malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document root must be a JSON object.
    #[error("document root must be an object, found {found}")]
    NotAnObject {
        /// JSON type actually found.
        found: &'static str,
    },

    /// The document text could not be parsed.
    #[error("document could not be parsed: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_error_names_path() {
        let err = SchemaDefinitionError::DuplicateField {
            path: "doctor.contactInfo".into(),
            name: "email".into(),
        };
        assert_eq!(err.to_string(), "doctor.contactInfo: duplicate field name \"email\"");
    }

    #[test]
    fn test_lectern_error_from_conversions() {
        let err: LecternError = SchemaDefinitionError::EmptyObject {
            path: "homePage.hero".into(),
        }
        .into();
        assert!(matches!(err, LecternError::SchemaDefinition(_)));
        assert!(err.to_string().starts_with("schema definition error: homePage.hero"));

        let err: LecternError = PathError::Empty.into();
        assert_eq!(err.to_string(), "path error: field path must not be empty");

        let err: LecternError = DocumentError::NotAnObject { found: "array" }.into();
        assert!(matches!(err, LecternError::Document(_)));
    }

    #[test]
    fn test_preview_error_message() {
        let err = SchemaDefinitionError::InvalidPreview {
            type_name: "seo".into(),
            role: "title",
            path: "heading".into(),
            reason: "no such field".into(),
        };
        assert_eq!(
            err.to_string(),
            "seo: preview title path \"heading\" does not resolve: no such field"
        );
    }
}
