//! # lectern-schema: Declarative Document Schemas
//!
//! Builds immutable schema trees from field declarations and derives three
//! behaviors from each tree: validation of document instances, conditional
//! field visibility, and preview summaries.
//!
//! ## Schema Trees (`field`, `tree`)
//!
//! [`define_document_type`] checks a [`DocumentTypeSpec`] and produces a
//! [`SchemaTree`]. All schema mistakes surface here, at startup, as
//! [`SchemaDefinitionError`](lectern_core::SchemaDefinitionError)s.
//!
//! ## Engine (`visibility`, `validate`, `preview`, `slug`)
//!
//! - [`validate()`]: ordered [`ValidationFinding`]s; hidden fields are exempt.
//! - [`evaluate_visibility`] / [`is_path_visible`]: predicate evaluation
//!   over materialized sibling values.
//! - [`project`]: title, subtitle and media for list views.
//! - [`suggest_slug`]: slug derived from the slug field's source.
//!
//! Every engine operation is a pure function of an immutable tree and a
//! caller-supplied document. None of them fail, log or allocate shared state.
//!
//! ## Catalog (`catalog`, `loader`)
//!
//! [`load_dir`] reads a schema directory into a [`Catalog`], which is
//! installed once per process and read from everywhere afterwards.
//!
//! ## Crate Policy
//!
//! - Depends only on `lectern-core` internally.
//! - Validation findings are data, never errors.
//! - No logging; observability belongs to the hosting application.

pub mod catalog;
pub mod field;
pub mod loader;
pub mod preview;
pub mod rule;
pub mod slug;
pub mod tree;
pub mod validate;
pub mod visibility;

pub use catalog::{Catalog, CatalogError};
pub use field::{define_field, FieldDefinition, FieldSpec};
pub use loader::{load_dir, load_type_file, LoadError};
pub use preview::{project, project_with, PreviewSelection, PreviewSummary};
pub use rule::{Constraint, Pattern, ValidationRule};
pub use slug::{suggest_slug, SlugTarget};
pub use tree::{define_document_type, define_object_type, DocumentTypeSpec, SchemaTree};
pub use validate::{validate, ValidationFinding, ValidationReport};
pub use visibility::{
    evaluate_visibility, is_path_visible, is_visible, FieldVisibility, ObjectScope,
    VisibilityPredicate,
};
