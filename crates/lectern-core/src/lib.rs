//! # lectern-core: Foundational Types for Lectern
//!
//! This crate holds the vocabulary every other Lectern crate speaks: the
//! closed set of field kinds and what each intrinsically accepts, addresses of
//! values inside documents, the document snapshot itself, finding severities,
//! and the schema error taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **Single `FieldKind` enum.** One definition, 13 variants, exhaustive
//!    `match` everywhere. Kind names outside the vocabulary fail when parsed,
//!    so an unknown kind can never reach the registry.
//!
//! 2. **Options are typed per kind.** Flat option declarations resolve into
//!    [`KindOptions`]; an option that does not apply to the kind is refused
//!    before any schema tree exists.
//!
//! 3. **`FieldPath` is structured.** Paths are segment sequences, not
//!    strings, so array indices and field names can never be confused.
//!
//! 4. **Documents are read-only snapshots.** Nothing in Lectern mutates a
//!    [`DocumentInstance`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lectern-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No logging; observability belongs to the hosting application.

pub mod document;
pub mod error;
pub mod kind;
pub mod options;
pub mod path;
pub mod registry;
pub mod severity;
pub mod text;

// Re-export primary types for ergonomic imports.
pub use document::DocumentInstance;
pub use error::{DocumentError, LecternError, PathError, SchemaDefinitionError};
pub use kind::{FieldKind, UnknownKind, FIELD_KIND_COUNT};
pub use options::{Choice, KindOptions, MediaFilter, OptionsSpec};
pub use path::{FieldPath, PathSegment};
pub use registry::{describe, Emptiness, FieldKindDescriptor, JsonType, Shape};
pub use severity::{Severity, UnknownSeverity};
