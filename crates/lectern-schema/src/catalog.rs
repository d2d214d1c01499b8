//! # Document Type Catalog
//!
//! Maps type names to their schema trees, in registration order, and routes
//! every engine operation to the right tree.
//!
//! ## Lifecycle
//!
//! A catalog is built once from ordered `(name, tree)` pairs. Building checks
//! that names are unique, that each name matches its tree, and that every
//! reference field targets a registered type. [`Catalog::install`] then
//! publishes it process-wide; from that point it is read-only and shared by
//! all callers without synchronization.

use indexmap::IndexMap;
use lectern_core::{DocumentInstance, FieldPath, SchemaDefinitionError};
use once_cell::sync::OnceCell;
use thiserror::Error;

use crate::preview::{self, PreviewSummary};
use crate::slug::{self, SlugTarget};
use crate::tree::SchemaTree;
use crate::validate::{self, ValidationReport};
use crate::visibility;

static CATALOG: OnceCell<Catalog> = OnceCell::new();

/// Errors from catalog lookups and installation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// [`Catalog::install`] was called twice.
    #[error("document type catalog is already installed")]
    AlreadyInstalled,

    /// [`Catalog::global`] was called before [`Catalog::install`].
    #[error("document type catalog has not been installed")]
    NotInstalled,

    /// No type is registered under the name.
    #[error("unknown document type {type_name:?}")]
    UnknownType {
        /// The requested name.
        type_name: String,
    },

    /// The path names no field of the type.
    #[error("document type {type_name:?} has no field at {path}")]
    UnknownField {
        /// The document type.
        type_name: String,
        /// The requested path.
        path: String,
    },

    /// The path names a field that is not a slug.
    #[error("{type_name}.{path} is not a slug field")]
    NotASlug {
        /// The document type.
        type_name: String,
        /// The requested path.
        path: String,
    },

    /// The document does not declare its type.
    #[error("document has no `_type` member")]
    MissingType,

    /// The catalog could not be built.
    #[error(transparent)]
    Definition(#[from] SchemaDefinitionError),
}

/// Registered document types, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: IndexMap<String, SchemaTree>,
}

impl Catalog {
    /// Build a catalog from `(name, tree)` pairs.
    pub fn from_types<I, S>(pairs: I) -> Result<Self, SchemaDefinitionError>
    where
        I: IntoIterator<Item = (S, SchemaTree)>,
        S: Into<String>,
    {
        let mut types = IndexMap::new();
        for (name, tree) in pairs {
            let name = name.into();
            if name != tree.name() {
                return Err(SchemaDefinitionError::TypeNameMismatch {
                    registered: name,
                    actual: tree.name().to_string(),
                });
            }
            if types.contains_key(&name) {
                return Err(SchemaDefinitionError::DuplicateType { name });
            }
            types.insert(name, tree);
        }

        for tree in types.values() {
            for (path, field) in tree.references() {
                if let Some(target) = field
                    .target_types()
                    .iter()
                    .find(|target| !types.contains_key(target.as_str()))
                {
                    return Err(SchemaDefinitionError::UnknownReferenceTarget {
                        path,
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(Self { types })
    }

    /// Build a catalog registering each tree under its own name.
    pub fn from_trees(trees: impl IntoIterator<Item = SchemaTree>) -> Result<Self, SchemaDefinitionError> {
        Self::from_types(trees.into_iter().map(|tree| (tree.name().to_string(), tree)))
    }

    /// Publish this catalog process-wide.
    pub fn install(self) -> Result<&'static Catalog, CatalogError> {
        CATALOG.set(self).map_err(|_| CatalogError::AlreadyInstalled)?;
        Self::global()
    }

    /// The installed catalog.
    pub fn global() -> Result<&'static Catalog, CatalogError> {
        CATALOG.get().ok_or(CatalogError::NotInstalled)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Registered trees, in registration order.
    pub fn trees(&self) -> impl Iterator<Item = &SchemaTree> {
        self.types.values()
    }

    /// The tree registered under `name`.
    pub fn get(&self, name: &str) -> Option<&SchemaTree> {
        self.types.get(name)
    }

    /// The tree registered under `name`, or `UnknownType`.
    pub fn tree(&self, name: &str) -> Result<&SchemaTree, CatalogError> {
        self.get(name).ok_or_else(|| CatalogError::UnknownType {
            type_name: name.to_string(),
        })
    }

    /// Validate `doc` as an instance of `type_name`.
    pub fn validate(&self, type_name: &str, doc: &DocumentInstance) -> Result<ValidationReport, CatalogError> {
        Ok(validate::validate(self.tree(type_name)?, doc))
    }

    /// Validate `doc` as an instance of the type named by its `_type`.
    pub fn validate_document(&self, doc: &DocumentInstance) -> Result<ValidationReport, CatalogError> {
        let type_name = doc.type_name().ok_or(CatalogError::MissingType)?;
        self.validate(type_name, doc)
    }

    /// Project `doc` with the preview selection of `type_name`.
    pub fn project(&self, type_name: &str, doc: &DocumentInstance) -> Result<PreviewSummary, CatalogError> {
        Ok(preview::project(self.tree(type_name)?, doc))
    }

    /// Whether the field at `path` of `type_name` is visible in `doc`.
    pub fn is_field_visible(
        &self,
        type_name: &str,
        path: &FieldPath,
        doc: &DocumentInstance,
    ) -> Result<bool, CatalogError> {
        let tree = self.tree(type_name)?;
        visibility::is_path_visible(tree, path, doc).ok_or_else(|| CatalogError::UnknownField {
            type_name: type_name.to_string(),
            path: path.to_string(),
        })
    }

    /// Suggest a slug for the slug field at `path` of `type_name`.
    pub fn suggest_slug(
        &self,
        type_name: &str,
        path: &FieldPath,
        doc: &DocumentInstance,
    ) -> Result<Option<String>, CatalogError> {
        let tree = self.tree(type_name)?;
        slug::suggest_slug(tree, path, doc).map_err(|target| match target {
            SlugTarget::Unresolved => CatalogError::UnknownField {
                type_name: type_name.to_string(),
                path: path.to_string(),
            },
            SlugTarget::NotASlug => CatalogError::NotASlug {
                type_name: type_name.to_string(),
                path: path.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::tree::define_object_type;
    use lectern_core::{FieldKind, Severity};
    use serde_json::json;

    fn doctor() -> SchemaTree {
        define_object_type(
            "doctor",
            vec![FieldSpec::new("name", FieldKind::String).required()],
        )
        .unwrap()
    }

    fn home_page() -> SchemaTree {
        define_object_type(
            "homePage",
            vec![FieldSpec::array(
                "featuredDoctors",
                vec![FieldSpec::reference("", ["doctor"])],
            )],
        )
        .unwrap()
    }

    fn doc(value: serde_json::Value) -> DocumentInstance {
        DocumentInstance::from_value(value).unwrap()
    }

    #[test]
    fn test_registration_order_preserved() {
        let catalog = Catalog::from_trees([home_page(), doctor()]).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["homePage", "doctor"]);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let err = Catalog::from_trees([doctor(), doctor()]).unwrap_err();
        assert_eq!(err, SchemaDefinitionError::DuplicateType { name: "doctor".into() });
    }

    #[test]
    fn test_name_mismatch_rejected() {
        let err = Catalog::from_types([("physician", doctor())]).unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::TypeNameMismatch { .. }));
    }

    #[test]
    fn test_reference_targets_must_be_registered() {
        let err = Catalog::from_trees([home_page()]).unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::UnknownReferenceTarget {
                path: "homePage.featuredDoctors.reference".into(),
                target: "doctor".into()
            }
        );
    }

    #[test]
    fn test_routes_to_type() {
        let catalog = Catalog::from_trees([doctor(), home_page()]).unwrap();
        let report = catalog.validate("doctor", &doc(json!({}))).unwrap();
        assert_eq!(report.findings()[0].severity, Severity::Error);
        assert_eq!(
            catalog.validate("nurse", &doc(json!({}))).unwrap_err(),
            CatalogError::UnknownType { type_name: "nurse".into() }
        );
    }

    #[test]
    fn test_validate_document_uses_type_member() {
        let catalog = Catalog::from_trees([doctor(), home_page()]).unwrap();
        let report = catalog
            .validate_document(&doc(json!({"_type": "doctor", "name": "Dr. Smith"})))
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(
            catalog.validate_document(&doc(json!({"name": "x"}))).unwrap_err(),
            CatalogError::MissingType
        );
    }

    #[test]
    fn test_unknown_field_and_not_a_slug() {
        let catalog = Catalog::from_trees([doctor(), home_page()]).unwrap();
        let d = doc(json!({}));
        assert!(matches!(
            catalog.is_field_visible("doctor", &"nope".parse().unwrap(), &d),
            Err(CatalogError::UnknownField { .. })
        ));
        assert!(matches!(
            catalog.suggest_slug("doctor", &"name".parse().unwrap(), &d),
            Err(CatalogError::NotASlug { .. })
        ));
        assert_eq!(
            catalog.is_field_visible("doctor", &"name".parse().unwrap(), &d),
            Ok(true)
        );
    }

    #[test]
    fn test_project_falls_back_to_type_name() {
        let catalog = Catalog::from_trees([doctor(), home_page()]).unwrap();
        let summary = catalog.project("doctor", &doc(json!({}))).unwrap();
        assert_eq!(summary.title, "doctor");
    }
}
