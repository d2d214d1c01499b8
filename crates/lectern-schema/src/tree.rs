//! # Schema Trees
//!
//! A [`SchemaTree`] is one document (or object) type: its name, its root
//! object definition and its preview selection. Trees are built once, at
//! startup, and never change afterwards; every engine operation borrows
//! them immutably.

use lectern_core::{FieldKind, FieldPath, PathSegment, SchemaDefinitionError};
use serde::{Deserialize, Serialize};

use crate::field::{define_root, FieldDefinition, FieldSpec};
use crate::preview::PreviewSelection;

/// A document type as declared by a schema author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentTypeSpec {
    /// Type name, e.g. `doctor`.
    pub name: String,
    /// Editor label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Top-level fields, in declaration order.
    pub fields: Vec<FieldSpec>,
    /// Preview selection.
    #[serde(default)]
    pub preview: PreviewSelection,
}

/// An immutable, checked document type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaTree {
    name: String,
    root: FieldDefinition,
    preview: PreviewSelection,
}

impl SchemaTree {
    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The editor label, if declared.
    pub fn title(&self) -> Option<&str> {
        self.root.title()
    }

    /// The editor label, falling back to the type name.
    pub fn display_title(&self) -> &str {
        self.root.display_title()
    }

    /// The root object definition.
    pub fn root(&self) -> &FieldDefinition {
        &self.root
    }

    /// Top-level fields, in declaration order.
    pub fn fields(&self) -> &[FieldDefinition] {
        self.root.children()
    }

    /// The preview selection.
    pub fn preview(&self) -> &PreviewSelection {
        &self.preview
    }

    /// Number of fields in the tree, nested fields and variants included.
    pub fn field_count(&self) -> usize {
        self.root.descendant_count()
    }

    /// The definition at `path`, following the schema only.
    ///
    /// Index segments step into an array's first variant that can continue
    /// the path.
    pub fn field(&self, path: &FieldPath) -> Option<&FieldDefinition> {
        if path.is_root() {
            return None;
        }
        lookup(&self.root, path.segments())
    }

    /// All reference fields, with their dotted paths.
    pub fn references(&self) -> Vec<(String, &FieldDefinition)> {
        let mut out = Vec::new();
        collect_references(&self.root, self.name.clone(), &mut out);
        out
    }
}

fn lookup<'a>(field: &'a FieldDefinition, segments: &[PathSegment]) -> Option<&'a FieldDefinition> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(field);
    };
    match (field.kind(), first) {
        (FieldKind::Object, PathSegment::Field(name)) => lookup(field.child(name)?, rest),
        (FieldKind::Array, PathSegment::Index(_)) => field
            .children()
            .iter()
            .find_map(|variant| lookup(variant, rest)),
        _ => None,
    }
}

fn collect_references<'a>(
    field: &'a FieldDefinition,
    path: String,
    out: &mut Vec<(String, &'a FieldDefinition)>,
) {
    if field.kind() == FieldKind::Reference {
        out.push((path.clone(), field));
    }
    for child in field.children() {
        collect_references(child, format!("{path}.{}", child.name()), out);
    }
}

/// Build a tree from a name and its fields, with no preview selection.
pub fn define_object_type(
    name: impl Into<String>,
    fields: Vec<FieldSpec>,
) -> Result<SchemaTree, SchemaDefinitionError> {
    define_document_type(DocumentTypeSpec {
        name: name.into(),
        fields,
        ..Default::default()
    })
}

/// Check a document type declaration and build its tree.
pub fn define_document_type(spec: DocumentTypeSpec) -> Result<SchemaTree, SchemaDefinitionError> {
    let root = define_root(&spec.name, spec.title, &spec.fields)?;
    let tree = SchemaTree {
        name: spec.name,
        root,
        preview: spec.preview,
    };

    for (role, path) in tree.preview.paths() {
        if tree.field(path).is_none() {
            return Err(SchemaDefinitionError::InvalidPreview {
                type_name: tree.name.clone(),
                role,
                path: path.to_string(),
                reason: "no such field".to_string(),
            });
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doctor_spec() -> DocumentTypeSpec {
        serde_json::from_value(json!({
            "name": "doctor",
            "title": "Doctor",
            "fields": [
                {"name": "name", "type": "string", "validation": [{"rule": "required"}]},
                {"name": "slug", "type": "slug", "options": {"source": "name"}},
                {"name": "image", "type": "image", "options": {"hotspot": true}},
                {"name": "education", "type": "array", "of": [
                    {"type": "object", "name": "degree", "fields": [
                        {"name": "title", "type": "string"},
                        {"name": "year", "type": "number"}
                    ]}
                ]}
            ],
            "preview": {"title": "name", "media": "image"}
        }))
        .unwrap()
    }

    #[test]
    fn test_define_document_type() {
        let tree = define_document_type(doctor_spec()).unwrap();
        assert_eq!(tree.name(), "doctor");
        assert_eq!(tree.display_title(), "Doctor");
        let names: Vec<&str> = tree.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["name", "slug", "image", "education"]);
        assert_eq!(tree.field_count(), 7);
    }

    #[test]
    fn test_schema_lookup() {
        let tree = define_document_type(doctor_spec()).unwrap();
        let year = tree.field(&"education[0].year".parse().unwrap()).unwrap();
        assert_eq!(year.kind(), FieldKind::Number);
        assert!(tree.field(&"education.year".parse().unwrap()).is_none());
        assert!(tree.field(&FieldPath::root()).is_none());
    }

    #[test]
    fn test_preview_paths_must_resolve() {
        let mut spec = doctor_spec();
        spec.preview.subtitle = Some("specialty".parse().unwrap());
        match define_document_type(spec).unwrap_err() {
            SchemaDefinitionError::InvalidPreview { role, path, .. } => {
                assert_eq!(role, "subtitle");
                assert_eq!(path, "specialty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_type_name() {
        assert!(matches!(
            define_object_type("home page", vec![FieldSpec::new("a", FieldKind::String)]),
            Err(SchemaDefinitionError::InvalidName { .. })
        ));
        assert!(matches!(
            define_object_type("empty", vec![]),
            Err(SchemaDefinitionError::EmptyObject { .. })
        ));
    }

    #[test]
    fn test_references_listed_with_paths() {
        let tree = define_object_type(
            "homePage",
            vec![FieldSpec::object(
                "about",
                vec![FieldSpec::array(
                    "doctors",
                    vec![FieldSpec::reference("", ["doctor"])],
                )],
            )],
        );
        // An unnamed reference variant takes its kind as name.
        let tree = tree.unwrap();
        let refs = tree.references();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].0, "homePage.about.doctors.reference");
        assert_eq!(refs[0].1.target_types(), ["doctor".to_string()]);
    }
}
