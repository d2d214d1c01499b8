//! Slug suggestions derived from a slug field's `source` sibling.

use lectern_core::text::slugify;
use lectern_core::{DocumentInstance, FieldKind, FieldPath, KindOptions};

use crate::preview::render_text;
use crate::tree::SchemaTree;
use crate::visibility::resolve;

/// Why no suggestion could be made for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugTarget {
    /// The path names no field.
    Unresolved,
    /// The path names a field that is not a slug.
    NotASlug,
}

/// Suggest a slug for the slug field at `path`.
///
/// `Ok(None)` means the field has no source or the source is empty.
pub fn suggest_slug(
    tree: &SchemaTree,
    path: &FieldPath,
    doc: &DocumentInstance,
) -> Result<Option<String>, SlugTarget> {
    let target = resolve(tree, path, doc).ok_or(SlugTarget::Unresolved)?;
    if target.field.kind() != FieldKind::Slug {
        return Err(SlugTarget::NotASlug);
    }
    let KindOptions::Slug {
        source: Some(source),
        max_length,
    } = target.field.options()
    else {
        return Ok(None);
    };
    let Some(source_path) = path.parent().map(|parent| parent.field(source.as_str())) else {
        return Ok(None);
    };
    let suggestion = resolve(tree, &source_path, doc)
        .and_then(|source| render_text(source.field, source.value?))
        .map(|text| slugify(&text, *max_length))
        .filter(|slug| !slug.is_empty());
    Ok(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::tree::define_object_type;
    use lectern_core::OptionsSpec;
    use serde_json::json;

    fn doctor(max_length: Option<usize>) -> SchemaTree {
        define_object_type(
            "doctor",
            vec![
                FieldSpec::new("name", FieldKind::String),
                FieldSpec::new("slug", FieldKind::Slug).options(OptionsSpec {
                    source: Some("name".into()),
                    max_length,
                    ..Default::default()
                }),
                FieldSpec::new("plainSlug", FieldKind::Slug),
            ],
        )
        .unwrap()
    }

    fn suggest(tree: &SchemaTree, path: &str, value: serde_json::Value) -> Result<Option<String>, SlugTarget> {
        let doc = DocumentInstance::from_value(value).unwrap();
        suggest_slug(tree, &path.parse().unwrap(), &doc)
    }

    #[test]
    fn test_suggest_from_source() {
        let tree = doctor(None);
        assert_eq!(
            suggest(&tree, "slug", json!({"name": "Dr. Jane Smith, MD"})),
            Ok(Some("dr-jane-smith-md".to_string()))
        );
    }

    #[test]
    fn test_max_length_applies() {
        let tree = doctor(Some(8));
        assert_eq!(
            suggest(&tree, "slug", json!({"name": "Dr. Jane Smith"})),
            Ok(Some("dr-jane".to_string()))
        );
    }

    #[test]
    fn test_absent_source_gives_nothing() {
        let tree = doctor(None);
        assert_eq!(suggest(&tree, "slug", json!({})), Ok(None));
        assert_eq!(suggest(&tree, "slug", json!({"name": "!!!"})), Ok(None));
        assert_eq!(suggest(&tree, "plainSlug", json!({"name": "x"})), Ok(None));
    }

    #[test]
    fn test_target_must_be_slug() {
        let tree = doctor(None);
        assert_eq!(suggest(&tree, "name", json!({})), Err(SlugTarget::NotASlug));
        assert_eq!(suggest(&tree, "missing", json!({})), Err(SlugTarget::Unresolved));
    }
}
