//! # Visibility Evaluator
//!
//! A field may carry a [`VisibilityPredicate`] over the materialized values of
//! its siblings. Predicates are data, not closures, so schema trees stay
//! serializable:
//!
//! ```yaml
//! - name: video
//!   type: file
//!   visibleWhen:
//!     equals: { field: mediaType, value: video }
//! ```
//!
//! ## Materialization
//!
//! A sibling that is absent or `null` in the document takes its declared
//! `initialValue`. A sibling with neither compares as `null`, so
//! `notEquals: { field: b, value: null }` reads "shown once `b` is set".
//!
//! ## Nesting
//!
//! A field is visible only if every ancestor is visible. Evaluation walks the
//! tree top-down and stops consulting predicates once an ancestor is hidden.

use lectern_core::{DocumentInstance, FieldKind, FieldPath, PathSegment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::FieldDefinition;
use crate::tree::SchemaTree;

static NULL: Value = Value::Null;

/// Condition over sibling values deciding whether a field is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisibilityPredicate {
    /// The sibling equals `value`.
    Equals {
        /// Sibling field name.
        field: String,
        /// Value compared against.
        value: Value,
    },
    /// The sibling is absent or differs from `value`.
    NotEquals {
        /// Sibling field name.
        field: String,
        /// Value compared against.
        value: Value,
    },
    /// The sibling equals one of `values`.
    OneOf {
        /// Sibling field name.
        field: String,
        /// Values compared against.
        values: Vec<Value>,
    },
    /// Every inner predicate holds.
    All(Vec<VisibilityPredicate>),
    /// At least one inner predicate holds.
    Any(Vec<VisibilityPredicate>),
}

impl VisibilityPredicate {
    /// `equals`.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `notEquals`.
    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::NotEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `oneOf`.
    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::OneOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Evaluate against the enclosing object's materialized values.
    pub fn evaluate(&self, scope: &ObjectScope<'_>) -> bool {
        match self {
            Self::Equals { field, value } => scope.compared(field) == value,
            Self::NotEquals { field, value } => scope.compared(field) != value,
            Self::OneOf { field, values } => values.contains(scope.compared(field)),
            Self::All(inner) => inner.iter().all(|p| p.evaluate(scope)),
            Self::Any(inner) => inner.iter().any(|p| p.evaluate(scope)),
        }
    }

    /// Names of the sibling fields the predicate reads.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_fields(&mut names);
        names
    }

    fn collect_fields<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Equals { field, .. } | Self::NotEquals { field, .. } | Self::OneOf { field, .. } => {
                if !names.contains(&field.as_str()) {
                    names.push(field);
                }
            }
            Self::All(inner) | Self::Any(inner) => {
                for p in inner {
                    p.collect_fields(names);
                }
            }
        }
    }

    /// Structural checks independent of the surrounding schema.
    pub(crate) fn check_structure(&self) -> Result<(), String> {
        match self {
            Self::Equals { .. } | Self::NotEquals { .. } => Ok(()),
            Self::OneOf { values, .. } if values.is_empty() => {
                Err("`oneOf` must list at least one value".to_string())
            }
            Self::OneOf { .. } => Ok(()),
            Self::All(inner) | Self::Any(inner) if inner.is_empty() => {
                Err("`all`/`any` must combine at least one predicate".to_string())
            }
            Self::All(inner) | Self::Any(inner) => inner.iter().try_for_each(Self::check_structure),
        }
    }
}

/// The sibling fields of one object together with the object's values.
#[derive(Debug, Clone, Copy)]
pub struct ObjectScope<'a> {
    fields: &'a [FieldDefinition],
    values: Option<&'a Map<String, Value>>,
}

impl<'a> ObjectScope<'a> {
    /// Scope over `fields`, reading from `values` (absent when the object is).
    pub fn new(fields: &'a [FieldDefinition], values: Option<&'a Map<String, Value>>) -> Self {
        Self { fields, values }
    }

    /// Scope over a document's top-level fields.
    pub fn document(tree: &'a SchemaTree, doc: &'a DocumentInstance) -> Self {
        Self::new(tree.fields(), Some(doc.members()))
    }

    /// The declared fields.
    pub fn fields(&self) -> &'a [FieldDefinition] {
        self.fields
    }

    /// Value of `name` with its initial value applied when absent or null.
    pub fn materialized(&self, name: &str) -> Option<&'a Value> {
        self.values
            .and_then(|values| values.get(name))
            .filter(|value| !value.is_null())
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|f| f.name() == name)
                    .and_then(FieldDefinition::initial_value)
            })
    }

    /// The materialized value of `name`, or `null` when there is none.
    fn compared(&self, name: &str) -> &'a Value {
        self.materialized(name).unwrap_or(&NULL)
    }
}

/// Whether `field` is visible among its siblings, ignoring ancestors.
pub fn is_visible(field: &FieldDefinition, scope: &ObjectScope<'_>) -> bool {
    field
        .visibility()
        .map_or(true, |predicate| predicate.evaluate(scope))
}

/// Visibility of one field occurrence in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldVisibility {
    /// Where the field occurs.
    pub path: FieldPath,
    /// Whether it and all its ancestors are visible.
    pub visible: bool,
}

/// Visibility of every field of `tree` in `doc`, in declaration order.
///
/// Fields inside array items are reported once per present item.
pub fn evaluate_visibility(tree: &SchemaTree, doc: &DocumentInstance) -> Vec<FieldVisibility> {
    let mut out = Vec::new();
    let mut path = FieldPath::root();
    visit_members(tree.fields(), Some(doc.members()), true, &mut path, &mut out);
    out
}

fn visit_members(
    fields: &[FieldDefinition],
    values: Option<&Map<String, Value>>,
    parent_visible: bool,
    path: &mut FieldPath,
    out: &mut Vec<FieldVisibility>,
) {
    let scope = ObjectScope::new(fields, values);
    for field in fields {
        let visible = parent_visible && is_visible(field, &scope);
        path.push_field(field.name());
        out.push(FieldVisibility {
            path: path.clone(),
            visible,
        });
        let value = scope.materialized(field.name());
        match field.kind() {
            FieldKind::Object => {
                visit_members(field.children(), value.and_then(Value::as_object), visible, path, out);
            }
            FieldKind::Array => {
                let items = value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
                for (index, item) in items.iter().enumerate() {
                    let Some(variant) = field.variant_for(item) else {
                        continue;
                    };
                    if variant.kind() == FieldKind::Object {
                        path.push_index(index);
                        visit_members(variant.children(), item.as_object(), visible, path, out);
                        path.pop();
                    }
                }
            }
            _ => {}
        }
        path.pop();
    }
}

/// A field occurrence located by path.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    /// The declaration governing the value (the variant, for array items).
    pub field: &'a FieldDefinition,
    /// The materialized value, if any.
    pub value: Option<&'a Value>,
    /// Whether the occurrence and all its ancestors are visible.
    pub visible: bool,
}

/// Locate `path` in `tree` and `doc`.
///
/// Returns `None` when the path does not name a field of the tree. Index
/// segments select the item's variant; an index past the end of the array
/// resolves against the array's first variant with no value.
pub fn resolve<'a>(
    tree: &'a SchemaTree,
    path: &FieldPath,
    doc: &'a DocumentInstance,
) -> Option<Resolved<'a>> {
    if path.is_root() {
        return None;
    }
    let mut field = tree.root();
    let mut value: Option<&'a Value> = None;
    let mut object = Some(doc.members());
    let mut visible = true;

    for segment in path.segments() {
        match segment {
            PathSegment::Field(name) => {
                if field.kind() != FieldKind::Object {
                    return None;
                }
                let scope = ObjectScope::new(field.children(), object);
                let child = field.child(name)?;
                if visible {
                    visible = is_visible(child, &scope);
                }
                value = scope.materialized(name);
                object = value.and_then(Value::as_object);
                field = child;
            }
            PathSegment::Index(index) => {
                if field.kind() != FieldKind::Array {
                    return None;
                }
                let item = value.and_then(Value::as_array).and_then(|items| items.get(*index));
                let variant = match item {
                    Some(item) => field.variant_for(item)?,
                    None => field.children().first()?,
                };
                value = item;
                object = item.and_then(Value::as_object);
                field = variant;
            }
        }
    }

    Some(Resolved {
        field,
        value,
        visible,
    })
}

/// Whether the field at `path` is visible in `doc`; `None` if the path does
/// not resolve.
pub fn is_path_visible(tree: &SchemaTree, path: &FieldPath, doc: &DocumentInstance) -> Option<bool> {
    resolve(tree, path, doc).map(|r| r.visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::tree::define_object_type;
    use lectern_core::{Choice, FieldKind, OptionsSpec};
    use serde_json::json;

    fn about() -> SchemaTree {
        define_object_type(
            "about",
            vec![
                FieldSpec::new("title", FieldKind::String),
                FieldSpec::new("mediaType", FieldKind::String)
                    .options(OptionsSpec {
                        list: Some(vec![Choice::new("image"), Choice::new("video")]),
                        ..Default::default()
                    })
                    .initial_value("image"),
                FieldSpec::new("image", FieldKind::Image)
                    .visible_when(VisibilityPredicate::equals("mediaType", "image")),
                FieldSpec::new("video", FieldKind::File)
                    .visible_when(VisibilityPredicate::equals("mediaType", "video")),
            ],
        )
        .unwrap()
    }

    fn doc(value: Value) -> DocumentInstance {
        DocumentInstance::from_value(value).unwrap()
    }

    fn visible(tree: &SchemaTree, path: &str, d: &DocumentInstance) -> Option<bool> {
        is_path_visible(tree, &path.parse().unwrap(), d)
    }

    #[test]
    fn test_equals_selects_sibling() {
        let tree = about();
        let d = doc(json!({"mediaType": "video"}));
        assert_eq!(visible(&tree, "video", &d), Some(true));
        assert_eq!(visible(&tree, "image", &d), Some(false));
        assert_eq!(visible(&tree, "title", &d), Some(true));
    }

    #[test]
    fn test_absent_sibling_uses_initial_value() {
        let tree = about();
        let d = doc(json!({}));
        assert_eq!(visible(&tree, "image", &d), Some(true));
        assert_eq!(visible(&tree, "video", &d), Some(false));
        let d = doc(json!({"mediaType": null}));
        assert_eq!(visible(&tree, "image", &d), Some(true));
    }

    #[test]
    fn test_absent_semantics_per_predicate() {
        let fields = vec![FieldSpec::new("kind", FieldKind::String)];
        let tree = define_object_type("t", fields).unwrap();
        let scope = ObjectScope::new(tree.fields(), None);
        assert!(!VisibilityPredicate::equals("kind", "a").evaluate(&scope));
        assert!(VisibilityPredicate::not_equals("kind", "a").evaluate(&scope));
        assert!(!VisibilityPredicate::one_of("kind", ["a", "b"]).evaluate(&scope));
    }

    #[test]
    fn test_absent_sibling_compares_as_null() {
        let tree = define_object_type(
            "t",
            vec![
                FieldSpec::new("b", FieldKind::String),
                FieldSpec::new("shownWhenBSet", FieldKind::String)
                    .required()
                    .visible_when(VisibilityPredicate::not_equals("b", Value::Null)),
                FieldSpec::new("shownWhenBUnset", FieldKind::String)
                    .visible_when(VisibilityPredicate::equals("b", Value::Null)),
            ],
        )
        .unwrap();
        let unset = doc(json!({}));
        assert_eq!(visible(&tree, "shownWhenBSet", &unset), Some(false));
        assert_eq!(visible(&tree, "shownWhenBUnset", &unset), Some(true));
        assert!(crate::validate::validate(&tree, &unset).is_empty());

        let set = doc(json!({"b": "x"}));
        assert_eq!(visible(&tree, "shownWhenBSet", &set), Some(true));
        assert_eq!(visible(&tree, "shownWhenBUnset", &set), Some(false));
        let report = crate::validate::validate(&tree, &set);
        assert_eq!(report.findings()[0].field_path.to_string(), "shownWhenBSet");

        let scope = ObjectScope::new(tree.fields(), None);
        assert!(VisibilityPredicate::one_of("b", [Value::Null]).evaluate(&scope));
    }

    #[test]
    fn test_combinators() {
        let tree = about();
        let d = doc(json!({"mediaType": "video", "title": "Meet us"}));
        let scope = ObjectScope::document(&tree, &d);
        let all = VisibilityPredicate::All(vec![
            VisibilityPredicate::equals("mediaType", "video"),
            VisibilityPredicate::not_equals("title", "x"),
        ]);
        let any = VisibilityPredicate::Any(vec![
            VisibilityPredicate::equals("mediaType", "image"),
            VisibilityPredicate::one_of("title", ["Meet us"]),
        ]);
        assert!(all.evaluate(&scope));
        assert!(any.evaluate(&scope));
        assert_eq!(all.referenced_fields(), vec!["mediaType", "title"]);
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let tree = define_object_type(
            "page",
            vec![
                FieldSpec::new("showCta", FieldKind::Boolean),
                FieldSpec::object(
                    "cta",
                    vec![FieldSpec::new("label", FieldKind::String)],
                )
                .visible_when(VisibilityPredicate::equals("showCta", true)),
            ],
        )
        .unwrap();
        let d = doc(json!({"showCta": false, "cta": {"label": "Book"}}));
        assert_eq!(visible(&tree, "cta.label", &d), Some(false));
        let report = evaluate_visibility(&tree, &d);
        let paths: Vec<(String, bool)> =
            report.iter().map(|v| (v.path.to_string(), v.visible)).collect();
        assert_eq!(
            paths,
            vec![
                ("showCta".to_string(), true),
                ("cta".to_string(), false),
                ("cta.label".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_array_items_evaluate_against_item_siblings() {
        let tree = define_object_type(
            "navbar",
            vec![FieldSpec::array(
                "menuItems",
                vec![FieldSpec::object(
                    "menuItem",
                    vec![
                        FieldSpec::new("hasDropdown", FieldKind::Boolean),
                        FieldSpec::new("href", FieldKind::String)
                            .visible_when(VisibilityPredicate::not_equals("hasDropdown", true)),
                    ],
                )],
            )],
        )
        .unwrap();
        let d = doc(json!({"menuItems": [
            {"_type": "menuItem", "hasDropdown": true},
            {"_type": "menuItem", "href": "/about"}
        ]}));
        assert_eq!(visible(&tree, "menuItems[0].href", &d), Some(false));
        assert_eq!(visible(&tree, "menuItems[1].href", &d), Some(true));
        let report = evaluate_visibility(&tree, &d);
        assert_eq!(report.len(), 5);
    }

    #[test]
    fn test_unresolvable_paths() {
        let tree = about();
        let d = doc(json!({}));
        assert_eq!(visible(&tree, "nope", &d), None);
        assert_eq!(visible(&tree, "title.inner", &d), None);
        assert_eq!(visible(&tree, "title[0]", &d), None);
    }

    #[test]
    fn test_predicate_yaml_shape() {
        let p: VisibilityPredicate =
            serde_json::from_value(json!({"equals": {"field": "mediaType", "value": "video"}}))
                .unwrap();
        assert_eq!(p, VisibilityPredicate::equals("mediaType", "video"));
        let p: VisibilityPredicate = serde_json::from_value(json!({"any": [
            {"oneOf": {"field": "a", "values": [1, 2]}},
            {"notEquals": {"field": "b", "value": null}}
        ]}))
        .unwrap();
        assert!(matches!(p, VisibilityPredicate::Any(ref inner) if inner.len() == 2));
    }

    #[test]
    fn test_check_structure() {
        assert!(VisibilityPredicate::All(vec![]).check_structure().is_err());
        assert!(VisibilityPredicate::one_of("a", Vec::<Value>::new()).check_structure().is_err());
        assert!(VisibilityPredicate::Any(vec![VisibilityPredicate::equals("a", 1)])
            .check_structure()
            .is_ok());
    }
}
