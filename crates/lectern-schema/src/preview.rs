//! # Preview Projector
//!
//! Projects a document onto a compact [`PreviewSummary`] for list views:
//! a title, an optional subtitle and an optional media value, each read from
//! a field path named in the type's [`PreviewSelection`].
//!
//! Projection never fails. A missing, empty or hidden title falls back to
//! the selection's `fallbackTitle`, then to the type name. A missing, empty
//! or hidden subtitle falls back to `fallbackSubtitle` and is otherwise
//! omitted; media is omitted.
//!
//! Text longer than [`PREVIEW_TEXT_BUDGET`] characters is cut and marked
//! with an ellipsis.

use lectern_core::registry::{display_scalar, slug_current};
use lectern_core::text::{collapse_whitespace, plain_text, truncate, PREVIEW_TEXT_BUDGET};
use lectern_core::{DocumentInstance, FieldKind, FieldPath};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::FieldDefinition;
use crate::tree::SchemaTree;
use crate::visibility::resolve;

/// Field paths feeding each preview role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreviewSelection {
    /// Path of the title text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldPath>,
    /// Path of the subtitle text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<FieldPath>,
    /// Path of the media value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<FieldPath>,
    /// Title used when the title path yields nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_title: Option<String>,
    /// Subtitle used when the subtitle path yields nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_subtitle: Option<String>,
}

impl PreviewSelection {
    /// The declared paths with their role names.
    pub fn paths(&self) -> impl Iterator<Item = (&'static str, &FieldPath)> {
        [
            ("title", self.title.as_ref()),
            ("subtitle", self.subtitle.as_ref()),
            ("media", self.media.as_ref()),
        ]
        .into_iter()
        .filter_map(|(role, path)| path.map(|p| (role, p)))
    }
}

/// The projected summary of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSummary {
    /// Display title; never empty.
    pub title: String,
    /// Display subtitle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Media value (an image or file object), as stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
}

/// Project `doc` using the tree's own preview selection.
pub fn project(tree: &SchemaTree, doc: &DocumentInstance) -> PreviewSummary {
    project_with(tree, tree.preview(), doc)
}

/// Project `doc` using an explicit selection.
pub fn project_with(
    tree: &SchemaTree,
    selection: &PreviewSelection,
    doc: &DocumentInstance,
) -> PreviewSummary {
    let title = selection
        .title
        .as_ref()
        .and_then(|path| text_at(tree, path, doc))
        .or_else(|| selection.fallback_title.clone())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| tree.name().to_string());

    let subtitle = selection
        .subtitle
        .as_ref()
        .and_then(|path| text_at(tree, path, doc))
        .or_else(|| selection.fallback_subtitle.clone());

    let media = selection.media.as_ref().and_then(|path| {
        let resolved = resolve(tree, path, doc)?;
        let value = resolved.value?;
        let shown = resolved.visible && !resolved.field.descriptor().is_empty(value);
        shown.then(|| value.clone())
    });

    PreviewSummary {
        title,
        subtitle,
        media,
    }
}

fn text_at(tree: &SchemaTree, path: &FieldPath, doc: &DocumentInstance) -> Option<String> {
    let resolved = resolve(tree, path, doc)?;
    if !resolved.visible {
        return None;
    }
    let text = render_text(resolved.field, resolved.value?)?;
    Some(truncate(&text, PREVIEW_TEXT_BUDGET).into_owned())
}

/// Single-line display text of a value, or `None` when it has none.
pub(crate) fn render_text(field: &FieldDefinition, value: &Value) -> Option<String> {
    let raw = match field.kind() {
        FieldKind::String | FieldKind::Text | FieldKind::Url | FieldKind::Date => {
            value.as_str()?.to_string()
        }
        FieldKind::Number => match value {
            Value::Number(n) => n.to_string(),
            _ => return None,
        },
        FieldKind::Boolean => match value.as_bool()? {
            true => "Yes".to_string(),
            false => "No".to_string(),
        },
        FieldKind::Slug => slug_current(value)?.to_string(),
        FieldKind::RichText => plain_text(value),
        FieldKind::Array => {
            let items = value.as_array()?;
            if items.is_empty() {
                return None;
            }
            if items.iter().all(is_primitive) {
                items.iter().map(display_scalar).collect::<Vec<_>>().join(", ")
            } else {
                format!("{} items", items.len())
            }
        }
        FieldKind::Image | FieldKind::File | FieldKind::Object | FieldKind::Reference => {
            return None
        }
    };
    let text = collapse_whitespace(&raw);
    (!text.is_empty()).then(|| text.into_owned())
}

fn is_primitive(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}
