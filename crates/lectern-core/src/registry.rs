//! # Field Type Registry
//!
//! [`describe`] maps a [`FieldKind`] and its resolved [`KindOptions`] to a
//! [`FieldKindDescriptor`]: the kind's intrinsic shape, which JSON values it
//! accepts, what "empty" means for it, and the checks every value of the kind
//! must pass regardless of the rules a schema attaches.
//!
//! The registry is pure and stateless. Unknown kinds cannot reach it: they
//! are rejected when a kind name is parsed into a [`FieldKind`].

use chrono::NaiveDate;
use serde_json::Value;

use crate::document::is_system_key;
use crate::kind::FieldKind;
use crate::options::KindOptions;

/// Structural role of a kind within the schema tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Scalar or opaque value; no children.
    Leaf,
    /// Named sub-fields.
    Object,
    /// Items drawn from declared variants.
    Array,
    /// Sequence of content blocks.
    Blocks,
    /// Terminates the tree; points at another document.
    Reference,
}

/// JSON type a kind stores its values as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// JSON string or object (slugs).
    StringOrObject,
}

/// What counts as "empty" for a `required` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emptiness {
    /// Blank (whitespace-only) text.
    BlankText,
    /// Only absence; any present value counts.
    Absent,
    /// An object with no meaningful member.
    NoMembers,
    /// An array with no meaningful item.
    NoItems,
    /// An asset object without an asset reference.
    NoAsset,
    /// A slug without a `current` value.
    NoSlug,
    /// A reference without `_ref`.
    NoReference,
    /// Rich text with no text and no image.
    NoBlockContent,
}

/// Intrinsic description of one field kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldKindDescriptor<'a> {
    /// The kind described.
    pub kind: FieldKind,
    /// Structural role.
    pub shape: Shape,
    /// Stored JSON type.
    pub json_type: JsonType,
    /// Emptiness rule.
    pub emptiness: Emptiness,
    options: &'a KindOptions,
}

/// Describe a kind under the given options.
pub fn describe(kind: FieldKind, options: &KindOptions) -> FieldKindDescriptor<'_> {
    let (shape, json_type, emptiness) = match kind {
        FieldKind::String | FieldKind::Text | FieldKind::Url | FieldKind::Date => {
            (Shape::Leaf, JsonType::String, Emptiness::BlankText)
        }
        FieldKind::Number => (Shape::Leaf, JsonType::Number, Emptiness::Absent),
        FieldKind::Boolean => (Shape::Leaf, JsonType::Boolean, Emptiness::Absent),
        FieldKind::Slug => (Shape::Leaf, JsonType::StringOrObject, Emptiness::NoSlug),
        FieldKind::Image | FieldKind::File => (Shape::Leaf, JsonType::Object, Emptiness::NoAsset),
        FieldKind::RichText => (Shape::Blocks, JsonType::Array, Emptiness::NoBlockContent),
        FieldKind::Object => (Shape::Object, JsonType::Object, Emptiness::NoMembers),
        FieldKind::Array => (Shape::Array, JsonType::Array, Emptiness::NoItems),
        FieldKind::Reference => (Shape::Reference, JsonType::Object, Emptiness::NoReference),
    };
    FieldKindDescriptor {
        kind,
        shape,
        json_type,
        emptiness,
        options,
    }
}

impl<'a> FieldKindDescriptor<'a> {
    /// The options this descriptor was built with.
    pub fn options(&self) -> &'a KindOptions {
        self.options
    }

    /// Whether the kind is a leaf of the schema tree.
    pub fn is_leaf(&self) -> bool {
        matches!(self.shape, Shape::Leaf | Shape::Reference)
    }

    /// Whether the kind holds rich-text blocks.
    pub fn accepts_blocks(&self) -> bool {
        self.shape == Shape::Blocks
    }

    /// Whether the kind declares children.
    pub fn has_children(&self) -> bool {
        matches!(self.shape, Shape::Object | Shape::Array)
    }

    /// Whether `value` has the JSON type this kind stores.
    pub fn accepts(&self, value: &Value) -> bool {
        match self.json_type {
            JsonType::String => value.is_string(),
            JsonType::Number => value.is_number(),
            JsonType::Boolean => value.is_boolean(),
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
            JsonType::StringOrObject => value.is_string() || value.is_object(),
        }
    }

    /// Whether `value` counts as empty for this kind.
    pub fn is_empty(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self.emptiness {
            Emptiness::BlankText => value.as_str().is_some_and(|s| s.trim().is_empty()),
            Emptiness::Absent => false,
            Emptiness::NoMembers => !is_meaningful(value),
            Emptiness::NoItems => !is_meaningful(value),
            Emptiness::NoAsset => asset_ref(value).is_none(),
            Emptiness::NoSlug => slug_current(value).is_none(),
            Emptiness::NoReference => reference_id(value).is_none(),
            Emptiness::NoBlockContent => !blocks_have_content(value),
        }
    }

    /// Intrinsic problem with a present, non-empty value of this kind.
    ///
    /// Covers list membership, URL shape, calendar dates and media
    /// acceptance. Block-level problems of rich text are reported by
    /// [`block_problems`](Self::block_problems).
    pub fn intrinsic_problem(&self, value: &Value) -> Option<String> {
        if let Some(list) = self.options.choices() {
            if !list.iter().any(|choice| &choice.value == value) {
                let allowed: Vec<String> = list.iter().map(|c| display_scalar(&c.value)).collect();
                return Some(format!("must be one of: {}", allowed.join(", ")));
            }
        }
        match (self.kind, self.options) {
            (FieldKind::Url, KindOptions::Url { allow_relative, schemes }) => {
                value.as_str().and_then(|s| url_problem(s, *allow_relative, schemes))
            }
            (FieldKind::Date, _) => value.as_str().and_then(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .err()
                    .map(|_| format!("{s:?} is not a date in YYYY-MM-DD format"))
            }),
            (FieldKind::Image | FieldKind::File, KindOptions::Media { accept: Some(filter), .. }) => {
                let (mime, ext) = asset_media(value);
                let verdict = filter.matches(mime.as_deref(), ext.as_deref());
                match verdict {
                    Some(false) => Some(format!(
                        "{} is not an accepted media type ({})",
                        mime.or(ext).unwrap_or_default(),
                        filter.as_str()
                    )),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Problems with individual rich-text blocks, by block index.
    pub fn block_problems(&self, value: &Value) -> Vec<(usize, String)> {
        let inline_images = matches!(
            self.options,
            KindOptions::RichText { inline_images: true }
        );
        let Some(blocks) = value.as_array() else {
            return Vec::new();
        };
        blocks
            .iter()
            .enumerate()
            .filter_map(|(index, block)| {
                let block_type = block.get("_type").and_then(Value::as_str);
                let problem = match block_type {
                    None => Some("content blocks must be objects with a `_type`".to_string()),
                    Some("block") => None,
                    Some("image") if inline_images => None,
                    Some(other) => Some(format!("block type {other:?} is not allowed here")),
                };
                problem.map(|p| (index, p))
            })
            .collect()
    }
}

/// Whether a value carries meaningful content.
///
/// Null, blank strings, arrays without a meaningful item and objects whose
/// non-system members are all meaningless are not meaningful. Objects
/// carrying a `_ref` are.
pub fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => items.iter().any(is_meaningful),
        Value::Object(members) => {
            reference_id(value).is_some()
                || members
                    .iter()
                    .any(|(key, member)| !is_system_key(key) && is_meaningful(member))
        }
    }
}

/// The `current` value of a slug, accepting a bare string too.
pub fn slug_current(value: &Value) -> Option<&str> {
    let current = match value {
        Value::String(s) => s.as_str(),
        Value::Object(members) => members.get("current")?.as_str()?,
        _ => return None,
    };
    (!current.trim().is_empty()).then_some(current)
}

/// The referenced document id of a reference value.
pub fn reference_id(value: &Value) -> Option<&str> {
    value
        .get("_ref")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
}

/// The asset reference of an image or file value.
pub fn asset_ref(value: &Value) -> Option<&str> {
    value.get("asset").and_then(reference_id)
}

/// MIME type and extension of an asset value, as far as they can be told.
///
/// The MIME type comes from an explicit `mimeType` member or is guessed from
/// the extension; the extension comes from `extension`, `originalFilename`,
/// or the last `-` segment of the asset reference (`file-<id>-mp4`).
pub fn asset_media(value: &Value) -> (Option<String>, Option<String>) {
    let extension = value
        .get("extension")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            value
                .get("originalFilename")
                .and_then(Value::as_str)
                .and_then(|name| name.rsplit_once('.'))
                .map(|(_, ext)| ext.to_string())
        })
        .or_else(|| {
            asset_ref(value)
                .and_then(|r| r.rsplit_once('-'))
                .map(|(_, ext)| ext.to_string())
        })
        .map(|ext| ext.to_ascii_lowercase());

    let mime = value
        .get("mimeType")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| {
            extension
                .as_deref()
                .and_then(|ext| mime_guess::from_ext(ext).first())
                .map(|m| m.essence_str().to_string())
        });

    (mime, extension)
}

fn blocks_have_content(value: &Value) -> bool {
    let Some(blocks) = value.as_array() else {
        return false;
    };
    blocks.iter().any(|block| {
        match block.get("_type").and_then(Value::as_str) {
            Some("block") => block
                .get("children")
                .and_then(Value::as_array)
                .is_some_and(|spans| {
                    spans.iter().any(|span| {
                        span.get("text")
                            .and_then(Value::as_str)
                            .is_some_and(|t| !t.trim().is_empty())
                    })
                }),
            Some("image") => asset_ref(block).is_some(),
            _ => false,
        }
    })
}

fn url_problem(s: &str, allow_relative: bool, schemes: &[String]) -> Option<String> {
    match url::Url::parse(s) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if schemes.iter().any(|allowed| allowed == scheme) {
                None
            } else {
                Some(format!("URL scheme {scheme:?} is not allowed"))
            }
        }
        Err(url::ParseError::RelativeUrlWithoutBase) if allow_relative => None,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Some("must be an absolute URL".to_string())
        }
        Err(e) => Some(format!("must be a valid URL ({e})")),
    }
}

/// Render a scalar for messages: strings without quotes, everything else as JSON.
pub fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
