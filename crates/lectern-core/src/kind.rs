//! # Field Kinds: Closed Type Vocabulary
//!
//! Defines the `FieldKind` enum: the complete set of semantic types a schema
//! field may declare. Every `match` on `FieldKind` is exhaustive, so adding a
//! kind forces every consumer (registry, validation, preview) to handle it.
//!
//! Kinds are named on the wire in camelCase (`richText`), matching the way
//! schema files spell them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The semantic type of a schema field.
///
/// | Kind | Value shape |
/// |------|-------------|
/// | `string` | single-line string |
/// | `text` | multi-line string |
/// | `number` | JSON number |
/// | `boolean` | JSON boolean |
/// | `url` | string holding a URL |
/// | `slug` | `{ "current": "..." }` or a bare string |
/// | `date` | `YYYY-MM-DD` string |
/// | `image` | asset object `{ "asset": { "_ref": "..." } }` |
/// | `file` | asset object `{ "asset": { "_ref": "..." } }` |
/// | `richText` | array of typed content blocks |
/// | `object` | named sub-fields |
/// | `array` | ordered items, each matching one declared variant |
/// | `reference` | `{ "_ref": "<document id>" }` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    /// Single-line text.
    String,
    /// Multi-line text.
    Text,
    /// Numeric value.
    Number,
    /// True/false toggle.
    Boolean,
    /// URL, absolute or (when allowed) relative.
    Url,
    /// URL-safe identifier, usually derived from another field.
    Slug,
    /// Calendar date.
    Date,
    /// Image asset with optional hotspot.
    Image,
    /// Arbitrary file asset.
    File,
    /// Sequence of typed content blocks.
    RichText,
    /// Named sub-fields.
    Object,
    /// Ordered sequence of items drawn from declared variants.
    Array,
    /// Pointer to another document by identity.
    Reference,
}

/// Total number of field kinds.
pub const FIELD_KIND_COUNT: usize = 13;

impl FieldKind {
    /// Returns every kind in canonical order.
    pub fn all_kinds() -> &'static [FieldKind] {
        &[
            Self::String,
            Self::Text,
            Self::Number,
            Self::Boolean,
            Self::Url,
            Self::Slug,
            Self::Date,
            Self::Image,
            Self::File,
            Self::RichText,
            Self::Object,
            Self::Array,
            Self::Reference,
        ]
    }

    /// The wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Url => "url",
            Self::Slug => "slug",
            Self::Date => "date",
            Self::Image => "image",
            Self::File => "file",
            Self::RichText => "richText",
            Self::Object => "object",
            Self::Array => "array",
            Self::Reference => "reference",
        }
    }

    /// Whether fields of this kind hold textual content.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Text | Self::Url | Self::Slug | Self::Date
        )
    }

    /// Whether fields of this kind declare children (`fields` or `of`).
    pub fn has_children(&self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Whether fields of this kind hold an asset reference.
    pub fn is_asset(&self) -> bool {
        matches!(self, Self::Image | Self::File)
    }

    /// Whether values of this kind are item sequences (countable).
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Array | Self::RichText)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a kind name is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for FieldKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_kinds()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_count() {
        assert_eq!(FieldKind::all_kinds().len(), FIELD_KIND_COUNT);
    }

    #[test]
    fn test_as_str_roundtrip() {
        for kind in FieldKind::all_kinds() {
            let parsed: FieldKind = kind.as_str().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        assert!("block".parse::<FieldKind>().is_err());
        assert!("RichText".parse::<FieldKind>().is_err()); // case-sensitive
        assert!("".parse::<FieldKind>().is_err());
        let err = "geopoint".parse::<FieldKind>().unwrap_err();
        assert_eq!(err.0, "geopoint");
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for kind in FieldKind::all_kinds() {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_children_only_for_containers() {
        for kind in FieldKind::all_kinds() {
            let expected = matches!(kind, FieldKind::Object | FieldKind::Array);
            assert_eq!(kind.has_children(), expected, "{kind}");
        }
    }
}
