//! # Kind Options
//!
//! Schema authors declare options flat, the way studio schema files do:
//!
//! ```yaml
//! options:
//!   list: [summary, summary_large_image]
//!   hotspot: true
//!   accept: video/*
//! ```
//!
//! [`OptionsSpec::resolve`] turns the flat declaration into a typed
//! [`KindOptions`] for one [`FieldKind`], rejecting options that do not apply
//! to that kind. The typed form is what the registry and validation engine
//! read; it serializes back to the flat form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::json_type_name;
use crate::kind::FieldKind;

/// Default schemes accepted by `url` fields.
pub const DEFAULT_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Default maximum length of a derived slug.
pub const DEFAULT_SLUG_MAX_LENGTH: usize = 200;

/// One allowed value of a constrained field, with an optional display title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ChoiceRepr")]
pub struct Choice {
    /// The stored value.
    pub value: Value,
    /// Label shown to editors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Choice {
    /// A choice whose title is its value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            title: None,
        }
    }

    /// A choice with a display title.
    pub fn titled(title: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            title: Some(title.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceRepr {
    Titled {
        value: Value,
        #[serde(default)]
        title: Option<String>,
    },
    Bare(Value),
}

impl From<ChoiceRepr> for Choice {
    fn from(repr: ChoiceRepr) -> Self {
        match repr {
            ChoiceRepr::Titled { value, title } => Self { value, title },
            ChoiceRepr::Bare(value) => Self { value, title: None },
        }
    }
}

/// One entry of an `accept` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPattern {
    /// `type/subtype`; a subtype of `*` matches any subtype.
    Mime {
        /// Top-level type, e.g. `video`.
        top: String,
        /// Subtype or `*`.
        sub: String,
    },
    /// `.ext`, compared case-insensitively without the dot.
    Extension(String),
}

/// Media-acceptance filter for file and image fields, e.g. `video/*,.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    raw: String,
    patterns: Vec<MediaPattern>,
}

impl MediaFilter {
    /// Parse a comma-separated filter.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut patterns = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(ext) = part.strip_prefix('.') {
                if ext.is_empty() {
                    return Err(format!("empty extension in accept filter {raw:?}"));
                }
                patterns.push(MediaPattern::Extension(ext.to_ascii_lowercase()));
            } else if let Some((top, sub)) = part.split_once('/') {
                if top.is_empty() || sub.is_empty() {
                    return Err(format!("malformed MIME pattern {part:?}"));
                }
                patterns.push(MediaPattern::Mime {
                    top: top.to_ascii_lowercase(),
                    sub: sub.to_ascii_lowercase(),
                });
            } else {
                return Err(format!(
                    "accept entry {part:?} is neither a MIME pattern nor an extension"
                ));
            }
        }
        if patterns.is_empty() {
            return Err("accept filter must not be empty".to_string());
        }
        Ok(Self {
            raw: raw.to_string(),
            patterns,
        })
    }

    /// The filter as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed entries.
    pub fn patterns(&self) -> &[MediaPattern] {
        &self.patterns
    }

    /// Whether an asset with the given MIME type and extension passes.
    ///
    /// Returns `None` when neither is known, in which case the asset cannot
    /// be judged.
    pub fn matches(&self, mime_type: Option<&str>, extension: Option<&str>) -> Option<bool> {
        if mime_type.is_none() && extension.is_none() {
            return None;
        }
        let mime = mime_type.map(str::to_ascii_lowercase);
        let ext = extension.map(str::to_ascii_lowercase);
        let hit = self.patterns.iter().any(|pattern| match pattern {
            MediaPattern::Extension(want) => ext.as_deref() == Some(want.as_str()),
            MediaPattern::Mime { top, sub } => match mime.as_deref().and_then(|m| m.split_once('/')) {
                Some((t, s)) => t == top && (sub == "*" || s == sub),
                None => false,
            },
        });
        Some(hit)
    }
}

/// Options as declared in a schema, before they are checked against a kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsSpec {
    /// Enumerated allowed values (`string`, `number`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Choice>>,
    /// Editor layout hint (`radio`, `dropdown`, `tags`, `grid`, `switch`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Enable hotspot/crop editing (`image`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<bool>,
    /// Media-acceptance filter (`image`, `file`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Sibling field a slug is derived from (`slug`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Maximum derived slug length (`slug`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Whether the editor may collapse the object (`object`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,
    /// Whether the object starts collapsed (`object`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    /// Editor height in rows (`text`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Accept relative references (`url`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_relative: Option<bool>,
    /// Accepted URL schemes (`url`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    /// Allow image blocks between text blocks (`richText`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_images: Option<bool>,
}

impl OptionsSpec {
    /// Returns true when no option is declared.
    pub fn is_empty(&self) -> bool {
        self.declared().is_empty()
    }

    /// Names of the options that are declared, in declaration-struct order.
    fn declared(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.list.is_some() {
            names.push("list");
        }
        if self.layout.is_some() {
            names.push("layout");
        }
        if self.hotspot.is_some() {
            names.push("hotspot");
        }
        if self.accept.is_some() {
            names.push("accept");
        }
        if self.source.is_some() {
            names.push("source");
        }
        if self.max_length.is_some() {
            names.push("maxLength");
        }
        if self.collapsible.is_some() {
            names.push("collapsible");
        }
        if self.collapsed.is_some() {
            names.push("collapsed");
        }
        if self.rows.is_some() {
            names.push("rows");
        }
        if self.allow_relative.is_some() {
            names.push("allowRelative");
        }
        if self.schemes.is_some() {
            names.push("schemes");
        }
        if self.inline_images.is_some() {
            names.push("inlineImages");
        }
        names
    }

    /// Check the declared options against `kind` and produce typed options.
    pub fn resolve(&self, kind: FieldKind) -> Result<KindOptions, String> {
        let allowed: &[&str] = match kind {
            FieldKind::String | FieldKind::Number => &["list", "layout"],
            FieldKind::Boolean => &["layout"],
            FieldKind::Text => &["rows"],
            FieldKind::Url => &["allowRelative", "schemes"],
            FieldKind::Slug => &["source", "maxLength"],
            FieldKind::Image => &["hotspot", "accept"],
            FieldKind::File => &["accept"],
            FieldKind::Object => &["collapsible", "collapsed"],
            FieldKind::Array => &["layout"],
            FieldKind::RichText => &["inlineImages"],
            FieldKind::Date | FieldKind::Reference => &[],
        };
        if let Some(bad) = self.declared().into_iter().find(|n| !allowed.contains(n)) {
            return Err(format!("`{bad}` does not apply to {kind} fields"));
        }

        let resolved = match kind {
            FieldKind::String | FieldKind::Number => match &self.list {
                Some(list) => {
                    if list.is_empty() {
                        return Err("`list` must name at least one value".to_string());
                    }
                    for choice in list {
                        let fits = match kind {
                            FieldKind::String => choice.value.is_string(),
                            _ => choice.value.is_number(),
                        };
                        if !fits {
                            return Err(format!(
                                "`list` value {} is a {}, expected {kind}",
                                choice.value,
                                json_type_name(&choice.value)
                            ));
                        }
                    }
                    KindOptions::Choice {
                        list: list.clone(),
                        layout: self.layout.clone(),
                    }
                }
                None => match &self.layout {
                    Some(layout) => KindOptions::Layout {
                        layout: layout.clone(),
                    },
                    None => KindOptions::Plain,
                },
            },
            FieldKind::Boolean | FieldKind::Array => match &self.layout {
                Some(layout) => KindOptions::Layout {
                    layout: layout.clone(),
                },
                None => KindOptions::Plain,
            },
            FieldKind::Text => match self.rows {
                Some(0) => return Err("`rows` must be positive".to_string()),
                Some(rows) => KindOptions::Text { rows: Some(rows) },
                None => KindOptions::Plain,
            },
            FieldKind::Url => {
                let schemes = match &self.schemes {
                    Some(schemes) => {
                        if schemes.is_empty() {
                            return Err("`schemes` must name at least one scheme".to_string());
                        }
                        if let Some(bad) = schemes.iter().find(|s| !is_scheme(s)) {
                            return Err(format!("{bad:?} is not a URL scheme"));
                        }
                        schemes.iter().map(|s| s.to_ascii_lowercase()).collect()
                    }
                    None => DEFAULT_URL_SCHEMES.iter().map(|s| s.to_string()).collect(),
                };
                KindOptions::Url {
                    allow_relative: self.allow_relative.unwrap_or(false),
                    schemes,
                }
            }
            FieldKind::Slug => {
                let max_length = self.max_length.unwrap_or(DEFAULT_SLUG_MAX_LENGTH);
                if max_length == 0 {
                    return Err("`maxLength` must be positive".to_string());
                }
                KindOptions::Slug {
                    source: self.source.clone(),
                    max_length,
                }
            }
            FieldKind::Image | FieldKind::File => KindOptions::Media {
                hotspot: self.hotspot.unwrap_or(false),
                accept: self.accept.as_deref().map(MediaFilter::parse).transpose()?,
            },
            FieldKind::Object => KindOptions::Object {
                collapsible: self.collapsible.unwrap_or(false),
                collapsed: self.collapsed.unwrap_or(false),
            },
            FieldKind::RichText => KindOptions::RichText {
                inline_images: self.inline_images.unwrap_or(false),
            },
            FieldKind::Date | FieldKind::Reference => KindOptions::Plain,
        };
        Ok(resolved)
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Options resolved for one kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(into = "OptionsSpec")]
pub enum KindOptions {
    /// No kind-specific configuration.
    #[default]
    Plain,
    /// Editor layout hint only.
    Layout {
        /// The layout name.
        layout: String,
    },
    /// Value constrained to an enumerated list.
    Choice {
        /// Allowed values, in display order.
        list: Vec<Choice>,
        /// Editor layout hint.
        layout: Option<String>,
    },
    /// Multi-line text presentation.
    Text {
        /// Editor height in rows.
        rows: Option<u32>,
    },
    /// URL acceptance.
    Url {
        /// Whether relative references are accepted.
        allow_relative: bool,
        /// Accepted schemes, lower-case.
        schemes: Vec<String>,
    },
    /// Slug derivation.
    Slug {
        /// Sibling field the slug derives from.
        source: Option<String>,
        /// Maximum derived length.
        max_length: usize,
    },
    /// Asset acceptance.
    Media {
        /// Whether hotspot editing is enabled.
        hotspot: bool,
        /// Accepted media types.
        accept: Option<MediaFilter>,
    },
    /// Object presentation.
    Object {
        /// Whether the object may be collapsed.
        collapsible: bool,
        /// Whether it starts collapsed.
        collapsed: bool,
    },
    /// Rich text block acceptance.
    RichText {
        /// Whether image blocks are accepted.
        inline_images: bool,
    },
}

impl KindOptions {
    /// Allowed values, when the field is constrained to a list.
    pub fn choices(&self) -> Option<&[Choice]> {
        match self {
            Self::Choice { list, .. } => Some(list),
            _ => None,
        }
    }

    /// The slug source field, when declared.
    pub fn slug_source(&self) -> Option<&str> {
        match self {
            Self::Slug { source, .. } => source.as_deref(),
            _ => None,
        }
    }
}

impl From<KindOptions> for OptionsSpec {
    fn from(options: KindOptions) -> Self {
        let mut spec = OptionsSpec::default();
        match options {
            KindOptions::Plain => {}
            KindOptions::Layout { layout } => spec.layout = Some(layout),
            KindOptions::Choice { list, layout } => {
                spec.list = Some(list);
                spec.layout = layout;
            }
            KindOptions::Text { rows } => spec.rows = rows,
            KindOptions::Url {
                allow_relative,
                schemes,
            } => {
                spec.allow_relative = Some(allow_relative);
                spec.schemes = Some(schemes);
            }
            KindOptions::Slug { source, max_length } => {
                spec.source = source;
                spec.max_length = Some(max_length);
            }
            KindOptions::Media { hotspot, accept } => {
                spec.hotspot = Some(hotspot);
                spec.accept = accept.map(|a| a.raw);
            }
            KindOptions::Object {
                collapsible,
                collapsed,
            } => {
                spec.collapsible = Some(collapsible);
                spec.collapsed = Some(collapsed);
            }
            KindOptions::RichText { inline_images } => spec.inline_images = Some(inline_images),
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_choice_accepts_bare_and_titled() {
        let list: Vec<Choice> = serde_json::from_value(json!([
            "image",
            {"title": "Video", "value": "video"}
        ]))
        .unwrap();
        assert_eq!(list[0], Choice::new("image"));
        assert_eq!(list[1], Choice::titled("Video", "video"));
    }

    #[test]
    fn test_resolve_rejects_inapplicable_option() {
        let spec = OptionsSpec {
            hotspot: Some(true),
            ..Default::default()
        };
        let err = spec.resolve(FieldKind::String).unwrap_err();
        assert!(err.contains("hotspot"), "{err}");
        assert!(spec.resolve(FieldKind::Image).is_ok());
    }

    #[test]
    fn test_resolve_list_type_must_match_kind() {
        let spec = OptionsSpec {
            list: Some(vec![Choice::new(1)]),
            ..Default::default()
        };
        assert!(spec.resolve(FieldKind::String).is_err());
        assert!(spec.resolve(FieldKind::Number).is_ok());

        let empty = OptionsSpec {
            list: Some(vec![]),
            ..Default::default()
        };
        assert!(empty.resolve(FieldKind::String).is_err());
    }

    #[test]
    fn test_resolve_url_defaults() {
        let resolved = OptionsSpec::default().resolve(FieldKind::Url).unwrap();
        match resolved {
            KindOptions::Url {
                allow_relative,
                schemes,
            } => {
                assert!(!allow_relative);
                assert_eq!(schemes, vec!["http", "https", "mailto", "tel"]);
            }
            other => panic!("expected url options, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_slug_max_length() {
        let spec = OptionsSpec {
            source: Some("name".into()),
            max_length: Some(96),
            ..Default::default()
        };
        let resolved = spec.resolve(FieldKind::Slug).unwrap();
        assert_eq!(resolved.slug_source(), Some("name"));
        let zero = OptionsSpec {
            max_length: Some(0),
            ..Default::default()
        };
        assert!(zero.resolve(FieldKind::Slug).is_err());
    }

    #[test]
    fn test_media_filter_matching() {
        let filter = MediaFilter::parse("video/*, .pdf").unwrap();
        assert_eq!(filter.matches(Some("video/mp4"), None), Some(true));
        assert_eq!(filter.matches(Some("image/png"), Some("png")), Some(false));
        assert_eq!(filter.matches(None, Some("PDF")), Some(true));
        assert_eq!(filter.matches(None, None), None);
    }

    #[test]
    fn test_media_filter_rejects_garbage() {
        assert!(MediaFilter::parse("").is_err());
        assert!(MediaFilter::parse("video").is_err());
        assert!(MediaFilter::parse("/mp4").is_err());
        assert!(MediaFilter::parse(".").is_err());
    }

    #[test]
    fn test_kind_options_serialize_flat() {
        let spec = OptionsSpec {
            hotspot: Some(true),
            accept: Some("image/*".into()),
            ..Default::default()
        };
        let resolved = spec.resolve(FieldKind::Image).unwrap();
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json, json!({"hotspot": true, "accept": "image/*"}));
    }

    #[test]
    fn test_options_spec_denies_unknown_keys() {
        let parsed: Result<OptionsSpec, _> = serde_json::from_value(json!({"hotpsot": true}));
        assert!(parsed.is_err());
    }
}
