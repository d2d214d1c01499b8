//! # Field Paths
//!
//! A `FieldPath` addresses one value inside a document: a sequence of field
//! names with array indices, e.g. `hero.stats[2].label`.
//!
//! Paths serialize as a JSON sequence (`["hero", "stats", 2, "label"]`) and
//! deserialize from either that sequence or the dotted string form, so schema
//! files can write `title: hero.headline` for preview selections.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position inside an array.
    Index(usize),
    /// Named member of an object.
    Field(String),
}

impl PathSegment {
    /// The field name, if this segment names one.
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            Self::Index(_) => None,
        }
    }
}

/// Address of a value within a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path, addressing the document itself.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from field names only.
    pub fn from_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(|n| PathSegment::Field(n.into())).collect())
    }

    /// Returns the segments of this path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a field name in place.
    pub fn push_field(&mut self, name: impl Into<String>) {
        self.0.push(PathSegment::Field(name.into()));
    }

    /// Append an array index in place.
    pub fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Return a new path with a field name appended.
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push_field(name);
        next
    }

    /// Return a new path with an index appended.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push_index(index);
        next
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// The path without its last segment.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    /// Parses `a.b[0].c`; a purely numeric dotted part (`a.0.c`) is an index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in s.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };

            if name.is_empty() {
                if segments.is_empty() || rest.is_empty() {
                    return Err(PathError::InvalidSegment {
                        path: s.to_string(),
                        segment: part.to_string(),
                    });
                }
            } else if let Ok(index) = name.parse::<usize>() {
                segments.push(PathSegment::Index(index));
            } else if is_field_name(name) {
                segments.push(PathSegment::Field(name.to_string()));
            } else {
                return Err(PathError::InvalidSegment {
                    path: s.to_string(),
                    segment: name.to_string(),
                });
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(|| PathError::InvalidSegment {
                    path: s.to_string(),
                    segment: part.to_string(),
                })?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| PathError::InvalidSegment {
                        path: s.to_string(),
                        segment: part.to_string(),
                    })?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(PathError::InvalidSegment {
                        path: s.to_string(),
                        segment: part.to_string(),
                    });
                }
            }
        }

        Ok(Self(segments))
    }
}

/// Whether `name` is usable as a field name: an ASCII identifier.
pub fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Dotted(String),
            Segments(Vec<PathSegment>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Dotted(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Segments(segments) => Ok(Self(segments)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let path: FieldPath = "hero.headline".parse().unwrap();
        assert_eq!(path, FieldPath::from_fields(["hero", "headline"]));
    }

    #[test]
    fn test_parse_bracket_and_numeric_indices() {
        let bracket: FieldPath = "hero.stats[2].label".parse().unwrap();
        let dotted: FieldPath = "hero.stats.2.label".parse().unwrap();
        assert_eq!(bracket, dotted);
        assert_eq!(
            bracket.segments(),
            &[
                PathSegment::Field("hero".into()),
                PathSegment::Field("stats".into()),
                PathSegment::Index(2),
                PathSegment::Field("label".into()),
            ]
        );
    }

    #[test]
    fn test_parse_nested_indices() {
        let path: FieldPath = "grid[1][3]".parse().unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.last(), Some(&PathSegment::Index(3)));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<FieldPath>().is_err());
        assert!("a..b".parse::<FieldPath>().is_err());
        assert!("a[x]".parse::<FieldPath>().is_err());
        assert!("a[1".parse::<FieldPath>().is_err());
        assert!("a[1]b".parse::<FieldPath>().is_err());
        assert!("some-field".parse::<FieldPath>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for raw in ["slug", "hero.stats[2].label", "menuItems[0]"] {
            let path: FieldPath = raw.parse().unwrap();
            assert_eq!(path.to_string(), raw);
        }
        assert_eq!(FieldPath::root().to_string(), "(root)");
    }

    #[test]
    fn test_serialize_as_sequence() {
        let path: FieldPath = "stats[0].label".parse().unwrap();
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!(["stats", 0, "label"]));
    }

    #[test]
    fn test_deserialize_string_or_sequence() {
        let from_str: FieldPath = serde_json::from_str("\"stats[0].label\"").unwrap();
        let from_seq: FieldPath = serde_json::from_str("[\"stats\", 0, \"label\"]").unwrap();
        assert_eq!(from_str, from_seq);
    }

    #[test]
    fn test_parent_and_push() {
        let mut path = FieldPath::root();
        path.push_field("about");
        path.push_field("video");
        assert_eq!(path.parent(), Some(FieldPath::from_fields(["about"])));
        assert_eq!(path.pop(), Some(PathSegment::Field("video".into())));
        assert_eq!(path.index(3).to_string(), "about[3]");
    }

    #[test]
    fn test_is_field_name() {
        assert!(is_field_name("mediaType"));
        assert!(is_field_name("_id"));
        assert!(!is_field_name("2fast"));
        assert!(!is_field_name("og-image"));
        assert!(!is_field_name(""));
    }
}
