//! # Validation Rules
//!
//! A [`ValidationRule`] is a tagged constraint plus a severity level and an
//! optional message template. Schema files write rules as flat maps:
//!
//! ```yaml
//! validation:
//!   - rule: required
//!   - rule: maxLength
//!     limit: 60
//!     level: warning
//!     message: Titles over {limit} characters are truncated ({actual})
//! ```
//!
//! Templates may use `{limit}` and `{actual}`; without a template each
//! constraint produces its default message (`required` → `"required"`).
//!
//! Every constraint except `required` passes on an absent or empty value:
//! presence is the job of `required` alone.

use std::fmt;

use lectern_core::registry::{display_scalar, slug_current, FieldKindDescriptor};
use lectern_core::{FieldKind, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex pattern"));

/// A compiled regular expression that serializes as its source.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether `text` contains a match.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::new(&source).map_err(serde::de::Error::custom)
    }
}

/// The condition a rule checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Constraint {
    /// The value must be present and non-empty.
    Required,
    /// Text must have at least `limit` characters; a sequence, `limit` items.
    MinLength {
        /// Minimum length.
        limit: usize,
    },
    /// Text must have at most `limit` characters; a sequence, `limit` items.
    MaxLength {
        /// Maximum length.
        limit: usize,
    },
    /// A sequence must have at least `limit` items.
    MinCount {
        /// Minimum item count.
        limit: usize,
    },
    /// A sequence must have at most `limit` items.
    MaxCount {
        /// Maximum item count.
        limit: usize,
    },
    /// A number must lie within the bounds.
    Range {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    /// Text must match (or, inverted, must not match) a regular expression.
    Pattern {
        /// The expression.
        pattern: Pattern,
        /// Human name used in the default message.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Fail on a match instead of on a miss.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        invert: bool,
    },
    /// Text must look like an email address.
    Email,
    /// The value must equal one of `values`.
    OneOf {
        /// Allowed values.
        values: Vec<Value>,
    },
}

impl Constraint {
    /// Wire name of the constraint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::MinCount { .. } => "minCount",
            Self::MaxCount { .. } => "maxCount",
            Self::Range { .. } => "range",
            Self::Pattern { .. } => "pattern",
            Self::Email => "email",
            Self::OneOf { .. } => "oneOf",
        }
    }
}

/// A constraint with its severity and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// What is checked.
    #[serde(flatten)]
    pub constraint: Constraint,
    /// Severity of findings produced by this rule.
    #[serde(default, skip_serializing_if = "Severity::is_error")]
    pub level: Severity,
    /// Message template replacing the default message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Details of one failed check, before the message is rendered.
struct Failure {
    default: String,
    limit: Option<String>,
    actual: Option<String>,
}

impl Failure {
    fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            limit: None,
            actual: None,
        }
    }

    fn limit(mut self, limit: impl fmt::Display) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    fn actual(mut self, actual: impl fmt::Display) -> Self {
        self.actual = Some(actual.to_string());
        self
    }

    fn render(self, template: Option<&str>) -> String {
        let Some(template) = template else {
            return self.default;
        };
        let mut message = template.to_string();
        if let Some(limit) = &self.limit {
            message = message.replace("{limit}", limit);
        }
        if let Some(actual) = &self.actual {
            message = message.replace("{actual}", actual);
        }
        message
    }
}

impl ValidationRule {
    /// An `error`-level rule with the default message.
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            level: Severity::Error,
            message: None,
        }
    }

    /// `required`.
    pub fn required() -> Self {
        Self::new(Constraint::Required)
    }

    /// `minLength`.
    pub fn min_length(limit: usize) -> Self {
        Self::new(Constraint::MinLength { limit })
    }

    /// `maxLength`.
    pub fn max_length(limit: usize) -> Self {
        Self::new(Constraint::MaxLength { limit })
    }

    /// `minCount`.
    pub fn min_count(limit: usize) -> Self {
        Self::new(Constraint::MinCount { limit })
    }

    /// `maxCount`.
    pub fn max_count(limit: usize) -> Self {
        Self::new(Constraint::MaxCount { limit })
    }

    /// `range`.
    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(Constraint::Range { min, max })
    }

    /// `pattern`.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(Constraint::Pattern {
            pattern: Pattern::new(source)?,
            name: None,
            invert: false,
        }))
    }

    /// `email`.
    pub fn email() -> Self {
        Self::new(Constraint::Email)
    }

    /// `oneOf`.
    pub fn one_of(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(Constraint::OneOf {
            values: values.into_iter().collect(),
        })
    }

    /// Downgrade to `warning` with the given message template.
    pub fn warning(mut self, message: impl Into<String>) -> Self {
        self.level = Severity::Warning;
        self.message = Some(message.into());
        self
    }

    /// Keep `error` level with the given message template.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.level = Severity::Error;
        self.message = Some(message.into());
        self
    }

    /// Whether this is a `required` rule.
    pub fn is_required(&self) -> bool {
        matches!(self.constraint, Constraint::Required)
    }

    /// Check that the rule can apply to fields of `kind`.
    pub fn check_applies(&self, kind: FieldKind) -> Result<(), String> {
        let name = self.constraint.as_str();
        let applies = match &self.constraint {
            Constraint::Required => true,
            Constraint::MinLength { .. } | Constraint::MaxLength { .. } => {
                kind.is_textual() || kind.is_sequence()
            }
            Constraint::MinCount { .. } | Constraint::MaxCount { .. } => kind.is_sequence(),
            Constraint::Range { min, max } => {
                if min.is_none() && max.is_none() {
                    return Err("`range` must declare `min` or `max`".to_string());
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(format!("`range` min {lo} exceeds max {hi}"));
                    }
                }
                kind == FieldKind::Number
            }
            Constraint::Pattern { .. } | Constraint::Email => kind.is_textual(),
            Constraint::OneOf { values } => {
                if values.is_empty() {
                    return Err("`oneOf` must list at least one value".to_string());
                }
                kind.is_textual() || matches!(kind, FieldKind::Number | FieldKind::Boolean)
            }
        };
        if applies {
            Ok(())
        } else {
            Err(format!("`{name}` does not apply to {kind} fields"))
        }
    }

    /// Evaluate the rule against a field's materialized value.
    ///
    /// Returns the finding message when the rule fails. The value has
    /// already been checked against the kind's JSON type.
    pub fn evaluate(&self, descriptor: &FieldKindDescriptor<'_>, value: Option<&Value>) -> Option<String> {
        let template = self.message.as_deref();
        let present = value.filter(|v| !descriptor.is_empty(v));
        let Some(value) = present else {
            return self
                .is_required()
                .then(|| Failure::new("required").render(template));
        };

        let failure = match &self.constraint {
            Constraint::Required => None,
            Constraint::MinLength { limit } => {
                let (length, unit) = measure(descriptor.kind, value)?;
                (length < *limit).then(|| {
                    Failure::new(at_least(*limit, unit)).limit(limit).actual(length)
                })
            }
            Constraint::MaxLength { limit } => {
                let (length, unit) = measure(descriptor.kind, value)?;
                (length > *limit).then(|| {
                    Failure::new(at_most(*limit, unit)).limit(limit).actual(length)
                })
            }
            Constraint::MinCount { limit } => {
                let count = value.as_array()?.len();
                (count < *limit).then(|| {
                    Failure::new(at_least(*limit, Unit::Items))
                        .limit(limit)
                        .actual(count)
                })
            }
            Constraint::MaxCount { limit } => {
                let count = value.as_array()?.len();
                (count > *limit).then(|| {
                    Failure::new(at_most(*limit, Unit::Items))
                        .limit(limit)
                        .actual(count)
                })
            }
            Constraint::Range { min, max } => {
                let number = value.as_f64()?;
                match (min, max) {
                    (Some(lo), _) if number < *lo => Some(
                        Failure::new(format!("must be at least {lo}"))
                            .limit(lo)
                            .actual(number),
                    ),
                    (_, Some(hi)) if number > *hi => Some(
                        Failure::new(format!("must be at most {hi}"))
                            .limit(hi)
                            .actual(number),
                    ),
                    _ => None,
                }
            }
            Constraint::Pattern {
                pattern,
                name,
                invert,
            } => {
                let text = text_of(descriptor.kind, value)?;
                let label = name.as_deref().unwrap_or(pattern.as_str());
                if pattern.is_match(text) == *invert {
                    let default = if *invert {
                        format!("must not match the {label} pattern")
                    } else {
                        format!("does not match the {label} pattern")
                    };
                    Some(Failure::new(default).actual(text))
                } else {
                    None
                }
            }
            Constraint::Email => {
                let text = text_of(descriptor.kind, value)?;
                (!EMAIL.is_match(text.trim()))
                    .then(|| Failure::new("must be a valid email address").actual(text))
            }
            Constraint::OneOf { values } => (!values.contains(value)).then(|| {
                let allowed: Vec<String> = values.iter().map(display_scalar).collect();
                Failure::new(format!("must be one of: {}", allowed.join(", ")))
                    .actual(display_scalar(value))
            }),
        };
        failure.map(|f| f.render(template))
    }
}

/// Length of a value for `minLength`/`maxLength`: characters of text, or
/// items of a sequence.
fn measure(kind: FieldKind, value: &Value) -> Option<(usize, Unit)> {
    if kind.is_sequence() {
        return value.as_array().map(|items| (items.len(), Unit::Items));
    }
    text_of(kind, value).map(|text| (text.chars().count(), Unit::Characters))
}

#[derive(Clone, Copy)]
enum Unit {
    Characters,
    Items,
}

fn at_least(limit: usize, unit: Unit) -> String {
    match unit {
        Unit::Characters => format!("must be at least {limit} characters long"),
        Unit::Items => format!("must have at least {limit} items"),
    }
}

fn at_most(limit: usize, unit: Unit) -> String {
    match unit {
        Unit::Characters => format!("must be at most {limit} characters long"),
        Unit::Items => format!("must have at most {limit} items"),
    }
}

/// Text measured by length, pattern and email constraints.
fn text_of(kind: FieldKind, value: &Value) -> Option<&str> {
    match kind {
        FieldKind::Slug => slug_current(value),
        _ => value.as_str(),
    }
}
