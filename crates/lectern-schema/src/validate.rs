//! # Validation Engine
//!
//! Walks a schema tree and a document together and reports every problem as
//! a [`ValidationFinding`]. Validation never fails: a document that cannot
//! be accepted is described by its findings, not by an error.
//!
//! ## Traversal
//!
//! Depth-first, in declaration order; array items in document order. At
//! each field:
//!
//! 1. A hidden field is skipped together with its whole subtree.
//! 2. A present value of the wrong JSON type yields one `expected <kind>`
//!    error and nothing else for that field.
//! 3. The field's rules run in declaration order.
//! 4. Intrinsic checks of the kind run on non-empty values (list
//!    membership, URL, date, media type).
//! 5. Present objects recurse into their members; arrays into each item,
//!    matched to its variant; rich text reports malformed blocks.
//!
//! Count rules run once on the array itself, never per item.

use std::fmt;

use lectern_core::document::json_type_name;
use lectern_core::{DocumentInstance, FieldKind, FieldPath, Severity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::{item_type, FieldDefinition};
use crate::tree::SchemaTree;
use crate::visibility::{is_visible, ObjectScope};

/// One reported problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFinding {
    /// Where the problem is.
    pub field_path: FieldPath,
    /// Whether it blocks acceptance.
    pub severity: Severity,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} [{}]: {}", self.field_path, self.severity, self.message)
    }
}

/// Ordered findings for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// Returns the number of findings.
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Returns true if there are no findings.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns a slice of all findings, in traversal order.
    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    /// True when no finding has `error` severity.
    pub fn is_acceptable(&self) -> bool {
        !self.findings.iter().any(|f| f.severity.is_blocking())
    }

    /// Findings with `error` severity.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    /// Findings with `warning` severity.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    /// The first `error` finding in traversal order.
    pub fn first_error(&self) -> Option<&ValidationFinding> {
        self.errors().next()
    }

    /// Consumes self and returns the findings.
    pub fn into_findings(self) -> Vec<ValidationFinding> {
        self.findings
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, finding) in self.findings.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{finding}")?;
        }
        Ok(())
    }
}

/// Validate `doc` against `tree`.
pub fn validate(tree: &SchemaTree, doc: &DocumentInstance) -> ValidationReport {
    let mut walker = Walker {
        path: FieldPath::root(),
        findings: Vec::new(),
    };
    walker.members(tree.fields(), Some(doc.members()));
    ValidationReport {
        findings: walker.findings,
    }
}

struct Walker {
    path: FieldPath,
    findings: Vec<ValidationFinding>,
}

impl Walker {
    fn report(&mut self, severity: Severity, message: impl Into<String>) {
        self.findings.push(ValidationFinding {
            field_path: self.path.clone(),
            severity,
            message: message.into(),
        });
    }

    fn members(&mut self, fields: &[FieldDefinition], values: Option<&Map<String, Value>>) {
        let scope = ObjectScope::new(fields, values);
        for field in fields {
            if !is_visible(field, &scope) {
                continue;
            }
            self.path.push_field(field.name());
            self.field(field, scope.materialized(field.name()));
            self.path.pop();
        }
    }

    fn field(&mut self, field: &FieldDefinition, value: Option<&Value>) {
        let descriptor = field.descriptor();
        let value = value.filter(|v| !v.is_null());

        if let Some(v) = value {
            if !descriptor.accepts(v) {
                self.report(
                    Severity::Error,
                    format!("expected {}, found {}", field.kind(), json_type_name(v)),
                );
                return;
            }
        }

        for rule in field.rules() {
            if let Some(message) = rule.evaluate(&descriptor, value) {
                self.report(rule.level, message);
            }
        }

        let Some(value) = value else {
            return;
        };
        if !descriptor.is_empty(value) {
            if let Some(problem) = descriptor.intrinsic_problem(value) {
                self.report(Severity::Error, problem);
            }
        }

        match field.kind() {
            FieldKind::Object => self.members(field.children(), value.as_object()),
            FieldKind::Array => self.items(field, value.as_array().map(Vec::as_slice).unwrap_or_default()),
            FieldKind::RichText => {
                for (index, problem) in descriptor.block_problems(value) {
                    self.path.push_index(index);
                    self.report(Severity::Error, problem);
                    self.path.pop();
                }
            }
            _ => {}
        }
    }

    fn items(&mut self, field: &FieldDefinition, items: &[Value]) {
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            if item.is_null() {
                self.report(Severity::Error, "null items are not allowed");
            } else {
                match field.variant_for(item) {
                    Some(variant) => self.field(variant, Some(item)),
                    None => {
                        let allowed: Vec<&str> = field.children().iter().map(|v| v.name()).collect();
                        let message = match item_type(item) {
                            Some(type_name) => format!(
                                "unknown item type {type_name:?} (expected one of: {})",
                                allowed.join(", ")
                            ),
                            None => format!("item type not allowed (expected one of: {})", allowed.join(", ")),
                        };
                        self.report(Severity::Error, message);
                    }
                }
            }
            self.path.pop();
        }
    }
}
