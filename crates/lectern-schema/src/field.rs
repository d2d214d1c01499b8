//! # Field Declarations and Definitions
//!
//! [`FieldSpec`] is what an author writes, in Rust or in a schema file.
//! [`define_field`] checks it and produces an immutable [`FieldDefinition`],
//! the node type of every schema tree.
//!
//! ## Construction-time checks
//!
//! - Names are identifiers, unique among siblings, never `_`-prefixed.
//! - `fields` only on objects (at least one), `of` only on arrays (at least
//!   one variant), `to` only and always on references.
//! - Array variants are named (defaulting to their kind) and carry no
//!   visibility predicate.
//! - Options, rules and the initial value fit the kind.
//! - Visibility predicates and slug sources name existing siblings.
//!
//! Any violation is a [`SchemaDefinitionError`] naming the offending path.

use std::collections::HashSet;

use lectern_core::path::is_field_name;
use lectern_core::registry::{describe, FieldKindDescriptor};
use lectern_core::{FieldKind, KindOptions, OptionsSpec, SchemaDefinitionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::ValidationRule;
use crate::visibility::VisibilityPredicate;

/// A field as declared by a schema author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldSpec {
    /// Field name; optional for array variants.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Editor label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Editor help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kind name, e.g. `string` or `richText`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Members of an `object`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
    /// Item variants of an `array`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub of: Vec<FieldSpec>,
    /// Target document types of a `reference`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    /// Validation rules, evaluated in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationRule>,
    /// Visibility predicate over sibling values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<VisibilityPredicate>,
    /// Value used when a document omits the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    /// Kind-specific options.
    #[serde(default, skip_serializing_if = "OptionsSpec::is_empty")]
    pub options: OptionsSpec,
}

impl FieldSpec {
    /// A field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind: kind.as_str().to_string(),
            ..Default::default()
        }
    }

    /// An unnamed array variant of the given kind.
    pub fn variant(kind: FieldKind) -> Self {
        Self::new(String::new(), kind)
    }

    /// An `object` field with members.
    pub fn object(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            ..Self::new(name, FieldKind::Object)
        }
    }

    /// An `array` field with item variants.
    pub fn array(name: impl Into<String>, of: Vec<FieldSpec>) -> Self {
        Self {
            of,
            ..Self::new(name, FieldKind::Array)
        }
    }

    /// A `reference` field to the given document types.
    pub fn reference<I, S>(name: impl Into<String>, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            to: to.into_iter().map(Into::into).collect(),
            ..Self::new(name, FieldKind::Reference)
        }
    }

    /// Set the editor label.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the help text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a validation rule.
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.validation.push(rule);
        self
    }

    /// Append a `required` rule.
    pub fn required(self) -> Self {
        self.rule(ValidationRule::required())
    }

    /// Set the visibility predicate.
    pub fn visible_when(mut self, predicate: VisibilityPredicate) -> Self {
        self.visible_when = Some(predicate);
        self
    }

    /// Set the initial value.
    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Set the kind options.
    pub fn options(mut self, options: OptionsSpec) -> Self {
        self.options = options;
        self
    }
}

/// A checked, immutable node of a schema tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "type")]
    kind: FieldKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<FieldDefinition>,
    #[serde(rename = "validation", skip_serializing_if = "Vec::is_empty")]
    rules: Vec<ValidationRule>,
    #[serde(rename = "visibleWhen", skip_serializing_if = "Option::is_none")]
    visibility: Option<VisibilityPredicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_value: Option<Value>,
    #[serde(skip_serializing_if = "is_plain")]
    options: KindOptions,
    #[serde(rename = "to", skip_serializing_if = "Vec::is_empty")]
    target_types: Vec<String>,
}

fn is_plain(options: &KindOptions) -> bool {
    *options == KindOptions::Plain
}

impl FieldDefinition {
    /// Field name (the variant name, for array item variants).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Editor label, if declared.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Editor label, falling back to the name.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Help text, if declared.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The field's kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Object members or array variants, in declaration order.
    pub fn children(&self) -> &[FieldDefinition] {
        &self.children
    }

    /// The child named `name`.
    pub fn child(&self, name: &str) -> Option<&FieldDefinition> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Validation rules, in declaration order.
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Whether any rule is `required`.
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(ValidationRule::is_required)
    }

    /// Visibility predicate, if any.
    pub fn visibility(&self) -> Option<&VisibilityPredicate> {
        self.visibility.as_ref()
    }

    /// Initial value, if any.
    pub fn initial_value(&self) -> Option<&Value> {
        self.initial_value.as_ref()
    }

    /// Resolved kind options.
    pub fn options(&self) -> &KindOptions {
        &self.options
    }

    /// Document types a reference may point to.
    pub fn target_types(&self) -> &[String] {
        &self.target_types
    }

    /// The kind's intrinsic description under this field's options.
    pub fn descriptor(&self) -> FieldKindDescriptor<'_> {
        describe(self.kind, &self.options)
    }

    /// The array variant governing `item`.
    ///
    /// An item's `_type` selects the variant of that name, and a `_type`
    /// naming no variant matches nothing. An untyped item is governed by the
    /// first variant whose kind accepts its shape. `null` matches nothing.
    pub fn variant_for(&self, item: &Value) -> Option<&FieldDefinition> {
        if self.kind != FieldKind::Array || item.is_null() {
            return None;
        }
        match item_type(item) {
            Some(type_name) => self.child(type_name),
            None => self
                .children
                .iter()
                .find(|variant| variant.descriptor().accepts(item)),
        }
    }

    /// Number of fields below this one, variants included.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }
}

/// The declared `_type` of an array item.
pub(crate) fn item_type(item: &Value) -> Option<&str> {
    item.get("_type").and_then(Value::as_str)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Member,
    Variant,
}

/// Check a declaration and build its definition.
///
/// `parent` is the dotted path of the enclosing object (the document type
/// name at top level, empty for a stand-alone field).
pub fn define_field(spec: &FieldSpec, parent: &str) -> Result<FieldDefinition, SchemaDefinitionError> {
    build(spec, parent, Role::Member)
}

/// Build the root object of a type; `name` is the type name.
pub(crate) fn define_root(
    name: &str,
    title: Option<String>,
    fields: &[FieldSpec],
) -> Result<FieldDefinition, SchemaDefinitionError> {
    let spec = FieldSpec {
        title,
        fields: fields.to_vec(),
        ..FieldSpec::new(name, FieldKind::Object)
    };
    build(&spec, "", Role::Member)
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn build(spec: &FieldSpec, parent: &str, role: Role) -> Result<FieldDefinition, SchemaDefinitionError> {
    let declared_at = join(parent, if spec.name.is_empty() { &spec.kind } else { &spec.name });

    let kind: FieldKind = spec
        .kind
        .parse()
        .map_err(|_| SchemaDefinitionError::UnknownKind {
            path: declared_at.clone(),
            kind: spec.kind.clone(),
        })?;

    let name = match (role, spec.name.is_empty()) {
        (Role::Variant, true) => kind.as_str().to_string(),
        (Role::Member, true) => {
            return Err(SchemaDefinitionError::EmptyName {
                path: parent.to_string(),
            })
        }
        (_, false) => spec.name.clone(),
    };
    if !is_field_name(&name) || name.starts_with('_') {
        return Err(SchemaDefinitionError::InvalidName {
            path: parent.to_string(),
            name,
        });
    }
    let path = join(parent, &name);

    for (what, misplaced) in [
        ("fields", !spec.fields.is_empty() && kind != FieldKind::Object),
        ("of", !spec.of.is_empty() && kind != FieldKind::Array),
        ("to", !spec.to.is_empty() && kind != FieldKind::Reference),
    ] {
        if misplaced {
            return Err(SchemaDefinitionError::ChildrenNotAllowed {
                path,
                kind: kind.to_string(),
                what,
            });
        }
    }

    if role == Role::Variant && spec.visible_when.is_some() {
        return Err(SchemaDefinitionError::InvalidPredicate {
            path,
            reason: "array item variants cannot declare `visibleWhen`".to_string(),
        });
    }

    let children = match kind {
        FieldKind::Object => {
            if spec.fields.is_empty() {
                return Err(SchemaDefinitionError::EmptyObject { path });
            }
            let members = build_all(&spec.fields, &path, Role::Member)?;
            check_sibling_references(&members, &path)?;
            members
        }
        FieldKind::Array => {
            if spec.of.is_empty() {
                return Err(SchemaDefinitionError::EmptyArrayVariants { path });
            }
            build_all(&spec.of, &path, Role::Variant)?
        }
        _ => Vec::new(),
    };

    if kind == FieldKind::Reference && spec.to.is_empty() {
        return Err(SchemaDefinitionError::MissingReferenceTargets { path });
    }

    let options = spec
        .options
        .resolve(kind)
        .map_err(|reason| SchemaDefinitionError::InvalidOption {
            path: path.clone(),
            reason,
        })?;

    for rule in &spec.validation {
        rule.check_applies(kind)
            .map_err(|reason| SchemaDefinitionError::InvalidRule {
                path: path.clone(),
                reason,
            })?;
    }

    if let Some(predicate) = &spec.visible_when {
        predicate
            .check_structure()
            .map_err(|reason| SchemaDefinitionError::InvalidPredicate {
                path: path.clone(),
                reason,
            })?;
    }

    if let Some(initial) = &spec.initial_value {
        let descriptor = describe(kind, &options);
        if !descriptor.accepts(initial) {
            return Err(SchemaDefinitionError::InvalidInitialValue {
                path,
                reason: format!(
                    "expected {kind}, found {}",
                    lectern_core::document::json_type_name(initial)
                ),
            });
        }
        if let Some(problem) = descriptor.intrinsic_problem(initial) {
            return Err(SchemaDefinitionError::InvalidInitialValue {
                path,
                reason: problem,
            });
        }
    }

    Ok(FieldDefinition {
        name,
        title: spec.title.clone(),
        description: spec.description.clone(),
        kind,
        children,
        rules: spec.validation.clone(),
        visibility: spec.visible_when.clone(),
        initial_value: spec.initial_value.clone(),
        options,
        target_types: spec.to.clone(),
    })
}

fn build_all(
    specs: &[FieldSpec],
    path: &str,
    role: Role,
) -> Result<Vec<FieldDefinition>, SchemaDefinitionError> {
    let mut seen = HashSet::new();
    let mut built = Vec::with_capacity(specs.len());
    for spec in specs {
        let field = build(spec, path, role)?;
        if !seen.insert(field.name.clone()) {
            return Err(SchemaDefinitionError::DuplicateField {
                path: path.to_string(),
                name: field.name,
            });
        }
        built.push(field);
    }
    Ok(built)
}

/// Predicates and slug sources must name a sibling other than the field.
fn check_sibling_references(
    members: &[FieldDefinition],
    path: &str,
) -> Result<(), SchemaDefinitionError> {
    for field in members {
        let field_path = join(path, &field.name);
        if let Some(predicate) = &field.visibility {
            for referenced in predicate.referenced_fields() {
                let reason = if referenced == field.name {
                    format!("`{referenced}` cannot depend on itself")
                } else if members.iter().all(|m| m.name != referenced) {
                    format!("`{referenced}` is not a sibling field")
                } else {
                    continue;
                };
                return Err(SchemaDefinitionError::InvalidPredicate {
                    path: field_path,
                    reason,
                });
            }
        }
        if let Some(source) = field.options.slug_source() {
            if source == field.name || members.iter().all(|m| m.name != source) {
                return Err(SchemaDefinitionError::InvalidOption {
                    path: field_path,
                    reason: format!("slug source `{source}` is not a sibling field"),
                });
            }
        }
    }
    Ok(())
}
