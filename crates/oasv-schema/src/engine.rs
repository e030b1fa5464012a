//! # Schema Validator
//!
//! The recursive engine: checks one JSON value against one schema node and
//! returns every violation found. Pure and reentrant; it holds only shared
//! references to the document and options.
//!
//! ## Rule Order
//!
//! 1. `oneOf` hands the value to the discriminator-selected variant and
//!    nothing else about the node is checked.
//! 2. `allOf` parts are checked in order; the node's own rules still apply.
//! 3. `type` (with `nullable`); a mismatch stops this branch.
//! 4. Kind-specific rules: `required`/`properties`, `items`,
//!    `minLength`/`maxLength`, `minimum`/`maximum`.
//! 5. `enum`, compared on the canonical text of the value.
//!
//! Each step into a sub-schema counts one level against
//! [`ValidatorOptions::max_depth`], so cyclic component graphs terminate
//! with `RecursionLimit` instead of overflowing the stack.

use std::borrow::Cow;
use std::cmp::Ordering;

use oasv_core::{InstancePath, SchemaViolation, ViolationKind};
use serde_json::{Number, Value};

use crate::document::{SchemaDocument, SchemaId, SchemaNode};
use crate::options::ValidatorOptions;

/// Validates values against nodes of one document.
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'a> {
    document: &'a SchemaDocument,
    options: &'a ValidatorOptions,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(document: &'a SchemaDocument, options: &'a ValidatorOptions) -> Self {
        Self { document, options }
    }

    /// All violations of `value` against `schema`, with paths below `path`.
    pub fn validate(
        &self,
        value: &Value,
        schema: SchemaId,
        path: &InstancePath,
    ) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        self.walk(value, schema, path, 0, &mut violations);
        violations
    }

    fn walk(
        &self,
        value: &Value,
        id: SchemaId,
        path: &InstancePath,
        depth: usize,
        out: &mut Vec<SchemaViolation>,
    ) {
        if depth > self.options.max_depth {
            out.push(SchemaViolation::new(
                ViolationKind::RecursionLimit,
                path.clone(),
                format!(
                    "schema nesting exceeds the limit of {} levels",
                    self.options.max_depth
                ),
            ));
            return;
        }

        let node = self.document.node(id);

        if value.is_null() && node.nullable {
            return;
        }

        if !node.one_of.is_empty() {
            self.one_of(value, node, path, depth, out);
            return;
        }

        for &part in &node.all_of {
            self.walk(value, part, path, depth + 1, out);
        }

        self.node_rules(value, node, path, depth, out);
    }

    fn node_rules(
        &self,
        value: &Value,
        node: &SchemaNode,
        path: &InstancePath,
        depth: usize,
        out: &mut Vec<SchemaViolation>,
    ) {
        if let Some(kind) = node.kind {
            if !kind.matches(value) {
                out.push(SchemaViolation::new(
                    ViolationKind::TypeMismatch,
                    path.clone(),
                    format!("expected {kind}, got {}", value_kind(value)),
                ));
                return;
            }
        }

        match value {
            Value::Object(object) => {
                for name in &node.required {
                    if !object.contains_key(name) {
                        out.push(SchemaViolation::new(
                            ViolationKind::MissingRequiredProperty,
                            path.key(name.as_str()),
                            format!("missing required property '{name}'"),
                        ));
                    }
                }
                for (name, &child) in &node.properties {
                    if let Some(property) = object.get(name) {
                        self.walk(property, child, &path.key(name.as_str()), depth + 1, out);
                    }
                }
            }
            Value::Array(elements) => {
                if let Some(items) = node.items {
                    for (i, element) in elements.iter().enumerate() {
                        self.walk(element, items, &path.index(i), depth + 1, out);
                    }
                }
            }
            Value::String(s) => {
                let length = s.chars().count() as u64;
                if let Some(min) = node.min_length.filter(|min| length < *min) {
                    out.push(SchemaViolation::new(
                        ViolationKind::LengthOutOfRange,
                        path.clone(),
                        format!("length {length} is less than minLength {min}"),
                    ));
                }
                if let Some(max) = node.max_length.filter(|max| length > *max) {
                    out.push(SchemaViolation::new(
                        ViolationKind::LengthOutOfRange,
                        path.clone(),
                        format!("length {length} exceeds maxLength {max}"),
                    ));
                }
            }
            Value::Number(n) => {
                let below = |min: &&Number| compare_numbers(n, min) == Some(Ordering::Less);
                if let Some(min) = node.minimum.as_ref().filter(below) {
                    out.push(SchemaViolation::new(
                        ViolationKind::ValueOutOfRange,
                        path.clone(),
                        format!("value {n} is less than minimum {min}"),
                    ));
                }
                let above = |max: &&Number| compare_numbers(n, max) == Some(Ordering::Greater);
                if let Some(max) = node.maximum.as_ref().filter(above) {
                    out.push(SchemaViolation::new(
                        ViolationKind::ValueOutOfRange,
                        path.clone(),
                        format!("value {n} is greater than maximum {max}"),
                    ));
                }
            }
            Value::Bool(_) | Value::Null => {}
        }

        if !node.enum_values.is_empty() {
            let text = canonical_text(value);
            if !node.enum_values.iter().any(|e| canonical_text(e) == text) {
                let allowed: Vec<Cow<'_, str>> =
                    node.enum_values.iter().map(canonical_text).collect();
                out.push(SchemaViolation::new(
                    ViolationKind::EnumViolation,
                    path.clone(),
                    format!("value '{text}' is not one of: {}", allowed.join(", ")),
                ));
            }
        }
    }

    fn one_of(
        &self,
        value: &Value,
        node: &SchemaNode,
        path: &InstancePath,
        depth: usize,
        out: &mut Vec<SchemaViolation>,
    ) {
        let Some(object) = value.as_object() else {
            out.push(SchemaViolation::new(
                ViolationKind::TypeMismatch,
                path.clone(),
                format!("expected object, got {}", value_kind(value)),
            ));
            return;
        };

        let property = node
            .discriminator_property
            .as_deref()
            .unwrap_or(&self.options.default_discriminator);

        let Some(tag) = object.get(property) else {
            if self.options.one_of_fallback {
                self.first_passing_variant(value, node, path, depth, out);
            } else {
                out.push(SchemaViolation::new(
                    ViolationKind::MissingDiscriminator,
                    path.key(property),
                    format!("missing discriminator property '{property}'"),
                ));
            }
            return;
        };

        let tag = canonical_text(tag);
        match self.select_variant(node, property, &tag, depth) {
            Some(variant) => {
                tracing::trace!(%path, discriminator = %tag, "selected oneOf variant");
                self.walk(value, variant, path, depth + 1, out);
            }
            None => out.push(SchemaViolation::new(
                ViolationKind::OneOfNoMatch,
                path.clone(),
                format!(
                    "discriminator value '{tag}' matches none of: {}",
                    self.variant_names(node)
                ),
            )),
        }
    }

    /// Mapping first, then a variant whose discriminator property enumerates
    /// the tag, then a variant whose component name is the tag.
    fn select_variant(
        &self,
        node: &SchemaNode,
        property: &str,
        tag: &str,
        depth: usize,
    ) -> Option<SchemaId> {
        if let Some(&id) = node.discriminator_mapping.get(tag) {
            return Some(id);
        }

        let candidates = || node.one_of.iter().copied();
        candidates()
            .find(|&c| self.property_enum_contains(c, property, tag, depth + 1))
            .or_else(|| candidates().find(|&c| self.document.node(c).name.as_deref() == Some(tag)))
    }

    /// Whether `property` of `id` (or of any of its `allOf` parts) lists `tag`
    /// in its enum.
    fn property_enum_contains(
        &self,
        id: SchemaId,
        property: &str,
        tag: &str,
        depth: usize,
    ) -> bool {
        if depth > self.options.max_depth {
            return false;
        }
        let node = self.document.node(id);
        let declared = node
            .properties
            .get(property)
            .map(|&p| self.document.node(p))
            .is_some_and(|p| p.enum_values.iter().any(|e| canonical_text(e) == tag));

        declared
            || node
                .all_of
                .iter()
                .any(|&part| self.property_enum_contains(part, property, tag, depth + 1))
    }

    fn first_passing_variant(
        &self,
        value: &Value,
        node: &SchemaNode,
        path: &InstancePath,
        depth: usize,
        out: &mut Vec<SchemaViolation>,
    ) {
        let passes = node.one_of.iter().any(|&variant| {
            let mut attempt = Vec::new();
            self.walk(value, variant, path, depth + 1, &mut attempt);
            attempt.is_empty()
        });

        if !passes {
            out.push(SchemaViolation::new(
                ViolationKind::OneOfNoMatch,
                path.clone(),
                format!("value matches none of: {}", self.variant_names(node)),
            ));
        }
    }

    fn variant_names(&self, node: &SchemaNode) -> String {
        node.one_of
            .iter()
            .map(|&id| match &self.document.node(id).name {
                Some(name) => name.clone(),
                None => format!("#{}", id.index()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// String contents for strings, JSON text for everything else.
fn canonical_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Integers compare exactly; anything else falls back to `f64`.
fn compare_numbers(value: &Number, bound: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (value.as_i64(), bound.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (value.as_u64(), bound.as_u64()) {
        return Some(a.cmp(&b));
    }
    value.as_f64()?.partial_cmp(&bound.as_f64()?)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
