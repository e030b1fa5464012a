//! # Validation Outcome
//!
//! The result model for checking a JSON value against a schema node.
//!
//! Every structural failure becomes one [`SchemaViolation`] carrying its
//! kind, its [`InstancePath`] and a human-readable message. Violations are
//! aggregated: a traversal reports every problem it finds, so callers that
//! want fail-fast behavior can simply look at the first one.

use std::fmt;

use serde::Serialize;

use crate::path::InstancePath;

/// Classification of a structural validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    /// The payload is not parseable JSON.
    MalformedJson,
    /// The value's runtime kind differs from the schema's `type`.
    TypeMismatch,
    /// A `required` property is absent.
    MissingRequiredProperty,
    /// String length outside `minLength`/`maxLength`.
    LengthOutOfRange,
    /// Number outside `minimum`/`maximum`.
    ValueOutOfRange,
    /// Value not in the schema's `enum`.
    EnumViolation,
    /// A `oneOf` value lacks its discriminator property.
    MissingDiscriminator,
    /// No `oneOf` variant matches.
    OneOfNoMatch,
    /// Schema nesting exceeded the configured depth (cyclic references).
    RecursionLimit,
}

impl ViolationKind {
    /// Stable machine-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedJson => "MalformedJson",
            Self::TypeMismatch => "TypeMismatch",
            Self::MissingRequiredProperty => "MissingRequiredProperty",
            Self::LengthOutOfRange => "LengthOutOfRange",
            Self::ValueOutOfRange => "ValueOutOfRange",
            Self::EnumViolation => "EnumViolation",
            Self::MissingDiscriminator => "MissingDiscriminator",
            Self::OneOfNoMatch => "OneOfNoMatch",
            Self::RecursionLimit => "RecursionLimit",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural violation located inside the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaViolation {
    /// What went wrong.
    pub kind: ViolationKind,
    /// Where in the payload it went wrong.
    pub path: InstancePath,
    /// Human-readable description, including actual vs. expected values.
    pub message: String,
}

impl SchemaViolation {
    /// Create a violation.
    pub fn new(kind: ViolationKind, path: InstancePath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): [{}] {}", self.kind, self.message)
        } else {
            write!(f, "{}: [{}] {}", self.path, self.kind, self.message)
        }
    }
}

/// Result of validating one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The payload conforms.
    Valid,
    /// The payload does not conform; never empty.
    Invalid(Vec<SchemaViolation>),
}

impl ValidationOutcome {
    /// `Valid` for an empty list, `Invalid` otherwise.
    pub fn from_violations(violations: Vec<SchemaViolation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(violations)
        }
    }

    /// Returns true when the payload conforms.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// All violations (empty slice when valid).
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(v) => v,
        }
    }

    /// The first violation, for fail-fast callers.
    pub fn first(&self) -> Option<&SchemaViolation> {
        self.violations().first()
    }

    /// Consumes self and returns the violations.
    pub fn into_violations(self) -> Vec<SchemaViolation> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(v) => v,
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid(violations) => {
                for (i, v) in violations.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_valid() {
        let outcome = ValidationOutcome::from_violations(Vec::new());
        assert!(outcome.is_valid());
        assert!(outcome.violations().is_empty());
        assert!(outcome.first().is_none());
    }

    #[test]
    fn keeps_every_violation_in_order() {
        let outcome = ValidationOutcome::from_violations(vec![
            SchemaViolation::new(
                ViolationKind::MissingRequiredProperty,
                InstancePath::root().key("weight"),
                "missing required property 'weight'",
            ),
            SchemaViolation::new(
                ViolationKind::ValueOutOfRange,
                InstancePath::root().key("age"),
                "value -5 is less than minimum 0",
            ),
        ]);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.violations().len(), 2);
        assert_eq!(
            outcome.first().map(|v| v.kind),
            Some(ViolationKind::MissingRequiredProperty)
        );
        assert_eq!(outcome.into_violations()[1].path.to_string(), "age");
    }

    #[test]
    fn display_marks_root() {
        let v = SchemaViolation::new(
            ViolationKind::MalformedJson,
            InstancePath::root(),
            "expected value at line 1 column 1",
        );
        assert!(v.to_string().starts_with("(root): [MalformedJson]"));
    }

    #[test]
    fn display_nested_path() {
        let v = SchemaViolation::new(
            ViolationKind::TypeMismatch,
            InstancePath::root().key("carps").index(2).key("weight"),
            "expected number, got string",
        );
        assert_eq!(
            v.to_string(),
            "carps[2].weight: [TypeMismatch] expected number, got string"
        );
    }

    #[test]
    fn serializes_for_error_bodies() {
        let v = SchemaViolation::new(
            ViolationKind::EnumViolation,
            InstancePath::root().key("typeName"),
            "value 'Shark' is not one of: Carp, Mackerel",
        );
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "EnumViolation");
        assert_eq!(json["path"], "typeName");
    }
}
