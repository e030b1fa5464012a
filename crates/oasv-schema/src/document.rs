//! # Schema Document Model
//!
//! In-memory form of an OpenAPI document, reduced to what payload
//! validation needs: ordered path templates, their operations, and the
//! schema nodes bound to request and response bodies.
//!
//! ## Arena
//!
//! Every [`SchemaNode`] lives in one arena owned by the document and is
//! addressed by a [`SchemaId`]. A `$ref` to a named component is stored as
//! the component's id, so two parts of the document share one node and
//! cyclic component references are plain graph edges rather than owned
//! recursion.
//!
//! The document is immutable after loading and is `Send + Sync`.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use oasv_core::ResolveError;
use serde_json::{Number, Value};

/// Address of a node in a [`SchemaDocument`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl SchemaKind {
    /// Parse an OpenAPI type name. `null` is handled by the loader.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// The OpenAPI type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Whether a JSON value has this runtime kind.
    ///
    /// `integer` and `number` both accept any JSON number.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Object, Value::Object(_)) => true,
            (Self::Array, Value::Array(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Integer | Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural rule for one JSON value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    /// Component name, when this node is `#/components/schemas/<name>`.
    pub name: Option<String>,
    /// `type`; unset means any kind (or composed via `oneOf`/`allOf`).
    pub kind: Option<SchemaKind>,
    /// Accept `null` in addition to `kind`.
    pub nullable: bool,
    /// Declared properties, in document order.
    pub properties: IndexMap<String, SchemaId>,
    /// Properties that must be present.
    pub required: Vec<String>,
    /// Element schema for arrays.
    pub items: Option<SchemaId>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// Inclusive bounds, kept as written so integers compare exactly.
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    /// Permitted literal values; empty means unrestricted.
    pub enum_values: Vec<Value>,
    /// Polymorphic variants. A node with variants has no `kind`.
    pub one_of: Vec<SchemaId>,
    /// Schemas the value must satisfy simultaneously.
    pub all_of: Vec<SchemaId>,
    /// `discriminator.propertyName`.
    pub discriminator_property: Option<String>,
    /// `discriminator.mapping`, resolved to component nodes.
    pub discriminator_mapping: IndexMap<String, SchemaId>,
}

/// HTTP methods an OpenAPI path item can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// All methods, in the order OpenAPI lists them on a path item.
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lower-case key used in the document (`get`, `post`, ...).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Head => "head",
            Self::Options => "options",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_ascii_uppercase())
    }
}

impl FromStr for HttpMethod {
    type Err = ResolveError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| ResolveError::UnsupportedMethod {
                method: s.to_string(),
            })
    }
}

/// One operation: a method on a path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// `operationId`, when declared.
    pub operation_id: Option<String>,
    /// JSON request-body schema, when the operation declares one.
    pub request_body: Option<SchemaId>,
    /// Response key (`200`, `2XX`, `default`) to JSON body schema.
    /// `None` means the response declares no JSON content.
    pub responses: IndexMap<String, Option<SchemaId>>,
}

/// Operations declared on one path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    /// Operation for `method`, if declared.
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }
}

/// A loaded OpenAPI document.
#[derive(Debug, Clone, Default)]
pub struct SchemaDocument {
    pub(crate) openapi: String,
    pub(crate) title: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) paths: IndexMap<String, PathItem>,
    pub(crate) components: IndexMap<String, SchemaId>,
    pub(crate) nodes: Vec<SchemaNode>,
}

impl SchemaDocument {
    /// The `openapi` version string.
    pub fn openapi_version(&self) -> &str {
        &self.openapi
    }

    /// `info.title`.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// `info.version`.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Path templates in declaration order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &PathItem)> {
        self.paths.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Path item for an exact template string.
    pub fn path_item(&self, template: &str) -> Option<&PathItem> {
        self.paths.get(template)
    }

    /// Number of declared path templates.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Number of declared operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|p| p.operations.len()).sum()
    }

    /// Named component schema.
    pub fn component(&self, name: &str) -> Option<SchemaId> {
        self.components.get(name).copied()
    }

    /// Component names in declaration order.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Node behind an id.
    ///
    /// # Panics
    ///
    /// If `id` was produced by a different document.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
