//! # Document Loader
//!
//! Reads an OpenAPI document (JSON or YAML) once and builds the immutable
//! [`SchemaDocument`]. Loading is all-or-nothing: every structural problem
//! found is collected with its document pointer and reported together in
//! [`SchemaLoadError::Invalid`]; no partially built document escapes.
//!
//! ## Reference Resolution
//!
//! Only local component lookups are resolved:
//!
//! - `#/components/schemas/<name>` anywhere a schema may appear;
//! - `#/components/requestBodies/<name>` for an operation's `requestBody`;
//! - `#/components/responses/<name>` for a response entry.
//!
//! Component schemas get their arena slots before any schema is built, so
//! references between components (including cycles) resolve to ids without
//! recursion.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use oasv_core::SchemaLoadError;
use serde_json::{Map, Number, Value};

use crate::document::{
    HttpMethod, Operation, PathItem, SchemaDocument, SchemaId, SchemaKind, SchemaNode,
};

const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
const REQUEST_BODY_REF_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_REF_PREFIX: &str = "#/components/responses/";
const JSON_MEDIA_TYPE: &str = "application/json";
const MEMORY_ORIGIN: &str = "<memory>";

/// Keywords outside the supported subset. They are skipped with a warning.
const IGNORED_KEYWORDS: [&str; 2] = ["anyOf", "not"];

/// Serialization of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Load a document from a file.
///
/// # Errors
///
/// `NotFound` when the file does not exist, `Io` when it cannot be read,
/// `Parse` when it is not JSON/YAML, `Invalid` for structural problems.
pub fn load(path: impl AsRef<Path>) -> Result<SchemaDocument, SchemaLoadError> {
    let path = path.as_ref();
    let origin = path.display().to_string();
    if !path.exists() {
        return Err(SchemaLoadError::NotFound { path: origin });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
        path: origin.clone(),
        source,
    })?;

    parse(&content, DocumentFormat::from_path(path), &origin)
}

/// Load a document from text already in memory.
pub fn load_str(content: &str, format: DocumentFormat) -> Result<SchemaDocument, SchemaLoadError> {
    parse(content, format, MEMORY_ORIGIN)
}

/// Build a document from an already parsed JSON value.
pub fn load_value(root: &Value) -> Result<SchemaDocument, SchemaLoadError> {
    build(root, MEMORY_ORIGIN)
}

fn parse(
    content: &str,
    format: DocumentFormat,
    origin: &str,
) -> Result<SchemaDocument, SchemaLoadError> {
    let parse_error = |reason: String| SchemaLoadError::Parse {
        path: origin.to_string(),
        reason,
    };

    let root: Value = match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| parse_error(format!("invalid JSON: {e}")))?
        }
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| parse_error(format!("invalid YAML: {e}")))?;
            yaml_to_json(&yaml)
                .map_err(|e| parse_error(format!("YAML-to-JSON conversion failed: {e}")))?
        }
    };

    build(&root, origin)
}

fn build(root: &Value, origin: &str) -> Result<SchemaDocument, SchemaLoadError> {
    let Some(root) = root.as_object() else {
        return Err(SchemaLoadError::Invalid {
            path: origin.to_string(),
            problems: vec!["#: document root must be an object".to_string()],
        });
    };

    let document = Builder::new(root)
        .finish()
        .map_err(|problems| SchemaLoadError::Invalid {
            path: origin.to_string(),
            problems,
        })?;

    tracing::info!(
        origin,
        title = document.title().unwrap_or(""),
        version = document.version().unwrap_or(""),
        paths = document.path_count(),
        operations = document.operation_count(),
        components = document.components.len(),
        "loaded OpenAPI document"
    );

    Ok(document)
}

/// Accumulates arena nodes and problems while walking the raw document.
struct Builder<'a> {
    root: &'a Map<String, Value>,
    nodes: Vec<SchemaNode>,
    components: IndexMap<String, SchemaId>,
    problems: Vec<String>,
}

impl<'a> Builder<'a> {
    fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            root,
            nodes: Vec::new(),
            components: IndexMap::new(),
            problems: Vec::new(),
        }
    }

    fn problem(&mut self, pointer: &str, message: impl fmt::Display) {
        self.problems.push(format!("{pointer}: {message}"));
    }

    fn finish(mut self) -> Result<SchemaDocument, Vec<String>> {
        let root = self.root;

        let openapi = match root.get("openapi") {
            Some(Value::String(v)) => v.clone(),
            Some(_) => {
                self.problem("#/openapi", "must be a string");
                String::new()
            }
            None => {
                self.problem("#/openapi", "missing OpenAPI version string");
                String::new()
            }
        };

        let info = root.get("info");
        let info_str = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let title = info_str("title");
        let version = info_str("version");

        self.reserve_components();
        self.build_components();
        let paths = self.build_paths();

        if !self.problems.is_empty() {
            return Err(self.problems);
        }

        Ok(SchemaDocument {
            openapi,
            title,
            version,
            paths,
            components: self.components,
            nodes: self.nodes,
        })
    }

    /// A `components/<section>` map, when present.
    fn section(&self, section: &str) -> Option<&'a Map<String, Value>> {
        let root = self.root;
        root.get("components")?.get(section)?.as_object()
    }

    fn reserve_components(&mut self) {
        let root = self.root;
        let Some(components) = root.get("components") else {
            return;
        };
        if !components.is_object() {
            self.problem("#/components", "must be an object");
            return;
        }

        match components.get("schemas") {
            None => {}
            Some(Value::Object(schemas)) => {
                for name in schemas.keys() {
                    let id = SchemaId(self.nodes.len());
                    self.nodes.push(SchemaNode {
                        name: Some(name.clone()),
                        ..SchemaNode::default()
                    });
                    self.components.insert(name.clone(), id);
                }
            }
            Some(_) => self.problem("#/components/schemas", "must be an object"),
        }
    }

    fn build_components(&mut self) {
        let Some(schemas) = self.section("schemas") else {
            return;
        };

        for (name, raw) in schemas {
            let Some(id) = self.components.get(name).copied() else {
                continue;
            };
            let pointer = format!("{SCHEMA_REF_PREFIX}{}", escape_pointer(name));
            let mut node = self.node(raw, &pointer);
            node.name = Some(name.clone());
            self.nodes[id.0] = node;
        }
    }

    fn build_paths(&mut self) -> IndexMap<String, PathItem> {
        let mut paths = IndexMap::new();
        let root = self.root;

        let raw_paths = match root.get("paths") {
            Some(Value::Object(p)) => p,
            Some(_) => {
                self.problem("#/paths", "must be an object");
                return paths;
            }
            None => {
                self.problem("#/paths", "missing paths object");
                return paths;
            }
        };

        for (template, raw_item) in raw_paths {
            let pointer = format!("#/paths/{}", escape_pointer(template));
            let Some(item) = raw_item.as_object() else {
                self.problem(&pointer, "path item must be an object");
                continue;
            };
            if item.contains_key("$ref") {
                self.problem(&pointer, "path item $ref is not supported");
                continue;
            }

            let mut path_item = PathItem::default();
            for method in HttpMethod::ALL {
                if let Some(raw_op) = item.get(method.key()) {
                    let op_pointer = format!("{pointer}/{}", method.key());
                    let operation = self.operation(raw_op, &op_pointer);
                    path_item.operations.insert(method, operation);
                }
            }
            paths.insert(template.clone(), path_item);
        }

        paths
    }

    fn operation(&mut self, raw: &'a Value, pointer: &str) -> Operation {
        let mut operation = Operation::default();
        let Some(map) = raw.as_object() else {
            self.problem(pointer, "operation must be an object");
            return operation;
        };

        match map.get("operationId") {
            None => {}
            Some(Value::String(id)) => operation.operation_id = Some(id.clone()),
            Some(_) => self.problem(&format!("{pointer}/operationId"), "must be a string"),
        }

        if let Some(raw_body) = map.get("requestBody") {
            let body_pointer = format!("{pointer}/requestBody");
            if let Some(body) = self.component_object(
                raw_body,
                REQUEST_BODY_REF_PREFIX,
                "requestBodies",
                &body_pointer,
            ) {
                operation.request_body = self.json_content(body, &body_pointer);
            }
        }

        match map.get("responses") {
            None => {}
            Some(Value::Object(responses)) => {
                for (status, raw_response) in responses {
                    let response_pointer =
                        format!("{pointer}/responses/{}", escape_pointer(status));
                    let schema = match self.component_object(
                        raw_response,
                        RESPONSE_REF_PREFIX,
                        "responses",
                        &response_pointer,
                    ) {
                        Some(response) => self.json_content(response, &response_pointer),
                        None => None,
                    };
                    operation.responses.insert(status.clone(), schema);
                }
            }
            Some(_) => self.problem(&format!("{pointer}/responses"), "must be an object"),
        }

        operation
    }

    /// Follow a one-level `$ref` into `components/<section>`.
    fn component_object(
        &mut self,
        raw: &'a Value,
        prefix: &str,
        section: &str,
        pointer: &str,
    ) -> Option<&'a Value> {
        let Some(reference) = raw.get("$ref") else {
            return Some(raw);
        };
        let ref_pointer = format!("{pointer}/$ref");

        let Some(target) = reference.as_str() else {
            self.problem(&ref_pointer, "must be a string");
            return None;
        };
        let Some(name) = target.strip_prefix(prefix) else {
            self.problem(&ref_pointer, format!("unsupported $ref '{target}'"));
            return None;
        };

        let resolved = self
            .section(section)
            .and_then(|s| s.get(&unescape_pointer(name)));
        if resolved.is_none() {
            self.problem(&ref_pointer, format!("dangling $ref '{target}'"));
        }
        resolved
    }

    /// Schema of the JSON media type in a request body or response.
    fn json_content(&mut self, body: &'a Value, pointer: &str) -> Option<SchemaId> {
        let content = body.get("content")?;
        let Some(content) = content.as_object() else {
            self.problem(&format!("{pointer}/content"), "must be an object");
            return None;
        };

        let (media_type, media) = content
            .get_key_value(JSON_MEDIA_TYPE)
            .or_else(|| content.iter().find(|(k, _)| is_json_media_type(k)))?;
        let schema = media.get("schema")?;

        let schema_pointer = format!(
            "{pointer}/content/{}/schema",
            escape_pointer(media_type)
        );
        self.schema(schema, &schema_pointer)
    }

    /// Id for a schema position: the component id for a `$ref`, a new
    /// arena node for an inline schema.
    fn schema(&mut self, raw: &'a Value, pointer: &str) -> Option<SchemaId> {
        if let Some(reference) = raw.get("$ref") {
            return self.schema_reference(reference, pointer);
        }
        let node = self.node(raw, pointer);
        let id = SchemaId(self.nodes.len());
        self.nodes.push(node);
        Some(id)
    }

    fn schema_reference(&mut self, reference: &Value, pointer: &str) -> Option<SchemaId> {
        let ref_pointer = format!("{pointer}/$ref");
        let Some(target) = reference.as_str() else {
            self.problem(&ref_pointer, "must be a string");
            return None;
        };
        let Some(name) = target.strip_prefix(SCHEMA_REF_PREFIX) else {
            self.problem(
                &ref_pointer,
                format!("unsupported $ref '{target}' (only {SCHEMA_REF_PREFIX}<name> is resolved)"),
            );
            return None;
        };

        let id = self.components.get(&unescape_pointer(name)).copied();
        if id.is_none() {
            self.problem(&ref_pointer, format!("dangling $ref '{target}'"));
        }
        id
    }

    fn node(&mut self, raw: &'a Value, pointer: &str) -> SchemaNode {
        let mut node = SchemaNode::default();
        let Some(map) = raw.as_object() else {
            self.problem(pointer, "schema must be an object");
            return node;
        };

        // A component that only aliases another one; siblings of $ref are ignored.
        if let Some(reference) = map.get("$ref") {
            if let Some(id) = self.schema_reference(reference, pointer) {
                node.all_of.push(id);
            }
            return node;
        }

        self.read_type(map, pointer, &mut node);

        match map.get("nullable") {
            None => {}
            Some(Value::Bool(b)) => node.nullable |= *b,
            Some(_) => self.problem(&format!("{pointer}/nullable"), "must be a boolean"),
        }

        if let Some(raw_props) = map.get("properties") {
            match raw_props.as_object() {
                Some(props) => {
                    for (name, child) in props {
                        let child_pointer =
                            format!("{pointer}/properties/{}", escape_pointer(name));
                        if let Some(id) = self.schema(child, &child_pointer) {
                            node.properties.insert(name.clone(), id);
                        }
                    }
                }
                None => self.problem(&format!("{pointer}/properties"), "must be an object"),
            }
        }

        if let Some(raw_required) = map.get("required") {
            match raw_required.as_array() {
                Some(names) => {
                    for name in names {
                        match name.as_str() {
                            Some(n) => node.required.push(n.to_string()),
                            None => self.problem(
                                &format!("{pointer}/required"),
                                "entries must be strings",
                            ),
                        }
                    }
                }
                None => self.problem(&format!("{pointer}/required"), "must be an array"),
            }
        }

        if let Some(raw_items) = map.get("items") {
            let items_pointer = format!("{pointer}/items");
            if raw_items.is_object() {
                node.items = self.schema(raw_items, &items_pointer);
            } else {
                self.problem(&items_pointer, "must be a schema object");
            }
        }

        node.min_length = self.unsigned(map, "minLength", pointer);
        node.max_length = self.unsigned(map, "maxLength", pointer);
        node.minimum = self.number(map, "minimum", pointer);
        node.maximum = self.number(map, "maximum", pointer);

        if let Some(raw_enum) = map.get("enum") {
            match raw_enum.as_array() {
                Some(values) => node.enum_values = values.clone(),
                None => self.problem(&format!("{pointer}/enum"), "must be an array"),
            }
        }

        node.one_of = self.schema_list(map, "oneOf", pointer);
        node.all_of = self.schema_list(map, "allOf", pointer);

        if let Some(raw_disc) = map.get("discriminator") {
            self.read_discriminator(raw_disc, pointer, &mut node);
        }

        for keyword in IGNORED_KEYWORDS {
            if map.contains_key(keyword) {
                tracing::warn!(pointer, keyword, "ignoring unsupported schema keyword");
            }
        }

        if !node.one_of.is_empty() {
            if let Some(kind) = node.kind.take() {
                tracing::warn!(
                    pointer,
                    kind = kind.as_str(),
                    "dropping type declared next to oneOf; variants decide the shape"
                );
            }
        }

        node
    }

    fn read_type(&mut self, map: &Map<String, Value>, pointer: &str, node: &mut SchemaNode) {
        let type_pointer = format!("{pointer}/type");
        match map.get("type") {
            None => {}
            Some(Value::String(name)) => node.kind = self.kind(name, &type_pointer),
            // OpenAPI 3.1 style: `type: [string, "null"]`.
            Some(Value::Array(names)) => {
                let mut named = false;
                for entry in names {
                    match entry.as_str() {
                        Some("null") => node.nullable = true,
                        Some(name) if !named => {
                            named = true;
                            node.kind = self.kind(name, &type_pointer);
                        }
                        Some(name) => self.problem(
                            &type_pointer,
                            format!("multiple non-null types are not supported ('{name}')"),
                        ),
                        None => self.problem(&type_pointer, "entries must be strings"),
                    }
                }
                if !named {
                    self.problem(&type_pointer, "must name a non-null type");
                }
            }
            Some(_) => self.problem(&type_pointer, "must be a string or an array of strings"),
        }
    }

    fn kind(&mut self, name: &str, pointer: &str) -> Option<SchemaKind> {
        let kind = SchemaKind::parse(name);
        if kind.is_none() {
            self.problem(pointer, format!("unknown type '{name}'"));
        }
        kind
    }

    fn read_discriminator(&mut self, raw: &'a Value, pointer: &str, node: &mut SchemaNode) {
        let disc_pointer = format!("{pointer}/discriminator");
        let Some(disc) = raw.as_object() else {
            self.problem(&disc_pointer, "must be an object");
            return;
        };

        match disc.get("propertyName") {
            Some(Value::String(p)) => node.discriminator_property = Some(p.clone()),
            Some(_) => self.problem(&format!("{disc_pointer}/propertyName"), "must be a string"),
            None => {}
        }

        let Some(raw_mapping) = disc.get("mapping") else {
            return;
        };
        let mapping_pointer = format!("{disc_pointer}/mapping");
        let Some(mapping) = raw_mapping.as_object() else {
            self.problem(&mapping_pointer, "must be an object");
            return;
        };

        for (value, target) in mapping {
            let entry_pointer = format!("{mapping_pointer}/{}", escape_pointer(value));
            let Some(target) = target.as_str() else {
                self.problem(&entry_pointer, "must be a string");
                continue;
            };
            // Mapping targets are either full references or bare schema names.
            let name = target.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(target);
            match self.components.get(&unescape_pointer(name)).copied() {
                Some(id) => {
                    node.discriminator_mapping.insert(value.clone(), id);
                }
                None => self.problem(&entry_pointer, format!("dangling mapping target '{target}'")),
            }
        }
    }

    fn schema_list(
        &mut self,
        map: &'a Map<String, Value>,
        keyword: &str,
        pointer: &str,
    ) -> Vec<SchemaId> {
        let Some(raw) = map.get(keyword) else {
            return Vec::new();
        };
        let list_pointer = format!("{pointer}/{keyword}");
        let Some(entries) = raw.as_array() else {
            self.problem(&list_pointer, "must be an array");
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| self.schema(entry, &format!("{list_pointer}/{i}")))
            .collect()
    }

    fn unsigned(&mut self, map: &Map<String, Value>, keyword: &str, pointer: &str) -> Option<u64> {
        let raw = map.get(keyword)?;
        let value = raw.as_u64();
        if value.is_none() {
            self.problem(&format!("{pointer}/{keyword}"), "must be a non-negative integer");
        }
        value
    }

    fn number(
        &mut self,
        map: &Map<String, Value>,
        keyword: &str,
        pointer: &str,
    ) -> Option<Number> {
        match map.get(keyword)? {
            Value::Number(n) => Some(n.clone()),
            _ => {
                self.problem(&format!("{pointer}/{keyword}"), "must be a number");
                None
            }
        }
    }
}

fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == JSON_MEDIA_TYPE || essence.ends_with("+json")
}

/// RFC 6901 escaping of one reference token.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Convert a YAML value tree into the equivalent JSON value tree.
///
/// Mapping keys may be scalars other than strings (`200:` is a number in
/// YAML); they are converted to their textual form.
fn yaml_to_json(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                let f = n.as_f64().ok_or_else(|| format!("unsupported YAML number: {n}"))?;
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent {f} in JSON"))?
            }
        }
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => {
            Value::Array(seq.iter().map(yaml_to_json).collect::<Result<_, _>>()?)
        }
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(&tagged.value)?,
    })
}
