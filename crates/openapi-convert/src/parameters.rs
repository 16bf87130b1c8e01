//! Parameter and request body conversion
//!
//! OpenAPI 3 parameters carry their constraints inside a nested `schema` and
//! describe array serialization with `style`/`explode`. Swagger 2.0 wants the
//! constraints on the parameter itself and a single `collectionFormat`.
//! Request bodies become a `body` parameter, or one `formData` parameter per
//! property for form encodings.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ConvertResult;
use crate::media::{self, BodyKind};
use crate::resolver::{is_external_ref, ReferenceResolver};
use crate::schema::SchemaRewriter;
use crate::types::{Direction, ParameterLocation, ResolveMode};

/// Schema keywords copied onto non-body parameters
const SCHEMA_PROPERTIES: [&str; 17] = [
    "format",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "multipleOf",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "additionalProperties",
    "pattern",
    "enum",
    "default",
];

const ARRAY_PROPERTIES: [&str; 2] = ["type", "items"];

const STYLES: [&str; 7] = [
    "matrix",
    "label",
    "simple",
    "spaceDelimited",
    "pipeDelimited",
    "deepObject",
    "form",
];

/// Swagger 2.0 `collectionFormat` for an OpenAPI 3 `style`/`explode` pair.
///
/// `None` means the parameter carries no `collectionFormat`.
pub fn collection_format(style: &str, explode: Option<bool>) -> Option<&'static str> {
    let exploded = explode == Some(true);
    match style {
        "matrix" => (!exploded).then_some("csv"),
        "label" => None,
        "simple" => Some("csv"),
        "spaceDelimited" => Some("ssv"),
        "pipeDelimited" => Some("pipes"),
        "deepObject" => Some("multi"),
        "form" => Some(if exploded { "multi" } else { "csv" }),
        _ => None,
    }
}

/// Default `style` for a parameter location
pub fn default_style(location: Option<ParameterLocation>) -> &'static str {
    match location {
        Some(ParameterLocation::Query) | Some(ParameterLocation::Cookie) => "form",
        _ => "simple",
    }
}

/// Converts `parameters` arrays and request bodies
pub struct ParameterRewriter<'r> {
    resolver: &'r ReferenceResolver,
}

impl<'r> ParameterRewriter<'r> {
    pub fn new(resolver: &'r ReferenceResolver) -> Self {
        Self { resolver }
    }

    /// Convert an operation: its request body becomes parameters, then every
    /// parameter is rewritten. The operation always ends up with a
    /// `parameters` sequence.
    pub fn rewrite_operation(
        &self,
        root: &Value,
        operation: &mut Map<String, Value>,
        schemas: &mut SchemaRewriter,
    ) -> ConvertResult<()> {
        if !matches!(operation.get("parameters"), Some(Value::Array(_))) {
            operation.insert("parameters".to_string(), Value::Array(Vec::new()));
        }

        self.rewrite_request_body(root, operation, schemas)?;
        self.rewrite_parameters(root, operation)
    }

    /// Rewrite the `parameters` sequence of a path item or operation, if any.
    /// Referenced parameters are inlined.
    pub fn rewrite_parameters(&self, root: &Value, owner: &mut Map<String, Value>) -> ConvertResult<()> {
        let Some(Value::Array(parameters)) = owner.get_mut("parameters") else {
            return Ok(());
        };

        for parameter in parameters.iter_mut() {
            let resolved = self
                .resolver
                .resolve(root, parameter, ResolveMode::Clone)?
                .into_owned();
            *parameter = resolved;
            if let Value::Object(parameter) = parameter {
                self.rewrite_parameter(root, parameter)?;
            }
        }
        Ok(())
    }

    fn rewrite_parameter(&self, root: &Value, parameter: &mut Map<String, Value>) -> ConvertResult<()> {
        let location = parameter
            .get("in")
            .and_then(Value::as_str)
            .and_then(ParameterLocation::from_str_opt);

        if location != Some(ParameterLocation::Body) {
            let schema = match parameter.get("schema") {
                Some(schema) => Some(self.resolver.resolve(root, schema, ResolveMode::Clone)?.into_owned()),
                None => None,
            };
            if let Some(Value::Object(schema)) = schema {
                hoist_schema_properties(parameter, &schema);
            }

            parameter.remove("schema");
            parameter.remove("allowReserved");
            if let Some(example) = parameter.remove("example") {
                parameter.insert("x-example".to_string(), example);
            }
        }

        if parameter.get("type").and_then(Value::as_str) == Some("array") {
            let style = parameter
                .get("style")
                .and_then(Value::as_str)
                .unwrap_or_else(|| default_style(location))
                .to_string();
            if STYLES.contains(&style.as_str()) {
                let explode = parameter.get("explode").and_then(Value::as_bool);
                parameter.remove("collectionFormat");
                if let Some(format) = collection_format(&style, explode) {
                    parameter.insert("collectionFormat".to_string(), json!(format));
                }
            }
        }

        parameter.remove("style");
        parameter.remove("explode");
        Ok(())
    }

    /// Replace `requestBody` with `body` or `formData` parameters
    fn rewrite_request_body(
        &self,
        root: &Value,
        operation: &mut Map<String, Value>,
        schemas: &mut SchemaRewriter,
    ) -> ConvertResult<()> {
        let Some(request_body) = operation.remove("requestBody") else {
            return Ok(());
        };

        let mut param = match self
            .resolver
            .resolve(root, &request_body, ResolveMode::Clone)?
            .into_owned()
        {
            Value::Object(param) => param,
            _ => Map::new(),
        };
        param.insert("name".to_string(), json!("body"));

        let content = match param.remove("content") {
            Some(Value::Object(content)) if !content.is_empty() => content,
            _ => return Ok(()),
        };
        let Some((content_key, kind)) = media::preferred_request_type(&content) else {
            debug!("Request body declares no media range, dropping it");
            return Ok(());
        };

        let media_types: Vec<Value> = content
            .keys()
            .filter(|key| media::is_media_range(key) && !media::is_wildcard(key))
            .map(|key| json!(key))
            .collect();
        operation.insert("consumes".to_string(), Value::Array(media_types));

        let mut schema = content.get(content_key).and_then(|media| media.get("schema")).cloned();
        if let Some(declared) = schema.as_mut() {
            if is_external_ref(declared) {
                let inlined = self.resolver.resolve(root, declared, ResolveMode::Clone)?.into_owned();
                *declared = inlined;
            }
        }

        let mut generated = Vec::new();
        match kind {
            BodyKind::Form => {
                param.insert("in".to_string(), json!("formData"));
                match schema {
                    Some(schema) => {
                        let mut schema = self.resolver.resolve(root, &schema, ResolveMode::Clone)?.into_owned();
                        schemas.rewrite(&mut schema, Direction::Request)?;
                        match explode_form_properties(&schema) {
                            Some(properties) => generated.extend(properties),
                            None => {
                                param.insert("schema".to_string(), schema);
                                generated.push(Value::Object(param));
                            }
                        }
                    }
                    None => generated.push(Value::Object(param)),
                }
            }
            BodyKind::Json => {
                param.insert("in".to_string(), json!("body"));
                if let Some(mut schema) = schema {
                    schemas.rewrite(&mut schema, Direction::Request)?;
                    param.insert("schema".to_string(), schema);
                }
                generated.push(Value::Object(param));
            }
            BodyKind::Other => {
                param.insert("in".to_string(), json!("body"));
                param.remove("type");
                let mut schema = schema.unwrap_or_else(|| json!({"type": "string", "format": "binary"}));
                schemas.rewrite(&mut schema, Direction::Request)?;
                param.insert("schema".to_string(), schema);
                generated.push(Value::Object(param));
            }
        }

        if let Some(Value::Array(parameters)) = operation.get_mut("parameters") {
            parameters.extend(generated);
        }
        Ok(())
    }
}

/// Copy constraint keywords and extensions from a parameter's schema
fn hoist_schema_properties(parameter: &mut Map<String, Value>, schema: &Map<String, Value>) {
    for key in SCHEMA_PROPERTIES.iter().chain(ARRAY_PROPERTIES.iter()) {
        let Some(value) = schema.get(*key) else {
            continue;
        };
        if *key == "additionalProperties" && value.is_boolean() {
            continue;
        }
        parameter.insert(key.to_string(), value.clone());
    }

    for (key, value) in schema {
        if key.starts_with("x-") && !parameter.contains_key(key) {
            parameter.insert(key.clone(), value.clone());
        }
    }

    if !is_truthy_string(parameter.get("description")) {
        if let Some(description) = schema.get("description").filter(|d| is_truthy_string(Some(d))) {
            parameter.insert("description".to_string(), description.clone());
        }
    }
}

fn is_truthy_string(value: Option<&Value>) -> bool {
    value.and_then(Value::as_str).is_some_and(|s| !s.is_empty())
}

/// One `formData` parameter per writable property of an object schema, or
/// `None` when the schema is not an object with properties.
fn explode_form_properties(schema: &Value) -> Option<Vec<Value>> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return None;
    }
    let properties = schema.get("properties")?.as_object()?;
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let parameters = properties
        .iter()
        .filter(|(_, property)| property.get("readOnly") != Some(&Value::Bool(true)))
        .map(|(name, property)| {
            let mut parameter = Map::new();
            parameter.insert("name".to_string(), json!(name));
            parameter.insert("in".to_string(), json!("formData"));
            parameter.insert("schema".to_string(), property.clone());
            if required.contains(&name.as_str()) {
                parameter.insert("required".to_string(), Value::Bool(true));
            }
            Value::Object(parameter)
        })
        .collect();
    Some(parameters)
}
