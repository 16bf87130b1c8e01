//! Response conversion
//!
//! Swagger 2.0 responses carry a single `schema` and the operation lists the
//! media types it `produces`, so each response's `content` map is folded down.

use indexmap::IndexSet;
use serde_json::{json, Map, Value};

use crate::error::ConvertResult;
use crate::media;
use crate::resolver::{is_external_ref, ReferenceResolver};
use crate::schema::SchemaRewriter;
use crate::types::{Direction, ResolveMode};

/// Converts the `responses` of an operation
pub struct ResponseRewriter<'r> {
    resolver: &'r ReferenceResolver,
}

impl<'r> ResponseRewriter<'r> {
    pub fn new(resolver: &'r ReferenceResolver) -> Self {
        Self { resolver }
    }

    /// Inline every response, fold its `content` into `schema`/`examples`
    /// and extend `operation.produces`.
    pub fn rewrite_responses(
        &self,
        root: &Value,
        operation: &mut Map<String, Value>,
        schemas: &mut SchemaRewriter,
    ) -> ConvertResult<()> {
        let mut produces: IndexSet<String> = operation
            .get("produces")
            .and_then(Value::as_array)
            .map(|types| types.iter().filter_map(Value::as_str).map(str::to_owned).collect())
            .unwrap_or_default();

        let Some(Value::Object(responses)) = operation.get_mut("responses") else {
            return Ok(());
        };

        for response in responses.values_mut() {
            let resolved = self.resolver.resolve(root, response, ResolveMode::Clone)?.into_owned();
            *response = resolved;
            if let Value::Object(response) = response {
                self.rewrite_response(root, response, &mut produces, schemas)?;
            }
        }

        if !produces.is_empty() {
            operation.insert("produces".to_string(), json!(produces));
        }
        Ok(())
    }

    fn rewrite_response(
        &self,
        root: &Value,
        response: &mut Map<String, Value>,
        produces: &mut IndexSet<String>,
        schemas: &mut SchemaRewriter,
    ) -> ConvertResult<()> {
        if let Some(Value::Object(content)) = response.remove("content") {
            let mut any_schema: Option<&Value> = None;
            let mut json_schema: Option<&Value> = None;

            for (media_range, media_object) in &content {
                let media_type = if media::is_wildcard(media_range) {
                    media::OCTET_STREAM
                } else {
                    media_range.as_str()
                };
                produces.insert(media_type.to_string());

                if let Some(schema) = media_object.get("schema").filter(|s| !s.is_null()) {
                    any_schema.get_or_insert(schema);
                    if json_schema.is_none() && media::is_json(media_type) {
                        json_schema = Some(schema);
                    }
                }

                if let Some(example) = media_object.get("example").filter(|e| !e.is_null()) {
                    let examples = response
                        .entry("examples")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(examples) = examples {
                        examples.insert(media_type.to_string(), example.clone());
                    }
                }
            }

            if let Some(selected) = json_schema.or(any_schema) {
                let mut schema = if is_external_ref(selected) {
                    self.resolver.resolve(root, selected, ResolveMode::Clone)?.into_owned()
                } else {
                    selected.clone()
                };
                schemas.rewrite(&mut schema, Direction::Response)?;
                response.insert("schema".to_string(), schema);
            }
        }

        if let Some(Value::Object(headers)) = response.get_mut("headers") {
            for header in headers.values_mut() {
                let resolved = self.resolver.resolve(root, header, ResolveMode::Clone)?.into_owned();
                *header = resolved;
                if let Value::Object(header) = header {
                    flatten_header_schema(header);
                }
            }
        }

        Ok(())
    }
}

/// Move a header's `schema.type`/`schema.format` onto the header itself
fn flatten_header_schema(header: &mut Map<String, Value>) {
    let Some(schema) = header.remove("schema") else {
        return;
    };
    header.remove("type");
    header.remove("format");
    for key in ["type", "format"] {
        if let Some(value) = schema.get(key) {
            header.insert(key.to_string(), value.clone());
        }
    }
}
