//! Schema normalization
//!
//! Rewrites a schema subtree in place so it only uses keywords Swagger 2.0
//! understands: `oneOf`/`anyOf` are dropped, `discriminator` collapses to a
//! property name, and `nullable`/`deprecated` move under `x-` keys.

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ConversionWarning, ConvertError, ConvertResult};
use crate::types::Direction;

/// A discriminator mapping entry waiting to be written onto its target schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorTag {
    /// Discriminator value (the mapping key)
    pub payload: String,
    /// Schema name or `$ref` pointer (the mapping value)
    pub target: String,
}

impl DiscriminatorTag {
    /// Pointers to try, in order. Bare component names are looked up under
    /// `#/components/schemas` before being tried as a raw pointer.
    pub fn candidates(&self) -> Vec<String> {
        let mut candidates = Vec::with_capacity(2);
        if is_schema_name(&self.target) {
            candidates.push(format!("#/components/schemas/{}", self.target));
        }
        candidates.push(self.target.clone());
        candidates
    }
}

fn is_schema_name(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

/// Recursive schema rewriter
#[derive(Debug)]
pub struct SchemaRewriter {
    max_depth: usize,
    tags: Vec<DiscriminatorTag>,
    warnings: Vec<ConversionWarning>,
}

impl SchemaRewriter {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            tags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Rewrite `node` and everything below it
    pub fn rewrite(&mut self, node: &mut Value, direction: Direction) -> ConvertResult<()> {
        self.walk(node, direction, "#", 0)
    }

    /// Discriminator mappings collected so far
    pub fn take_tags(&mut self) -> Vec<DiscriminatorTag> {
        std::mem::take(&mut self.tags)
    }

    pub fn take_warnings(&mut self) -> Vec<ConversionWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn walk(
        &mut self,
        node: &mut Value,
        direction: Direction,
        path: &str,
        depth: usize,
    ) -> ConvertResult<()> {
        if depth > self.max_depth {
            return Err(ConvertError::RecursionDepthExceeded {
                path: path.to_string(),
                max_depth: self.max_depth,
            });
        }
        let Some(obj) = node.as_object_mut() else {
            return Ok(());
        };

        let had_one_of = obj.remove("oneOf").is_some();
        let had_any_of = obj.remove("anyOf").is_some();
        if had_one_of || had_any_of {
            obj.remove("discriminator");
        }

        if let Some(Value::Array(members)) = obj.get_mut("allOf") {
            for (i, member) in members.iter_mut().enumerate() {
                self.walk(member, direction, &format!("{}/allOf/{}", path, i), depth + 1)?;
            }
        }

        self.collapse_discriminator(obj);

        let schema_type = obj.get("type").and_then(Value::as_str).map(str::to_owned);
        match schema_type.as_deref() {
            Some("object") => {
                if let Some(Value::Object(properties)) = obj.get_mut("properties") {
                    if direction == Direction::Response {
                        properties.retain(|_, property| !is_write_only(property));
                    }
                    for (name, property) in properties.iter_mut() {
                        let child_path = format!("{}/properties/{}", path, name);
                        self.walk(property, direction, &child_path, depth + 1)?;
                        if let Some(property) = property.as_object_mut() {
                            property.remove("writeOnly");
                        }
                    }
                }
            }
            Some("array") => {
                if let Some(items) = obj.get_mut("items") {
                    self.walk(items, direction, &format!("{}/items", path), depth + 1)?;
                }
            }
            _ => {}
        }

        if obj.get("nullable") == Some(&Value::Bool(true)) {
            obj.remove("nullable");
            obj.insert("x-nullable".to_string(), Value::Bool(true));
        }

        if let Some(deprecated) = obj.remove("deprecated") {
            obj.entry("x-deprecated").or_insert(deprecated);
        }

        Ok(())
    }

    /// `{propertyName, mapping}` becomes the bare property name; mapping
    /// entries are queued for tagging.
    fn collapse_discriminator(&mut self, obj: &mut Map<String, Value>) {
        let Some(Value::Object(discriminator)) = obj.get("discriminator") else {
            return;
        };

        if let Some(Value::Object(mapping)) = discriminator.get("mapping") {
            for (payload, target) in mapping {
                match target.as_str() {
                    Some(target) => self.tags.push(DiscriminatorTag {
                        payload: payload.clone(),
                        target: target.to_string(),
                    }),
                    None => {
                        let warning = ConversionWarning::InvalidDiscriminatorMapping {
                            payload: payload.clone(),
                        };
                        warn!("{}", warning);
                        self.warnings.push(warning);
                    }
                }
            }
        }

        match discriminator.get("propertyName").cloned() {
            Some(property_name) => {
                obj.insert("discriminator".to_string(), property_name);
            }
            None => {
                obj.remove("discriminator");
            }
        }
    }
}

fn is_write_only(property: &Value) -> bool {
    property.get("writeOnly") == Some(&Value::Bool(true))
}
