//! OpenAPI 3.0 → Swagger 2.0 document conversion
//!
//! Drives the individual rewriters over a private copy of the input:
//!
//! 1. `swagger: "2.0"`, server info
//! 2. every path item and operation (parameters, request body, responses)
//! 3. `components` → `definitions`, `securityDefinitions` and `x-components`
//! 4. discriminator mapping tags
//! 5. `$ref` relocation

use std::path::PathBuf;

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::ConvertOptions;
use crate::error::{ConversionWarning, ConvertError, ConvertResult};
use crate::formats::FormatId;
use crate::parameters::ParameterRewriter;
use crate::resolver::{is_local, walk_pointer_mut, ReferenceResolver};
use crate::responses::ResponseRewriter;
use crate::schema::{DiscriminatorTag, SchemaRewriter};
use crate::security::rewrite_security_schemes;
use crate::servers::rewrite_server_info;
use crate::types::{Direction, HttpMethod, ResolveMode};

/// Rewrite a `$ref` into the relocated Swagger 2.0 layout
pub fn relocate_ref(reference: &str) -> String {
    reference
        .replacen("#/components/schemas/", "#/definitions/", 1)
        .replacen("#/components/", "#/x-components/", 1)
}

/// Converts one OpenAPI 3.0 document to Swagger 2.0
///
/// The input is borrowed and never modified; [`convert`](Self::convert)
/// works on its own deep copy.
#[derive(Debug)]
pub struct OpenApi3ToSwagger2<'a> {
    spec: &'a Value,
    resolver: ReferenceResolver,
    options: ConvertOptions,
    warnings: Vec<ConversionWarning>,
}

impl<'a> OpenApi3ToSwagger2<'a> {
    /// `base_dir` is the directory of the source file, used for relative
    /// file references.
    pub fn new(spec: &'a Value, base_dir: Option<PathBuf>) -> Self {
        Self {
            spec,
            resolver: ReferenceResolver::new(base_dir),
            options: ConvertOptions::default(),
            warnings: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Warnings collected by the last [`convert`](Self::convert) call
    pub fn warnings(&self) -> &[ConversionWarning] {
        &self.warnings
    }

    /// Produce the Swagger 2.0 document
    pub fn convert(&mut self) -> ConvertResult<Value> {
        self.warnings.clear();
        let mut schemas = SchemaRewriter::new(self.options.max_depth);

        let mut spec = self.spec.clone();
        let Value::Object(root) = &mut spec else {
            return Err(ConvertError::InvalidFormat {
                origin: "document root".to_string(),
                format: FormatId::OpenApi3.to_string(),
            });
        };

        root.insert("swagger".to_string(), json!("2.0"));
        rewrite_server_info(root);

        self.convert_paths(&mut spec, &mut schemas)?;

        let relocated = match &mut spec {
            Value::Object(root) => relocate_components(root, &mut schemas)?,
            _ => false,
        };

        let tags = schemas.take_tags();
        self.warnings.extend(schemas.take_warnings());
        self.apply_discriminator_tags(&mut spec, tags, relocated);

        if relocated {
            fix_refs(&mut spec);
        }

        debug!("Conversion finished with {} warning(s)", self.warnings.len());
        Ok(spec)
    }

    fn convert_paths(&self, spec: &mut Value, schemas: &mut SchemaRewriter) -> ConvertResult<()> {
        let paths: Vec<String> = match spec.get("paths") {
            Some(Value::Object(paths)) => paths.keys().cloned().collect(),
            _ => return Ok(()),
        };

        let parameters = ParameterRewriter::new(&self.resolver);
        let responses = ResponseRewriter::new(&self.resolver);

        for path in paths {
            let mut item = self
                .resolver
                .resolve(spec, &spec["paths"][path.as_str()], ResolveMode::Clone)?
                .into_owned();

            if let Value::Object(item) = &mut item {
                parameters.rewrite_parameters(spec, item)?;

                for method in HttpMethod::ALL {
                    let Some(operation) = item.get(method.as_key()) else {
                        continue;
                    };
                    let mut operation = self
                        .resolver
                        .resolve(spec, operation, ResolveMode::Clone)?
                        .into_owned();

                    if let Value::Object(operation) = &mut operation {
                        debug!("Converting {} {}", method, path);
                        parameters.rewrite_operation(spec, operation, schemas)?;
                        responses.rewrite_responses(spec, operation, schemas)?;
                    }
                    item.insert(method.as_key().to_string(), operation);
                }
            }

            if let Some(Value::Object(paths)) = spec.get_mut("paths") {
                paths.insert(path, item);
            }
        }
        Ok(())
    }

    /// Write `x-discriminator-value` onto each mapped schema
    fn apply_discriminator_tags(&mut self, spec: &mut Value, tags: Vec<DiscriminatorTag>, relocated: bool) {
        for tag in tags {
            let mut tagged = false;

            for candidate in tag.candidates() {
                if is_local(&candidate) {
                    let pointer = if relocated {
                        relocate_ref(&candidate)
                    } else {
                        candidate
                    };
                    if let Some(Value::Object(target)) = walk_pointer_mut(spec, &pointer[1..]) {
                        target.insert("x-discriminator-value".to_string(), json!(tag.payload));
                        target.insert("x-ms-discriminator-value".to_string(), json!(tag.payload));
                        tagged = true;
                        break;
                    }
                    debug!("Discriminator target {} not found for {}", pointer, tag.payload);
                } else {
                    // Targets in other files are only checked; the loaded copy is not part of the output
                    match self.resolver.resolve_pointer(spec, &candidate, ResolveMode::Alias) {
                        Ok(_) => {
                            tagged = true;
                            break;
                        }
                        Err(err) => debug!("Discriminator target {} for {}: {}", candidate, tag.payload, err),
                    }
                }
            }

            if !tagged {
                let warning = ConversionWarning::UnresolvedDiscriminatorMapping {
                    payload: tag.payload,
                    target: tag.target,
                };
                warn!("{}", warning);
                self.warnings.push(warning);
            }
        }
    }
}

/// Move `components` into the Swagger 2.0 layout. Returns whether a
/// `components` mapping was present.
fn relocate_components(root: &mut Map<String, Value>, schemas: &mut SchemaRewriter) -> ConvertResult<bool> {
    let mut components = match root.remove("components") {
        Some(Value::Object(components)) => components,
        Some(other) => {
            debug!("Ignoring non-mapping components");
            root.insert("components".to_string(), other);
            return Ok(false);
        }
        None => return Ok(false),
    };

    if let Some(mut definitions) = components.remove("schemas") {
        if let Value::Object(definitions) = &mut definitions {
            for (name, definition) in definitions.iter_mut() {
                debug!("Converting definition {}", name);
                schemas.rewrite(definition, Direction::Response)?;
            }
        }
        root.insert("definitions".to_string(), definitions);
    }

    if let Some(mut security) = components.remove("securitySchemes") {
        if let Value::Object(security) = &mut security {
            rewrite_security_schemes(security)?;
        }
        root.insert("securityDefinitions".to_string(), security);
    }

    root.insert("x-components".to_string(), Value::Object(components));
    Ok(true)
}

/// Relocate every `$ref` string in the tree
fn fix_refs(node: &mut Value) {
    match node {
        Value::Array(items) => items.iter_mut().for_each(fix_refs),
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                match value {
                    Value::String(reference) if key == "$ref" => *reference = relocate_ref(reference),
                    other => fix_refs(other),
                }
            }
        }
        _ => {}
    }
}
