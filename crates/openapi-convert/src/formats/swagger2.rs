//! Swagger 2.0

use serde_json::Value;
use tracing::debug;

use super::{FormatId, SpecFormat};

#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger2Format;

impl SpecFormat for Swagger2Format {
    fn id(&self) -> FormatId {
        FormatId::Swagger2
    }

    fn name(&self) -> &'static str {
        "swagger"
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        &["2.0"]
    }

    fn check_format(&self, spec: &Value) -> bool {
        spec.get("swagger").is_some()
    }

    fn format_version(&self, spec: &Value) -> Option<String> {
        match spec.get("swagger")? {
            Value::String(version) => Some(version.clone()),
            Value::Number(version) => Some(version.to_string()),
            _ => None,
        }
    }

    fn fixup(&self, spec: &mut Value) {
        let Some(root) = spec.as_object_mut() else {
            return;
        };

        // Numeric versions are a common authoring mistake
        if let Some(info) = root.get_mut("info").and_then(Value::as_object_mut) {
            if let Some(Value::Number(version)) = info.get("version") {
                let version = version_string(version);
                debug!("Converting numeric info.version to {:?}", version);
                info.insert("version".to_string(), Value::String(version));
            }
        }

        if let Some(Value::String(base_path)) = root.get_mut("basePath") {
            *base_path = normalize_base_path(base_path);
        }

        if let Some(Value::Object(definitions)) = root.get_mut("definitions") {
            for definition in definitions.values_mut() {
                if let Some(definition) = definition.as_object_mut() {
                    definition.remove("id");
                }
            }
        }
    }
}

/// `1` → `"1.0"`, `1.5` → `"1.5"`
fn version_string(version: &serde_json::Number) -> String {
    if version.is_f64() {
        match version.as_f64() {
            Some(float) if float.fract() == 0.0 => format!("{:.1}", float),
            _ => version.to_string(),
        }
    } else {
        format!("{}.0", version)
    }
}

/// Collapse repeated slashes and drop a trailing one; empty becomes `/`
pub fn normalize_base_path(base_path: &str) -> String {
    let mut normalized = String::with_capacity(base_path.len());
    for c in base_path.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }
    if normalized.ends_with('/') {
        normalized.pop();
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}
