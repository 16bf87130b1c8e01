//! API description formats
//!
//! Each supported document format implements [`SpecFormat`]; a
//! [`FormatRegistry`] maps [`FormatId`]s to implementations.

mod openapi3;
mod swagger2;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ConvertOptions;
use crate::error::{ConversionWarning, ConvertError, ConvertResult};
use crate::loader::parse_content;

pub use openapi3::OpenApi3Format;
pub use swagger2::Swagger2Format;

/// Identifier of a document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatId {
    #[serde(rename = "openapi_3")]
    OpenApi3,
    #[serde(rename = "swagger_2")]
    Swagger2,
}

impl FormatId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatId::OpenApi3 => "openapi_3",
            FormatId::Swagger2 => "swagger_2",
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatId {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openapi_3" => Ok(FormatId::OpenApi3),
            "swagger_2" => Ok(FormatId::Swagger2),
            other => Err(ConvertError::UnknownFormat(other.to_string())),
        }
    }
}

/// Output of a format-to-format conversion
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub spec: Value,
    pub warnings: Vec<ConversionWarning>,
}

/// Capabilities of a document format
pub trait SpecFormat: Send + Sync {
    fn id(&self) -> FormatId;

    /// Family name, e.g. `openapi`
    fn name(&self) -> &'static str;

    /// `major.minor` versions this format accepts
    fn supported_versions(&self) -> &'static [&'static str];

    /// Parse document text (JSON, then YAML)
    fn parse(&self, content: &str) -> ConvertResult<Value> {
        parse_content(content)
    }

    /// Whether a parsed document belongs to this format
    fn check_format(&self, spec: &Value) -> bool;

    /// The document's version, as compared against [`supported_versions`](Self::supported_versions)
    fn format_version(&self, spec: &Value) -> Option<String>;

    /// Repair common authoring mistakes after loading or converting
    fn fixup(&self, _spec: &mut Value) {}

    /// Fill required fields the document leaves out. `dummy` replaces the
    /// default placeholder values.
    fn fill_missing(&self, spec: &mut Value, dummy: Option<&Value>) {
        let mut filled = dummy.cloned().unwrap_or_else(default_placeholders);
        merge_values(&mut filled, spec.take());
        *spec = filled;
    }

    /// Convert a document of this format to `target`
    fn convert_to(
        &self,
        spec: &Value,
        base_dir: Option<&Path>,
        target: FormatId,
        options: &ConvertOptions,
    ) -> ConvertResult<ConversionOutput> {
        let _ = (spec, base_dir, options);
        Err(ConvertError::ConversionUnavailable {
            from: self.id().to_string(),
            to: target.to_string(),
        })
    }
}

fn default_placeholders() -> Value {
    json!({
        "info": {
            "title": "< An API title here >",
            "version": "< An API version here >"
        }
    })
}

/// Deep-merge `overlay` into `base`; overlay values win except where both
/// sides are mappings.
pub(crate) fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Known formats, keyed by identifier
pub struct FormatRegistry {
    formats: IndexMap<FormatId, Box<dyn SpecFormat>>,
}

impl FormatRegistry {
    /// Registry with every built-in format
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Swagger2Format));
        registry.register(Box::new(OpenApi3Format));
        registry
    }

    pub fn empty() -> Self {
        Self {
            formats: IndexMap::new(),
        }
    }

    /// Add or replace a format implementation
    pub fn register(&mut self, format: Box<dyn SpecFormat>) {
        self.formats.insert(format.id(), format);
    }

    pub fn get(&self, id: FormatId) -> ConvertResult<&dyn SpecFormat> {
        self.formats
            .get(&id)
            .map(|format| format.as_ref())
            .ok_or_else(|| ConvertError::UnknownFormat(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = FormatId> + '_ {
        self.formats.keys().copied()
    }

    /// Identifier of the format with family `name` that supports `version`
    pub fn format_name(&self, name: &str, version: &str) -> Option<FormatId> {
        self.formats
            .values()
            .filter(|format| format.name() == name && format.supported_versions().contains(&version))
            .map(|format| format.id())
            .last()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.formats.keys()).finish()
    }
}
