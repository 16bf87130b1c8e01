//! OpenAPI 3.0

use std::path::Path;

use serde_json::Value;

use super::{ConversionOutput, FormatId, SpecFormat};
use crate::config::ConvertOptions;
use crate::converter::OpenApi3ToSwagger2;
use crate::error::{ConvertError, ConvertResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi3Format;

impl SpecFormat for OpenApi3Format {
    fn id(&self) -> FormatId {
        FormatId::OpenApi3
    }

    fn name(&self) -> &'static str {
        "openapi"
    }

    fn supported_versions(&self) -> &'static [&'static str] {
        &["3.0"]
    }

    fn check_format(&self, spec: &Value) -> bool {
        spec.get("openapi").is_some()
    }

    /// First two components of `openapi`, so `3.0.3` reports `3.0`
    fn format_version(&self, spec: &Value) -> Option<String> {
        let version = match spec.get("openapi")? {
            Value::String(version) => version.clone(),
            Value::Number(version) => version.to_string(),
            _ => return None,
        };
        Some(version.split('.').take(2).collect::<Vec<_>>().join("."))
    }

    fn convert_to(
        &self,
        spec: &Value,
        base_dir: Option<&Path>,
        target: FormatId,
        options: &ConvertOptions,
    ) -> ConvertResult<ConversionOutput> {
        match target {
            FormatId::Swagger2 => {
                let mut converter =
                    OpenApi3ToSwagger2::new(spec, base_dir.map(Path::to_path_buf)).with_options(*options);
                let spec = converter.convert()?;
                Ok(ConversionOutput {
                    spec,
                    warnings: converter.warnings().to_vec(),
                })
            }
            other => Err(ConvertError::ConversionUnavailable {
                from: self.id().to_string(),
                to: other.to_string(),
            }),
        }
    }
}
