//! End-to-end conversion API

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ConversionRequest;
use crate::error::{ConversionWarning, ConvertResult};
use crate::formats::{FormatId, FormatRegistry};
use crate::loader::{self, LoadedSpec, SpecSource};
use crate::stringify::{self, StringifyOptions};

/// A converted document
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSpec {
    pub format: FormatId,
    pub spec: Value,
    pub warnings: Vec<ConversionWarning>,
}

impl ConvertedSpec {
    pub fn stringify(&self, options: &StringifyOptions) -> ConvertResult<String> {
        stringify::stringify(&self.spec, options)
    }
}

/// Loads documents and converts them between registered formats
#[derive(Debug, Default)]
pub struct Converter {
    registry: FormatRegistry,
}

impl Converter {
    /// Converter over the built-in formats
    pub fn new() -> Self {
        Self {
            registry: FormatRegistry::new(),
        }
    }

    pub fn with_registry(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Load and validate a document of the given format
    pub fn get_spec(&self, source: SpecSource, format: FormatId) -> ConvertResult<LoadedSpec> {
        loader::load(&self.registry, source, format)
    }

    /// Load `source` as `request.from` and convert it to `request.to`
    pub fn convert(&self, source: SpecSource, request: &ConversionRequest) -> ConvertResult<ConvertedSpec> {
        let mut loaded = self.get_spec(source, request.from)?;
        if request.fill_missing {
            debug!("Filling missing fields");
            self.registry.get(request.from)?.fill_missing(&mut loaded.spec, None);
        }

        let converted = loaded.convert_to(&self.registry, request.to, &request.convert_options())?;
        if !converted.warnings.is_empty() {
            warn!(
                "Converted {} to {} with {} warning(s)",
                request.from,
                request.to,
                converted.warnings.len()
            );
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use serde_json::json;

    #[test]
    fn test_convert_object() {
        let converter = Converter::new();
        let source = SpecSource::Object(json!({
            "openapi": "3.0.0",
            "info": {"title": "Pets", "version": "1.0.0"},
            "paths": {}
        }));

        let converted = converter.convert(source, &ConversionRequest::default()).unwrap();
        assert_eq!(converted.format, FormatId::Swagger2);
        assert_eq!(converted.spec["swagger"], "2.0");
        assert!(converted.spec.get("openapi").is_none());
    }

    #[test]
    fn test_fill_missing() {
        let converter = Converter::new();
        let request = ConversionRequest {
            fill_missing: true,
            ..ConversionRequest::default()
        };
        let converted = converter
            .convert(json!({"openapi": "3.0.0", "paths": {}}).into(), &request)
            .unwrap();

        assert_eq!(converted.spec["info"]["title"], "< An API title here >");
        assert_eq!(converted.spec["info"]["version"], "< An API version here >");
    }

    #[test]
    fn test_swagger_to_openapi_is_unavailable() {
        let converter = Converter::new();
        let request = ConversionRequest {
            from: FormatId::Swagger2,
            to: FormatId::OpenApi3,
            ..ConversionRequest::default()
        };
        let err = converter
            .convert(json!({"swagger": "2.0"}).into(), &request)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to convert from swagger_2 to openapi_3");
    }

    #[test]
    fn test_unregistered_format() {
        let converter = Converter::with_registry(FormatRegistry::empty());
        let err = converter
            .get_spec(json!({"openapi": "3.0.0"}).into(), FormatId::OpenApi3)
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnknownFormat(_)));
    }
}
