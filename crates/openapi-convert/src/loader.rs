//! Reading documents into a known format

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::config::ConvertOptions;
use crate::error::{ConvertError, ConvertResult};
use crate::formats::{FormatId, FormatRegistry};
use crate::pipeline::ConvertedSpec;
use crate::resolver::parse_json_or_yaml;

/// Where a document comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SpecSource {
    /// Already parsed
    Object(Value),
    /// Path to a JSON or YAML file
    File(PathBuf),
    /// JSON or YAML text
    Text(String),
}

impl SpecSource {
    /// Classify a command-line style input string.
    ///
    /// Existing paths, `./`/`../` prefixes and anything without `://` are
    /// files; everything else is document text.
    pub fn detect(input: &str) -> Self {
        let is_file = Path::new(input).exists()
            || input.starts_with("./")
            || input.starts_with("../")
            || !input.contains("://");
        if is_file {
            SpecSource::File(PathBuf::from(input))
        } else {
            SpecSource::Text(input.to_string())
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SpecSource::Object(_) => "object",
            SpecSource::File(_) => "file",
            SpecSource::Text(_) => "string",
        }
    }
}

impl From<Value> for SpecSource {
    fn from(value: Value) -> Self {
        SpecSource::Object(value)
    }
}

impl From<PathBuf> for SpecSource {
    fn from(path: PathBuf) -> Self {
        SpecSource::File(path)
    }
}

/// Parse document text as JSON, falling back to YAML
pub fn parse_content(content: &str) -> ConvertResult<Value> {
    parse_json_or_yaml(content).map_err(|message| ConvertError::Parse {
        path: "input".to_string(),
        message,
    })
}

/// A parsed, format-checked document
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSpec {
    pub format: FormatId,
    pub spec: Value,
    /// The file the document was read from
    pub source: Option<PathBuf>,
}

impl LoadedSpec {
    /// Directory that relative `$ref`s are resolved against
    pub fn base_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }

    /// Convert to `target`, then apply the target format's fixups
    pub fn convert_to(
        &self,
        registry: &FormatRegistry,
        target: FormatId,
        options: &ConvertOptions,
    ) -> ConvertResult<ConvertedSpec> {
        if target == self.format {
            return Ok(ConvertedSpec {
                format: self.format,
                spec: self.spec.clone(),
                warnings: Vec::new(),
            });
        }

        debug!("Converting {} to {}", self.format, target);
        let output = registry
            .get(self.format)?
            .convert_to(&self.spec, self.base_dir(), target, options)?;

        let mut spec = output.spec;
        registry.get(target)?.fixup(&mut spec);
        Ok(ConvertedSpec {
            format: target,
            spec,
            warnings: output.warnings,
        })
    }
}

/// Read `source` as a document of `format`.
///
/// The document must belong to the format and declare a supported version;
/// the format's fixups are applied before the version check.
pub fn load(registry: &FormatRegistry, source: SpecSource, format: FormatId) -> ConvertResult<LoadedSpec> {
    let spec_format = registry.get(format)?;
    let kind = source.kind();

    let (mut spec, origin, path) = match source {
        SpecSource::Object(spec) => (spec, kind.to_string(), None),
        SpecSource::File(path) => {
            debug!("Reading {:?}", path);
            let content = std::fs::read_to_string(&path).map_err(|source| ConvertError::ReadSource {
                path: path.display().to_string(),
                source,
            })?;
            let spec = spec_format.parse(&content).map_err(|err| match err {
                ConvertError::Parse { message, .. } => ConvertError::Parse {
                    path: path.display().to_string(),
                    message,
                },
                other => other,
            })?;
            (spec, format!("{} {}", kind, path.display()), Some(path))
        }
        SpecSource::Text(text) => (spec_format.parse(&text)?, kind.to_string(), None),
    };

    if !spec_format.check_format(&spec) {
        return Err(ConvertError::InvalidFormat {
            origin,
            format: format.to_string(),
        });
    }

    spec_format.fixup(&mut spec);

    let version = spec_format.format_version(&spec).unwrap_or_default();
    if !spec_format.supported_versions().contains(&version.as_str()) {
        return Err(ConvertError::UnsupportedVersion {
            format: format.to_string(),
            version,
        });
    }

    debug!("Loaded {} {} document from {}", format, version, origin);
    Ok(LoadedSpec {
        format,
        spec,
        source: path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_detect_source_kind() {
        assert_eq!(
            SpecSource::detect("./petstore.yaml"),
            SpecSource::File(PathBuf::from("./petstore.yaml"))
        );
        assert_eq!(
            SpecSource::detect("specs/petstore.json"),
            SpecSource::File(PathBuf::from("specs/petstore.json"))
        );

        let text = "openapi: 3.0.0\nservers:\n  - url: https://example.com\n";
        assert_eq!(SpecSource::detect(text), SpecSource::Text(text.to_string()));
    }

    #[test]
    fn test_parse_content_json_then_yaml() {
        assert_eq!(parse_content(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(parse_content("a: 1\nb: [x]\n").unwrap(), json!({"a": 1, "b": ["x"]}));
        assert!(matches!(parse_content("a: [1"), Err(ConvertError::Parse { .. })));
    }

    #[test]
    fn test_load_object() {
        let registry = FormatRegistry::new();
        let spec = json!({"openapi": "3.0.2", "info": {"title": "t", "version": "1"}, "paths": {}});

        let loaded = load(&registry, spec.clone().into(), FormatId::OpenApi3).unwrap();
        assert_eq!(loaded.spec, spec);
        assert_eq!(loaded.source, None);
        assert_eq!(loaded.base_dir(), None);
    }

    #[test]
    fn test_load_file_records_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("api.yaml");
        std::fs::write(&path, "openapi: 3.0.0\ninfo:\n  title: t\n  version: '1'\npaths: {}\n").unwrap();

        let registry = FormatRegistry::new();
        let loaded = load(&registry, SpecSource::File(path.clone()), FormatId::OpenApi3).unwrap();
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.base_dir(), Some(temp_dir.path()));
    }

    #[test]
    fn test_wrong_format_is_rejected() {
        let registry = FormatRegistry::new();
        let err = load(&registry, json!({"swagger": "2.0"}).into(), FormatId::OpenApi3).unwrap_err();
        match err {
            ConvertError::InvalidFormat { origin, format } => {
                assert_eq!(origin, "object");
                assert_eq!(format, "openapi_3");
            }
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_version() {
        let registry = FormatRegistry::new();
        let err = load(&registry, json!({"openapi": "3.1.0"}).into(), FormatId::OpenApi3).unwrap_err();
        match err {
            ConvertError::UnsupportedVersion { version, .. } => assert_eq!(version, "3.1"),
            other => panic!("Expected UnsupportedVersion, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let registry = FormatRegistry::new();
        let err = load(
            &registry,
            SpecSource::File(temp_dir.path().join("missing.json")),
            FormatId::OpenApi3,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::ReadSource { .. }));
    }

    #[test]
    fn test_swagger_fixup_runs_on_load() {
        let registry = FormatRegistry::new();
        let spec = json!({"swagger": "2.0", "info": {"title": "t", "version": 1}, "basePath": "/v1/"});
        let loaded = load(&registry, spec.into(), FormatId::Swagger2).unwrap();

        assert_eq!(loaded.spec["info"]["version"], "1.0");
        assert_eq!(loaded.spec["basePath"], "/v1");
    }

    #[test]
    fn test_convert_to_same_format_is_a_copy() {
        let registry = FormatRegistry::new();
        let loaded = load(&registry, json!({"swagger": "2.0"}).into(), FormatId::Swagger2).unwrap();
        let converted = loaded
            .convert_to(&registry, FormatId::Swagger2, &ConvertOptions::default())
            .unwrap();
        assert_eq!(converted.spec, loaded.spec);
        assert_eq!(converted.format, FormatId::Swagger2);
    }

    #[test]
    fn test_convert_to_applies_target_fixup() {
        let registry = FormatRegistry::new();
        let spec = json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": 3},
            "servers": [{"url": "https://example.com/api/"}],
            "paths": {}
        });
        let loaded = load(&registry, spec.into(), FormatId::OpenApi3).unwrap();
        let converted = loaded
            .convert_to(&registry, FormatId::Swagger2, &ConvertOptions::default())
            .unwrap();

        assert_eq!(converted.spec["info"]["version"], "3.0");
        assert_eq!(converted.spec["basePath"], "/api");
    }
}
