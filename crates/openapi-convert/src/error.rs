//! Error types for the converter

use thiserror::Error;

/// Result type alias for conversion operations
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;

/// Conversion error types
///
/// Every variant is fatal: the conversion call that produced it returns no
/// document. Non-fatal problems are reported as [`ConversionWarning`]s.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Unsupported $ref {0}: remote references and relative file references without a source directory are not supported")]
    UnsupportedReference(String),

    #[error("Unresolved $ref: {0}")]
    UnresolvedReference(String),

    #[error("Could not read $ref target {path}: {source}")]
    ReadReference {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read {path}: {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {path} as JSON or YAML: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid security scheme {name}: {message}")]
    InvalidSecurityScheme { name: String, message: String },

    #[error("Recursion depth exceeded at {path} (max: {max_depth})")]
    RecursionDepthExceeded { path: String, max_depth: usize },

    #[error("Unknown format {0}")]
    UnknownFormat(String),

    #[error("{origin} is not valid {format}")]
    InvalidFormat { origin: String, format: String },

    #[error("Unsupported {format} version: {version}")]
    UnsupportedVersion { format: String, version: String },

    #[error("Unable to convert from {from} to {to}")]
    ConversionUnavailable { from: String, to: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Non-fatal problems found while converting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// A discriminator mapping entry whose target could not be found
    UnresolvedDiscriminatorMapping { payload: String, target: String },
    /// A discriminator mapping entry that is not a string
    InvalidDiscriminatorMapping { payload: String },
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::UnresolvedDiscriminatorMapping { payload, target } => write!(
                f,
                "Unable to resolve {} for {} in discriminator.mapping",
                target, payload
            ),
            ConversionWarning::InvalidDiscriminatorMapping { payload } => {
                write!(f, "Ignoring non-string target for {} in discriminator.mapping", payload)
            }
        }
    }
}
