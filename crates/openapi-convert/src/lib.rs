//! # openapi-convert
//!
//! Converts OpenAPI 3.0 documents to Swagger 2.0.
//! Works on untyped `serde_json::Value` trees so vendor extensions and
//! unknown keys survive the conversion.

mod config;
mod converter;
mod error;
mod formats;
mod loader;
mod media;
mod parameters;
mod pipeline;
mod resolver;
mod responses;
mod schema;
mod security;
mod servers;
mod stringify;
mod types;

pub use config::{ConversionRequest, ConvertOptions, DEFAULT_MAX_DEPTH};
pub use converter::{relocate_ref, OpenApi3ToSwagger2};
pub use error::{ConversionWarning, ConvertError, ConvertResult};
pub use formats::{ConversionOutput, FormatId, FormatRegistry, OpenApi3Format, SpecFormat, Swagger2Format};
pub use loader::{load, parse_content, LoadedSpec, SpecSource};
pub use parameters::{collection_format, ParameterRewriter};
pub use pipeline::{ConvertedSpec, Converter};
pub use resolver::ReferenceResolver;
pub use responses::ResponseRewriter;
pub use schema::{DiscriminatorTag, SchemaRewriter};
pub use stringify::{sort_keys, stringify, KeyOrder, StringifyOptions, Syntax};
pub use types::*;
