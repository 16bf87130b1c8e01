//! Conversion settings
//!
//! [`ConvertOptions`] tunes the conversion engine; [`ConversionRequest`]
//! describes an end-to-end conversion and can be read from a JSON or YAML
//! settings file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};
use crate::formats::FormatId;
use crate::resolver::parse_json_or_yaml;
use crate::stringify::{KeyOrder, StringifyOptions, Syntax};

/// Default limit on schema nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Engine options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    /// Deepest schema nesting the schema rewriter descends into
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// What to convert into what, and how to print it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionRequest {
    /// Source format
    pub from: FormatId,
    /// Target format
    pub to: FormatId,
    pub syntax: Syntax,
    pub order: KeyOrder,
    /// Fill in placeholder `info.title`/`info.version` before converting
    pub fill_missing: bool,
    pub max_depth: usize,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            from: FormatId::OpenApi3,
            to: FormatId::Swagger2,
            syntax: Syntax::default(),
            order: KeyOrder::default(),
            fill_missing: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConversionRequest {
    /// Load from a settings file; a missing file yields the defaults
    pub fn load(path: &Path) -> ConvertResult<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let value = parse_json_or_yaml(&contents).map_err(|message| ConvertError::Parse {
            path: path.display().to_string(),
            message,
        })?;
        let request: Self = serde_json::from_value(value)?;
        debug!("Loaded settings from {:?}", path);
        Ok(request)
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            max_depth: self.max_depth,
        }
    }

    pub fn stringify_options(&self) -> StringifyOptions {
        StringifyOptions {
            syntax: self.syntax,
            order: self.order,
        }
    }
}
