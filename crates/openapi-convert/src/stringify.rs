//! Serializing documents back to text

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConvertResult;

/// Well-known keys, emitted first and in this order
const OPENAPI_KEY_ORDER: [&str; 18] = [
    "openapi",
    "swagger",
    "info",
    "servers",
    "host",
    "basePath",
    "schemes",
    "consumes",
    "produces",
    "paths",
    "components",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "security",
    "tags",
    "externalDocs",
];

/// Output syntax
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Json,
    Yaml,
}

impl FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Syntax::Json),
            "yaml" => Ok(Syntax::Yaml),
            other => Err(format!("unknown syntax {:?}, expected json or yaml", other)),
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Syntax::Json => "json",
            Syntax::Yaml => "yaml",
        })
    }
}

/// Key ordering applied to every mapping before serializing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyOrder {
    /// Well-known OpenAPI/Swagger keys first, then the rest alphabetically
    #[default]
    #[serde(rename = "openapi")]
    OpenApi,
    /// Alphabetical
    #[serde(rename = "alpha")]
    Alpha,
    /// Keep document order
    #[serde(rename = "false")]
    Unordered,
}

impl FromStr for KeyOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openapi" => Ok(KeyOrder::OpenApi),
            "alpha" => Ok(KeyOrder::Alpha),
            "false" => Ok(KeyOrder::Unordered),
            other => Err(format!(
                "unknown order {:?}, expected openapi, alpha or false",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringifyOptions {
    pub syntax: Syntax,
    pub order: KeyOrder,
}

/// Recursively reorder mapping keys
pub fn sort_keys(value: &Value, order: KeyOrder) -> Value {
    match value {
        Value::Object(map) if order != KeyOrder::Unordered => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| sort_key(a, order).cmp(&sort_key(b, order)));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, child) in entries {
                sorted.insert(key.clone(), sort_keys(child, order));
            }
            Value::Object(sorted)
        }
        Value::Array(items) if order != KeyOrder::Unordered => {
            Value::Array(items.iter().map(|item| sort_keys(item, order)).collect())
        }
        other => other.clone(),
    }
}

fn sort_key(key: &str, order: KeyOrder) -> (usize, &str) {
    let rank = match order {
        KeyOrder::OpenApi => OPENAPI_KEY_ORDER
            .iter()
            .position(|known| *known == key)
            .unwrap_or(OPENAPI_KEY_ORDER.len()),
        _ => 0,
    };
    (rank, key)
}

/// Serialize a document with the requested syntax and key order
pub fn stringify(spec: &Value, options: &StringifyOptions) -> ConvertResult<String> {
    let sorted = sort_keys(spec, options.order);
    match options.syntax {
        Syntax::Json => Ok(serde_json::to_string_pretty(&sorted)?),
        Syntax::Yaml => Ok(serde_yaml::to_string(&sorted)?),
    }
}
