//! `$ref` resolution for OpenAPI documents
//!
//! References are either fragment-only (`#/components/schemas/Pet`), resolved
//! against the root document, or `file#fragment`, resolved by loading a file
//! that sits next to the source document. Resolution is single-hop: a target
//! that is itself a reference is returned as-is.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{ConvertError, ConvertResult};
use crate::types::ResolveMode;

/// Resolves `$ref` pointers, local or external-file
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver {
    /// Directory of the source document, when it was read from a file
    base_dir: Option<PathBuf>,
}

impl ReferenceResolver {
    /// Create a resolver; `base_dir` is required only for relative file refs
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Resolve `node` if it carries a `$ref`, otherwise hand it back unchanged.
    ///
    /// `Alias` borrows local targets in place; `Clone` returns an owned deep
    /// copy. Targets loaded from external files are always owned.
    pub fn resolve<'a>(
        &self,
        root: &'a Value,
        node: &'a Value,
        mode: ResolveMode,
    ) -> ConvertResult<Cow<'a, Value>> {
        match reference_of(node) {
            Some(pointer) => self.resolve_pointer(root, pointer, mode),
            None => Ok(Cow::Borrowed(node)),
        }
    }

    /// Resolve a raw `$ref` string
    pub fn resolve_pointer<'a>(
        &self,
        root: &'a Value,
        pointer: &str,
        mode: ResolveMode,
    ) -> ConvertResult<Cow<'a, Value>> {
        if let Some(fragment) = pointer.strip_prefix('#') {
            let target = walk_pointer(root, fragment)
                .ok_or_else(|| ConvertError::UnresolvedReference(pointer.to_string()))?;
            return Ok(match mode {
                ResolveMode::Alias => Cow::Borrowed(target),
                ResolveMode::Clone => Cow::Owned(target.clone()),
            });
        }

        self.resolve_external(pointer).map(Cow::Owned)
    }

    fn resolve_external(&self, pointer: &str) -> ConvertResult<Value> {
        let (file, fragment) = match pointer.split_once('#') {
            Some((file, fragment)) => (file, Some(fragment)),
            None => (pointer, None),
        };

        if is_absolute_url(file) {
            return Err(ConvertError::UnsupportedReference(pointer.to_string()));
        }
        let base_dir = self
            .base_dir
            .as_ref()
            .ok_or_else(|| ConvertError::UnsupportedReference(pointer.to_string()))?;

        let path = base_dir.join(file);
        debug!("Loading external $ref target {:?}", path);

        let content = std::fs::read_to_string(&path).map_err(|source| {
            ConvertError::ReadReference {
                path: path.display().to_string(),
                source,
            }
        })?;
        let external = parse_json_or_yaml(&content).map_err(|message| ConvertError::Parse {
            path: file.to_string(),
            message,
        })?;

        match fragment {
            Some(fragment) if !fragment.is_empty() => walk_pointer(&external, fragment)
                .cloned()
                .ok_or_else(|| ConvertError::UnresolvedReference(pointer.to_string())),
            _ => Ok(external),
        }
    }
}

/// The `$ref` string carried by `node`, if any
pub fn reference_of(node: &Value) -> Option<&str> {
    node.get("$ref").and_then(Value::as_str)
}

/// Whether `pointer` points into the root document
pub fn is_local(pointer: &str) -> bool {
    pointer.starts_with('#')
}

/// Whether `node` is a reference into another file
pub fn is_external_ref(node: &Value) -> bool {
    reference_of(node).is_some_and(|pointer| !is_local(pointer))
}

/// Parse text as JSON, falling back to YAML
pub(crate) fn parse_json_or_yaml(content: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(content)
            .map_err(|yaml_err| format!("{}; {}", json_err, yaml_err)),
    }
}

fn is_absolute_url(file: &str) -> bool {
    if file.starts_with("http") {
        return true;
    }
    // Single-letter schemes are Windows drive letters, not URLs
    Url::parse(file).is_ok_and(|url| url.scheme().len() > 1)
}

/// Unescape a single JSON Pointer segment
pub(crate) fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn segments(fragment: &str) -> Option<Vec<String>> {
    if fragment.is_empty() {
        return None;
    }
    let path = fragment.strip_prefix('/').unwrap_or(fragment);
    Some(path.split('/').map(unescape_segment).collect())
}

/// Walk a fragment (the part after `#`) from `root`
pub(crate) fn walk_pointer<'a>(root: &'a Value, fragment: &str) -> Option<&'a Value> {
    let Some(keys) = segments(fragment) else {
        return Some(root);
    };

    let mut current = root;
    for key in &keys {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`walk_pointer`]
pub(crate) fn walk_pointer_mut<'a>(root: &'a mut Value, fragment: &str) -> Option<&'a mut Value> {
    let Some(keys) = segments(fragment) else {
        return Some(root);
    };

    let mut current = root;
    for key in &keys {
        current = match current {
            Value::Object(map) => map.get_mut(key)?,
            Value::Array(items) => items.get_mut(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
