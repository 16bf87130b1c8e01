//! Media type classification

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const OCTET_STREAM: &str = "application/octet-stream";

fn json_media_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(application/json|[^;/ \t]+/[^;/ \t]+[+]json)[ \t]*(;.*)?$")
            .expect("JSON media type pattern is valid")
    })
}

/// `application/json` or any `type/subtype+json`, with optional parameters
pub fn is_json(media_type: &str) -> bool {
    json_media_type_pattern().is_match(media_type)
}

/// Whether a media range contains a wildcard
pub fn is_wildcard(media_range: &str) -> bool {
    media_range.contains('*')
}

/// Whether a content key looks like a media range at all (`type/subtype`)
pub fn is_media_range(key: &str) -> bool {
    key.find('/').is_some_and(|index| index > 0)
}

/// How a request body media type maps onto Swagger 2.0 parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// urlencoded or multipart: `in: formData`
    Form,
    /// JSON-compatible: `in: body`
    Json,
    /// Anything else (binary or unknown): `in: body`, binary string default
    Other,
}

/// Choose the request body media type to convert, in priority order:
/// urlencoded, multipart, first JSON-compatible type, first other media range.
pub fn preferred_request_type(content: &Map<String, Value>) -> Option<(&str, BodyKind)> {
    for form in [FORM_URLENCODED, MULTIPART_FORM_DATA] {
        if let Some((key, _)) = content.get_key_value(form) {
            return Some((key.as_str(), BodyKind::Form));
        }
    }
    if let Some(key) = content.keys().find(|key| is_json(key)) {
        return Some((key.as_str(), BodyKind::Json));
    }
    content
        .keys()
        .find(|key| is_media_range(key))
        .map(|key| (key.as_str(), BodyKind::Other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_media_types() {
        assert!(is_json("application/json"));
        assert!(is_json("Application/JSON; charset=utf-8"));
        assert!(is_json("application/vnd.api+json"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/plain"));
        assert!(!is_json("application/jsonp"));
        assert!(!is_json("*/*"));
    }

    #[test]
    fn test_media_range_detection() {
        assert!(is_media_range("text/plain"));
        assert!(!is_media_range("/plain"));
        assert!(!is_media_range("default"));
        assert!(is_wildcard("image/*"));
    }

    #[test]
    fn test_form_types_win_over_json() {
        let content = json!({
            "application/json": {},
            "multipart/form-data": {},
            "application/x-www-form-urlencoded": {}
        });
        let content = content.as_object().unwrap();
        assert_eq!(
            preferred_request_type(content),
            Some((FORM_URLENCODED, BodyKind::Form))
        );
    }

    #[test]
    fn test_json_wins_over_other_types() {
        let content = json!({"text/plain": {}, "application/merge-patch+json": {}});
        let content = content.as_object().unwrap();
        assert_eq!(
            preferred_request_type(content),
            Some(("application/merge-patch+json", BodyKind::Json))
        );
    }

    #[test]
    fn test_falls_back_to_first_media_range() {
        let content = json!({"application/octet-stream": {}, "image/png": {}});
        let content = content.as_object().unwrap();
        assert_eq!(
            preferred_request_type(content),
            Some(("application/octet-stream", BodyKind::Other))
        );

        let content = json!({"nonsense": {}});
        assert_eq!(preferred_request_type(content.as_object().unwrap()), None);
    }
}
