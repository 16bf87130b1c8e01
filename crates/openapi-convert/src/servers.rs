//! `servers` → `host`/`schemes`/`basePath`

use serde_json::{json, Map, Value};
use tracing::debug;
use url::Url;

/// Location pieces derived from a server URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerLocation {
    pub host: Option<String>,
    pub scheme: Option<String>,
    pub base_path: Option<String>,
}

impl ServerLocation {
    /// Split a (variable-substituted) server URL.
    ///
    /// Relative URLs carry only a path.
    pub fn parse(server_url: &str) -> Self {
        match Url::parse(server_url) {
            Ok(url) => {
                let port = url.port().or_else(|| explicit_port(server_url));
                let host = url.host_str().map(|host| match port {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                });
                Self {
                    host,
                    scheme: Some(url.scheme().to_string()),
                    base_path: non_empty(url.path()),
                }
            }
            Err(err) => {
                debug!("Server URL {} is relative ({})", server_url, err);
                let path = server_url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default();
                Self {
                    host: None,
                    scheme: None,
                    base_path: non_empty(path),
                }
            }
        }
    }
}

/// Port written in the URL's authority. `Url` drops ports that match the
/// scheme default, but `host` keeps them as written.
fn explicit_port(server_url: &str) -> Option<u16> {
    let (_, rest) = server_url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let (host, port) = host_port.rsplit_once(':')?;
    if host.starts_with('[') && !host.ends_with(']') {
        return None;
    }
    port.parse().ok()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `servers[0].url` with every `{name}` replaced by the variable's default.
/// Variables without a non-empty string default are left in place.
pub fn substitute_variables(server: &Value) -> Option<String> {
    let mut server_url = server.get("url")?.as_str()?.to_string();
    if let Some(Value::Object(variables)) = server.get("variables") {
        for (name, variable) in variables {
            let Some(default) = variable.get("default").and_then(Value::as_str) else {
                continue;
            };
            if !default.is_empty() {
                server_url = server_url.replace(&format!("{{{}}}", name), default);
            }
        }
    }
    Some(server_url)
}

/// Replace `servers` with `host`, `schemes` and `basePath`, and drop the
/// `openapi` version key.
pub fn rewrite_server_info(spec: &mut Map<String, Value>) {
    let server_url = spec
        .get("servers")
        .and_then(|servers| servers.get(0))
        .and_then(substitute_variables);

    if let Some(server_url) = server_url {
        let location = ServerLocation::parse(&server_url);
        debug!("Server {} resolved to {:?}", server_url, location);

        match location.host {
            Some(host) => {
                spec.insert("host".to_string(), json!(host));
            }
            None => {
                spec.remove("host");
            }
        }
        match location.scheme {
            Some(scheme) => {
                spec.insert("schemes".to_string(), json!([scheme]));
            }
            None => {
                spec.remove("schemes");
            }
        }
        if let Some(base_path) = location.base_path {
            spec.insert("basePath".to_string(), json!(base_path));
        }
    }

    spec.remove("servers");
    spec.remove("openapi");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rewrite(spec: Value) -> Value {
        let Value::Object(mut spec) = spec else {
            panic!("spec must be an object");
        };
        rewrite_server_info(&mut spec);
        Value::Object(spec)
    }

    #[test]
    fn test_absolute_server_url() {
        let result = rewrite(json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1"},
            "servers": [
                {"url": "https://api.example.com:8443/v1"},
                {"url": "http://fallback.example.com"}
            ]
        }));

        assert_eq!(
            result,
            json!({
                "info": {"title": "Pets", "version": "1"},
                "host": "api.example.com:8443",
                "schemes": ["https"],
                "basePath": "/v1"
            })
        );
    }

    #[test]
    fn test_default_ports_are_kept() {
        let result = rewrite(json!({"servers": [{"url": "https://api.example.com:443/v1"}]}));
        assert_eq!(result["host"], "api.example.com:443");
        assert_eq!(result["schemes"], json!(["https"]));
        assert_eq!(result["basePath"], "/v1");

        assert_eq!(
            ServerLocation::parse("http://user:pw@localhost:80/api").host.as_deref(),
            Some("localhost:80")
        );
        assert_eq!(ServerLocation::parse("http://[::1]:8080/a").host.as_deref(), Some("[::1]:8080"));
        assert_eq!(ServerLocation::parse("http://[::1]/a").host.as_deref(), Some("[::1]"));
        assert_eq!(ServerLocation::parse("https://example.com/v1").host.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_variables_are_substituted() {
        let server = json!({
            "url": "{scheme}://{env}.example.com/{version}/{version}",
            "variables": {
                "scheme": {"default": "https"},
                "env": {"default": "staging", "enum": ["staging", "prod"]},
                "version": {"default": "v2"}
            }
        });
        assert_eq!(
            substitute_variables(&server).unwrap(),
            "https://staging.example.com/v2/v2"
        );

        let result = rewrite(json!({"servers": [server]}));
        assert_eq!(result["host"], "staging.example.com");
        assert_eq!(result["schemes"], json!(["https"]));
        assert_eq!(result["basePath"], "/v2/v2");
    }

    #[test]
    fn test_empty_default_is_not_substituted() {
        let server = json!({"url": "/api/{tenant}", "variables": {"tenant": {"default": ""}}});
        assert_eq!(substitute_variables(&server).unwrap(), "/api/{tenant}");
    }

    #[test]
    fn test_relative_server_url() {
        let result = rewrite(json!({
            "host": "stale.example.com",
            "schemes": ["http"],
            "servers": [{"url": "/api/v3?debug=true#top"}]
        }));
        assert_eq!(result, json!({"basePath": "/api/v3"}));
    }

    #[test]
    fn test_root_url_has_slash_base_path() {
        let location = ServerLocation::parse("https://example.com");
        assert_eq!(
            location,
            ServerLocation {
                host: Some("example.com".into()),
                scheme: Some("https".into()),
                base_path: Some("/".into()),
            }
        );
    }

    #[test]
    fn test_no_servers() {
        let result = rewrite(json!({"openapi": "3.0.0", "paths": {}}));
        assert_eq!(result, json!({"paths": {}}));
    }
}
