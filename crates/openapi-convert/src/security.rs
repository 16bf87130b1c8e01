//! Security scheme conversion
//!
//! Maps `components.securitySchemes` onto Swagger 2.0
//! `securityDefinitions`. Swagger 2.0 has no bearer scheme, so bearer tokens
//! are described as an `Authorization` header API key.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{ConvertError, ConvertResult};

/// Security scheme shapes that need rewriting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// `type: http`, `scheme: basic`
    Basic,
    /// `type: http`, `scheme: bearer`
    Bearer,
    /// `type: oauth2`
    OAuth2,
    /// Anything else passes through unchanged
    Passthrough,
}

impl SchemeKind {
    /// Classify a security scheme object
    pub fn detect(scheme: &Map<String, Value>) -> Self {
        let scheme_type = scheme.get("type").and_then(Value::as_str);
        let http_scheme = scheme.get("scheme").and_then(Value::as_str);
        match (scheme_type, http_scheme) {
            (Some("http"), Some("basic")) => SchemeKind::Basic,
            (Some("http"), Some("bearer")) => SchemeKind::Bearer,
            (Some("oauth2"), _) => SchemeKind::OAuth2,
            _ => SchemeKind::Passthrough,
        }
    }
}

/// Swagger 2.0 `flow` name for an OpenAPI 3 OAuth2 flow key
pub fn swagger_flow_name(flow: &str) -> &str {
    match flow {
        "clientCredentials" => "application",
        "authorizationCode" => "accessCode",
        other => other,
    }
}

/// Rewrite every scheme in a `securitySchemes` mapping in place
pub fn rewrite_security_schemes(schemes: &mut Map<String, Value>) -> ConvertResult<()> {
    for (name, scheme) in schemes.iter_mut() {
        if let Value::Object(scheme) = scheme {
            rewrite_security_scheme(name, scheme)?;
        }
    }
    Ok(())
}

/// Rewrite a single security scheme in place
pub fn rewrite_security_scheme(name: &str, scheme: &mut Map<String, Value>) -> ConvertResult<()> {
    let kind = SchemeKind::detect(scheme);
    debug!("Converting security scheme {} ({:?})", name, kind);

    match kind {
        SchemeKind::Basic => {
            scheme.insert("type".to_string(), json!("basic"));
            scheme.remove("scheme");
        }
        SchemeKind::Bearer => {
            scheme.insert("type".to_string(), json!("apiKey"));
            scheme.insert("name".to_string(), json!("Authorization"));
            scheme.insert("in".to_string(), json!("header"));
            scheme.remove("scheme");
            scheme.remove("bearerFormat");
        }
        SchemeKind::OAuth2 => rewrite_oauth2(name, scheme)?,
        SchemeKind::Passthrough => {}
    }
    Ok(())
}

fn rewrite_oauth2(name: &str, scheme: &mut Map<String, Value>) -> ConvertResult<()> {
    let invalid = |message: &str| ConvertError::InvalidSecurityScheme {
        name: name.to_string(),
        message: message.to_string(),
    };

    let flows = match scheme.remove("flows") {
        Some(Value::Object(flows)) => flows,
        Some(_) => return Err(invalid("flows must be a mapping")),
        None => return Err(invalid("oauth2 scheme has no flows")),
    };
    let Some((flow_name, flow)) = flows.into_iter().next() else {
        return Err(invalid("oauth2 scheme declares no flow"));
    };

    scheme.insert("flow".to_string(), json!(swagger_flow_name(&flow_name)));
    for key in ["authorizationUrl", "tokenUrl", "scopes"] {
        scheme.remove(key);
        if let Some(value) = flow.get(key) {
            scheme.insert(key.to_string(), value.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(schemes: Value) -> ConvertResult<Value> {
        let Value::Object(mut schemes) = schemes else {
            panic!("schemes must be an object");
        };
        rewrite_security_schemes(&mut schemes)?;
        Ok(Value::Object(schemes))
    }

    #[test]
    fn test_http_basic() {
        let result = convert(json!({"basicAuth": {"type": "http", "scheme": "basic"}})).unwrap();
        assert_eq!(result["basicAuth"], json!({"type": "basic"}));
    }

    #[test]
    fn test_http_bearer_becomes_header_api_key() {
        let result = convert(json!({"bearerAuth": {
            "type": "http",
            "scheme": "bearer",
            "bearerFormat": "JWT",
            "description": "Token"
        }}))
        .unwrap();
        assert_eq!(
            result["bearerAuth"],
            json!({"type": "apiKey", "description": "Token", "name": "Authorization", "in": "header"})
        );
    }

    #[test]
    fn test_oauth2_flow_names() {
        assert_eq!(swagger_flow_name("clientCredentials"), "application");
        assert_eq!(swagger_flow_name("authorizationCode"), "accessCode");
        assert_eq!(swagger_flow_name("implicit"), "implicit");
        assert_eq!(swagger_flow_name("password"), "password");
    }

    #[test]
    fn test_oauth2_uses_first_flow() {
        let result = convert(json!({"oauth": {
            "type": "oauth2",
            "flows": {
                "authorizationCode": {
                    "authorizationUrl": "https://auth.example.com/authorize",
                    "tokenUrl": "https://auth.example.com/token",
                    "scopes": {"read": "Read access"}
                },
                "implicit": {
                    "authorizationUrl": "https://auth.example.com/implicit",
                    "scopes": {}
                }
            }
        }}))
        .unwrap();

        assert_eq!(
            result["oauth"],
            json!({
                "type": "oauth2",
                "flow": "accessCode",
                "authorizationUrl": "https://auth.example.com/authorize",
                "tokenUrl": "https://auth.example.com/token",
                "scopes": {"read": "Read access"}
            })
        );
    }

    #[test]
    fn test_oauth2_client_credentials() {
        let result = convert(json!({"machine": {
            "type": "oauth2",
            "flows": {"clientCredentials": {"tokenUrl": "https://auth.example.com/token", "scopes": {}}}
        }}))
        .unwrap();

        assert_eq!(result["machine"]["flow"], "application");
        assert!(result["machine"].get("authorizationUrl").is_none());
        assert!(result["machine"].get("flows").is_none());
    }

    #[test]
    fn test_oauth2_without_flows_is_an_error() {
        for flows in [None, Some(json!({})), Some(json!("implicit"))] {
            let mut scheme = json!({"type": "oauth2"});
            if let Some(flows) = flows {
                scheme["flows"] = flows;
            }
            let err = convert(json!({"broken": scheme})).unwrap_err();
            match err {
                ConvertError::InvalidSecurityScheme { name, .. } => assert_eq!(name, "broken"),
                other => panic!("Expected InvalidSecurityScheme, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_other_schemes_pass_through() {
        let schemes = json!({
            "apiKey": {"type": "apiKey", "name": "X-Key", "in": "header"},
            "digest": {"type": "http", "scheme": "digest"},
            "oidc": {"type": "openIdConnect", "openIdConnectUrl": "https://example.com/.well-known"}
        });
        assert_eq!(convert(schemes.clone()).unwrap(), schemes);
    }
}
