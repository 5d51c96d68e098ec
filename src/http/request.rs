//! Request construction
//!
//! Turns a scenario into a fully specified request: absolute URL with
//! encoded path segments and query pairs, merged headers, JSON body.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use super::method::HttpMethod;
use crate::common::{interpolate, Error, Result};
use crate::testing::Scenario;

/// A request ready to be handed to a transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub scenario_id: u32,
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl PreparedRequest {
    /// Build the request for `scenario`
    ///
    /// `{{name}}` placeholders anywhere in the path, parameters, headers,
    /// query and body strings resolve against `variables`; `{param}`
    /// placeholders in the path resolve against the scenario's
    /// `path_params`. `token`, when given, becomes the bearer token.
    pub fn build(
        scenario: &Scenario,
        base: &Url,
        variables: &HashMap<String, String>,
        token: Option<&str>,
    ) -> Result<Self> {
        let id = scenario.id;
        let vars = |text: &str| -> Result<String> {
            interpolate(text, |name| variables.get(name).map(String::as_str))
                .map_err(|name| Error::undefined_variable(id, &name))
        };

        let mut path_params = HashMap::new();
        for (name, value) in &scenario.path_params {
            path_params.insert(name.as_str(), vars(value)?);
        }

        let mut segments = Vec::new();
        for raw in scenario.path.split('/').filter(|s| !s.is_empty()) {
            segments.push(expand_segment(id, raw, variables, &path_params)?);
        }

        let mut url = base.clone();
        if !segments.is_empty() {
            let mut path_mut = url
                .path_segments_mut()
                .map_err(|_| Error::invalid_request(id, "base URL cannot have a path"))?;
            path_mut.pop_if_empty();
            for segment in &segments {
                path_mut.push(segment);
            }
        }

        if !scenario.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &scenario.query {
                query_pairs.append_pair(&vars(key)?, &vars(value)?);
            }
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &scenario.headers {
            let name = HeaderName::from_bytes(key.trim().as_bytes())
                .map_err(|e| Error::invalid_request(id, format!("invalid header key `{key}`: {e}")))?;
            let value = HeaderValue::from_str(vars(value)?.trim()).map_err(|e| {
                Error::invalid_request(id, format!("invalid value for header `{key}`: {e}"))
            })?;
            headers.insert(name, value);
        }

        let body = match &scenario.body {
            Some(body) => {
                let body = interpolate_json(body, &vars)?;
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Some(serde_json::to_string(&body)?)
            }
            None => None,
        };

        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|e| Error::invalid_request(id, format!("invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            scenario_id: id,
            method: scenario.method,
            url,
            headers,
            body,
        })
    }
}

/// Replace `{{var}}` and `{param}` placeholders within a single path segment
///
/// Substituted values are never scanned again, so a value containing `/`
/// or braces stays inside this segment and is percent-encoded with it.
fn expand_segment(
    id: u32,
    segment: &str,
    variables: &HashMap<String, String>,
    params: &HashMap<&str, String>,
) -> Result<String> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(start) = rest.find('{') {
        let is_variable = rest[start..].starts_with("{{");
        let (open, close) = if is_variable { (2, "}}") } else { (1, "}") };
        let inner = &rest[start + open..];
        let Some(len) = inner.find(close) else {
            break;
        };
        let name = inner[..len].trim();
        let value = if is_variable {
            variables
                .get(name)
                .ok_or_else(|| Error::undefined_variable(id, name))?
        } else {
            params
                .get(name)
                .ok_or_else(|| Error::undefined_path_param(id, name))?
        };
        out.push_str(&rest[..start]);
        out.push_str(value);
        rest = &inner[len + close.len()..];
    }

    out.push_str(rest);
    Ok(out)
}

fn interpolate_json<F>(value: &Value, vars: &F) -> Result<Value>
where
    F: Fn(&str) -> Result<String>,
{
    Ok(match value {
        Value::String(s) => Value::String(vars(s)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| interpolate_json(item, vars))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), interpolate_json(item, vars)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestSuite;

    fn scenario(yaml: &str) -> Scenario {
        let suite = format!("name: t\nscenarios:\n  - {}\n", yaml.trim().replace('\n', "\n    "));
        TestSuite::from_yaml_str(&suite).unwrap().scenarios.remove(0)
    }

    fn base() -> Url {
        Url::parse("https://chat.example.com").unwrap()
    }

    fn vars() -> HashMap<String, String> {
        [
            ("email".to_string(), "qa-1@x.com".to_string()),
            ("org".to_string(), "orgId123".to_string()),
        ]
        .into()
    }

    #[test]
    fn test_root_path() {
        let s = scenario("{ id: 1, name: health, method: GET, path: /, expect: { status: 200 } }");
        let req = PreparedRequest::build(&s, &base(), &vars(), None).unwrap();
        assert_eq!(req.url.as_str(), "https://chat.example.com/");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_path_params_are_substituted_and_encoded() {
        let s = scenario(
            r#"
id: 13
name: channel_detail
method: GET
path: /channel/{channelId}/org/{orgId}
path_params: { channelId: "id 1/2", orgId: "{{org}}" }
expect: { status: 200 }
"#,
        );
        let req = PreparedRequest::build(&s, &base(), &vars(), None).unwrap();
        assert_eq!(
            req.url.as_str(),
            "https://chat.example.com/channel/id%201%2F2/org/orgId123"
        );
    }

    #[test]
    fn test_variable_in_path_stays_one_segment() {
        let mut vars = vars();
        vars.insert("cid".to_string(), "a/b?c".to_string());
        vars.insert("raw".to_string(), "{orgId}".to_string());
        let s = scenario(
            r#"
id: 13
name: channel_detail
method: GET
path: "/channel/{{cid}}/org/{{raw}}"
path_params: { orgId: unused }
expect: { status: 200 }
"#,
        );
        let req = PreparedRequest::build(&s, &base(), &vars, None).unwrap();
        assert_eq!(
            req.url.as_str(),
            "https://chat.example.com/channel/a%2Fb%3Fc/org/%7BorgId%7D"
        );
        assert_eq!(req.url.path_segments().unwrap().count(), 4);
    }

    #[test]
    fn test_base_path_is_preserved() {
        let s = scenario("{ id: 1, name: orgs, method: GET, path: /organizations, expect: { status: 200 } }");
        let base = Url::parse("http://localhost:8080/api/").unwrap();
        let req = PreparedRequest::build(&s, &base, &vars(), None).unwrap();
        assert_eq!(req.url.as_str(), "http://localhost:8080/api/organizations");
    }

    #[test]
    fn test_query_is_encoded() {
        let s = scenario(
            r#"
id: 9
name: replies
method: GET
path: /chat/replies
query: { messageId: "id 123&x" }
expect: { status: 200 }
"#,
        );
        let req = PreparedRequest::build(&s, &base(), &vars(), None).unwrap();
        assert_eq!(
            req.url.as_str(),
            "https://chat.example.com/chat/replies?messageId=id+123%26x"
        );
    }

    #[test]
    fn test_body_sets_content_type_and_interpolates() {
        let s = scenario(
            r#"
id: 2
name: signup
method: POST
path: /auth/signup
body: { email: "{{email}}", password: "pw", tags: ["{{org}}", 3] }
expect: { status: 201 }
"#,
        );
        let req = PreparedRequest::build(&s, &base(), &vars(), None).unwrap();
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "qa-1@x.com");
        assert_eq!(body["tags"][0], "orgId123");
        assert_eq!(body["tags"][1], 3);
    }

    #[test]
    fn test_explicit_content_type_is_kept() {
        let s = scenario(
            r#"
id: 2
name: signup
method: POST
path: /auth/signup
headers: { Content-Type: "application/vnd.chat+json" }
body: { email: "a@x.com" }
expect: { status: 201 }
"#,
        );
        let req = PreparedRequest::build(&s, &base(), &vars(), None).unwrap();
        assert_eq!(req.headers[CONTENT_TYPE], "application/vnd.chat+json");
    }

    #[test]
    fn test_bearer_token_header() {
        let s = scenario("{ id: 8, name: messages, method: GET, path: /chat/messages, auth: a, expect: { status: 200 } }");
        let req = PreparedRequest::build(&s, &base(), &vars(), Some("tok")).unwrap();
        assert_eq!(req.headers[AUTHORIZATION], "Bearer tok");
    }

    #[test]
    fn test_undefined_placeholders_are_errors() {
        let s = scenario(r#"{ id: 4, name: x, method: GET, path: "/org/{orgId}", expect: { status: 200 } }"#);
        let err = PreparedRequest::build(&s, &base(), &vars(), None).unwrap_err();
        assert!(matches!(err, Error::UndefinedPlaceholder { id: 4, kind: "path parameter", .. }));

        let s = scenario(r#"{ id: 5, name: y, method: GET, path: "/{{nope}}", expect: { status: 200 } }"#);
        let err = PreparedRequest::build(&s, &base(), &vars(), None).unwrap_err();
        assert!(matches!(err, Error::UndefinedPlaceholder { id: 5, kind: "variable", .. }));
    }
}
