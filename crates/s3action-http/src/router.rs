//! Request routing.
//!
//! `/health` lives at the root; everything else is mounted under the
//! configured API prefix (default `/v1/api`). A known path with the wrong
//! method yields `MethodNotAllowed`, an unknown path yields `NotFound`.

use std::fmt;

use http::Method;
use percent_encoding::percent_decode_str;
use s3action_model::error::ActionError;

/// An identified route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /health`
    Health,
    /// `GET {prefix}/docs`
    Docs,
    /// `POST {prefix}/semantic/action`
    SemanticAction,
    /// `POST {prefix}/objects`
    UploadObject,
    /// `GET {prefix}/objects/{key}`
    GetObject { key: String },
    /// `DELETE {prefix}/objects/{key}`
    DeleteObject { key: String },
    /// `GET {prefix}/buckets`
    ListBuckets,
    /// `POST {prefix}/buckets`
    CreateBucket,
    /// `GET {prefix}/state/operations`
    ListOperations,
    /// `GET {prefix}/state/operations/{id}`
    GetOperation { id: String },
    /// `GET {prefix}/state/stats`
    OperationStats,
}

impl Route {
    /// Short route name for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Docs => "Docs",
            Self::SemanticAction => "SemanticAction",
            Self::UploadObject => "UploadObject",
            Self::GetObject { .. } => "GetObject",
            Self::DeleteObject { .. } => "DeleteObject",
            Self::ListBuckets => "ListBuckets",
            Self::CreateBucket => "CreateBucket",
            Self::ListOperations => "ListOperations",
            Self::GetOperation { .. } => "GetOperation",
            Self::OperationStats => "OperationStats",
        }
    }

    /// Whether the route is guarded by the API key.
    ///
    /// Health, documentation, and operation-state routes stay open.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Self::Health
                | Self::Docs
                | Self::ListOperations
                | Self::GetOperation { .. }
                | Self::OperationStats
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of routing a request.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The identified route.
    pub route: Route,
    /// Decoded query parameters in request order.
    pub query_params: Vec<(String, String)>,
}

impl RoutingContext {
    /// First value of a query parameter, if present and non-empty.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query_params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// Resolve a method and URI to a route.
///
/// # Errors
///
/// `NotFound` for unknown paths, `MethodNotAllowed` for a known path with
/// an unsupported method.
pub fn resolve_route(
    method: &Method,
    uri: &http::Uri,
    api_prefix: &str,
) -> Result<RoutingContext, ActionError> {
    let path = uri.path();
    let route = match_path(method, path, api_prefix)?;
    let query_params = uri.query().map(parse_query_params).unwrap_or_default();
    Ok(RoutingContext {
        route,
        query_params,
    })
}

fn match_path(method: &Method, path: &str, api_prefix: &str) -> Result<Route, ActionError> {
    if path == "/health" {
        return allow(method, path, &[Method::GET], Route::Health);
    }

    let prefix = api_prefix.trim_end_matches('/');
    let Some(rest) = path.strip_prefix(prefix) else {
        return Err(ActionError::not_found(path));
    };
    if !rest.starts_with('/') {
        return Err(ActionError::not_found(path));
    }

    match rest {
        "/docs" => allow(method, path, &[Method::GET], Route::Docs),
        "/semantic/action" => allow(method, path, &[Method::POST], Route::SemanticAction),
        "/objects" => allow(method, path, &[Method::POST], Route::UploadObject),
        "/buckets" => match *method {
            Method::GET => Ok(Route::ListBuckets),
            Method::POST => Ok(Route::CreateBucket),
            _ => Err(ActionError::method_not_allowed(method, path)),
        },
        "/state/operations" => allow(method, path, &[Method::GET], Route::ListOperations),
        "/state/stats" => allow(method, path, &[Method::GET], Route::OperationStats),
        _ => {
            if let Some(raw_key) = rest.strip_prefix("/objects/").filter(|k| !k.is_empty()) {
                let key = decode_uri_component(raw_key);
                return match *method {
                    Method::GET => Ok(Route::GetObject { key }),
                    Method::DELETE => Ok(Route::DeleteObject { key }),
                    _ => Err(ActionError::method_not_allowed(method, path)),
                };
            }
            if let Some(raw_id) = rest
                .strip_prefix("/state/operations/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
            {
                let id = decode_uri_component(raw_id);
                return allow(method, path, &[Method::GET], Route::GetOperation { id });
            }
            Err(ActionError::not_found(path))
        }
    }
}

fn allow(method: &Method, path: &str, allowed: &[Method], route: Route) -> Result<Route, ActionError> {
    if allowed.contains(method) {
        Ok(route)
    } else {
        Err(ActionError::method_not_allowed(method, path))
    }
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into key-value pairs.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let pair = pair.replace('+', " ");
            if let Some(pos) = pair.find('=') {
                (
                    decode_uri_component(&pair[..pos]),
                    decode_uri_component(&pair[pos + 1..]),
                )
            } else {
                (decode_uri_component(&pair), String::new())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use s3action_model::error::ActionErrorCode;

    use super::*;

    const PREFIX: &str = "/v1/api";

    fn route(method: Method, uri: &str) -> Result<RoutingContext, ActionError> {
        let uri: http::Uri = uri.parse().unwrap();
        resolve_route(&method, &uri, PREFIX)
    }

    #[test]
    fn test_should_route_health_at_root() {
        let ctx = route(Method::GET, "/health").unwrap();
        assert_eq!(ctx.route, Route::Health);
        assert!(!ctx.route.requires_auth());
    }

    #[test]
    fn test_should_route_semantic_action() {
        let ctx = route(Method::POST, "/v1/api/semantic/action").unwrap();
        assert_eq!(ctx.route, Route::SemanticAction);
        assert!(ctx.route.requires_auth());
    }

    #[test]
    fn test_should_decode_nested_object_key() {
        let ctx = route(Method::GET, "/v1/api/objects/test/my%20file.txt?bucket=b1").unwrap();
        assert_eq!(
            ctx.route,
            Route::GetObject {
                key: "test/my file.txt".to_owned()
            }
        );
        assert_eq!(ctx.query_value("bucket"), Some("b1"));

        let ctx = route(Method::DELETE, "/v1/api/objects/a.txt").unwrap();
        assert_eq!(
            ctx.route,
            Route::DeleteObject {
                key: "a.txt".to_owned()
            }
        );
    }

    #[test]
    fn test_should_route_buckets_by_method() {
        assert_eq!(route(Method::GET, "/v1/api/buckets").unwrap().route, Route::ListBuckets);
        assert_eq!(route(Method::POST, "/v1/api/buckets").unwrap().route, Route::CreateBucket);
        let err = route(Method::DELETE, "/v1/api/buckets").unwrap_err();
        assert_eq!(err.code, ActionErrorCode::MethodNotAllowed);
    }

    #[test]
    fn test_should_route_state_endpoints() {
        assert_eq!(
            route(Method::GET, "/v1/api/state/operations").unwrap().route,
            Route::ListOperations
        );
        assert_eq!(
            route(Method::GET, "/v1/api/state/operations/abc").unwrap().route,
            Route::GetOperation {
                id: "abc".to_owned()
            }
        );
        assert_eq!(
            route(Method::GET, "/v1/api/state/stats").unwrap().route,
            Route::OperationStats
        );
    }

    #[test]
    fn test_should_reject_wrong_method() {
        let err = route(Method::GET, "/v1/api/semantic/action").unwrap_err();
        assert_eq!(err.code, ActionErrorCode::MethodNotAllowed);
        assert_eq!(err.status_code, http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_should_return_not_found_for_unknown_paths() {
        for uri in ["/", "/v1/apix/docs", "/v1/api", "/v1/api/unknown", "/v1/api/objects/"] {
            let err = route(Method::GET, uri).unwrap_err();
            assert_eq!(err.code, ActionErrorCode::NotFound, "{uri}");
        }
    }

    #[test]
    fn test_should_honor_custom_prefix() {
        let uri: http::Uri = "/api/docs".parse().unwrap();
        let ctx = resolve_route(&Method::GET, &uri, "/api/").unwrap();
        assert_eq!(ctx.route, Route::Docs);
    }

    #[test]
    fn test_should_parse_query_params() {
        let params = parse_query_params("bucket=my%2Dbucket&flag&&q=a+b");
        assert_eq!(
            params,
            vec![
                ("bucket".to_owned(), "my-bucket".to_owned()),
                ("flag".to_owned(), String::new()),
                ("q".to_owned(), "a b".to_owned()),
            ]
        );
    }
}
