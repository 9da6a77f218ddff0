//! Response serialization and error formatting.

use serde::Serialize;

use s3action_model::error::ActionError;

use crate::body::ActionResponseBody;
use crate::service::ActionHttpConfig;

/// Content type for every JSON response.
pub const CONTENT_TYPE: &str = "application/json";

/// Capabilities advertised by the docs route and the registry.
pub const SERVICE_CAPABILITIES: &[&str] = &[
    "s3-upload",
    "s3-download",
    "s3-delete",
    "s3-list",
    "semantic-actions",
];

/// Serialize an out-of-band error into a JSON body.
///
/// ```json
/// {"error": "Unsupported action type: UpdateAction", "code": "UnsupportedActionType"}
/// ```
#[must_use]
pub fn error_to_json(error: &ActionError) -> Vec<u8> {
    serde_json::json!({
        "error": error.message,
        "code": error.code.as_str(),
    })
    .to_string()
    .into_bytes()
}

/// Convert an `ActionError` into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &ActionError, request_id: &str) -> http::Response<ActionResponseBody> {
    json_response(error.status_code, error_to_json(error), request_id)
}

/// Build a response from JSON bytes.
#[must_use]
pub fn json_response(
    status: http::StatusCode,
    json: Vec<u8>,
    request_id: &str,
) -> http::Response<ActionResponseBody> {
    let mut response = http::Response::new(ActionResponseBody::from_json(json));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(CONTENT_TYPE),
    );
    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.insert("x-request-id", hv);
    }
    response
}

/// Serialize a value into a 200 response.
#[must_use]
pub fn serialize_response<T: Serialize>(value: &T, request_id: &str) -> http::Response<ActionResponseBody> {
    match serde_json::to_vec(value) {
        Ok(json) => json_response(http::StatusCode::OK, json, request_id),
        Err(e) => error_to_response(
            &ActionError::internal_error(format!("Failed to serialize response: {e}")),
            request_id,
        ),
    }
}

/// `GET /health`.
#[must_use]
pub fn health_response(config: &ActionHttpConfig, request_id: &str) -> http::Response<ActionResponseBody> {
    serialize_response(
        &serde_json::json!({
            "status": "healthy",
            "service": config.service_name,
            "version": config.version,
        }),
        request_id,
    )
}

/// `GET {prefix}/docs`.
#[must_use]
pub fn docs_response(config: &ActionHttpConfig, request_id: &str) -> http::Response<ActionResponseBody> {
    let prefix = config.api_prefix.trim_end_matches('/');
    let endpoints = [
        ("GET", "/health".to_owned(), "Service health"),
        ("GET", format!("{prefix}/docs"), "Service documentation"),
        ("POST", format!("{prefix}/semantic/action"), "Execute a Schema.org action"),
        ("POST", format!("{prefix}/objects"), "Upload base64 content"),
        ("GET", format!("{prefix}/objects/{{key}}"), "Find an object by key"),
        ("DELETE", format!("{prefix}/objects/{{key}}"), "Delete an object"),
        ("GET", format!("{prefix}/buckets"), "List buckets"),
        ("POST", format!("{prefix}/buckets"), "Create a bucket (not supported)"),
        ("GET", format!("{prefix}/state/operations"), "Recent operations"),
        ("GET", format!("{prefix}/state/operations/{{id}}"), "One operation"),
        ("GET", format!("{prefix}/state/stats"), "Operation counts"),
    ];
    let endpoints: Vec<_> = endpoints
        .iter()
        .map(|(method, path, description)| {
            serde_json::json!({"method": method, "path": path, "description": description})
        })
        .collect();

    serialize_response(
        &serde_json::json!({
            "id": config.service_id,
            "name": config.service_name,
            "description": config.description,
            "version": config.version,
            "capabilities": SERVICE_CAPABILITIES,
            "actionTypes": ["CreateAction", "DownloadAction", "DeleteAction", "SearchAction"],
            "endpoints": endpoints,
        }),
        request_id,
    )
}

/// CORS preflight answer.
#[must_use]
pub fn cors_preflight_response() -> http::Response<ActionResponseBody> {
    let mut response = http::Response::new(ActionResponseBody::empty());
    *response.status_mut() = http::StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        "access-control-allow-methods",
        http::HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        http::HeaderValue::from_static("Authorization, Content-Type, X-API-Key, X-Request-Id, traceparent"),
    );
    headers.insert(
        "access-control-max-age",
        http::HeaderValue::from_static("86400"),
    );
    response
}
