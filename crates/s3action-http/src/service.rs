//! Action HTTP service implementing the hyper `Service` trait.
//!
//! Request pipeline:
//!
//! 1. CORS preflight (`OPTIONS`)
//! 2. Routing
//! 3. API-key check on action and REST routes
//! 4. Health, docs, and state routes answered directly
//! 5. Envelope construction (JSON-LD body or REST adapter)
//! 6. Dispatch to the [`ActionHandler`] with operation tracking
//! 7. Common response headers (`x-request-id`, `server`, CORS)

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use tracing::{Instrument, debug, info, warn};

use s3action_model::action::{ActionOutcome, SemanticAction};
use s3action_model::error::{ActionError, ActionErrorCode};
use s3action_model::parse::parse_action;
use s3action_model::types::BucketDescriptor;

use crate::auth::verify_api_key;
use crate::body::ActionResponseBody;
use crate::dispatch::{ActionHandler, dispatch_action};
use crate::response::{
    CONTENT_TYPE, cors_preflight_response, docs_response, error_to_response, health_response,
    serialize_response,
};
use crate::rest;
use crate::router::{Route, resolve_route};
use crate::state::{NoopTracker, OperationTracker};

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const UNSETTLED_MESSAGE: &str = "Action was not executed";

/// Configuration for the action HTTP service.
#[derive(Clone)]
pub struct ActionHttpConfig {
    /// Prefix under which every route except `/health` is mounted.
    pub api_prefix: String,
    /// Static API key; `None` leaves the service open.
    pub api_key: Option<String>,
    /// Service id reported by the docs route.
    pub service_id: String,
    /// Human-readable service name.
    pub service_name: String,
    /// Service description.
    pub description: String,
    /// Service version.
    pub version: String,
    /// Target used by the REST routes.
    pub default_target: Option<BucketDescriptor>,
    /// Operation tracker backing the state routes.
    pub tracker: Arc<dyn OperationTracker>,
}

impl std::fmt::Debug for ActionHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionHttpConfig")
            .field("api_prefix", &self.api_prefix)
            .field("api_key", &self.api_key.as_ref().map(|_| "..."))
            .field("service_id", &self.service_id)
            .field("service_name", &self.service_name)
            .field("version", &self.version)
            .field(
                "default_target",
                &self.default_target.as_ref().map(BucketDescriptor::redacted),
            )
            .field("tracker", &"...")
            .finish_non_exhaustive()
    }
}

impl Default for ActionHttpConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/v1/api".to_owned(),
            api_key: None,
            service_id: "s3action".to_owned(),
            service_name: "S3 Semantic Action Service".to_owned(),
            description: "Schema.org JSON-LD actions over S3-compatible object storage".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            default_target: None,
            tracker: Arc::new(NoopTracker),
        }
    }
}

/// Hyper `Service` implementation for the action service.
///
/// Wraps an [`ActionHandler`] and routes incoming HTTP requests to it.
#[derive(Debug)]
pub struct ActionHttpService<H: ActionHandler> {
    handler: Arc<H>,
    config: Arc<ActionHttpConfig>,
}

impl<H: ActionHandler> ActionHttpService<H> {
    /// Create a new `ActionHttpService`.
    pub fn new(handler: Arc<H>, config: ActionHttpConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }

    /// Process one request through the full pipeline.
    ///
    /// Generic over the body so the pipeline can be driven without a socket.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<ActionResponseBody>
    where
        B: http_body::Body<Data = Bytes>,
        B::Error: Display,
    {
        let request_id = request_id_from(req.headers());
        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
            traceparent = tracing::field::Empty,
        );
        if let Some(traceparent) = req
            .headers()
            .get("traceparent")
            .and_then(|v| v.to_str().ok())
        {
            span.record("traceparent", traceparent);
        }

        let response = process_request(req, self.handler.as_ref(), &self.config, &request_id)
            .instrument(span)
            .await;
        add_common_headers(response, &request_id)
    }
}

impl<H: ActionHandler> Clone for ActionHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: ActionHandler> hyper::service::Service<http::Request<Incoming>> for ActionHttpService<H> {
    type Response = http::Response<ActionResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Reuse the caller's request id when it is usable, else mint one.
fn request_id_from(headers: &http::HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), str::to_owned)
}

async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    config: &ActionHttpConfig,
    request_id: &str,
) -> http::Response<ActionResponseBody>
where
    H: ActionHandler,
    B: http_body::Body<Data = Bytes>,
    B::Error: Display,
{
    let (parts, body) = req.into_parts();

    // 1. CORS preflight.
    if parts.method == http::Method::OPTIONS {
        return cors_preflight_response();
    }

    // 2. Route.
    let ctx = match resolve_route(&parts.method, &parts.uri, &config.api_prefix) {
        Ok(ctx) => ctx,
        Err(err) => {
            debug!(error = %err, "failed to route request");
            return error_to_response(&err, request_id);
        }
    };

    // 3. Authenticate (if enabled).
    if ctx.route.requires_auth() {
        if let Err(err) = verify_api_key(&parts.headers, config.api_key.as_deref()) {
            warn!(route = %ctx.route, "rejected request without a valid API key");
            return error_to_response(&err, request_id);
        }
    }

    // 4. Routes answered without the handler, 5. envelope construction.
    let default_target = config.default_target.as_ref();
    let action = match &ctx.route {
        Route::Health => return health_response(config, request_id),
        Route::Docs => return docs_response(config, request_id),
        Route::ListOperations => return serialize_response(&config.tracker.recent(), request_id),
        Route::OperationStats => return serialize_response(&config.tracker.stats(), request_id),
        Route::GetOperation { id } => {
            return match config.tracker.get(id) {
                Some(record) => serialize_response(&record, request_id),
                None => error_to_response(
                    &ActionError::with_message(
                        ActionErrorCode::NotFound,
                        format!("Operation {id} not found"),
                    ),
                    request_id,
                ),
            };
        }
        Route::SemanticAction => collect_body(body)
            .await
            .and_then(|bytes| parse_action(&bytes)),
        Route::UploadObject => collect_body(body)
            .await
            .and_then(|bytes| rest::upload_object_action(&bytes, default_target)),
        Route::CreateBucket => collect_body(body)
            .await
            .and_then(|bytes| rest::create_bucket_action(&bytes, default_target)),
        Route::GetObject { key } => {
            rest::get_object_action(key, ctx.query_value("bucket"), default_target)
        }
        Route::DeleteObject { key } => Ok(rest::delete_object_action(
            key,
            ctx.query_value("bucket"),
            default_target,
        )),
        Route::ListBuckets => Ok(rest::list_buckets_action(default_target)),
    };

    let action = match action {
        Ok(action) => action,
        Err(err) => {
            warn!(route = %ctx.route, code = %err.code, error = %err.message, "rejected request");
            return error_to_response(&err, request_id);
        }
    };

    // 6. Dispatch.
    run_action(handler, config, action, request_id).await
}

/// Dispatch an envelope with tracking and answer 200 with the settled envelope.
async fn run_action<H: ActionHandler>(
    handler: &H,
    config: &ActionHttpConfig,
    action: SemanticAction,
    request_id: &str,
) -> http::Response<ActionResponseBody> {
    config.tracker.begin(request_id, &action);
    let mut action = dispatch_action(handler, action).await;
    if matches!(action.outcome(), ActionOutcome::Pending) {
        warn!(action_type = %action.action_type, "handler returned an unsettled action");
        action.settle(Err(ActionError::internal_error(UNSETTLED_MESSAGE)), Utc::now());
        config.tracker.finish(request_id, &action);
        return error_to_response(&ActionError::internal_error(UNSETTLED_MESSAGE), request_id);
    }
    config.tracker.finish(request_id, &action);
    info!(
        action_type = %action.action_type,
        status = %action.status(),
        "action settled"
    );
    serialize_response(&action, request_id)
}

/// Collect the body into a single `Bytes` buffer.
async fn collect_body<B>(body: B) -> Result<Bytes, ActionError>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Display,
{
    body.collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| ActionError::internal_error(format!("Failed to read request body: {e}")))
}

/// Add common response headers to every response.
fn add_common_headers(
    mut response: http::Response<ActionResponseBody>,
    request_id: &str,
) -> http::Response<ActionResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry(http::header::CONTENT_TYPE)
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static("s3action"));

    // CORS headers.
    headers.insert(
        "access-control-allow-origin",
        http::HeaderValue::from_static("*"),
    );

    response
}
