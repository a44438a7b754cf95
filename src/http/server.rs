//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router: one any-method catch-all handler
//! - Wire up middleware (tracing, unconditional CORS header)
//! - Build the dispatch view of each request (decoded path, query or
//!   body fields, lowercased headers)
//! - Apply the matched rule's delay without blocking other requests
//! - Render match / not-found / internal-error responses

use axum::{
    body::Body,
    extract::State,
    http::{header, request::Parts, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::registry::{SharedRegistry, StubRegistry};
use crate::routing::{dispatch, Outcome, RequestView};

/// Largest request body the handler will buffer.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
}

/// HTTP front end for the stub engine.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new server over the shared rule registry.
    pub fn new(registry: SharedRegistry) -> Self {
        let state = AppState { registry };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(stub_handler))
            .route("/", any(stub_handler))
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on the given listener until ctrl-c or a shutdown
    /// broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: axum_server::tls_rustls::RustlsConfig,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, tls)
            .serve(self.router.into_make_service())
            .await
    }
}

/// Error raised while turning a raw request into a dispatch view.
///
/// These never escape the handler; they all render as the 500 response.
#[derive(Debug, Error)]
enum RequestError {
    #[error("failed to read request body: {0}")]
    Body(String),

    #[error("malformed request body: {0}")]
    BodyParse(#[from] serde_json::Error),

    #[error("request path is not valid UTF-8 after decoding")]
    Path,
}

/// The single catch-all handler: every method, every path.
async fn stub_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let snapshot = state.registry.snapshot();
    match handle_request(&snapshot, request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(error = %error, "Request handling failed");
            server_error()
        }
    }
}

async fn handle_request(
    registry: &StubRegistry,
    request: Request<Body>,
) -> Result<Response, RequestError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| RequestError::Body(e.to_string()))?;

    let view = request_view(&parts, &bytes)?;
    tracing::debug!(
        method = %view.method,
        path = %view.path,
        queries = %view.queries,
        "Dispatching request"
    );

    match dispatch(registry, &view) {
        Outcome::Matched {
            status,
            body,
            lag_sec,
        } => {
            if lag_sec > 0 {
                // Suspends only this request; dropped with the
                // connection if the client goes away first.
                tokio::time::sleep(Duration::from_secs(lag_sec)).await;
            }
            Ok(matched_response(status, &body))
        }
        Outcome::NotFound => Ok(not_found()),
    }
}

/// Build the dispatch view: decoded path, the queries axis (query string
/// for GET, parsed body for everything else) and the header object.
fn request_view(parts: &Parts, body: &[u8]) -> Result<RequestView, RequestError> {
    let path = urlencoding::decode(parts.uri.path())
        .map_err(|_| RequestError::Path)?
        .into_owned();

    let queries = if parts.method == Method::GET {
        parse_query(parts.uri.query())
    } else {
        parse_body(parts.headers.get(header::CONTENT_TYPE), body)?
    };

    let mut headers = Map::new();
    for (name, value) in &parts.headers {
        headers.insert(
            name.as_str().to_string(),
            Value::String(value.to_str().unwrap_or("").to_string()),
        );
    }

    Ok(RequestView {
        method: parts.method.as_str().to_string(),
        path,
        queries,
        headers: Value::Object(headers),
    })
}

/// Parse a query string into a JSON object of strings. Repeated keys
/// keep the last value.
fn parse_query(query: Option<&str>) -> Value {
    let mut fields = Map::new();
    for pair in query.unwrap_or("").split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        };
        fields.insert(
            decode_component(key),
            Value::String(decode_component(value)),
        );
    }
    Value::Object(fields)
}

fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(plus_decoded)
}

/// Parse a non-GET body into the queries axis. JSON bodies keep their
/// structure; urlencoded forms become an object of strings; anything
/// else carries no structured fields.
fn parse_body(content_type: Option<&HeaderValue>, body: &[u8]) -> Result<Value, RequestError> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let content_type = content_type.and_then(|v| v.to_str().ok()).unwrap_or("");
    if content_type.starts_with("application/json") {
        Ok(serde_json::from_slice(body)?)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let text = std::str::from_utf8(body)
            .map_err(|_| RequestError::Body("request body is not valid UTF-8".to_string()))?;
        Ok(parse_query(Some(text)))
    } else {
        Ok(Value::Object(Map::new()))
    }
}

fn matched_response(status: u16, body: &Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let payload = serde_json::to_string(body).unwrap_or_else(|_| "null".to_string());
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        )],
        payload,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Server Error!").into_response()
}
