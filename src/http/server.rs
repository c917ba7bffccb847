//! Proxy listener.
//!
//! # Responsibilities
//! - Forward every request (method, full target, headers, body) upstream
//! - Buffer the upstream body and splice the reload snippet into HTML
//! - Relay status and headers with a corrected Content-Length
//! - Map any upstream failure to a bare 500

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, uri::PathAndQuery, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::inject::{inject, is_html, Snippet};
use crate::http::response::relay_response;
use crate::observability::metrics;

/// Failures while relaying a request. All of them surface as a 500.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to build upstream request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream body: {0}")]
    ReadBody(#[source] axum::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub client: Client<HttpConnector, Body>,
    /// `host:port` of the upstream server.
    pub upstream: String,
    pub snippet: Snippet,
    pub max_response_bytes: usize,
}

/// HTTP server for the reverse proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new proxy server with the given configuration.
    ///
    /// The reload snippet is rendered here, once.
    pub fn new(config: &RelayConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = ProxyState {
            client,
            upstream: config.upstream.authority(),
            snippet: Snippet::new(&config.notification.socket_url()),
            max_response_bytes: config.limits.max_response_bytes,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: ProxyState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Proxy server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

async fn proxy_handler(State(state): State<ProxyState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());

    tracing::debug!(method = %method, target = %target, "Proxying request");

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(method = %method, target = %target, error = %e, "Proxy request failed");
            e.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn forward(state: &ProxyState, request: Request<Body>) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let mut outbound = Request::builder()
        .method(parts.method)
        .uri(upstream_uri(&state.upstream, &parts.uri)?)
        .body(body)?;
    *outbound.headers_mut() = parts.headers;
    // The client derives Host from the upstream authority.
    outbound.headers_mut().remove(header::HOST);

    let response = state.client.request(outbound).await?;
    let (parts, body) = response.into_parts();

    let mut body = axum::body::to_bytes(Body::new(body), state.max_response_bytes)
        .await
        .map_err(ProxyError::ReadBody)?;

    if is_html(&parts.headers) {
        if let Some(rewritten) = inject(&body, &state.snippet) {
            metrics::record_injection();
            body = Bytes::from(rewritten);
        }
    }

    Ok(relay_response(parts, body))
}

/// Point the inbound request target at the upstream, keeping path and query.
fn upstream_uri(upstream: &str, inbound: &Uri) -> Result<Uri, axum::http::Error> {
    let path_and_query = inbound
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));

    Uri::builder()
        .scheme("http")
        .authority(upstream)
        .path_and_query(path_and_query)
        .build()
}
