//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to
//! the static file handler, CORS injection and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Raw path, still percent-encoded
    pub path: String,
    pub query: Option<String>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub has_if_none_match: bool,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            is_head: req.method() == Method::HEAD,
            if_modified_since: headers
                .get(IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
            has_if_none_match: headers.contains_key(IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Only the extracted context moves into the returned future; the request
/// body is never read.
pub fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> impl Future<Output = Result<Response<Full<Bytes>>, Infallible>> {
    let ctx = RequestContext::from_request(&req);
    let log_entry = state
        .config
        .logging
        .access_log
        .then(|| access_log_entry(&req, peer_addr));

    async move {
        let started = Instant::now();
        let response = http::with_cors(
            route_request(&ctx, &state),
            &state.config.http.server_name,
        )
        .await;

        if let Some(mut entry) = log_entry {
            entry.status = response.status().as_u16();
            entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
            entry.request_time_us =
                u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            logger::log_access(&entry, &state.config.logging.access_log_format);
        }

        Ok(response)
    }
}

/// Route by method; only `GET` and `HEAD` reach the filesystem
async fn route_request(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    match ctx.method {
        Method::GET | Method::HEAD => static_files::serve(ctx, state).await,
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", ctx.method));
            http::build_405_response()
        }
    }
}

fn access_log_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_string(req, REFERER);
    entry.user_agent = header_string(req, USER_AGENT);
    entry
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use crate::config::Config;
    use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW};
    use hyper::StatusCode;

    fn state_for(root: &std::path::Path) -> Arc<AppState> {
        let args = Args {
            directory: Some(root.to_path_buf()),
            ..Args::default()
        };
        let mut cfg = Config::load_isolated(&args);
        cfg.logging.access_log = false;
        Arc::new(AppState::new(cfg).unwrap())
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let state = state_for(dir.path());

        let response = handle_request(request(Method::GET, "/a.txt"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()["content-length"], "5");
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let response = handle_request(request(Method::DELETE, "/a.txt"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD, OPTIONS");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let response = handle_request(request(Method::OPTIONS, "/anything"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/a%20b.txt?x=1")
            .header("If-Modified-Since", "Sun, 06 Nov 1994 08:49:37 GMT")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert!(ctx.is_head);
        assert_eq!(ctx.path, "/a%20b.txt");
        assert_eq!(ctx.query.as_deref(), Some("x=1"));
        assert!(ctx.if_modified_since.is_some());
        assert!(!ctx.has_if_none_match);
    }

    #[test]
    fn test_access_log_entry() {
        let req = Request::builder()
            .uri("/x?y=1")
            .version(Version::HTTP_10)
            .header("User-Agent", "curl/8")
            .body(())
            .unwrap();
        let entry = access_log_entry(&req, peer());
        assert_eq!(entry.remote_addr, "127.0.0.1");
        assert_eq!(entry.http_version, "1.0");
        assert_eq!(entry.query.as_deref(), Some("y=1"));
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8"));
    }
}
