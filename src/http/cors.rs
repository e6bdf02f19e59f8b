//! CORS header injection
//!
//! The file-serving handler knows nothing about CORS. Its responses pass
//! through [`with_cors`] on their way to hyper, so every status a handler
//! can produce leaves with `Access-Control-Allow-Origin: *`.

use hyper::header::{HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::Response;
use std::future::Future;

/// Await the wrapped handler, then finalize its headers
pub async fn with_cors<F, B>(handler: F, server_name: &str) -> Response<B>
where
    F: Future<Output = Response<B>>,
{
    let mut response = handler.await;
    finalize_headers(response.headers_mut(), server_name);
    response
}

/// Last mutation before headers are written: inject the CORS header and
/// fill in `Server` unless the handler already set one.
pub fn finalize_headers(headers: &mut HeaderMap, server_name: &str) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    if !headers.contains_key(SERVER) {
        if let Ok(value) = HeaderValue::from_str(server_name) {
            headers.insert(SERVER, value);
        }
    }
}
