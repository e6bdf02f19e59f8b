// Connection handling module
// Serves one accepted TCP connection on its own task
//
// Requests hyper cannot parse (bad request line, oversized headers) are
// answered by hyper itself with 400/431 before the service runs, so those
// responses carry no Access-Control-Allow-Origin header.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Hand an accepted connection to its own task.
///
/// Connections share nothing but the read-only state, so a slow client
/// never holds up another.
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    tokio::spawn(handle_connection(stream, peer_addr, Arc::clone(state)));
}

/// Serve HTTP/1.x requests on `stream` until the client closes it, keep-alive
/// ends, or the optional connection timeout fires.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);

    // HTTP/1.0 closes after each response unless the client asks otherwise;
    // hyper takes care of that per request.
    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive);

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    let timeout_secs = state.config.performance.connection_timeout;
    let result = if timeout_secs > 0 {
        if let Ok(result) = tokio::time::timeout(Duration::from_secs(timeout_secs), conn).await {
            result
        } else {
            logger::log_warning(&format!(
                "Connection from {peer_addr} timed out after {timeout_secs} seconds"
            ));
            return;
        }
    } else {
        conn.await
    };

    if let Err(err) = result {
        if err.is_parse() {
            logger::log_warning(&format!("Malformed request from {peer_addr}: {err}"));
        } else if !is_client_disconnect(&err) {
            logger::log_connection_error(&err);
        }
    }
}

/// The client went away mid-request or mid-response; nothing to report.
fn is_client_disconnect(err: &hyper::Error) -> bool {
    if err.is_incomplete_message() || err.is_canceled() || err.is_closed() || err.is_body_write_aborted() {
        return true;
    }
    std::error::Error::source(err)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|e| {
            matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            )
        })
}
