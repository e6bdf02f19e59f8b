//! Static file serving module
//!
//! Resolves request paths against the document root and serves files,
//! index files and generated directory listings.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::listing::{self, ListingEntry};
use crate::http::path::{self, PathError};
use crate::http::{self, date, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve the file or directory named by the request path
pub async fn serve(ctx: &RequestContext, state: &AppState) -> Response<Full<Bytes>> {
    let segments = match path::request_segments(&ctx.path) {
        Ok(segments) => segments,
        Err(PathError::Malformed) => {
            return http::build_error_response(StatusCode::BAD_REQUEST, "Bad request path", ctx.is_head);
        }
        Err(PathError::OutsideRoot) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
            return not_found(ctx);
        }
    };

    let target: PathBuf = segments.iter().fold(state.root.clone(), |p, s| p.join(s));
    let (resolved, metadata) = match resolve_within_root(&target, &state.root).await {
        Ok(found) => found,
        Err(e) => return io_error_response(ctx, &e, "File not found"),
    };

    if metadata.is_dir() {
        return serve_directory(ctx, state, &resolved).await;
    }
    // A trailing slash names a directory, never a file
    if ctx.path.ends_with('/') {
        return not_found(ctx);
    }
    serve_file(ctx, &resolved, &metadata).await
}

/// Canonicalize `target` and make sure it did not escape `root` through a
/// symlink.
async fn resolve_within_root(target: &Path, root: &Path) -> io::Result<(PathBuf, Metadata)> {
    let canonical = fs::canonicalize(target).await?;
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            target.display(),
            canonical.display()
        ));
        return Err(io::Error::from(io::ErrorKind::NotFound));
    }
    let metadata = fs::metadata(&canonical).await?;
    Ok((canonical, metadata))
}

async fn serve_directory(
    ctx: &RequestContext,
    state: &AppState,
    dir: &Path,
) -> Response<Full<Bytes>> {
    // Relative links in the listing only work below a trailing slash
    if !ctx.path.ends_with('/') {
        let location = match &ctx.query {
            Some(q) => format!("{}/?{q}", ctx.path),
            None => format!("{}/", ctx.path),
        };
        return http::build_redirect_response(&location, ctx.is_head);
    }

    for index_file in &state.config.http.index_files {
        if let Ok((index_path, metadata)) = resolve_within_root(&dir.join(index_file), &state.root).await {
            if metadata.is_file() {
                return serve_file(ctx, &index_path, &metadata).await;
            }
        }
    }

    match read_listing(dir).await {
        Ok(mut entries) => {
            let display_path = String::from_utf8_lossy(&path::percent_decode(&ctx.path)).into_owned();
            let html = listing::render_listing(&display_path, &mut entries);
            http::build_html_response(html, ctx.is_head)
        }
        Err(e) => io_error_response(ctx, &e, "No permission to list directory"),
    }
}

async fn read_listing(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut read_dir = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let is_symlink = entry.file_type().await.is_ok_and(|t| t.is_symlink());
        // Follows symlinks, so a link to a directory lists as one
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }
    Ok(entries)
}

async fn serve_file(ctx: &RequestContext, file_path: &Path, metadata: &Metadata) -> Response<Full<Bytes>> {
    let last_modified = metadata.modified().ok();

    if let (Some(modified), Some(since)) = (last_modified, ctx.if_modified_since.as_deref()) {
        // If-None-Match takes precedence, and this server sends no ETags
        if !ctx.has_if_none_match && date::not_modified_since(modified, since) {
            return http::build_304_response(&date::format_http_date(modified));
        }
    }

    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return io_error_response(ctx, &e, "File not found");
        }
    };

    let last_modified = last_modified.map(date::format_http_date);
    http::build_file_response(
        Bytes::from(content),
        mime::content_type_for(file_path),
        last_modified.as_deref(),
        ctx.is_head,
    )
}

/// Map a filesystem error onto 403 or 404
fn io_error_response(ctx: &RequestContext, err: &io::Error, not_found_message: &str) -> Response<Full<Bytes>> {
    if err.kind() == io::ErrorKind::PermissionDenied {
        http::build_error_response(StatusCode::FORBIDDEN, "Permission denied", ctx.is_head)
    } else {
        http::build_error_response(StatusCode::NOT_FOUND, not_found_message, ctx.is_head)
    }
}

fn not_found(ctx: &RequestContext) -> Response<Full<Bytes>> {
    http::build_error_response(StatusCode::NOT_FOUND, "File not found", ctx.is_head)
}
