//! Logger module
//!
//! Provides logging utilities for the file server:
//! - The startup announcement (stdout)
//! - Access logging in several formats
//! - Error and warning logging
//!
//! Everything except the startup line goes to stderr unless a log file is
//! configured.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => eprintln!("{message}"),
    }
}

/// Announce the bound port; this is the only line written to stdout
pub fn log_server_start(port: u16) {
    println!("Serving at http://localhost:{port} with CORS support");
}

pub fn log_shutdown(signal: &str) {
    write_error(&format!("[INFO] {signal} received, shutting down"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
