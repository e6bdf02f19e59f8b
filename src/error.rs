//! Startup errors
//!
//! Anything that goes wrong before the accept loop is running ends the
//! process with a non-zero exit status. Failures while serving a request
//! never reach this type: they become HTTP error responses.

use std::fmt;
use std::io;
use std::net::SocketAddr;

#[derive(Debug)]
pub enum StartupError {
    /// The configuration could not be loaded or deserialized
    Config(config::ConfigError),
    /// Host and port do not form a socket address
    Address(String),
    /// The document root is missing or not a directory
    Root { path: String, source: io::Error },
    /// The listening socket could not be bound, e.g. the port is in use
    Bind { addr: SocketAddr, source: io::Error },
    /// The Tokio runtime could not be built
    Runtime(io::Error),
    /// A log file could not be opened
    Log(io::Error),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "failed to load configuration: {err}"),
            Self::Address(msg) => f.write_str(msg),
            Self::Root { path, source } => write!(f, "cannot serve '{path}': {source}"),
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Runtime(err) => write!(f, "failed to start runtime: {err}"),
            Self::Log(err) => write!(f, "failed to open log file: {err}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Address(_) => None,
            Self::Root { source, .. } | Self::Bind { source, .. } => Some(source),
            Self::Runtime(err) | Self::Log(err) => Some(err),
        }
    }
}

impl From<config::ConfigError> for StartupError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_bind_error_display() {
        let err = StartupError::Bind {
            addr: "0.0.0.0:8000".parse().unwrap(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to bind 0.0.0.0:8000: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_address_error_has_no_source() {
        let err = StartupError::Address("Invalid address 'x:1'".to_string());
        assert_eq!(err.to_string(), "Invalid address 'x:1'");
        assert!(err.source().is_none());
    }
}
