// Application state module
// Holds the loaded configuration and the resolved document root

use std::io;
use std::path::PathBuf;

use super::types::Config;

/// Application state, shared read-only by every connection task
pub struct AppState {
    pub config: Config,
    /// Canonical document root; every served path must stay below it
    pub root: PathBuf,
}

impl AppState {
    pub fn new(config: Config) -> io::Result<Self> {
        let root = std::fs::canonicalize(&config.server.root)?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is not a directory", root.display()),
            ));
        }
        Ok(Self { config, root })
    }
}
