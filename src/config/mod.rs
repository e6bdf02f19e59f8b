// Configuration module entry point
// Layers defaults, an optional config file, environment variables and CLI flags

mod state;
mod types;

use std::net::SocketAddr;

use crate::cli::Args;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Config file looked up (with any supported extension) when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "cors-server";

const DEFAULT_SERVER_NAME: &str = concat!("cors-file-server/", env!("CARGO_PKG_VERSION"));

impl Config {
    /// Load configuration, command-line flags taking precedence over
    /// environment variables (`CORS_SERVER__PORT`, ...) and the config file.
    pub fn load(args: &Args) -> Result<Self, config::ConfigError> {
        Self::load_from(args, DEFAULT_CONFIG_FILE, None)
    }

    /// Same layering as [`Config::load`] with no default file and an empty
    /// environment, so the result depends on `args` alone.
    #[cfg(test)]
    pub fn load_isolated(args: &Args) -> Self {
        Self::load_from(args, "/nonexistent/cors-server", Some(config::Map::new())).unwrap()
    }

    /// `env` replaces the process environment when given.
    fn load_from(
        args: &Args,
        default_file: &str,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let config_path = args.config.as_deref().unwrap_or(default_file);

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.root", ".")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 0)?
            .set_default("http.server_name", DEFAULT_SERVER_NAME)?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            // An explicitly requested config file must exist
            .add_source(config::File::with_name(config_path).required(args.config.is_some()))
            .add_source(
                config::Environment::with_prefix("CORS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("server.port", args.port.map(i64::from))?
            .set_override_option("server.host", args.bind.clone())?
            .set_override_option(
                "server.root",
                args.directory
                    .as_ref()
                    .map(|dir| dir.to_string_lossy().into_owned()),
            )?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.host.trim_start_matches('[').trim_end_matches(']');
        let literal = if host.contains(':') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        literal
            .parse()
            .map_err(|e| format!("Invalid address '{literal}': {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::load_isolated(&Args::default());
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.root, ".");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "common");
        assert!(cfg.performance.keep_alive);
        assert_eq!(cfg.performance.connection_timeout, 0);
        assert_eq!(cfg.http.index_files, vec!["index.html", "index.htm"]);
        assert!(cfg.http.server_name.starts_with("cors-file-server/"));
    }

    #[test]
    fn test_cli_overrides() {
        let args = Args {
            port: Some(9123),
            bind: Some("127.0.0.1".to_string()),
            directory: Some("/tmp".into()),
            config: None,
        };
        let cfg = Config::load_isolated(&args);
        assert_eq!(cfg.server.port, 9123);
        assert_eq!(cfg.server.root, "/tmp");
        assert_eq!(
            cfg.socket_addr().unwrap(),
            "127.0.0.1:9123".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_config_file_then_cli() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 8111\nhost = \"127.0.0.1\"\n\n[logging]\naccess_log = false"
        )
        .unwrap();

        let mut args = Args {
            config: Some(file.path().to_string_lossy().into_owned()),
            ..Args::default()
        };
        let cfg = Config::load_isolated(&args);
        assert_eq!(cfg.server.port, 8111);
        assert!(!cfg.logging.access_log);

        args.port = Some(8222);
        let cfg = Config::load_isolated(&args);
        assert_eq!(cfg.server.port, 8222);
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_env_between_file_and_cli() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = 8111").unwrap();
        let env: config::Map<String, String> = [
            ("CORS_SERVER__PORT".to_string(), "9001".to_string()),
            ("CORS_LOGGING__ACCESS_LOG".to_string(), "false".to_string()),
        ]
        .into_iter()
        .collect();

        let mut args = Args {
            config: Some(file.path().to_string_lossy().into_owned()),
            ..Args::default()
        };
        let cfg = Config::load_from(&args, DEFAULT_CONFIG_FILE, Some(env.clone())).unwrap();
        assert_eq!(cfg.server.port, 9001);
        assert!(!cfg.logging.access_log);

        args.port = Some(8222);
        let cfg = Config::load_from(&args, DEFAULT_CONFIG_FILE, Some(env)).unwrap();
        assert_eq!(cfg.server.port, 8222);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let args = Args {
            config: Some("/nonexistent/cors-server.toml".to_string()),
            ..Args::default()
        };
        assert!(Config::load(&args).is_err());
    }

    #[test]
    fn test_ipv6_socket_addr() {
        let mut cfg = Config::load_isolated(&Args::default());
        cfg.server.host = "::1".to_string();
        cfg.server.port = 8000;
        assert_eq!(
            cfg.socket_addr().unwrap(),
            "[::1]:8000".parse::<SocketAddr>().unwrap()
        );
        cfg.server.host = "not an address".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
