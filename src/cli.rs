//! Command-line interface
//!
//! Every flag is optional; anything left unset falls back to the config
//! file, the environment and finally the built-in defaults.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(
    name = "cors-file-server",
    version,
    about = "Serve a directory over HTTP with Access-Control-Allow-Origin: * on every response"
)]
pub struct Args {
    /// Port to listen on [default: 8000]
    pub port: Option<u16>,

    /// Address to bind to [default: 0.0.0.0]
    #[arg(short, long, value_name = "ADDRESS")]
    pub bind: Option<String>,

    /// Directory to serve [default: current directory]
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,
}
