use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use error::StartupError;

fn main() -> ExitCode {
    let args = cli::Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &cli::Args) -> Result<(), StartupError> {
    let cfg = config::Config::load(args)?;
    logger::init(&cfg).map_err(StartupError::Log)?;

    // Build the Tokio runtime, sized by the workers setting when present
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), StartupError> {
    let addr = cfg.socket_addr().map_err(StartupError::Address)?;
    let root = cfg.server.root.clone();
    let state = Arc::new(
        config::AppState::new(cfg).map_err(|source| StartupError::Root { path: root, source })?,
    );

    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;
    let port = listener.local_addr().map_or(addr.port(), |a| a.port());
    logger::log_server_start(port);

    server::serve(listener, state, server::shutdown_signal()).await;
    Ok(())
}
