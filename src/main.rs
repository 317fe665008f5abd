//! minircd - a minimal IRC daemon.
//!
//! A TCP listener, a framed line protocol, a per-session registration
//! state machine with asynchronous reverse-DNS, and a pluggable,
//! hot-reloadable command registry.

mod config;
mod error;
mod handlers;
mod network;
mod replies;
mod resolver;
mod state;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::resolver::{DnsResolver, NoResolver, Resolver};
use crate::state::ServerState;

const USAGE: &str = "usage: minircd [-c <config>] [-b|--bind <addr:port>] [--debug] [-v|--version]";

#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<String>,
    bind: Option<String>,
    debug: bool,
}

/// Hand-rolled flag parsing: `-b/--bind`, `--debug`, `-v/--version`, and
/// an optional config path (bare or behind `-c/--config`).
fn parse_args() -> CliArgs {
    let mut cli = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-v" | "--version" => {
                println!("minircd {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-b" | "--bind" => match args.next() {
                Some(bind) => cli.bind = Some(bind),
                None => {
                    eprintln!("missing value after {}\n{}", arg, USAGE);
                    std::process::exit(2);
                }
            },
            "--debug" => cli.debug = true,
            "-c" | "--config" => match args.next() {
                Some(path) => cli.config_path = Some(path),
                None => {
                    eprintln!("missing path after {}\n{}", arg, USAGE);
                    std::process::exit(2);
                }
            },
            path if !path.starts_with('-') => cli.config_path = Some(path.to_string()),
            other => {
                eprintln!("unknown flag {}\n{}", other, USAGE);
                std::process::exit(2);
            }
        }
    }
    cli
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let cli = parse_args();

    let mut config = match &cli.config_path {
        Some(path) => Config::load(path)?,
        None if std::path::Path::new("config.toml").exists() => Config::load("config.toml")?,
        None => Config::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if cli.debug {
        config.debug = true;
    }

    let default_level = if config.debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    config.validate()?;

    info!(
        host = %config.host,
        network = %config.network,
        bind = %config.bind,
        "Starting minircd"
    );

    let resolver: Arc<dyn Resolver> = if config.dns {
        Arc::new(DnsResolver::new())
    } else {
        info!("hostname lookups disabled");
        Arc::new(NoResolver)
    };

    let (bind_host, bind_port) = config.bind_addr()?;
    let state = Arc::new(ServerState::new(config, resolver, argv));

    // termination signals drain into the same shutdown path as RESTART
    {
        let shutdown_tx = state.shutdown.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt()).expect("install SIGINT handler");
            let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
            tokio::select! {
                _ = sigint.recv() => info!("SIGINT - shutting down"),
                _ = sigterm.recv() => info!("SIGTERM - shutting down"),
            }
            let _ = shutdown_tx.send(());
        });
    }

    let listener = TcpListener::bind((bind_host.as_str(), bind_port))
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}:{}: {}", bind_host, bind_port, e))?;

    network::run(state, listener).await
}
