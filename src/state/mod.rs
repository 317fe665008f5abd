//! Shared server state.

pub mod channel;
pub mod directory;
pub mod user;

pub use channel::Channel;
pub use directory::{ConnHandle, Directory, OUTBOUND_BUFFER};
pub use user::{User, UserInfo, UserModes};

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::Config;
use crate::handlers::Registry;
use crate::resolver::Resolver;

/// Opaque transport handle identifying one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl ConnId {
    pub fn from_raw(raw: u64) -> ConnId {
        ConnId(raw)
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// This server's identity.
#[derive(Debug, Clone)]
pub struct ServerInfo {
    /// Server host name, the default message prefix.
    pub host: String,
    pub network: String,
    pub version: String,
}

/// Everything the dispatcher and handlers share: the object directory,
/// the command registry, configuration and lifecycle signals.
pub struct ServerState {
    pub directory: Directory,
    pub info: ServerInfo,
    pub config: Config,
    pub registry: Registry,
    pub resolver: Arc<dyn Resolver>,
    pub shutdown: broadcast::Sender<()>,
    /// Original invocation arguments, preserved for RESTART.
    pub argv: Vec<String>,
}

impl ServerState {
    pub fn new(config: Config, resolver: Arc<dyn Resolver>, argv: Vec<String>) -> ServerState {
        let (shutdown, _) = broadcast::channel(4);
        let info = ServerInfo {
            host: config.host.clone(),
            network: config.network.clone(),
            version: format!("ircd v{}", env!("CARGO_PKG_VERSION")),
        };
        ServerState {
            directory: Directory::new(),
            info,
            config,
            registry: Registry::with_builtins(),
            resolver,
            shutdown,
            argv,
        }
    }
}
