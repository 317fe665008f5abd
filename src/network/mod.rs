//! TCP listener and accept loop.

pub mod connection;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::state::ServerState;

/// Accept connections until shutdown is signalled (RESTART or a
/// termination signal).
pub async fn run(state: Arc<ServerState>, listener: TcpListener) -> anyhow::Result<()> {
    info!(
        "{} ready! Listening on: {}",
        state.info.version,
        listener.local_addr()?
    );

    let mut shutdown_rx = state.shutdown.subscribe();
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = state.clone();
                    tokio::spawn(connection::handle_connection(state, stream, addr));
                }
                Err(e) => warn!(error = %e, "accept failed"),
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    info!("listener closed");
    Ok(())
}
