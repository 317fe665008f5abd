//! Per-connection session.
//!
//! Each accepted socket gets a reader task (framing + dispatch) and a
//! writer task (drains the bounded outbound queue, injecting the
//! recipient nick and default prefix just before serialization). The
//! User is registered with the directory before the first byte is read.
//!
//! Registration walks: connected -> resolving-host -> host-known ->
//! registered. The hostname lookup runs on its own task; its completion
//! re-fires any signon that arrived while it was pending.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use minirc_proto::IrcCodec;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handlers::{dispatch, fire_event, signon, Event};
use crate::replies::{self, Outbound};
use crate::state::{ConnId, ServerState};

/// QUIT reason used when a socket goes away without a QUIT.
const DISCONNECT_REASON: &str = "Leavling";

pub async fn handle_connection(state: Arc<ServerState>, stream: TcpStream, addr: SocketAddr) {
    let (conn, rx, cancel) = state
        .directory
        .register(addr.ip().to_string(), addr.port());
    info!(conn = %conn, peer = %addr, "connected");

    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, IrcCodec::new());
    let writer = tokio::spawn(write_loop(
        state.clone(),
        conn,
        write_half,
        rx,
        cancel.clone(),
    ));

    state
        .directory
        .send(conn, replies::notice_star("*** Looking up your hostname..."))
        .await;
    spawn_lookup(state.clone(), conn, addr.ip());

    let mut shutdown_rx = state.shutdown.subscribe();
    loop {
        tokio::select! {
            item = reader.next() => match item {
                Some(Ok(line)) => {
                    debug!(conn = %conn, line = %line, "I");
                    dispatch(&state, conn, &line).await;
                }
                Some(Err(e)) => {
                    warn!(conn = %conn, error = %e, "read error");
                    break;
                }
                None => break,
            },
            _ = cancel.cancelled() => break,
            _ = shutdown_rx.recv() => break,
        }

        if !state.directory.users.contains_key(&conn) {
            break;
        }
    }

    // forced teardown; a no-op when a graceful QUIT already ran
    fire_event(&state, Event::Quit(conn, DISCONNECT_REASON.to_string())).await;
    cancel.cancel();
    let _ = writer.await;
    info!(conn = %conn, peer = %addr, "disconnected");
}

/// Drain the session's outbound queue onto the socket.
async fn write_loop(
    state: Arc<ServerState>,
    conn: ConnId,
    write_half: OwnedWriteHalf,
    mut rx: mpsc::Receiver<Outbound>,
    cancel: CancellationToken,
) {
    let mut framed = FramedWrite::new(write_half, IrcCodec::new());
    loop {
        let out = tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(out) => out,
                None => break,
            },
            _ = cancel.cancelled() => break,
        };

        let nick = match state.directory.user(conn) {
            Some(user_arc) => user_arc.read().await.nick.clone(),
            None => String::new(),
        };
        let msg = out.finalize(&nick, &state.info.host);
        debug!(conn = %conn, line = %msg, "O");
        if framed.send(&msg).await.is_err() {
            cancel.cancel();
            break;
        }
    }
}

/// Kick off the reverse-DNS lookup for a fresh connection.
///
/// The completion lands back on the directory: it fills in the resolved
/// hostname, clears the pending flag and replays a suppressed signon. A
/// completion for a connection that has since closed is discarded.
fn spawn_lookup(state: Arc<ServerState>, conn: ConnId, ip: IpAddr) {
    tokio::spawn(async move {
        let resolved = state.resolver.resolve(ip).await;

        let Some(user_arc) = state.directory.user(conn) else {
            debug!(conn = %conn, "discarding hostname lookup for closed connection");
            return;
        };

        let notice = match &resolved {
            Some(_) => "*** Found your hostname",
            None => "*** Couldn't look up your hostname",
        };
        state.directory.send(conn, replies::notice_star(notice)).await;

        {
            let mut user = user_arc.write().await;
            user.info.host = resolved.unwrap_or_else(|| user.host.clone());
            user.lookup_pending = false;
        }
        signon(&state, conn).await;
    });
}
