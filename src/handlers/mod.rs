//! Command dispatch.
//!
//! The event core: parses each inbound line, resolves the verb through
//! the plugin [`Registry`], runs the handler and applies the completion
//! protocol to whatever it returned. Handlers yield replies for the
//! issuing session and/or follow-up internal events; broadcasts go
//! straight through the directory's fan-out.

pub mod admin;
pub mod channel;
pub mod core;
pub mod mode;
pub mod registry;
pub mod user;


pub use registry::{Plugin, Registry};

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use minirc_proto::MessageRef;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::HandlerError;
use crate::replies::{self, Outbound};
use crate::state::{ConnId, ServerState, User};

/// What a handler produced: nothing, one reply, several replies, or a
/// follow-up internal event.
pub enum Outcome {
    None,
    Reply(Outbound),
    Replies(Vec<Outbound>),
    Event(Event),
}

impl From<Outbound> for Outcome {
    fn from(out: Outbound) -> Outcome {
        Outcome::Reply(out)
    }
}

impl From<Vec<Outbound>> for Outcome {
    fn from(out: Vec<Outbound>) -> Outcome {
        Outcome::Replies(out)
    }
}

/// Internal events fired between handlers and the session machinery.
#[derive(Debug, Clone)]
pub enum Event {
    /// Registration preconditions may be complete; greet the session.
    Signon(ConnId),
    /// Join the connection to a channel (signon auto-join).
    Join(ConnId, String),
    /// Tear the session down with the given reason.
    Quit(ConnId, String),
}

/// Per-dispatch context handed to handlers.
pub struct Context<'a> {
    pub conn: ConnId,
    pub state: &'a Arc<ServerState>,
}

impl Context<'_> {
    pub fn user(&self) -> Option<Arc<RwLock<User>>> {
        self.state.directory.user(self.conn)
    }

    pub fn server_host(&self) -> &str {
        &self.state.info.host
    }

    /// Current nick and oper flag, for privilege checks.
    pub async fn oper_info(&self) -> Option<(String, bool)> {
        let user_arc = self.user()?;
        let user = user_arc.read().await;
        Some((user.nick.clone(), user.modes.is_oper()))
    }
}

/// A command handler. `args` are the positional parameters of the parsed
/// message, trailing included.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult;
}

pub type HandlerResult = Result<Outcome, HandlerError>;

/// Extract a required argument, bailing out with `NeedMoreParams`.
#[macro_export]
macro_rules! require_arg {
    ($args:expr, $idx:expr) => {
        match $args.get($idx) {
            Some(s) if !s.is_empty() => s.as_str(),
            _ => return Err($crate::error::HandlerError::NeedMoreParams),
        }
    };
}

/// Parse one inbound line and run it through the registry.
pub async fn dispatch(state: &Arc<ServerState>, conn: ConnId, line: &str) {
    let msg = match MessageRef::parse(line) {
        Ok(msg) => msg,
        Err(e) => {
            debug!(conn = %conn, error = %e, "skipping unparseable line");
            return;
        }
    };
    let verb = msg.command.to_ascii_uppercase();
    let args = msg.args_owned();
    run_command(state, conn, &verb, args).await;
}

/// Resolve a verb against the registry and run its handler.
///
/// Unknown verbs stop here with ERR_UNKNOWNCOMMAND.
pub async fn run_command(state: &Arc<ServerState>, conn: ConnId, verb: &str, args: Vec<String>) {
    let Some(plugin) = state.registry.lookup(verb) else {
        state
            .directory
            .send(conn, replies::err_unknowncommand(verb))
            .await;
        return;
    };
    let Some(handler) = plugin.handler(verb) else {
        // registry and plugin disagree on the verb set
        let err = HandlerError::Internal(format!(
            "verb {} registered without a handler in plugin {}",
            verb,
            plugin.name()
        ));
        warn!(conn = %conn, error = %err, "dispatch");
        return;
    };

    debug!(conn = %conn, command = %verb, plugin = plugin.name(), "dispatch");
    let ctx = Context { conn, state };
    match handler.handle(&ctx, &args).await {
        Ok(outcome) => complete(state, conn, outcome).await,
        Err(e) => match e.to_reply(verb) {
            Some(reply) => state.directory.send(conn, reply).await,
            None => warn!(conn = %conn, command = %verb, error = %e, "handler error"),
        },
    }
}

/// Completion protocol: forward replies to the issuing session, fire
/// follow-up events.
pub async fn complete(state: &Arc<ServerState>, conn: ConnId, outcome: Outcome) {
    match outcome {
        Outcome::None => {}
        Outcome::Reply(out) => state.directory.send(conn, out).await,
        Outcome::Replies(outs) => {
            for out in outs {
                state.directory.send(conn, out).await;
            }
        }
        Outcome::Event(event) => fire_event(state, event).await,
    }
}

/// Fire an internal event. Join and Quit re-enter the registry so a hot
/// reload applies to them like any client command.
///
/// Boxed: events fired from handler completion recurse back into
/// dispatch.
pub fn fire_event<'a>(state: &'a Arc<ServerState>, event: Event) -> BoxFuture<'a, ()> {
    Box::pin(async move {
        match event {
            Event::Signon(conn) => signon(state, conn).await,
            Event::Join(conn, name) => run_command(state, conn, "JOIN", vec![name]).await,
            Event::Quit(conn, reason) => run_command(state, conn, "QUIT", vec![reason]).await,
        }
    })
}

/// Greet a freshly registered session and auto-join the default channel.
///
/// Runs at most once per session. A signon arriving while the hostname
/// lookup is still pending is dropped; the lookup completion replays it.
pub async fn signon(state: &Arc<ServerState>, conn: ConnId) {
    let Some(user_arc) = state.directory.user(conn) else {
        return;
    };

    let nick = {
        let mut user = user_arc.write().await;
        if user.lookup_pending {
            debug!(conn = %conn, "signon before hostname resolution, deferred");
            return;
        }
        if user.signon.is_some() || user.nick.is_empty() || user.info.user.is_empty() {
            return;
        }
        user.registered = true;
        user.signon = Some(chrono::Utc::now().timestamp());
        user.nick.clone()
    };

    debug!(conn = %conn, nick = %nick, "signon");
    let directory = &state.directory;
    directory
        .send(conn, replies::rpl_welcome(&state.info.network, &nick))
        .await;
    directory
        .send(
            conn,
            replies::rpl_yourhost(&state.info.host, &state.info.version),
        )
        .await;
    match state.config.read_motd() {
        Some(text) => {
            directory.send(conn, replies::rpl_motdstart(&state.info.host)).await;
            for line in text.lines() {
                directory.send(conn, replies::rpl_motd(line)).await;
            }
            directory.send(conn, replies::rpl_endofmotd()).await;
        }
        None => directory.send(conn, replies::err_nomotd()).await,
    }

    let default_channel = state.config.default_channel.clone();
    fire_event(state, Event::Join(conn, default_channel)).await;
}
