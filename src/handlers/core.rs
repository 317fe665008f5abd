//! Core plugin: NICK, USER, QUIT, PING, PRIVMSG.

use async_trait::async_trait;
use minirc_proto::{validation, Message, Prefix};
use tracing::info;

use super::{Context, Event, Handler, HandlerResult, Outcome, Plugin};
use crate::replies;
use crate::require_arg;

pub struct CorePlugin {
    nick: NickHandler,
    user: UserHandler,
    quit: QuitHandler,
    ping: PingHandler,
    privmsg: PrivmsgHandler,
}

impl CorePlugin {
    pub fn new() -> CorePlugin {
        CorePlugin {
            nick: NickHandler,
            user: UserHandler,
            quit: QuitHandler,
            ping: PingHandler,
            privmsg: PrivmsgHandler,
        }
    }
}

impl Plugin for CorePlugin {
    fn name(&self) -> &'static str {
        "core"
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["NICK", "USER", "QUIT", "PING", "PRIVMSG"]
    }

    fn handler(&self, verb: &str) -> Option<&dyn Handler> {
        match verb {
            "NICK" => Some(&self.nick),
            "USER" => Some(&self.user),
            "QUIT" => Some(&self.quit),
            "PING" => Some(&self.ping),
            "PRIVMSG" => Some(&self.privmsg),
            _ => None,
        }
    }
}

/// `NICK <nick>`
pub struct NickHandler;

#[async_trait]
impl Handler for NickHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let nick = require_arg!(args, 0);

        if !validation::is_valid_nickname(nick) {
            return Ok(replies::err_erroneusnickname(nick).into());
        }
        if ctx.state.directory.conn_by_nick(nick).is_some() {
            return Ok(replies::err_nicknameinuse(nick).into());
        }

        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };

        let (old_prefix, completes_registration) = {
            let mut user = user_arc.write().await;
            let old_prefix = user.prefix();
            if !ctx.state.directory.claim_nick(ctx.conn, &user.nick, nick) {
                return Ok(replies::err_nicknameinuse(nick).into());
            }
            user.nick = nick.to_string();
            let completes = !user.registered && !user.info.user.is_empty();
            (old_prefix, completes)
        };

        if completes_registration {
            return Ok(Outcome::Event(Event::Signon(ctx.conn)));
        }

        // tell everyone sharing a channel, the renamer included
        let peers = ctx.state.directory.common_peers(ctx.conn).await;
        let msg = Message::nick(nick).with_prefix(Prefix::parse(&old_prefix));
        ctx.state.directory.broadcast(&peers, &msg, &[]);
        Ok(Outcome::None)
    }
}

/// `USER <user> <host> <server> <realname>`
pub struct UserHandler;

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let username = require_arg!(args, 0);
        let _hostname = require_arg!(args, 1);
        let servername = require_arg!(args, 2);
        let realname = require_arg!(args, 3);

        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };

        let completes_registration = {
            let mut user = user_arc.write().await;
            user.info.user = username.to_string();
            user.info.name = realname.to_string();
            user.info.server = servername.to_string();
            !user.registered && !user.nick.is_empty()
        };

        if completes_registration {
            return Ok(Outcome::Event(Event::Signon(ctx.conn)));
        }
        Ok(Outcome::None)
    }
}

/// `QUIT [reason]`
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let reason = args.first().cloned().unwrap_or_else(|| "Leaving".to_string());
        info!(conn = %ctx.conn, reason = %reason, "quit");
        ctx.state.directory.remove_user(ctx.conn, &reason).await;
        Ok(Outcome::None)
    }
}

/// `PING <token>`
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, _ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let token = require_arg!(args, 0);
        Ok(Outcome::Reply(Message::pong(token).into()))
    }
}

/// `PRIVMSG <target> <text>`
pub struct PrivmsgHandler;

#[async_trait]
impl Handler for PrivmsgHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let target = require_arg!(args, 0);
        let text = require_arg!(args, 1);

        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };
        let prefix = {
            let user = user_arc.read().await;
            user.prefix()
        };
        let msg = Message::privmsg(target, text).with_prefix(Prefix::parse(&prefix));

        if target.starts_with('#') {
            let Some(chan_arc) = ctx.state.directory.channel(target) else {
                return Ok(replies::err_nosuchchannel(target).into());
            };
            let members = chan_arc.read().await.members.clone();
            ctx.state.directory.broadcast(&members, &msg, &[ctx.conn]);
        } else {
            let Some(peer) = ctx.state.directory.conn_by_nick(target) else {
                return Ok(replies::err_nosuchnick(target).into());
            };
            ctx.state.directory.try_send(peer, msg.into());
        }
        Ok(Outcome::None)
    }
}
