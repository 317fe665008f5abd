//! User query plugin: LUSERS, MOTD, VERSION, WHOIS, WHO.

use async_trait::async_trait;

use super::{Context, Handler, HandlerResult, Plugin};
use crate::replies::{self, Outbound};
use crate::require_arg;

pub struct UserPlugin {
    lusers: LusersHandler,
    motd: MotdHandler,
    version: VersionHandler,
    whois: WhoisHandler,
    who: WhoHandler,
}

impl UserPlugin {
    pub fn new() -> UserPlugin {
        UserPlugin {
            lusers: LusersHandler,
            motd: MotdHandler,
            version: VersionHandler,
            whois: WhoisHandler,
            who: WhoHandler,
        }
    }
}

impl Plugin for UserPlugin {
    fn name(&self) -> &'static str {
        "user"
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["LUSERS", "MOTD", "VERSION", "WHOIS", "WHO"]
    }

    fn handler(&self, verb: &str) -> Option<&dyn Handler> {
        match verb {
            "LUSERS" => Some(&self.lusers),
            "MOTD" => Some(&self.motd),
            "VERSION" => Some(&self.version),
            "WHOIS" => Some(&self.whois),
            "WHO" => Some(&self.who),
            _ => None,
        }
    }
}

/// `LUSERS`
pub struct LusersHandler;

#[async_trait]
impl Handler for LusersHandler {
    async fn handle(&self, ctx: &Context<'_>, _args: &[String]) -> HandlerResult {
        let users = ctx.state.directory.users.len();
        let channels = ctx.state.directory.channels.len();
        let services = 0;
        let servers = 1;

        Ok(vec![
            replies::rpl_luserclient(users, services, servers),
            replies::rpl_luserchannels(channels),
            replies::rpl_luserme(users, servers),
        ]
        .into())
    }
}

/// `MOTD`
pub struct MotdHandler;

#[async_trait]
impl Handler for MotdHandler {
    async fn handle(&self, ctx: &Context<'_>, _args: &[String]) -> HandlerResult {
        let Some(text) = ctx.state.config.read_motd() else {
            return Ok(replies::err_nomotd().into());
        };

        let mut out = vec![replies::rpl_motdstart(ctx.server_host())];
        for line in text.lines() {
            out.push(replies::rpl_motd(line));
        }
        out.push(replies::rpl_endofmotd());
        Ok(out.into())
    }
}

/// `VERSION`
pub struct VersionHandler;

#[async_trait]
impl Handler for VersionHandler {
    async fn handle(&self, ctx: &Context<'_>, _args: &[String]) -> HandlerResult {
        Ok(replies::rpl_version(&ctx.state.info.version, ctx.server_host()).into())
    }
}

/// `WHOIS <nick>`
pub struct WhoisHandler;

#[async_trait]
impl Handler for WhoisHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let Some(mask) = args.first().filter(|a| !a.is_empty()) else {
            return Ok(replies::err_nonicknamegiven().into());
        };

        let target_arc = ctx
            .state
            .directory
            .conn_by_nick(mask)
            .and_then(|conn| ctx.state.directory.user(conn));
        let Some(target_arc) = target_arc else {
            return Ok(replies::err_nosuchnick(mask).into());
        };

        let (conn, nick, user, host, realname, channel_names) = {
            let target = target_arc.read().await;
            let (nick, user, host) = target.source();
            (
                target.conn,
                nick,
                user,
                host,
                target.info.name.clone(),
                target.channels.clone(),
            )
        };

        let mut channels = Vec::with_capacity(channel_names.len());
        for name in &channel_names {
            if let Some(chan_arc) = ctx.state.directory.channel(name) {
                let chan = chan_arc.read().await;
                channels.push(format!("{}{}", chan.whois_prefix(conn), chan.name));
            }
        }
        // force the :<channels> trailing delimiter for a lone entry
        if channels.len() == 1 {
            channels.push(String::new());
        }

        Ok(vec![
            replies::rpl_whoisuser(&nick, &user, &host, &realname),
            replies::rpl_whoischannels(&nick, &channels.join(" ")),
            replies::rpl_whoisserver(&nick, ctx.server_host(), &ctx.state.info.version),
            replies::rpl_endofwhois(&nick),
        ]
        .into())
    }
}

/// `WHO <mask>`
pub struct WhoHandler;

#[async_trait]
impl Handler for WhoHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let mask = require_arg!(args, 0);
        let mut out: Vec<Outbound> = Vec::new();

        if mask.starts_with('#') {
            let Some(chan_arc) = ctx.state.directory.channel(mask) else {
                return Ok(replies::err_nosuchchannel(mask).into());
            };
            let members = chan_arc.read().await.members.clone();
            for member in members {
                if let Some(member_arc) = ctx.state.directory.user(member) {
                    out.push(who_reply(ctx, mask, &member_arc).await);
                }
            }
        } else {
            let target_arc = ctx
                .state
                .directory
                .conn_by_nick(mask)
                .and_then(|conn| ctx.state.directory.user(conn));
            let Some(target_arc) = target_arc else {
                return Ok(replies::err_nosuchnick(mask).into());
            };
            out.push(who_reply(ctx, mask, &target_arc).await);
        }

        out.push(replies::rpl_endofwho(mask));
        Ok(out.into())
    }
}

async fn who_reply(
    ctx: &Context<'_>,
    mask: &str,
    user_arc: &std::sync::Arc<tokio::sync::RwLock<crate::state::User>>,
) -> Outbound {
    let user = user_arc.read().await;
    let (nick, ident, host) = user.source();
    replies::rpl_whoreply(
        mask,
        &ident,
        &host,
        ctx.server_host(),
        &nick,
        &user.info.name,
    )
}
