//! Channel plugin: JOIN, PART, TOPIC.

use async_trait::async_trait;
use minirc_proto::{irc_eq, Message, Prefix};

use super::{Context, Handler, HandlerResult, Outcome, Plugin};
use crate::replies::{self, Outbound};
use crate::require_arg;

pub struct ChannelPlugin {
    join: JoinHandler,
    part: PartHandler,
    topic: TopicHandler,
}

impl ChannelPlugin {
    pub fn new() -> ChannelPlugin {
        ChannelPlugin {
            join: JoinHandler,
            part: PartHandler,
            topic: TopicHandler,
        }
    }
}

impl Plugin for ChannelPlugin {
    fn name(&self) -> &'static str {
        "channel"
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["JOIN", "PART", "TOPIC"]
    }

    fn handler(&self, verb: &str) -> Option<&dyn Handler> {
        match verb {
            "JOIN" => Some(&self.join),
            "PART" => Some(&self.part),
            "TOPIC" => Some(&self.topic),
            _ => None,
        }
    }
}

/// `JOIN <channel>`
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let name = require_arg!(args, 0);
        if !name.starts_with('#') {
            return Ok(replies::err_nosuchchannel(name).into());
        }

        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };
        let (prefix, nick) = {
            let user = user_arc.read().await;
            (user.prefix(), user.nick.clone())
        };

        let chan_arc = ctx.state.directory.channel_or_create(name);
        let join_msg = Message::join(name).with_prefix(Prefix::parse(&prefix));
        let mut burst: Vec<Outbound> = vec![join_msg.clone().into()];

        let names = {
            let mut chan = chan_arc.write().await;
            if chan.is_member(ctx.conn) {
                return Ok(Outcome::None);
            }

            ctx.state.directory.broadcast(&chan.members, &join_msg, &[]);

            let first_member = chan.members.is_empty();
            chan.add_member(ctx.conn);
            if first_member {
                chan.operators.insert(ctx.conn);
                burst.push(
                    Message::mode(chan.name.as_str(), "+o", &[nick.as_str()])
                        .with_prefix(Prefix::ServerName(ctx.server_host().to_string()))
                        .into(),
                );
            }

            let mut names = Vec::with_capacity(chan.members.len());
            for &member in &chan.members.clone() {
                if let Some(member_arc) = ctx.state.directory.user(member) {
                    let member_nick = member_arc.read().await.nick.clone();
                    names.push(format!("{}{}", chan.names_prefix(member), member_nick));
                }
            }
            names.join(" ")
        };

        {
            let mut user = user_arc.write().await;
            user.channels.push(name.to_string());
        }

        burst.push(replies::rpl_notopic(name));
        burst.push(replies::rpl_namereply(name, &names));
        burst.push(replies::rpl_endofnames(name));
        Ok(burst.into())
    }
}

/// `PART <channel> [reason]`
pub struct PartHandler;

#[async_trait]
impl Handler for PartHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let name = require_arg!(args, 0);
        let reason = args.get(1).cloned().unwrap_or_else(|| "Leaving".to_string());

        // missing channel or membership parts silently
        let Some(chan_arc) = ctx.state.directory.channel(name) else {
            return Ok(Outcome::None);
        };
        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };
        let prefix = user_arc.read().await.prefix();

        {
            let mut chan = chan_arc.write().await;
            if !chan.is_member(ctx.conn) {
                return Ok(Outcome::None);
            }

            // broadcast before removal so the departing user hears it too
            let part_msg = Message::part(chan.name.as_str(), reason.as_str())
                .with_prefix(Prefix::parse(&prefix));
            ctx.state.directory.broadcast(&chan.members, &part_msg, &[]);

            chan.remove_member(ctx.conn);
            if chan.is_empty() {
                ctx.state.directory.drop_channel(name);
            }
        }

        {
            let mut user = user_arc.write().await;
            user.channels.retain(|c| !irc_eq(c, name));
        }
        Ok(Outcome::None)
    }
}

/// `TOPIC <channel> [topic]`
pub struct TopicHandler;

#[async_trait]
impl Handler for TopicHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let name = require_arg!(args, 0);
        let Some(chan_arc) = ctx.state.directory.channel(name) else {
            return Ok(replies::err_nosuchchannel(name).into());
        };

        let Some(topic) = args.get(1) else {
            let chan = chan_arc.read().await;
            if chan.topic.is_empty() {
                return Ok(replies::rpl_notopic(&chan.name).into());
            }
            return Ok(replies::rpl_topic(&chan.name, &chan.topic).into());
        };

        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };
        let prefix = user_arc.read().await.prefix();

        let mut chan = chan_arc.write().await;
        chan.topic = topic.clone();
        let topic_msg = Message::topic(chan.name.as_str(), topic.as_str())
            .with_prefix(Prefix::parse(&prefix));
        ctx.state.directory.broadcast(&chan.members, &topic_msg, &[]);
        Ok(Outcome::None)
    }
}
