//! Mode plugin: MODE for channels and users.
//!
//! Channel modes: `o` and `v`, one nick argument each. User modes: `i`.
//! Tokens are scanned left to right; a `+` or `-` sets the operator for
//! the letters that follow, and each letter consumes its arguments from
//! the remaining tokens.

use std::collections::VecDeque;

use async_trait::async_trait;
use minirc_proto::{Message, Prefix};

use super::{Context, Handler, HandlerResult, Outcome, Plugin};
use crate::replies::{self, Outbound};
use crate::require_arg;

pub struct ModePlugin {
    mode: ModeHandler,
}

impl ModePlugin {
    pub fn new() -> ModePlugin {
        ModePlugin { mode: ModeHandler }
    }
}

impl Plugin for ModePlugin {
    fn name(&self) -> &'static str {
        "mode"
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["MODE"]
    }

    fn handler(&self, verb: &str) -> Option<&dyn Handler> {
        match verb {
            "MODE" => Some(&self.mode),
            _ => None,
        }
    }
}

/// `MODE <mask> [modes...]`
pub struct ModeHandler;

#[async_trait]
impl Handler for ModeHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let mask = require_arg!(args, 0);
        if mask.starts_with('#') {
            channel_mode(ctx, mask, &args[1..]).await
        } else {
            user_mode(ctx, mask, &args[1..]).await
        }
    }
}

/// One token, split into its sign (if any) and letters.
fn split_sign(token: &str) -> (Option<char>, &str) {
    match token.chars().next() {
        Some(sign @ ('+' | '-')) => (Some(sign), &token[1..]),
        _ => (None, token),
    }
}

async fn channel_mode(ctx: &Context<'_>, mask: &str, modes: &[String]) -> HandlerResult {
    let Some(chan_arc) = ctx.state.directory.channel(mask) else {
        return Ok(replies::err_nosuchchannel(mask).into());
    };

    if modes.is_empty() {
        let chan = chan_arc.read().await;
        return Ok(replies::rpl_channelmodeis(&chan.name, &format!("+{}", chan.modes)).into());
    }

    {
        let chan = chan_arc.read().await;
        if !chan.operators.contains(&ctx.conn) {
            return Ok(replies::err_chanoprivsneeded(&chan.name).into());
        }
    }

    let Some(user_arc) = ctx.user() else {
        return Ok(Outcome::None);
    };
    let issuer_prefix = user_arc.read().await.prefix();

    let mut replies_out: Vec<Outbound> = Vec::new();
    let mut tokens: VecDeque<&str> = modes.iter().map(|s| s.as_str()).collect();
    let mut op: Option<char> = None;

    while let Some(token) = tokens.pop_front() {
        let (sign, letters) = split_sign(token);
        if let Some(sign) = sign {
            op = Some(sign);
        }

        for letter in letters.chars() {
            match letter {
                'o' | 'v' => {
                    let Some(target_nick) = tokens.pop_front() else {
                        replies_out.push(replies::err_needmoreparams("MODE"));
                        continue;
                    };
                    apply_member_mode(
                        ctx,
                        &chan_arc,
                        op,
                        letter,
                        target_nick,
                        &issuer_prefix,
                        &mut replies_out,
                    )
                    .await;
                }
                _ => replies_out.push(replies::err_unknownmode(&letter.to_string())),
            }
        }
    }

    Ok(replies_out.into())
}

/// Grant or revoke a membership role. Valid changes broadcast to the
/// channel; invalid ones reply only to the sender.
async fn apply_member_mode(
    ctx: &Context<'_>,
    chan_arc: &std::sync::Arc<tokio::sync::RwLock<crate::state::Channel>>,
    op: Option<char>,
    letter: char,
    target_nick: &str,
    issuer_prefix: &str,
    replies_out: &mut Vec<Outbound>,
) {
    let target_conn = ctx.state.directory.conn_by_nick(target_nick);

    let mut chan = chan_arc.write().await;
    let member = target_conn.filter(|conn| chan.is_member(*conn));
    let Some(target) = member else {
        replies_out.push(replies::err_usernotinchannel(target_nick, &chan.name));
        return;
    };

    let collection = match letter {
        'o' => &mut chan.operators,
        _ => &mut chan.voiced,
    };
    let changed = match op {
        Some('+') => {
            collection.insert(target);
            true
        }
        Some('-') => {
            collection.remove(&target);
            true
        }
        _ => false,
    };

    if changed {
        let sign = op.unwrap_or('+');
        let msg = Message::mode(
            chan.name.as_str(),
            format!("{}{}", sign, letter),
            &[target_nick],
        )
        .with_prefix(Prefix::parse(issuer_prefix));
        ctx.state.directory.broadcast(&chan.members, &msg, &[]);
    }
}

async fn user_mode(ctx: &Context<'_>, mask: &str, modes: &[String]) -> HandlerResult {
    let Some(target_conn) = ctx.state.directory.conn_by_nick(mask) else {
        return Ok(replies::err_nosuchnick(mask).into());
    };
    let Some(target_arc) = ctx.state.directory.user(target_conn) else {
        return Ok(replies::err_nosuchnick(mask).into());
    };

    if modes.is_empty() {
        let target = target_arc.read().await;
        return Ok(replies::rpl_umodeis(&target.modes.as_mode_string()).into());
    }

    let mut replies_out: Vec<Outbound> = Vec::new();
    let mut op: Option<char> = None;

    for token in modes {
        let (sign, letters) = split_sign(token);
        if let Some(sign) = sign {
            op = Some(sign);
        }

        for letter in letters.chars() {
            match letter {
                'i' => {
                    let mut target = target_arc.write().await;
                    // applying the same sign twice is a no-op
                    let changed = match op {
                        Some('+') => target.modes.insert(letter),
                        Some('-') => target.modes.remove(letter),
                        _ => false,
                    };
                    if changed {
                        let sign = op.unwrap_or('+');
                        let nick = target.nick.clone();
                        drop(target);
                        let msg = Message::mode(nick.as_str(), format!("{}{}", sign, letter), &[])
                            .with_prefix(Prefix::Nickname(
                                nick.clone(),
                                String::new(),
                                String::new(),
                            ));
                        replies_out.push(msg.into());
                    }
                }
                _ => replies_out.push(replies::err_unknownmode(&letter.to_string())),
            }
        }
    }

    Ok(replies_out.into())
}
