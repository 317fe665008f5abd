//! Admin plugin: OPER, DIE, RESTART, RELOAD.

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::{Context, Handler, HandlerResult, Outcome, Plugin, Registry};
use crate::replies::{self, Outbound};
use crate::require_arg;

pub struct AdminPlugin {
    oper: OperHandler,
    die: DieHandler,
    restart: RestartHandler,
    reload: ReloadHandler,
}

impl AdminPlugin {
    pub fn new() -> AdminPlugin {
        AdminPlugin {
            oper: OperHandler,
            die: DieHandler,
            restart: RestartHandler,
            reload: ReloadHandler,
        }
    }
}

impl Plugin for AdminPlugin {
    fn name(&self) -> &'static str {
        "admin"
    }

    fn verbs(&self) -> &'static [&'static str] {
        &["OPER", "DIE", "RESTART", "RELOAD"]
    }

    fn handler(&self, verb: &str) -> Option<&dyn Handler> {
        match verb {
            "OPER" => Some(&self.oper),
            "DIE" => Some(&self.die),
            "RESTART" => Some(&self.restart),
            "RELOAD" => Some(&self.reload),
            _ => None,
        }
    }
}

/// `OPER <name> <password>`
pub struct OperHandler;

#[async_trait]
impl Handler for OperHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let name = require_arg!(args, 0);
        let password = require_arg!(args, 1);

        let Some(user_arc) = ctx.user() else {
            return Ok(Outcome::None);
        };

        let (nick, prefix, already_oper) = {
            let user = user_arc.read().await;
            (user.nick.clone(), user.prefix(), user.modes.is_oper())
        };
        if already_oper {
            return Ok(Outcome::None);
        }

        let Some(oline) = ctx.state.config.oline_for(&prefix) else {
            warn!(nick = %nick, prefix = %prefix, "OPER failed: no matching O-line");
            return Ok(replies::err_nooperhost().into());
        };

        if oline.name != name || oline.password != password {
            warn!(nick = %nick, oper_name = %name, "OPER failed: bad credentials");
            return Ok(replies::err_passwdmismatch().into());
        }

        {
            let mut user = user_arc.write().await;
            user.modes.insert('o');
        }
        info!(nick = %nick, oper_name = %name, "OPER successful");
        Ok(replies::rpl_youreoper().into())
    }
}

/// `DIE` - terminate the process with exit code 0.
pub struct DieHandler;

#[async_trait]
impl Handler for DieHandler {
    async fn handle(&self, ctx: &Context<'_>, _args: &[String]) -> HandlerResult {
        let Some((nick, is_oper)) = ctx.oper_info().await else {
            return Ok(Outcome::None);
        };
        if !is_oper {
            return Ok(replies::err_noprivileges().into());
        }

        info!(nick = %nick, "shutting down on DIE");
        std::process::exit(0);
    }
}

/// `RESTART` - close the listener and re-exec the original invocation.
pub struct RestartHandler;

#[async_trait]
impl Handler for RestartHandler {
    async fn handle(&self, ctx: &Context<'_>, _args: &[String]) -> HandlerResult {
        let Some((nick, is_oper)) = ctx.oper_info().await else {
            return Ok(Outcome::None);
        };
        if !is_oper {
            return Ok(replies::err_noprivileges().into());
        }

        info!(nick = %nick, args = ?ctx.state.argv, "restarting");
        let _ = ctx.state.shutdown.send(());
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let program = match std::env::current_exe() {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, "restart failed: cannot find program image");
                std::process::exit(1);
            }
        };
        let err = exec(std::process::Command::new(program).args(ctx.state.argv.iter().skip(1)));
        error!(error = %err, "restart failed: exec");
        std::process::exit(1);
    }
}

#[cfg(unix)]
fn exec(command: &mut std::process::Command) -> std::io::Error {
    use std::os::unix::process::CommandExt;
    command.exec()
}

#[cfg(not(unix))]
fn exec(command: &mut std::process::Command) -> std::io::Error {
    // no execv: hand off to a fresh child and leave
    match command.spawn() {
        Ok(_) => std::process::exit(0),
        Err(e) => e,
    }
}

/// `RELOAD <plugin>` - query, unload, reconstruct, register.
pub struct ReloadHandler;

#[async_trait]
impl Handler for ReloadHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[String]) -> HandlerResult {
        let name = require_arg!(args, 0);

        let Some((nick, is_oper)) = ctx.oper_info().await else {
            return Ok(Outcome::None);
        };
        if !is_oper {
            return Ok(replies::err_noprivileges().into());
        }

        let key = name.to_ascii_lowercase();
        if !ctx.state.registry.has_plugin(&key) {
            return Ok(replies::notice_star(format!("No such plugin: {}", name)).into());
        }

        let mut out: Vec<Outbound> = Vec::new();
        ctx.state.registry.unregister(&key);
        out.push(replies::notice_star(format!("Unloaded plugin: {}", key)));

        match Registry::construct(&key) {
            Some(plugin) => {
                ctx.state.registry.register(plugin);
                info!(
                    nick = %nick,
                    plugin = %key,
                    verbs = ?ctx.state.registry.verbs_of(&key),
                    "plugin reloaded"
                );
                out.push(replies::notice_star(format!("Loaded plugin: {}", key)));
            }
            None => {
                error!(plugin = %key, "plugin vanished during reload");
                out.push(replies::notice_star(format!("Failed to load plugin: {}", key)));
            }
        }
        Ok(out.into())
    }
}
