//! Reply catalogue.
//!
//! Constructors for every numeric and verb message the daemon sends.
//! Numerics are built without their recipient: the [`Outbound::add_nick`]
//! flag tells the writer to inject the recipient's nick as the first
//! argument just before serialization, and a missing prefix defaults to
//! the server host at the same point.

use minirc_proto::{Message, Prefix, Response};

/// An outgoing message queued on a session's send buffer.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub message: Message,
    pub add_nick: bool,
}

impl Outbound {
    fn numeric(response: Response, args: Vec<String>) -> Outbound {
        Outbound {
            message: Message::numeric(response, args),
            add_nick: true,
        }
    }

    fn numeric_trailing(response: Response, args: Vec<String>) -> Outbound {
        let mut out = Outbound::numeric(response, args);
        out.message.trailing = true;
        out
    }

    /// Finish the message for one recipient: inject the nick where asked
    /// (`*` while none is set) and default the prefix to the server host.
    pub fn finalize(self, nick: &str, server_host: &str) -> Message {
        let mut message = self.message;
        if self.add_nick {
            let nick = if nick.is_empty() { "*" } else { nick };
            message.args.insert(0, nick.to_string());
        }
        if message.prefix.is_none() {
            message.prefix = Some(Prefix::ServerName(server_host.to_string()));
        }
        message
    }
}

impl From<Message> for Outbound {
    fn from(message: Message) -> Outbound {
        Outbound {
            message,
            add_nick: false,
        }
    }
}

/// `NOTICE * :<text>` from the server.
pub fn notice_star(text: impl Into<String>) -> Outbound {
    Message::notice("*", text).into()
}

// === Registration ===

pub fn rpl_welcome(network: &str, nick: &str) -> Outbound {
    Outbound::numeric(
        Response::RPL_WELCOME,
        vec![format!("Welcome to the {} IRC Network {}", network, nick)],
    )
}

pub fn rpl_yourhost(host: &str, version: &str) -> Outbound {
    Outbound::numeric(
        Response::RPL_YOURHOST,
        vec![format!("Your host is {} running {}", host, version)],
    )
}

#[allow(dead_code)]
pub fn rpl_created(date: &str) -> Outbound {
    Outbound::numeric(
        Response::RPL_CREATED,
        vec![format!("This server was created {}", date)],
    )
}

#[allow(dead_code)]
pub fn rpl_isupport(features: &[&str]) -> Outbound {
    let mut args: Vec<String> = features.iter().map(|f| f.to_string()).collect();
    args.push("are supported by this server".to_string());
    Outbound::numeric(Response::RPL_ISUPPORT, args)
}

// === Modes ===

pub fn rpl_umodeis(modes: &str) -> Outbound {
    Outbound::numeric(Response::RPL_UMODEIS, vec![modes.to_string()])
}

pub fn rpl_channelmodeis(channel: &str, modes: &str) -> Outbound {
    Outbound::numeric(
        Response::RPL_CHANNELMODEIS,
        vec![channel.to_string(), modes.to_string()],
    )
}

// === Channels ===

pub fn rpl_notopic(channel: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_NOTOPIC,
        vec![channel.to_string(), "No topic".to_string()],
    )
}

pub fn rpl_topic(channel: &str, topic: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_TOPIC,
        vec![channel.to_string(), topic.to_string()],
    )
}

pub fn rpl_namereply(channel: &str, names: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_NAMREPLY,
        vec!["=".to_string(), channel.to_string(), names.to_string()],
    )
}

pub fn rpl_endofnames(channel: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_ENDOFNAMES,
        vec![channel.to_string(), "End of NAMES".to_string()],
    )
}

// === WHOIS / WHO ===

pub fn rpl_whoisuser(nick: &str, user: &str, host: &str, realname: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_WHOISUSER,
        vec![
            nick.to_string(),
            user.to_string(),
            host.to_string(),
            "*".to_string(),
            realname.to_string(),
        ],
    )
}

pub fn rpl_whoischannels(nick: &str, channels: &str) -> Outbound {
    Outbound::numeric(
        Response::RPL_WHOISCHANNELS,
        vec![nick.to_string(), channels.to_string()],
    )
}

pub fn rpl_whoisserver(nick: &str, server: &str, info: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_WHOISSERVER,
        vec![nick.to_string(), server.to_string(), info.to_string()],
    )
}

pub fn rpl_endofwhois(nick: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_ENDOFWHOIS,
        vec![nick.to_string(), "End of WHOIS list".to_string()],
    )
}

pub fn rpl_whoreply(
    mask: &str,
    user: &str,
    host: &str,
    server: &str,
    nick: &str,
    realname: &str,
) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_WHOREPLY,
        vec![
            mask.to_string(),
            user.to_string(),
            host.to_string(),
            server.to_string(),
            nick.to_string(),
            "H".to_string(),
            format!("0 {}", realname),
        ],
    )
}

pub fn rpl_endofwho(mask: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_ENDOFWHO,
        vec![mask.to_string(), "End of WHO list".to_string()],
    )
}

// === LUSERS / MOTD / VERSION ===

pub fn rpl_luserclient(users: usize, services: usize, servers: usize) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_LUSERCLIENT,
        vec![format!(
            "There are {} users and {} services on {} servers",
            users, services, servers
        )],
    )
}

pub fn rpl_luserchannels(channels: usize) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_LUSERCHANNELS,
        vec![channels.to_string(), "channels formed".to_string()],
    )
}

pub fn rpl_luserme(clients: usize, servers: usize) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_LUSERME,
        vec![format!("I have {} clients and {} servers", clients, servers)],
    )
}

pub fn rpl_motdstart(server: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_MOTDSTART,
        vec![format!("- {} Message of the day -", server)],
    )
}

pub fn rpl_motd(line: &str) -> Outbound {
    Outbound::numeric_trailing(Response::RPL_MOTD, vec![format!("- {}", line)])
}

pub fn rpl_endofmotd() -> Outbound {
    Outbound::numeric_trailing(Response::RPL_ENDOFMOTD, vec!["End of MOTD command".to_string()])
}

pub fn rpl_version(version: &str, host: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_VERSION,
        vec![
            version.to_string(),
            host.to_string(),
            "minimal IRC daemon".to_string(),
        ],
    )
}

// === Operator ===

pub fn rpl_youreoper() -> Outbound {
    Outbound::numeric_trailing(
        Response::RPL_YOUREOPER,
        vec!["You are now an IRC operator".to_string()],
    )
}

pub fn err_nooperhost() -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NOOPERHOST,
        vec!["No O-lines for your host".to_string()],
    )
}

pub fn err_passwdmismatch() -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_PASSWDMISMATCH,
        vec!["Password incorrect".to_string()],
    )
}

pub fn err_noprivileges() -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NOPRIVILEGES,
        vec!["Permission denied".to_string()],
    )
}

// === Errors ===

pub fn err_nosuchnick(nick: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NOSUCHNICK,
        vec![nick.to_string(), "No such nick/channel".to_string()],
    )
}

pub fn err_nosuchchannel(channel: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NOSUCHCHANNEL,
        vec![channel.to_string(), "No such channel".to_string()],
    )
}

#[allow(dead_code)]
pub fn err_toomanychannels(channel: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_TOOMANYCHANNELS,
        vec![
            channel.to_string(),
            "You have joined too many channels".to_string(),
        ],
    )
}

pub fn err_unknowncommand(command: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_UNKNOWNCOMMAND,
        vec![command.to_string(), "Unknown command".to_string()],
    )
}

pub fn err_nomotd() -> Outbound {
    Outbound::numeric_trailing(Response::ERR_NOMOTD, vec!["MOTD File is missing".to_string()])
}

pub fn err_nonicknamegiven() -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NONICKNAMEGIVEN,
        vec!["No nickname given".to_string()],
    )
}

pub fn err_erroneusnickname(nick: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_ERRONEUSNICKNAME,
        vec![nick.to_string(), "Erroneous nickname".to_string()],
    )
}

pub fn err_nicknameinuse(nick: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NICKNAMEINUSE,
        vec![nick.to_string(), "Nickname is already in use".to_string()],
    )
}

pub fn err_usernotinchannel(nick: &str, channel: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_USERNOTINCHANNEL,
        vec![
            nick.to_string(),
            channel.to_string(),
            "They aren't on that channel".to_string(),
        ],
    )
}

pub fn err_needmoreparams(command: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_NEEDMOREPARAMS,
        vec![command.to_string(), "Need more parameters".to_string()],
    )
}

pub fn err_unknownmode(mode: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_UNKNOWNMODE,
        vec![mode.to_string(), "is unknown mode char to me".to_string()],
    )
}

pub fn err_chanoprivsneeded(channel: &str) -> Outbound {
    Outbound::numeric_trailing(
        Response::ERR_CHANOPRIVSNEEDED,
        vec![
            channel.to_string(),
            "You're not channel operator".to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numerics_inject_recipient_nick() {
        let msg = err_nicknameinuse("bob").finalize("alice", "srv");
        assert_eq!(msg.to_string(), ":srv 433 alice bob :Nickname is already in use");
    }

    #[test]
    fn unset_nick_renders_as_star() {
        let msg = err_nicknameinuse("bob").finalize("", "srv");
        assert_eq!(msg.to_string(), ":srv 433 * bob :Nickname is already in use");
    }

    #[test]
    fn existing_prefix_is_kept() {
        let out: Outbound = Message::join("#x")
            .with_prefix(Prefix::new("alice", "alice", "host"))
            .into();
        let msg = out.finalize("bob", "srv");
        assert_eq!(msg.to_string(), ":alice!alice@host JOIN #x");
    }

    #[test]
    fn namereply_forces_trailing() {
        let msg = rpl_namereply("#x", "@alice").finalize("alice", "srv");
        assert_eq!(msg.to_string(), ":srv 353 alice = #x :@alice");
    }

    #[test]
    fn welcome_line_matches_wire_format() {
        let msg = rpl_welcome("Test", "alice").finalize("alice", "srv");
        assert_eq!(
            msg.to_string(),
            ":srv 001 alice :Welcome to the Test IRC Network alice"
        );
    }
}
