//! IRC message model.
//!
//! [`MessageRef`] is the borrowed, zero-copy parse of an incoming line.
//! [`Message`] is the owned form the server builds for outgoing traffic.

mod nom_parser;

use std::fmt;

use crate::error::MessageParseError;
use crate::prefix::Prefix;
use crate::response::Response;

use nom_parser::ParsedMessage;

/// Whether an argument must be sent as the trailing (colon-prefixed)
/// parameter to survive a round-trip.
#[inline]
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// An owned IRC message.
///
/// `command` is an uppercase verb or a three-digit numeric; `args` are the
/// positional parameters. When `trailing` is set the final argument is
/// always emitted as a trailing parameter, otherwise it is colon-prefixed
/// only when required (it is empty, contains a space, or starts with `:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub command: String,
    pub args: Vec<String>,
    pub trailing: bool,
}

impl Message {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Message {
        Message {
            prefix: None,
            command: command.into(),
            args,
            trailing: false,
        }
    }

    /// A message whose final argument is freeform text.
    pub fn with_trailing(command: impl Into<String>, args: Vec<String>) -> Message {
        Message {
            trailing: true,
            ..Message::new(command, args)
        }
    }

    /// A numeric reply.
    pub fn numeric(response: Response, args: Vec<String>) -> Message {
        Message::new(response.to_string(), args)
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Message {
        self.prefix = Some(prefix);
        self
    }

    // Constructors for the verbs the daemon emits.

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Message {
        Message::with_trailing("NOTICE", vec![target.into(), text.into()])
    }

    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Message {
        Message::with_trailing("PRIVMSG", vec![target.into(), text.into()])
    }

    pub fn join(channel: impl Into<String>) -> Message {
        Message::new("JOIN", vec![channel.into()])
    }

    pub fn part(channel: impl Into<String>, reason: impl Into<String>) -> Message {
        Message::with_trailing("PART", vec![channel.into(), reason.into()])
    }

    pub fn topic(channel: impl Into<String>, text: impl Into<String>) -> Message {
        Message::with_trailing("TOPIC", vec![channel.into(), text.into()])
    }

    pub fn quit(reason: impl Into<String>) -> Message {
        Message::with_trailing("QUIT", vec![reason.into()])
    }

    pub fn nick(nick: impl Into<String>) -> Message {
        Message::new("NICK", vec![nick.into()])
    }

    pub fn pong(token: impl Into<String>) -> Message {
        Message::new("PONG", vec![token.into()])
    }

    /// `MODE <target> <modes> [params...]`
    pub fn mode(target: impl Into<String>, modes: impl Into<String>, params: &[&str]) -> Message {
        let mut args = vec![target.into(), modes.into()];
        args.extend(params.iter().map(|p| p.to_string()));
        Message::new("MODE", args)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.args.split_last() {
            for arg in middle {
                write!(f, " {}", arg)?;
            }
            if self.trailing || needs_colon_prefix(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }
        Ok(())
    }
}

/// A borrowed, parsed IRC message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRef<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub args: Vec<&'a str>,
}

impl<'a> MessageRef<'a> {
    /// Parse one line (with or without its terminator).
    pub fn parse(line: &'a str) -> Result<MessageRef<'a>, MessageParseError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = ParsedMessage::parse(trimmed).ok_or(MessageParseError::InvalidCommand)?;

        Ok(MessageRef {
            prefix: parsed.prefix,
            command: parsed.command,
            args: parsed.params,
        })
    }

    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.get(index).copied()
    }

    pub fn args_owned(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_plain_args() {
        let msg = Message::join("#rust").with_prefix(Prefix::new("a", "b", "c"));
        assert_eq!(msg.to_string(), ":a!b@c JOIN #rust");
    }

    #[test]
    fn serializes_trailing_text() {
        let msg = Message::privmsg("#rust", "hello world");
        assert_eq!(msg.to_string(), "PRIVMSG #rust :hello world");
    }

    #[test]
    fn forces_trailing_on_single_word_text() {
        let msg = Message::quit("Leaving");
        assert_eq!(msg.to_string(), "QUIT :Leaving");
    }

    #[test]
    fn colon_prefixes_empty_final_arg() {
        let msg = Message::new("TOPIC", vec!["#rust".into(), String::new()]);
        assert_eq!(msg.to_string(), "TOPIC #rust :");
    }

    #[test]
    fn numeric_display() {
        let msg = Message::numeric(
            Response::ERR_NOMOTD,
            vec!["alice".into(), "MOTD File is missing".into()],
        )
        .with_prefix(Prefix::ServerName("srv".into()));
        assert_eq!(msg.to_string(), ":srv 422 alice :MOTD File is missing");
    }

    #[test]
    fn mode_with_params() {
        let msg = Message::mode("#x", "+o", &["alice"]);
        assert_eq!(msg.to_string(), "MODE #x +o alice");
    }

    #[test]
    fn parse_ref_basic() {
        let msg = MessageRef::parse("NICK alice\r\n").unwrap();
        assert_eq!(msg.command, "NICK");
        assert_eq!(msg.arg(0), Some("alice"));
    }

    #[test]
    fn parse_ref_rejects_empty() {
        assert_eq!(
            MessageRef::parse("\r\n"),
            Err(MessageParseError::EmptyMessage)
        );
    }

    #[test]
    fn round_trips_ascii_messages() {
        let cases = [
            "PRIVMSG #chan :hello there",
            ":srv 001 alice :Welcome to the Test IRC Network alice",
            ":alice!alice@host JOIN #x",
            "MODE #x +o alice",
            "PING token",
        ];
        for line in cases {
            let parsed = MessageRef::parse(line).unwrap();
            let rebuilt = Message {
                prefix: parsed.prefix.map(Prefix::parse),
                command: parsed.command.to_string(),
                args: parsed.args_owned(),
                trailing: false,
            };
            let reparsed = MessageRef::parse(&rebuilt.to_string()).unwrap();
            assert_eq!(parsed.command, reparsed.command);
            assert_eq!(parsed.args, reparsed.args);
            assert_eq!(parsed.prefix, reparsed.prefix);
        }
    }
}
