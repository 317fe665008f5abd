//! Message prefixes (the `:nick!user@host` originator tag).

use std::fmt;

/// The originator of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// A server name, e.g. `irc.example.net`.
    ServerName(String),
    /// A user source: nick, user (ident), host. User and host may be empty
    /// while a session is still registering.
    Nickname(String, String, String),
}

impl Prefix {
    pub fn new(
        nick: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Prefix {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// Parse a raw prefix (without the leading `:`).
    ///
    /// Anything containing `!` or `@` is a user prefix; a bare token with a
    /// dot is taken as a server name, anything else as a lone nick.
    pub fn parse(raw: &str) -> Prefix {
        if raw.contains('!') || raw.contains('@') {
            let (nick, rest) = raw.split_once('!').unwrap_or_else(|| {
                let (n, h) = raw.split_once('@').unwrap_or((raw, ""));
                (n, h)
            });
            if let Some((user, host)) = rest.split_once('@') {
                Prefix::Nickname(nick.to_string(), user.to_string(), host.to_string())
            } else if raw.contains('!') {
                Prefix::Nickname(nick.to_string(), rest.to_string(), String::new())
            } else {
                Prefix::Nickname(nick.to_string(), String::new(), rest.to_string())
            }
        } else if raw.contains('.') {
            Prefix::ServerName(raw.to_string())
        } else {
            Prefix::Nickname(raw.to_string(), String::new(), String::new())
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_user_prefix() {
        let p = Prefix::parse("alice!alice@alice.example");
        assert_eq!(
            p,
            Prefix::Nickname("alice".into(), "alice".into(), "alice.example".into())
        );
        assert_eq!(p.to_string(), "alice!alice@alice.example");
    }

    #[test]
    fn parses_server_prefix() {
        assert_eq!(
            Prefix::parse("irc.example.net"),
            Prefix::ServerName("irc.example.net".into())
        );
    }

    #[test]
    fn parses_bare_nick() {
        assert_eq!(
            Prefix::parse("alice"),
            Prefix::Nickname("alice".into(), String::new(), String::new())
        );
    }

    #[test]
    fn parses_nick_at_host() {
        assert_eq!(
            Prefix::parse("alice@example.org"),
            Prefix::Nickname("alice".into(), String::new(), "example.org".into())
        );
    }

    #[test]
    fn displays_partial_prefix_without_separators() {
        let p = Prefix::Nickname("alice".into(), String::new(), String::new());
        assert_eq!(p.to_string(), "alice");
    }
}
