//! User state.

use super::ConnId;

/// A connected user.
///
/// Created on accept, deleted on disconnect. `conn` is the opaque
/// transport handle and never changes for the lifetime of the session.
#[derive(Debug)]
pub struct User {
    pub conn: ConnId,
    /// Peer address as seen on accept (numeric).
    pub host: String,
    #[allow(dead_code)]
    pub port: u16,
    /// Empty until the first NICK.
    pub nick: String,
    pub modes: UserModes,
    /// True once nick, ident and hostname resolution are all in.
    pub registered: bool,
    /// Signon timestamp; set exactly once, when the welcome burst runs.
    pub signon: Option<i64>,
    /// Reverse-DNS still outstanding; signon is suppressed until cleared.
    pub lookup_pending: bool,
    pub info: UserInfo,
    /// Channels this user is in, in join order (display names).
    pub channels: Vec<String>,
}

/// Identity details supplied by USER and the hostname lookup.
#[derive(Debug, Default)]
pub struct UserInfo {
    /// Ident.
    pub user: String,
    /// Resolved hostname, else the numeric address.
    pub host: String,
    /// Realname.
    pub name: String,
    #[allow(dead_code)]
    pub server: String,
}

impl User {
    pub fn new(conn: ConnId, host: String, port: u16) -> User {
        User {
            conn,
            host,
            port,
            nick: String::new(),
            modes: UserModes::default(),
            registered: false,
            signon: None,
            lookup_pending: true,
            info: UserInfo::default(),
            channels: Vec::new(),
        }
    }

    /// `nick!ident@host`, recomputed on demand.
    pub fn prefix(&self) -> String {
        let (nick, user, host) = self.source();
        format!("{}!{}@{}", nick, user, host)
    }

    /// The (nick, ident, host) triple used as sender identity.
    pub fn source(&self) -> (String, String, String) {
        let host = if self.info.host.is_empty() {
            self.host.clone()
        } else {
            self.info.host.clone()
        };
        (self.nick.clone(), self.info.user.clone(), host)
    }
}

/// User modes as an ordered letter string (`i`, `o`, ...).
#[derive(Debug, Default, Clone)]
pub struct UserModes {
    flags: String,
}

impl UserModes {
    pub fn contains(&self, mode: char) -> bool {
        self.flags.contains(mode)
    }

    /// Add a mode letter. Returns false if it was already set.
    pub fn insert(&mut self, mode: char) -> bool {
        if self.contains(mode) {
            return false;
        }
        self.flags.push(mode);
        true
    }

    /// Remove a mode letter. Returns false if it was not set.
    pub fn remove(&mut self, mode: char) -> bool {
        if !self.contains(mode) {
            return false;
        }
        self.flags.retain(|c| c != mode);
        true
    }

    pub fn is_oper(&self) -> bool {
        self.contains('o')
    }

    /// Convert modes to a string like "+io".
    pub fn as_mode_string(&self) -> String {
        format!("+{}", self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_prefers_resolved_host() {
        let mut user = User::new(ConnId::from_raw(1), "127.0.0.1".into(), 40000);
        user.nick = "alice".into();
        user.info.user = "alice".into();
        assert_eq!(user.prefix(), "alice!alice@127.0.0.1");

        user.info.host = "alice.example".into();
        assert_eq!(user.prefix(), "alice!alice@alice.example");
    }

    #[test]
    fn mode_insert_is_idempotent() {
        let mut modes = UserModes::default();
        assert!(modes.insert('i'));
        assert!(!modes.insert('i'));
        assert_eq!(modes.as_mode_string(), "+i");
    }

    #[test]
    fn mode_remove_is_idempotent() {
        let mut modes = UserModes::default();
        modes.insert('i');
        modes.insert('o');
        assert!(modes.remove('i'));
        assert!(!modes.remove('i'));
        assert_eq!(modes.as_mode_string(), "+o");
    }
}
