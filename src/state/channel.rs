//! Channel state.

use std::collections::HashSet;

use super::ConnId;

/// A channel. Created on the first JOIN, deleted when the last member
/// leaves.
#[derive(Debug)]
pub struct Channel {
    /// Display name, starts with `#`.
    pub name: String,
    pub topic: String,
    pub modes: String,
    /// Members in join order.
    pub members: Vec<ConnId>,
    pub operators: HashSet<ConnId>,
    pub voiced: HashSet<ConnId>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Channel {
        Channel {
            name: name.into(),
            topic: String::new(),
            modes: String::new(),
            members: Vec::new(),
            operators: HashSet::new(),
            voiced: HashSet::new(),
        }
    }

    pub fn is_member(&self, conn: ConnId) -> bool {
        self.members.contains(&conn)
    }

    pub fn add_member(&mut self, conn: ConnId) {
        if !self.is_member(conn) {
            self.members.push(conn);
        }
    }

    /// Remove a member, keeping the operator and voiced sets subsets of
    /// the membership.
    pub fn remove_member(&mut self, conn: ConnId) {
        self.members.retain(|&m| m != conn);
        self.operators.remove(&conn);
        self.voiced.remove(&conn);
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// `@` for operators, `+` for voiced, used in NAMES.
    pub fn names_prefix(&self, conn: ConnId) -> &'static str {
        if self.operators.contains(&conn) {
            "@"
        } else if self.voiced.contains(&conn) {
            "+"
        } else {
            ""
        }
    }

    /// Role prefix for WHOIS channel lists; both roles show.
    pub fn whois_prefix(&self, conn: ConnId) -> String {
        let mut prefix = String::new();
        if self.operators.contains(&conn) {
            prefix.push('@');
        }
        if self.voiced.contains(&conn) {
            prefix.push('+');
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_member_clears_roles() {
        let mut chan = Channel::new("#x");
        let a = ConnId::from_raw(1);
        chan.add_member(a);
        chan.operators.insert(a);
        chan.voiced.insert(a);

        chan.remove_member(a);
        assert!(chan.is_empty());
        assert!(chan.operators.is_empty());
        assert!(chan.voiced.is_empty());
    }

    #[test]
    fn add_member_is_idempotent() {
        let mut chan = Channel::new("#x");
        let a = ConnId::from_raw(1);
        chan.add_member(a);
        chan.add_member(a);
        assert_eq!(chan.members.len(), 1);
    }

    #[test]
    fn role_prefixes() {
        let mut chan = Channel::new("#x");
        let a = ConnId::from_raw(1);
        let b = ConnId::from_raw(2);
        chan.add_member(a);
        chan.add_member(b);
        chan.operators.insert(a);
        chan.voiced.insert(b);

        assert_eq!(chan.names_prefix(a), "@");
        assert_eq!(chan.names_prefix(b), "+");
        assert_eq!(chan.whois_prefix(a), "@");

        chan.voiced.insert(a);
        assert_eq!(chan.whois_prefix(a), "@+");
    }
}
