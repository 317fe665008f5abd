//! The object directory: the single owner of all User and Channel state.
//!
//! Indices are concurrent maps keyed by transport handle, lowercased nick
//! and lowercased channel name, so the hot lookups are O(1). All
//! inter-object references go through these indices; there is no direct
//! object-to-object ownership.
//!
//! Lock order: channel `RwLock` before user `RwLock`, and never hold a
//! DashMap shard guard across an await. Callers clone the `Arc` out of
//! the map, drop the guard, then lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use minirc_proto::{irc_to_lower, Message, Prefix};
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::channel::Channel;
use super::user::User;
use super::ConnId;
use crate::replies::Outbound;

/// Bound on each session's outbound queue. At the 512-byte line cap this
/// is roughly a 64 KiB send buffer; a laggard that overflows it is
/// disconnected.
pub const OUTBOUND_BUFFER: usize = 128;

/// Per-connection send handle.
pub struct ConnHandle {
    pub tx: mpsc::Sender<Outbound>,
    pub cancel: CancellationToken,
}

/// In-memory store of users, nicknames and channels.
pub struct Directory {
    next_conn: AtomicU64,
    pub users: DashMap<ConnId, Arc<RwLock<User>>>,
    pub nicks: DashMap<String, ConnId>,
    pub channels: DashMap<String, Arc<RwLock<Channel>>>,
    senders: DashMap<ConnId, ConnHandle>,
}

impl Default for Directory {
    fn default() -> Directory {
        Directory::new()
    }
}

impl Directory {
    pub fn new() -> Directory {
        Directory {
            next_conn: AtomicU64::new(1),
            users: DashMap::new(),
            nicks: DashMap::new(),
            channels: DashMap::new(),
            senders: DashMap::new(),
        }
    }

    /// Create a User for a freshly accepted connection and register its
    /// bounded send queue. Runs before the first byte is read.
    pub fn register(
        &self,
        host: String,
        port: u16,
    ) -> (ConnId, mpsc::Receiver<Outbound>, CancellationToken) {
        let conn = ConnId::from_raw(self.next_conn.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let cancel = CancellationToken::new();
        self.users
            .insert(conn, Arc::new(RwLock::new(User::new(conn, host, port))));
        self.senders.insert(
            conn,
            ConnHandle {
                tx,
                cancel: cancel.clone(),
            },
        );
        (conn, rx, cancel)
    }

    pub fn user(&self, conn: ConnId) -> Option<Arc<RwLock<User>>> {
        self.users.get(&conn).map(|entry| entry.value().clone())
    }

    pub fn conn_by_nick(&self, nick: &str) -> Option<ConnId> {
        self.nicks.get(&irc_to_lower(nick)).map(|entry| *entry.value())
    }

    pub fn channel(&self, name: &str) -> Option<Arc<RwLock<Channel>>> {
        self.channels
            .get(&irc_to_lower(name))
            .map(|entry| entry.value().clone())
    }

    /// Look up a channel, creating it on first JOIN.
    pub fn channel_or_create(&self, name: &str) -> Arc<RwLock<Channel>> {
        self.channels
            .entry(irc_to_lower(name))
            .or_insert_with(|| Arc::new(RwLock::new(Channel::new(name))))
            .value()
            .clone()
    }

    /// Reap a channel whose last member left.
    pub fn drop_channel(&self, name: &str) {
        self.channels.remove(&irc_to_lower(name));
    }

    /// Claim `new` for `conn`, releasing `old`. Returns false when another
    /// connection holds the nick.
    pub fn claim_nick(&self, conn: ConnId, old: &str, new: &str) -> bool {
        let new_key = irc_to_lower(new);
        if let Some(owner) = self.nicks.get(&new_key) {
            return *owner.value() == conn;
        }
        self.nicks.insert(new_key, conn);
        if !old.is_empty() {
            let old_key = irc_to_lower(old);
            let owned = self
                .nicks
                .get(&old_key)
                .is_some_and(|entry| *entry.value() == conn);
            if owned && old_key != irc_to_lower(new) {
                self.nicks.remove(&old_key);
            }
        }
        true
    }

    /// Queue a reply on the session's own send buffer, waiting for space.
    pub async fn send(&self, conn: ConnId, out: Outbound) {
        let tx = match self.senders.get(&conn) {
            Some(handle) => handle.tx.clone(),
            None => return,
        };
        let _ = tx.send(out).await;
    }

    /// Queue a message without waiting. A full buffer means the recipient
    /// is not keeping up; it is forced off the server.
    pub fn try_send(&self, conn: ConnId, out: Outbound) {
        let Some(handle) = self.senders.get(&conn) else {
            return;
        };
        if let Err(mpsc::error::TrySendError::Full(_)) = handle.tx.try_send(out) {
            warn!(conn = %conn, "send buffer overflow, disconnecting");
            handle.cancel.cancel();
        }
    }

    /// Fan one message out to many sessions, skipping `exclude`.
    pub fn broadcast(&self, targets: &[ConnId], message: &Message, exclude: &[ConnId]) {
        for &conn in targets {
            if exclude.contains(&conn) {
                continue;
            }
            self.try_send(conn, Outbound::from(message.clone()));
        }
    }

    /// Connections sharing at least one channel with `conn`, deduplicated.
    /// Includes `conn` itself when it is in any channel.
    pub async fn common_peers(&self, conn: ConnId) -> Vec<ConnId> {
        let channel_names = match self.user(conn) {
            Some(user_arc) => user_arc.read().await.channels.clone(),
            None => return Vec::new(),
        };
        let mut peers = Vec::new();
        for name in channel_names {
            if let Some(chan_arc) = self.channel(&name) {
                peers.extend(chan_arc.read().await.members.iter().copied());
            }
        }
        peers.sort_unstable();
        peers.dedup();
        peers
    }

    /// Tear a user down: leave every channel, reap empty channels, drop
    /// the nick index entry and the user record, then broadcast QUIT to
    /// the union of former co-members.
    pub async fn remove_user(&self, conn: ConnId, reason: &str) {
        let Some((_, user_arc)) = self.users.remove(&conn) else {
            self.drop_handle(conn);
            return;
        };

        let (source, nick, channel_names) = {
            let user = user_arc.read().await;
            (user.source(), user.nick.clone(), user.channels.clone())
        };

        let mut recipients = Vec::new();
        for name in &channel_names {
            let key = irc_to_lower(name);
            let chan_arc = match self.channels.get(&key) {
                Some(entry) => entry.value().clone(),
                None => continue,
            };
            let mut chan = chan_arc.write().await;
            chan.remove_member(conn);
            if chan.is_empty() {
                drop(chan);
                self.channels.remove(&key);
            } else {
                recipients.extend(chan.members.iter().copied());
            }
        }

        if !nick.is_empty() {
            let key = irc_to_lower(&nick);
            let owned = self
                .nicks
                .get(&key)
                .is_some_and(|entry| *entry.value() == conn);
            if owned {
                self.nicks.remove(&key);
            }
        }

        self.drop_handle(conn);

        recipients.sort_unstable();
        recipients.dedup();
        let (nick, user, host) = source;
        let quit = Message::quit(reason).with_prefix(Prefix::new(nick, user, host));
        debug!(conn = %conn, peers = recipients.len(), "quit fan-out");
        self.broadcast(&recipients, &quit, &[conn]);
    }

    fn drop_handle(&self, conn: ConnId) {
        if let Some((_, handle)) = self.senders.remove(&conn) {
            handle.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with_user(nick: &str) -> (Directory, ConnId) {
        let directory = Directory::new();
        let (conn, _rx, _cancel) = directory.register("127.0.0.1".into(), 1234);
        assert!(directory.claim_nick(conn, "", nick));
        (directory, conn)
    }

    #[tokio::test]
    async fn nick_claims_are_case_insensitive() {
        let (directory, conn) = directory_with_user("Alice");
        let (other, _rx, _cancel) = directory.register("127.0.0.1".into(), 1235);
        assert!(!directory.claim_nick(other, "", "alice"));
        assert!(!directory.claim_nick(other, "", "ALICE"));
        assert_eq!(directory.conn_by_nick("aLiCe"), Some(conn));
    }

    #[tokio::test]
    async fn claim_nick_releases_old_nick() {
        let (directory, conn) = directory_with_user("alice");
        assert!(directory.claim_nick(conn, "alice", "alicia"));
        assert_eq!(directory.conn_by_nick("alice"), None);
        assert_eq!(directory.conn_by_nick("alicia"), Some(conn));
    }

    #[tokio::test]
    async fn channel_keys_use_irc_casemapping() {
        let directory = Directory::new();
        let created = directory.channel_or_create("#Rust[1]");
        let found = directory.channel("#rust{1}").expect("casemapped lookup");
        assert!(Arc::ptr_eq(&created, &found));
    }

    #[tokio::test]
    async fn remove_user_reaps_empty_channels_and_nick() {
        let (directory, conn) = directory_with_user("alice");
        let chan_arc = directory.channel_or_create("#x");
        {
            let mut chan = chan_arc.write().await;
            chan.add_member(conn);
        }
        directory
            .user(conn)
            .unwrap()
            .write()
            .await
            .channels
            .push("#x".into());

        directory.remove_user(conn, "Leaving").await;
        assert!(directory.user(conn).is_none());
        assert!(directory.conn_by_nick("alice").is_none());
        assert!(directory.channel("#x").is_none());
    }

    #[tokio::test]
    async fn remove_user_broadcasts_quit_to_co_members() {
        let (directory, alice) = directory_with_user("alice");
        let (bob, mut bob_rx, _cancel) = directory.register("127.0.0.1".into(), 1236);
        assert!(directory.claim_nick(bob, "", "bob"));

        let chan_arc = directory.channel_or_create("#x");
        {
            let mut chan = chan_arc.write().await;
            chan.add_member(alice);
            chan.add_member(bob);
        }
        for (conn, name) in [(alice, "#x"), (bob, "#x")] {
            directory
                .user(conn)
                .unwrap()
                .write()
                .await
                .channels
                .push(name.into());
        }

        directory.remove_user(alice, "gone").await;

        let out = bob_rx.recv().await.expect("bob receives the quit");
        assert_eq!(out.message.command, "QUIT");
        assert_eq!(out.message.args, vec!["gone".to_string()]);
        // channel survives with bob in it
        let chan = directory.channel("#x").unwrap();
        assert_eq!(chan.read().await.members, vec![bob]);
    }

    #[tokio::test]
    async fn membership_symmetry_after_teardown() {
        // no channel may keep a member whose user record is gone
        let (directory, alice) = directory_with_user("alice");
        let chan_arc = directory.channel_or_create("#a");
        {
            let mut chan = chan_arc.write().await;
            chan.add_member(alice);
            chan.operators.insert(alice);
        }
        directory
            .user(alice)
            .unwrap()
            .write()
            .await
            .channels
            .push("#a".into());

        directory.remove_user(alice, "bye").await;
        for entry in directory.channels.iter() {
            assert!(!entry.value().read().await.members.contains(&alice));
        }
    }
}
