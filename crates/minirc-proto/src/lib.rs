//! minirc-proto - IRC wire protocol support for minircd.
//!
//! This crate owns everything that touches the wire: the message grammar
//! (`[":" prefix SPACE] command SPACE params [" :" trailing]`), the framed
//! line codec with the 512-byte cap, the numeric reply catalogue, RFC 1459
//! casemapping, and fnmatch-style hostmask matching.
//!
//! The daemon parses incoming lines into [`MessageRef`] (borrowed, zero-copy)
//! and emits owned [`Message`] values through the codec.

pub mod casemap;
pub mod codec;
pub mod error;
pub mod hostmask;
pub mod message;
pub mod prefix;
pub mod response;
pub mod validation;

pub use casemap::{irc_eq, irc_to_lower};
pub use codec::{IrcCodec, MAX_LINE_LEN};
pub use error::MessageParseError;
pub use message::{Message, MessageRef};
pub use prefix::Prefix;
pub use response::Response;
