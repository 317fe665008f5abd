//! Protocol error types.

use thiserror::Error;

/// Errors produced when parsing a line into a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    #[error("empty message")]
    EmptyMessage,

    #[error("invalid command")]
    InvalidCommand,
}
