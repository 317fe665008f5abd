//! Error handling for the daemon.
//!
//! Handlers never raise across the event boundary: anything a client can
//! trigger becomes a numeric reply, and the dispatcher converts the few
//! typed failures below into replies or log lines scoped to one session.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::replies::{self, Outbound};

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough parameters")]
    NeedMoreParams,

    #[error("send error: {0}")]
    Send(#[from] mpsc::error::SendError<Outbound>),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a client-visible numeric reply, when one applies.
    pub fn to_reply(&self, verb: &str) -> Option<Outbound> {
        match self {
            HandlerError::NeedMoreParams => Some(replies::err_needmoreparams(verb)),
            HandlerError::Send(_) | HandlerError::Internal(_) => None,
        }
    }
}
