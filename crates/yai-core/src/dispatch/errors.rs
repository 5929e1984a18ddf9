//! Error types for connection dispatch failures.

use thiserror::Error;

use crate::stream::StreamError;

use super::handler::HandlerError;
use super::table::Identifier;

/// Errors surfaced while dispatching a single connection.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Reading the identifier or writing the unrecognized reply failed.
    #[error("connection stream failed: {0}")]
    Stream(#[from] StreamError),
    /// The routed handler returned an error.
    #[error("handler {identifier} ({name}) failed: {source}")]
    Handler {
        /// Identifier the client sent.
        identifier: Identifier,
        /// Handler name, for logs.
        name: &'static str,
        /// Error returned by the handler.
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns `true` when the failure is the peer closing the connection,
    /// which is not worth reporting.
    pub fn is_peer_close(&self) -> bool {
        match self {
            Self::Stream(error) => error.is_peer_close(),
            Self::Handler { source, .. } => source.is_peer_close(),
        }
    }
}
