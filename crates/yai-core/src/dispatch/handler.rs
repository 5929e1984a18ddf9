//! The capability every dispatch table entry implements.

use async_trait::async_trait;
use thiserror::Error;

use crate::envelope::EnvelopeError;
use crate::stream::{Stream, StreamError};

/// Errors a handler may propagate back to the dispatcher.
///
/// The dispatcher only logs these; handlers that want the client to see a
/// failure write an error envelope before returning.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Reading from or writing to the connection failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// Building or decoding an envelope failed.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    /// Handler-specific failure.
    #[error("{message}")]
    Failed {
        /// Human-readable description.
        message: String,
    },
}

impl HandlerError {
    /// Creates a handler-specific failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Returns `true` when the failure is the peer closing the connection.
    pub fn is_peer_close(&self) -> bool {
        match self {
            Self::Stream(error) | Self::Envelope(EnvelopeError::Stream(error)) => {
                error.is_peer_close()
            }
            Self::Envelope(_) | Self::Failed { .. } => false,
        }
    }
}

/// Serves one connection after its identifier has been resolved.
///
/// The handler owns the remainder of the connection: it may read request
/// bytes, must write its own responses, and returns once it is done with the
/// stream. Implementations must not block the executor thread.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Handles the connection.
    async fn handle(&self, stream: &mut dyn Stream) -> Result<(), HandlerError>;
}
