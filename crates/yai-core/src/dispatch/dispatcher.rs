//! Per-connection identifier resolution and routing.
//!
//! A connection starts in the resolving state: the dispatcher makes a single
//! read of [`IDENTIFIER_WIDTH`] bytes. A full, in-range identifier routes the
//! stream to its handler; anything else rejects the connection with
//! [`UNRECOGNIZED_REPLY`](crate::envelope::UNRECOGNIZED_REPLY).

use std::net::SocketAddr;

use tracing::{debug, info, warn};

use crate::envelope::EncodedEnvelope;
use crate::stream::{Stream, StreamError};

use super::errors::DispatchError;
use super::table::{DispatchTable, IDENTIFIER_WIDTH, Identifier};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Terminal state of a dispatched connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The stream was handed to the handler at `identifier`.
    Routed {
        /// Resolved identifier.
        identifier: Identifier,
    },
    /// The connection received the unrecognized reply.
    Rejected(Rejection),
}

/// Why a connection was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fewer than [`IDENTIFIER_WIDTH`] bytes arrived in the first read.
    ShortRead {
        /// Bytes received.
        received: usize,
    },
    /// The identifier does not index the table.
    OutOfRange {
        /// Identifier the client sent.
        identifier: Identifier,
    },
}

/// Reads the identifier and decides where the connection goes.
///
/// # Errors
///
/// Propagates transport failures from the identifier read.
pub async fn resolve(
    table: &DispatchTable,
    stream: &mut dyn Stream,
) -> Result<Resolution, StreamError> {
    let mut bytes = [0_u8; IDENTIFIER_WIDTH];
    let received = stream.read(&mut bytes).await?;
    if received != IDENTIFIER_WIDTH {
        return Ok(Resolution::Rejected(Rejection::ShortRead { received }));
    }

    let identifier = Identifier::from_be_bytes(bytes);
    if table.get(identifier).is_some() {
        Ok(Resolution::Routed { identifier })
    } else {
        Ok(Resolution::Rejected(Rejection::OutOfRange { identifier }))
    }
}

/// Resolves the connection, then runs its handler or writes the unrecognized
/// reply.
///
/// # Errors
///
/// Returns [`DispatchError::Stream`] for transport failures outside the
/// handler and [`DispatchError::Handler`] for errors the handler propagates.
pub async fn dispatch(
    table: &DispatchTable,
    stream: &mut dyn Stream,
) -> Result<Resolution, DispatchError> {
    let resolution = resolve(table, stream).await?;
    if let Resolution::Routed { identifier } = resolution
        && let Some(handler) = table.get(identifier)
    {
        debug!(
            target: DISPATCH_TARGET,
            identifier,
            handler = handler.name(),
            "dispatching connection"
        );
        handler
            .handle(stream)
            .await
            .map_err(|source| DispatchError::Handler {
                identifier,
                name: handler.name(),
                source,
            })?;
    } else {
        info!(
            target: DISPATCH_TARGET,
            ?resolution,
            handlers = table.len(),
            "unrecognized handler"
        );
        EncodedEnvelope::unrecognized().send(stream).await?;
    }
    Ok(resolution)
}

/// Task body for one accepted connection. Errors end the task; only those
/// other than a peer close are reported.
pub async fn run_connection(table: &DispatchTable, stream: &mut dyn Stream, peer: SocketAddr) {
    match dispatch(table, stream).await {
        Ok(resolution) => {
            debug!(target: DISPATCH_TARGET, %peer, ?resolution, "connection complete");
        }
        Err(error) if error.is_peer_close() => {
            debug!(target: DISPATCH_TARGET, %peer, %error, "peer closed connection");
        }
        Err(error) => {
            warn!(target: DISPATCH_TARGET, %peer, %error, "connection dispatch failed");
        }
    }
}
