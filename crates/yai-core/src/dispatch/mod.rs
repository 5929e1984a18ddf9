//! Positional request dispatch.
//!
//! Clients open a connection and send a 4-byte big-endian identifier. The
//! identifier indexes a [`DispatchTable`] fixed at startup; the matching
//! [`Handler`] receives the connection's [`Stream`](crate::Stream) and owns it
//! from then on. Identifiers that are short or out of range receive the
//! unrecognized reply (status 1, empty payload) and the connection ends.
//!
//! Table order is part of the wire contract: moving an entry changes which
//! handler existing clients reach.

mod dispatcher;
mod errors;
mod handler;
mod table;
#[cfg(test)]
pub(crate) mod test_support;

pub use self::dispatcher::{Rejection, Resolution, dispatch, resolve, run_connection};
pub use self::errors::DispatchError;
pub use self::handler::{Handler, HandlerError};
pub use self::table::{DispatchTable, IDENTIFIER_WIDTH, Identifier};
