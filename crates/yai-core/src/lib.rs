//! Minimal request-dispatch server for the yAI booking backend.
//!
//! Clients open a TCP connection and send a 4-byte big-endian handler
//! identifier. The identifier indexes a [`DispatchTable`] fixed at startup;
//! the matching [`Handler`] then owns the connection, reads whatever request
//! bytes it expects and writes one or more length-prefixed envelopes built
//! with [`EnvelopeBuilder`]. Unknown or short identifiers receive the
//! unrecognized reply and the connection is closed.
//!
//! Each connection runs as its own task on a single-threaded `tokio`
//! runtime, so a handler that fails or panics only ends its own connection.
//! [`run_server`] wires configuration from [`yai_config`], structured
//! telemetry and the shutdown signal around the listener.

mod bootstrap;
pub mod client;
pub mod dispatch;
pub mod envelope;
mod process;
mod stream;
mod telemetry;
pub mod transport;

pub use bootstrap::{ConfigLoader, StaticConfigLoader, SystemConfigLoader};
pub use dispatch::{DispatchTable, Handler, HandlerError};
pub use envelope::{EncodedEnvelope, Envelope, EnvelopeBuilder, EnvelopeError, PayloadReader};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_server, serve,
    serve_listener,
};
pub use stream::{ConnectionStream, Stream, StreamError};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod tests;
