//! TCP listener for the dispatch server.
//!
//! The transport module binds the configured endpoint and runs the accept
//! loop as a task on the current runtime, spawning one dispatch task per
//! accepted connection.

mod errors;
mod listener;

pub use self::errors::ListenerError;
pub use self::listener::{ListenerHandle, SocketListener};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
