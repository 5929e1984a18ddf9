//! Minimal async client for the dispatch protocol.
//!
//! A call opens a fresh connection, writes the identifier followed by the
//! request bytes and reads exactly one envelope back.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpStream;
use tracing::debug;

use yai_config::ListenEndpoint;

use crate::dispatch::{IDENTIFIER_WIDTH, Identifier};
use crate::envelope::{Envelope, EnvelopeError};
use crate::stream::{ConnectionStream, Stream, StreamError};

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");

/// Errors raised by [`Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint that was dialled.
        endpoint: ListenEndpoint,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Writing the request failed.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// The reply was not a well-formed envelope.
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Client bound to one server endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: ListenEndpoint,
}

impl Client {
    /// Creates a client for `endpoint`.
    pub fn new(endpoint: ListenEndpoint) -> Self {
        Self { endpoint }
    }

    /// Creates a client for a resolved socket address.
    pub fn for_addr(addr: SocketAddr) -> Self {
        Self::new(ListenEndpoint::tcp(addr.ip().to_string(), addr.port()))
    }

    /// Opens a connection and routes it to `identifier`, leaving the stream
    /// for the caller to drive.
    ///
    /// # Errors
    ///
    /// Fails when the connection cannot be opened or the identifier write
    /// fails.
    pub async fn open(
        &self,
        identifier: Identifier,
    ) -> Result<ConnectionStream<TcpStream>, ClientError> {
        let mut stream = self.connect().await?;
        stream.write(&identifier.to_be_bytes()).await?;
        Ok(stream)
    }

    /// Sends `request` to handler `identifier` and returns its reply.
    ///
    /// # Errors
    ///
    /// Fails on connection, transport or decoding errors. Error envelopes are
    /// returned as values; inspect [`Envelope::is_success`].
    pub async fn call(
        &self,
        identifier: Identifier,
        request: &[u8],
    ) -> Result<Envelope, ClientError> {
        let mut stream = self.connect().await?;
        let mut message = Vec::with_capacity(IDENTIFIER_WIDTH + request.len());
        message.extend_from_slice(&identifier.to_be_bytes());
        message.extend_from_slice(request);
        stream.write(&message).await?;

        let envelope = Envelope::read_from(&mut stream).await?;
        debug!(
            target: CLIENT_TARGET,
            endpoint = %self.endpoint,
            identifier,
            status = envelope.status(),
            payload_len = envelope.payload().len(),
            "call complete"
        );
        Ok(envelope)
    }

    async fn connect(&self) -> Result<ConnectionStream<TcpStream>, ClientError> {
        let socket = TcpStream::connect(self.endpoint.as_pair())
            .await
            .map_err(|source| ClientError::Connect {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        Ok(ConnectionStream::new(socket))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::dispatch::DispatchTable;
    use crate::dispatch::test_support::{EchoHandler, TaggedHandler};
    use crate::envelope::STATUS_ERROR;
    use crate::transport::{ListenerHandle, SocketListener};

    async fn server() -> (Client, ListenerHandle) {
        let listener = SocketListener::bind(&ListenEndpoint::tcp("127.0.0.1", 0))
            .await
            .expect("bind");
        let client = Client::for_addr(listener.local_addr());
        let table = DispatchTable::new(vec![
            Box::new(TaggedHandler::new("zero")),
            Box::new(EchoHandler),
        ]);
        (client, listener.start(Arc::new(table)))
    }

    #[rstest]
    #[tokio::test]
    async fn call_returns_handler_reply() {
        let (client, handle) = server().await;
        let mut request = 3_u32.to_be_bytes().to_vec();
        request.extend_from_slice(b"abc");

        let envelope = client.call(1, &request).await.expect("call");
        assert!(envelope.is_success());
        assert_eq!(envelope.payload(), b"abc");
        handle.shutdown();
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_identifiers_yield_error_envelopes() {
        let (client, handle) = server().await;

        let envelope = client.call(2, &[]).await.expect("call");
        assert_eq!(envelope.status(), STATUS_ERROR);
        assert!(envelope.errors().expect("errors").is_empty());
        handle.shutdown();
    }

    #[rstest]
    #[tokio::test]
    async fn open_leaves_the_stream_to_the_caller() {
        let (client, handle) = server().await;

        let mut stream = client.open(0).await.expect("open");
        let envelope = Envelope::read_from(&mut stream).await.expect("read");
        assert_eq!(envelope.reader().read_string().expect("tag"), "zero");
        handle.shutdown();
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_servers_report_the_endpoint() {
        let reserved = std::net::TcpListener::bind("127.0.0.1:0").expect("reserve port");
        let addr = reserved.local_addr().expect("addr");
        drop(reserved);

        let error = Client::for_addr(addr)
            .call(0, &[])
            .await
            .expect_err("nothing listens");
        assert!(matches!(error, ClientError::Connect { .. }));
    }
}
