//! Shared world for dispatch scenarios: a live server on a loopback port.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::runtime::{Builder, Runtime};

use yai_config::ListenEndpoint;

use crate::dispatch::DispatchTable;
use crate::dispatch::test_support::{EchoHandler, FailingHandler, TaggedHandler};
use crate::envelope::Envelope;
use crate::transport::{ListenerHandle, SocketListener};

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// Server, runtime and the last reply a scenario received.
pub struct DispatchWorld {
    runtime: Runtime,
    listener: Option<ListenerHandle>,
    address: Option<SocketAddr>,
    reply: Option<Vec<u8>>,
}

impl DispatchWorld {
    /// Builds a world with its own runtime and no server.
    pub fn new() -> Self {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("build runtime");
        Self {
            runtime,
            listener: None,
            address: None,
            reply: None,
        }
    }

    /// Starts a server whose table is `[tagged "zero", echo, failing]`.
    pub fn start_server(&mut self) {
        let table = Arc::new(DispatchTable::new(vec![
            Box::new(TaggedHandler::new("zero")),
            Box::new(EchoHandler),
            Box::new(FailingHandler),
        ]));
        let (address, handle) = self.runtime.block_on(async {
            let listener = SocketListener::bind(&ListenEndpoint::tcp("127.0.0.1", 0))
                .await
                .expect("bind listener");
            let address = listener.local_addr();
            (address, listener.start(table))
        });
        self.address = Some(address);
        self.listener = Some(handle);
    }

    /// Sends raw bytes, closes the write half and records everything the
    /// server writes back.
    pub fn send(&mut self, bytes: &[u8]) {
        let address = self.address.expect("server started");
        let reply = self.runtime.block_on(async {
            let mut client = TcpStream::connect(address).await.expect("connect");
            client.write_all(bytes).await.expect("write request");
            client.shutdown().await.expect("close write half");
            let mut reply = Vec::new();
            // Failing handlers may reset instead of closing cleanly.
            let _ = tokio::time::timeout(REPLY_TIMEOUT, client.read_to_end(&mut reply)).await;
            reply
        });
        self.reply = Some(reply);
    }

    /// Last raw reply.
    pub fn reply(&self) -> &[u8] {
        self.reply.as_deref().expect("a request was sent")
    }

    /// Last reply decoded as an envelope.
    pub fn envelope(&self) -> Envelope {
        Envelope::decode(self.reply()).expect("decode reply")
    }
}

impl Drop for DispatchWorld {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.take() {
            handle.shutdown();
            let _ = self.runtime.block_on(handle.join());
        }
    }
}
