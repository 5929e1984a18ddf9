//! Listener implementation for the dispatch server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, lookup_host};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use yai_config::ListenEndpoint;

use crate::dispatch::{DispatchTable, run_connection};
use crate::stream::ConnectionStream;

use super::{LISTENER_TARGET, ListenerError};

const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener bound to a TCP endpoint.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: ListenEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl SocketListener {
    /// Resolves and binds `endpoint`.
    ///
    /// # Errors
    ///
    /// Fails when the host does not resolve or the address cannot be bound.
    pub async fn bind(endpoint: &ListenEndpoint) -> Result<Self, ListenerError> {
        let addr = resolve(endpoint).await?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ListenerError::BindTcp { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
        })
    }

    /// Address actually bound; differs from the endpoint when port `0` was
    /// requested.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns the accept loop on the current runtime.
    pub fn start(self, table: Arc<DispatchTable>) -> ListenerHandle {
        let (shutdown, receiver) = watch::channel(false);
        let task = tokio::spawn(self.serve(table, receiver));
        ListenerHandle {
            shutdown,
            task: Some(task),
        }
    }

    /// Accepts connections until `shutdown` becomes `true` or its sender is
    /// dropped. Connections already accepted keep running.
    pub async fn serve(self, table: Arc<DispatchTable>, mut shutdown: watch::Receiver<bool>) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            addr = %self.local_addr,
            handlers = table.len(),
            "socket listener active"
        );
        let mut last_error = None::<io::ErrorKind>;
        loop {
            let stop = *shutdown.borrow_and_update();
            if stop {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, peer)) => {
                        last_error = None;
                        debug!(target: LISTENER_TARGET, %peer, "connection accepted");
                        let table = Arc::clone(&table);
                        tokio::spawn(async move {
                            let mut stream = ConnectionStream::new(socket);
                            run_connection(&table, &mut stream, peer).await;
                        });
                    }
                    Err(error) => {
                        let kind = error.kind();
                        if last_error != Some(kind) {
                            warn!(
                                target: LISTENER_TARGET,
                                error = %error,
                                "socket accept error"
                            );
                        }
                        last_error = Some(kind);
                        tokio::time::sleep(ERROR_BACKOFF).await;
                    }
                },
            }
        }
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "socket listener stopped"
        );
    }
}

/// Handle to the spawned accept loop.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop taking connections.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Waits for the accept loop to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Task`] if the loop panicked or was cancelled.
    pub async fn join(mut self) -> Result<(), ListenerError> {
        match self.task.take() {
            Some(task) => task.await.map_err(|source| ListenerError::Task { source }),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

async fn resolve(endpoint: &ListenEndpoint) -> Result<SocketAddr, ListenerError> {
    let mut addrs = lookup_host(endpoint.as_pair())
        .await
        .map_err(|source| ListenerError::Resolve {
            host: endpoint.host.clone(),
            port: endpoint.port,
            source,
        })?;
    addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: endpoint.host.clone(),
        port: endpoint.port,
    })
}
