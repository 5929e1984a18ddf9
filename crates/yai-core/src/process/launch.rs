use std::sync::Arc;

use tokio::runtime::Builder;
use tracing::info;

use yai_config::ListenEndpoint;

use crate::bootstrap::ConfigLoader;
use crate::dispatch::DispatchTable;
use crate::telemetry;
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::ShutdownSignal;

/// Loads configuration, installs telemetry and serves `table` on a
/// single-threaded runtime until `signal` fires.
///
/// Connections still in flight when the signal arrives are abandoned with the
/// runtime rather than drained.
///
/// # Errors
///
/// Fails when configuration, telemetry, the runtime, the bind or the signal
/// listener fails.
pub fn run_server(
    loader: &dyn ConfigLoader,
    table: DispatchTable,
    signal: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let config = loader.load()?;
    telemetry::initialise(&config)?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| LaunchError::Runtime { source })?;
    let result = runtime.block_on(serve(&config.listen_endpoint(), Arc::new(table), signal));
    runtime.shutdown_background();
    result
}

/// Binds `endpoint` and serves until `signal` fires.
///
/// # Errors
///
/// See [`serve_listener`]; additionally fails when the bind fails.
pub async fn serve(
    endpoint: &ListenEndpoint,
    table: Arc<DispatchTable>,
    signal: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let listener = SocketListener::bind(endpoint).await?;
    serve_listener(listener, table, signal).await
}

/// Runs the accept loop of an already bound listener until `signal` fires,
/// then stops accepting.
///
/// # Errors
///
/// Fails when the signal listener cannot be installed or the accept loop
/// panics.
pub async fn serve_listener(
    listener: SocketListener,
    table: Arc<DispatchTable>,
    signal: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let addr = listener.local_addr();
    info!(
        target: PROCESS_TARGET,
        %addr,
        handlers = ?table,
        "dispatch server ready"
    );
    let handle = listener.start(table);
    let waited = signal.wait().await;
    handle.shutdown();
    handle.join().await?;
    waited?;
    info!(target: PROCESS_TARGET, %addr, "dispatch server stopped");
    Ok(())
}
