//! Graceful shutdown on Ctrl+C or SIGTERM

use std::{fmt, io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to install {signal} handler: {source}")]
    Install {
        signal: ShutdownSignal,
        #[source]
        source: io::Error,
    },
}

/// The signal that stopped the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShutdownSignal {
    CtrlC,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CtrlC => "Ctrl+C",
            Self::Terminate => "terminate",
        })
    }
}

fn install_error(signal: ShutdownSignal) -> impl FnOnce(io::Error) -> ShutdownSignalError {
    move |source| ShutdownSignalError::Install { signal, source }
}

async fn ctrl_c() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::ctrl_c()
        .await
        .map_err(install_error(ShutdownSignal::CtrlC))?;

    Ok(ShutdownSignal::CtrlC)
}

#[cfg(unix)]
async fn terminate() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(install_error(ShutdownSignal::Terminate))?
        .recv()
        .await;

    Ok(ShutdownSignal::Terminate)
}

#[cfg(windows)]
async fn terminate() -> Result<ShutdownSignal, ShutdownSignalError> {
    signal::windows::ctrl_close()
        .map_err(install_error(ShutdownSignal::Terminate))?
        .recv()
        .await;

    Ok(ShutdownSignal::Terminate)
}

/// Wait for a shutdown signal, then give in-flight requests `grace` to finish.
pub(crate) async fn listen(handle: ServerHandle, grace: Duration) -> Result<(), ShutdownSignalError> {
    let signal = tokio::select! {
        signal = ctrl_c() => signal?,
        signal = terminate() => signal?,
    };

    info!(
        %signal,
        grace_seconds = grace.as_secs(),
        "shutdown signal received, draining requests"
    );

    handle.stop_graceful(Some(grace));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_error_names_signal() {
        let error = install_error(ShutdownSignal::Terminate)(io::Error::other("denied"));

        assert_eq!(
            error.to_string(),
            "failed to install terminate handler: denied"
        );
    }
}
