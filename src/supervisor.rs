//! Run lifecycle and signal handling
//!
//! The supervisor owns the handle of the build container and is the only
//! place that listens for SIGINT/SIGTERM. It drives the run as a future; on a
//! signal that future is dropped (which kills the attached container client),
//! the container is stopped by name, and the run ends with
//! [`MatrixError::Interrupted`]. Nothing is written to the ledger for the
//! project that was in flight.

use crate::error::{MatrixError, MatrixResult};
use crate::orchestration::{ContainerHandle, ContainerRuntime};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Signal that ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT (Ctrl-C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl ShutdownSignal {
    /// Conventional signal number
    pub fn number(&self) -> u8 {
        match self {
            Self::Interrupt => 2,
            Self::Terminate => 15,
        }
    }

    /// Exit status of a process ended by this signal
    pub fn exit_code(&self) -> u8 {
        128 + self.number()
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Guards the build container across the whole run
pub struct Supervisor {
    runtime: Arc<dyn ContainerRuntime>,
    handle: ContainerHandle,
    grace: Duration,
}

impl Supervisor {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, handle: ContainerHandle, grace: Duration) -> Self {
        Self {
            runtime,
            handle,
            grace,
        }
    }

    /// Handle of the container builds must run under
    pub fn handle(&self) -> &ContainerHandle {
        &self.handle
    }

    /// Remove a container left behind by a run that died without cleanup
    pub async fn clear_stale(&self) -> MatrixResult<()> {
        debug!("Removing leftover container {}", self.handle.name());
        self.runtime.remove(self.handle.name()).await
    }

    /// Drive `work` until it finishes or a shutdown signal arrives
    pub async fn supervise<F, T>(&self, work: F) -> MatrixResult<T>
    where
        F: Future<Output = MatrixResult<T>>,
    {
        let listener = SignalListener::install()?;
        self.supervise_until(work, listener.recv()).await
    }

    /// Drive `work` until it finishes or `shutdown` resolves
    pub async fn supervise_until<F, S, T>(&self, work: F, shutdown: S) -> MatrixResult<T>
    where
        F: Future<Output = MatrixResult<T>>,
        S: Future<Output = ShutdownSignal>,
    {
        // The losing branch is dropped before its handler runs, so the
        // container client is already gone when the stop is issued.
        tokio::select! {
            result = work => result,
            signal = shutdown => {
                warn!("Received {}, stopping container {}", signal, self.handle.name());
                if let Err(e) = self.runtime.stop(self.handle.name(), self.grace).await {
                    warn!("Failed to stop container {}: {}", self.handle.name(), e);
                }
                Err(MatrixError::Interrupted(signal))
            }
        }
    }
}

/// Process signal handlers, registered once per run
struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl SignalListener {
    #[cfg(unix)]
    fn install() -> MatrixResult<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt())
            .map_err(|e| MatrixError::io("installing SIGINT handler", e))?;
        let terminate = signal(SignalKind::terminate())
            .map_err(|e| MatrixError::io("installing SIGTERM handler", e))?;
        Ok(Self {
            interrupt,
            terminate,
        })
    }

    #[cfg(not(unix))]
    fn install() -> MatrixResult<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
        }
    }

    #[cfg(not(unix))]
    async fn recv(self) -> ShutdownSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Ctrl-C handler failed: {}", e);
            std::future::pending::<()>().await;
        }
        ShutdownSignal::Interrupt
    }
}
