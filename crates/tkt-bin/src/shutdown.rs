// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! The coordinator turns SIGTERM/SIGINT (or Ctrl+C on Windows) into a
//! broadcast that the HTTP server and the runtime both wait on.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use crate::error::{BinError, BinResult};

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown across the server and its background tasks.
///
/// # Example
///
/// ```ignore
/// use tkt_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
/// let signal = coordinator.shutdown_signal();
///
/// tokio::spawn({
///     let coordinator = coordinator.clone();
///     async move { coordinator.listen_for_signals().await }
/// });
///
/// server.run_with_shutdown(signal).await?;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribes to shutdown notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Returns a future that resolves once shutdown is initiated.
    ///
    /// Resolves immediately if shutdown already happened.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut receiver = self.sender.subscribe();
        let initiated = self.shutdown_initiated.clone();
        async move {
            if initiated.load(Ordering::SeqCst) {
                return;
            }
            let _ = receiver.recv().await;
        }
    }

    /// Initiates shutdown. Idempotent.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.sender.send(());
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for an OS termination signal, then initiates shutdown.
    pub async fn listen_for_signals(&self) -> BinResult<()> {
        wait_for_os_signal().await?;
        self.initiate_shutdown();
        Ok(())
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() -> BinResult<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let register = |kind: SignalKind, name: &str| {
        signal(kind).map_err(|e| BinError::init(format!("Failed to register {} handler: {}", name, e)))
    };
    let mut sigterm = register(SignalKind::terminate(), "SIGTERM")?;
    let mut sigint = register(SignalKind::interrupt(), "SIGINT")?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM"),
        _ = sigint.recv() => info!("Received SIGINT"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> BinResult<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| BinError::init(format!("Failed to register Ctrl+C handler: {}", e)))?;
    info!("Received Ctrl+C");
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_coordinator() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();

        assert!(!coordinator.is_shutdown_initiated());
        coordinator.initiate_shutdown();

        assert!(coordinator.is_shutdown_initiated());
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_signal() {
        let coordinator = ShutdownCoordinator::new();
        let signal = coordinator.shutdown_signal();

        let trigger = coordinator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.initiate_shutdown();
        });

        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .expect("shutdown signal should resolve");
    }

    #[tokio::test]
    async fn test_signal_after_shutdown_resolves_immediately() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.initiate_shutdown();

        tokio::time::timeout(Duration::from_millis(100), coordinator.shutdown_signal())
            .await
            .expect("late subscribers must not hang");
    }

    #[tokio::test]
    async fn test_double_shutdown() {
        let coordinator = ShutdownCoordinator::new();
        let mut rx = coordinator.subscribe();

        coordinator.initiate_shutdown();
        coordinator.initiate_shutdown();

        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
    }
}
