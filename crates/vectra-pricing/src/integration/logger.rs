//! Integration logger
//!
//! Lookups hand entries to [`IntegrationLogger::log`], which never blocks and
//! never fails; a background consumer drains the channel into an
//! [`IntegrationLogStore`]. Store failures are counted and swallowed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use vectra_common::{IntegrationLogEntry, DEFAULT_CALL_TIMEOUT_MS};

use super::store::IntegrationLogStore;

/// Configuration for the integration logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Channel buffer size; entries beyond it are dropped
    pub channel_buffer: usize,
    /// Deadline for a single store append
    pub append_timeout: Duration,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            append_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
        }
    }
}

/// Logger counters
#[derive(Debug, Default)]
pub struct LoggerMetrics {
    pub entries_received: AtomicU64,
    pub entries_dropped: AtomicU64,
    pub entries_persisted: AtomicU64,
    pub entries_failed: AtomicU64,
}

/// Point-in-time copy of [`LoggerMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggerStats {
    pub received: u64,
    pub dropped: u64,
    pub persisted: u64,
    pub failed: u64,
}

impl LoggerMetrics {
    pub fn snapshot(&self) -> LoggerStats {
        LoggerStats {
            received: self.entries_received.load(Ordering::Relaxed),
            dropped: self.entries_dropped.load(Ordering::Relaxed),
            persisted: self.entries_persisted.load(Ordering::Relaxed),
            failed: self.entries_failed.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable handle to the integration log channel
#[derive(Clone)]
pub struct IntegrationLogger {
    entry_tx: Option<mpsc::Sender<IntegrationLogEntry>>,
    metrics: Arc<LoggerMetrics>,
}

impl IntegrationLogger {
    /// Spawn the consumer task and return a handle to feed it.
    ///
    /// The task exits once every handle has been dropped and the channel is
    /// drained.
    pub fn spawn(store: Arc<dyn IntegrationLogStore>, config: LoggerConfig) -> (Self, JoinHandle<()>) {
        let (entry_tx, entry_rx) = mpsc::channel(config.channel_buffer.max(1));
        let metrics = Arc::new(LoggerMetrics::default());

        let handle = tokio::spawn(Self::consumer(
            store,
            entry_rx,
            config.append_timeout,
            metrics.clone(),
        ));

        (
            Self {
                entry_tx: Some(entry_tx),
                metrics,
            },
            handle,
        )
    }

    /// Logger that discards every entry
    pub fn disabled() -> Self {
        Self {
            entry_tx: None,
            metrics: Arc::new(LoggerMetrics::default()),
        }
    }

    /// Record an entry. Never blocks, never fails.
    pub fn log(&self, entry: IntegrationLogEntry) {
        let Some(tx) = &self.entry_tx else {
            return;
        };

        self.metrics.entries_received.fetch_add(1, Ordering::Relaxed);
        match tx.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                self.metrics.entries_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(endpoint = %entry.endpoint, "Integration log channel full, entry dropped");
            }
            Err(TrySendError::Closed(entry)) => {
                self.metrics.entries_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(endpoint = %entry.endpoint, "Integration log consumer gone, entry dropped");
            }
        }
    }

    /// Get logger metrics
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Metrics handle that outlives the logger, for reading after the consumer drains
    pub fn shared_metrics(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Background consumer persisting entries one by one
    #[instrument(skip_all)]
    async fn consumer(
        store: Arc<dyn IntegrationLogStore>,
        mut entry_rx: mpsc::Receiver<IntegrationLogEntry>,
        append_timeout: Duration,
        metrics: Arc<LoggerMetrics>,
    ) {
        while let Some(entry) = entry_rx.recv().await {
            let endpoint = entry.endpoint.clone();
            match tokio::time::timeout(append_timeout, store.append(entry)).await {
                Ok(Ok(())) => {
                    metrics.entries_persisted.fetch_add(1, Ordering::Relaxed);
                    debug!(%endpoint, "Integration entry persisted");
                }
                Ok(Err(e)) => {
                    metrics.entries_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(%endpoint, error = %e, "Failed to persist integration entry");
                }
                Err(_) => {
                    metrics.entries_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        %endpoint,
                        timeout_ms = append_timeout.as_millis() as u64,
                        "Integration entry append timed out"
                    );
                }
            }
        }
        info!("Integration log channel closed, consumer exiting");
    }
}
