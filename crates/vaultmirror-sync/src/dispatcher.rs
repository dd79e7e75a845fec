//! Event dispatch loop
//!
//! The [`EventDispatcher`] is the host side of the engine boundary: it
//! receives raw watcher events, batches them for a short debounce window,
//! converts and coalesces them, then applies them one at a time. Handler
//! failures are logged and never stop the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::engine::SyncEngine;
use crate::filesystem::LocalVault;
use crate::watcher::{coalesce_events, ChangeEvent};

/// Counters of a dispatcher run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: usize,
    pub failed: usize,
}

/// Feeds watcher events to the sync engine serially
pub struct EventDispatcher {
    engine: Arc<SyncEngine>,
    vault: LocalVault,
    debounce: Duration,
}

impl EventDispatcher {
    pub fn new(engine: Arc<SyncEngine>, vault: LocalVault, debounce: Duration) -> Self {
        Self {
            engine,
            vault,
            debounce,
        }
    }

    /// Runs until `cancel` fires or the watcher channel closes
    pub async fn run(
        &self,
        mut rx: mpsc::Receiver<ChangeEvent>,
        cancel: CancellationToken,
    ) -> DispatchStats {
        let mut stats = DispatchStats::default();
        info!(debounce_ms = self.debounce.as_millis() as u64, "Dispatching vault events");

        loop {
            let first = tokio::select! {
                _ = cancel.cancelled() => break,
                change = rx.recv() => match change {
                    Some(change) => change,
                    None => break,
                },
            };

            // Let the burst settle, then take everything that arrived
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(self.debounce) => {}
            }
            let mut batch = vec![first];
            while let Ok(change) = rx.try_recv() {
                batch.push(change);
            }

            let run = self.process(batch).await;
            stats.applied += run.applied;
            stats.failed += run.failed;
        }

        info!(applied = stats.applied, failed = stats.failed, "Event dispatch stopped");
        stats
    }

    /// Converts, coalesces and applies one batch of watcher events
    pub async fn process(&self, batch: Vec<ChangeEvent>) -> DispatchStats {
        let mut events = Vec::with_capacity(batch.len());
        for change in &batch {
            match self.vault.event_for(change).await {
                Some(event) => events.push(event),
                None => debug!(path = %change.path().display(), "Outside the vault, skipped"),
            }
        }

        let mut stats = DispatchStats::default();
        for event in coalesce_events(events) {
            match self.engine.dispatch(&event).await {
                Ok(outcome) => {
                    stats.applied += 1;
                    debug!(event = event.kind_name(), path = %event.entry(), ?outcome, "Event applied");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(
                        event = event.kind_name(),
                        path = %event.entry(),
                        error = %format!("{e:#}"),
                        "Failed to apply event"
                    );
                }
            }
        }
        stats
    }
}
