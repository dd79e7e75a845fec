//! Watch command - Mirror vault changes as they happen
//!
//! Opens a session, watches the vault recursively and feeds every change to
//! the sync engine until SIGINT/SIGTERM. Failed events are logged and the
//! loop keeps going.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use vaultmirror_core::config::Config;
use vaultmirror_sync::{EventDispatcher, FileWatcher};

use super::{shutdown_signal, GlobalOptions, Session};
use crate::output::{plural, reporter, OutputFormat, Report};

#[derive(Debug, Args)]
pub struct WatchCommand {
    /// Mirror the whole vault once before watching
    #[arg(long)]
    pub initial_push: bool,
}

impl WatchCommand {
    pub async fn execute(
        &self,
        global: &GlobalOptions,
        config: Config,
        format: OutputFormat,
    ) -> Result<()> {
        let report = reporter(format);
        let session = Session::open(config, global.local_db.as_deref()).await?;

        if self.initial_push {
            match session.engine.push_all().await {
                Ok(summary) => report.detail(&format!(
                    "Initial push: {} uploaded",
                    plural(summary.uploaded, "file")
                )),
                Err(e) => {
                    session.close().await;
                    return Err(e.context("Initial push failed"));
                }
            }
        }

        let (mut watcher, rx) = match FileWatcher::new() {
            Ok(pair) => pair,
            Err(e) => {
                session.close().await;
                return Err(e);
            }
        };
        if let Err(e) = watcher.watch(session.vault.root()) {
            session.close().await;
            return Err(e);
        }

        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal(signal_token).await;
        });

        report.done(&format!("Watching {}", session.vault.root().display()));

        let dispatcher = EventDispatcher::new(
            Arc::clone(&session.engine),
            session.vault.clone(),
            Duration::from_millis(session.config.vault.debounce_ms),
        );
        let stats = dispatcher.run(rx, shutdown).await;

        if let Err(e) = watcher.unwatch(session.vault.root()) {
            error!(error = %format!("{e:#}"), "Failed to stop watching");
        }
        drop(watcher);
        session.close().await;

        info!(applied = stats.applied, failed = stats.failed, "Watch stopped");
        report.counts(
            "Watch stopped",
            &[("Applied", stats.applied), ("Failed", stats.failed)],
        );
        Ok(())
    }
}
