//! Push commands - One-shot uploads
//!
//! `push-images` uploads every file directly inside the image folder.
//! `push-markdown` runs the create handler over the whole vault.

use anyhow::Result;
use clap::Args;

use vaultmirror_core::config::Config;
use vaultmirror_sync::PushSummary;

use super::{GlobalOptions, Session};
use crate::output::{reporter, OutputFormat, Report};

#[derive(Debug, Args)]
pub struct PushImagesCommand {}

impl PushImagesCommand {
    pub async fn execute(
        &self,
        global: &GlobalOptions,
        config: Config,
        format: OutputFormat,
    ) -> Result<()> {
        let report = reporter(format);
        let image_folder = config.vault.image_folder.clone();
        let session = Session::open(config, global.local_db.as_deref()).await?;

        let result = session.engine.push_images().await;
        session.close().await;

        match result? {
            Some(summary) => show(report.as_ref(), "Images pushed", &summary),
            None => report.warning(&format!("No images folder found ({image_folder})")),
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct PushMarkdownCommand {}

impl PushMarkdownCommand {
    pub async fn execute(
        &self,
        global: &GlobalOptions,
        config: Config,
        format: OutputFormat,
    ) -> Result<()> {
        let report = reporter(format);
        let session = Session::open(config, global.local_db.as_deref()).await?;

        let result = session.engine.push_all().await;
        session.close().await;

        show(report.as_ref(), "Vault pushed", &result?);
        Ok(())
    }
}

fn show(report: &dyn Report, title: &str, summary: &PushSummary) {
    report.counts(
        title,
        &[
            ("Uploaded", summary.uploaded),
            ("Folders", summary.mirrored),
            ("Skipped", summary.ignored),
        ],
    );
}
