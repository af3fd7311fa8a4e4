use crate::configuration::Settings;
use crate::walker::{WalkReport, Walker};
use crate::xkcd_client;
use anyhow::{Context, Result};
use log::{info, warn};
use resolve_path::PathResolveExt;
use std::fs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub async fn run(settings: Settings) -> Result<WalkReport> {
    info!("Output directory: {}", settings.output_directory);
    let output_directory = settings.output_directory.resolve().into_owned();
    fs::create_dir_all(&output_directory)
        .with_context(|| format!("unable to create {}", output_directory.display()))?;

    let client = xkcd_client::build_client(Duration::from_secs(settings.timeout_seconds))?;

    // The archive root serves the newest comic
    let latest = xkcd_client::fetch_comic(&client, &settings.base_url)
        .await
        .with_context(|| {
            format!("unable to resolve the latest comic from {}", settings.base_url)
        })?;
    info!("Latest comic is #{}", latest.number);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current batch");
            interrupt.cancel();
        }
    });

    let walker = Walker::new(client, &settings, output_directory, cancel);
    let report = walker.walk(latest.number).await;

    print_summary(&report);
    Ok(report)
}

fn print_summary(report: &WalkReport) {
    if !report.failed.is_empty() {
        warn!("The following comics failed to download:");
        for page_url in &report.failed {
            warn!("  {page_url}");
        }
    }
    info!("Downloaded {} comics", report.downloaded);
    info!("Finished!");
}
