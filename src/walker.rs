use crate::configuration::Settings;
use crate::xkcd_client;
use log::{error, info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Aggregate outcome of one walk. Failed page URLs keep attempt order.
#[derive(Debug, Default)]
pub struct WalkReport {
    pub failed: Vec<String>,
    pub downloaded: usize,
}

enum Outcome {
    Downloaded,
    AlreadyExists,
    Failed,
    Cancelled,
}

/// Walks the archive from a start comic down to the floor, downloading every
/// comic that is not already saved locally.
pub struct Walker {
    client: Client,
    base_url: String,
    output_directory: PathBuf,
    concurrency: usize,
    floor: u32,
    cancel: CancellationToken,
}

impl Walker {
    pub fn new(
        client: Client,
        settings: &Settings,
        output_directory: PathBuf,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            base_url: settings.base_url.clone(),
            output_directory,
            concurrency: settings.concurrency.max(1),
            floor: settings.floor,
            cancel,
        }
    }

    /// Downloads comics `[floor+1, start]` in descending batches of
    /// `concurrency` tasks. Every batch is joined in full before the walk
    /// decides anything; an already-saved comic stops it, since everything
    /// older was synced by an earlier run.
    pub async fn walk(&self, start: u32) -> WalkReport {
        let mut report = WalkReport::default();
        let mut cursor = start;

        'walk: while cursor > self.floor && !self.cancel.is_cancelled() {
            let batch_floor = cursor
                .saturating_sub(self.concurrency as u32)
                .max(self.floor);

            // One task per remaining comic, never more than the batch width
            let mut batch = JoinSet::new();
            for number in (batch_floor + 1..=cursor).rev() {
                let client = self.client.clone();
                let url = page_url(&self.base_url, number);
                let directory = self.output_directory.clone();
                let cancel = self.cancel.clone();
                batch.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => (number, Outcome::Cancelled),
                        outcome = sync_comic(&client, &url, &directory) => (number, outcome),
                    }
                });
            }

            let mut outcomes = Vec::with_capacity(self.concurrency);
            while let Some(joined) = batch.join_next().await {
                match joined {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => error!("Comic task did not complete: {e}"),
                }
            }

            // Completion order within the batch does not matter, evaluation
            // order does: highest number first, so the stop lands on the next
            // expected comic rather than a stray late finisher.
            outcomes.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            for (number, outcome) in outcomes {
                match outcome {
                    Outcome::Downloaded => report.downloaded += 1,
                    Outcome::Failed => report.failed.push(page_url(&self.base_url, number)),
                    Outcome::AlreadyExists => {
                        info!("Comic {number} is already saved, stopping");
                        break 'walk;
                    }
                    Outcome::Cancelled => {
                        warn!("Walk cancelled at comic {number}");
                        break 'walk;
                    }
                }
            }

            cursor = batch_floor;
        }

        report
    }
}

fn page_url(base_url: &str, number: u32) -> String {
    format!("{}/{}/", base_url.trim_end_matches('/'), number)
}

/// One fetch pipeline: page, metadata, existence check, image.
async fn sync_comic(client: &Client, page_url: &str, directory: &Path) -> Outcome {
    info!("{page_url}");
    let comic = match xkcd_client::fetch_comic(client, page_url).await {
        Ok(comic) => comic,
        Err(e) => {
            warn!("  failed to fetch comic: {e:#}");
            return Outcome::Failed;
        }
    };

    let file_name = comic.file_name();
    if directory.join(&file_name).exists() {
        info!("  {file_name} already exists");
        return Outcome::AlreadyExists;
    }

    match xkcd_client::download_image(client, &comic, directory).await {
        Ok(_) => {
            info!("  downloaded {file_name}");
            Outcome::Downloaded
        }
        Err(e) => {
            warn!("  failed to download image: {e:#}");
            Outcome::Failed
        }
    }
}
