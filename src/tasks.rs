use std::sync::Arc;

use metrics::{counter, histogram};
use tracing::info;

use crate::error::Result;
use crate::store::ListingsStore;
use crate::transform::{render_csv, transform_report};

/// Summary of one fetch-and-transform run. The CLI and the HTTP handler
/// both run the feed through here so the two surfaces cannot drift.
#[derive(Debug)]
pub struct FeedRunResult {
    pub source: String,
    pub payload_bytes: usize,
    pub rows: usize,
    pub skipped: usize,
    pub csv: String,
}

/// Fetch the listings blob and transform it into the CSV feed.
pub async fn feed_once(store: Arc<dyn ListingsStore>) -> Result<FeedRunResult> {
    let source = store.describe();
    info!("fetching job listings from {source}");

    let t0 = std::time::Instant::now();
    let text = match store.fetch().await {
        Ok(text) => {
            counter!("feed_fetch_success_total").increment(1);
            text
        }
        Err(e) => {
            counter!("feed_fetch_error_total").increment(1);
            return Err(e);
        }
    };
    histogram!("feed_fetch_payload_bytes").record(text.len() as f64);

    let report = transform_report(&text);
    let csv = render_csv(&report.rows);
    histogram!("feed_transform_duration_seconds").record(t0.elapsed().as_secs_f64());

    info!(
        "feed run complete: {} rows, {} skipped, {} payload bytes",
        report.rows.len(),
        report.skipped.len(),
        text.len()
    );

    Ok(FeedRunResult {
        source,
        payload_bytes: text.len(),
        rows: report.rows.len(),
        skipped: report.skipped.len(),
        csv,
    })
}
