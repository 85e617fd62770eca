//! Prometheus metrics for the feed service.
//!
//! One global recorder for the process. Series are described up front so
//! scrapes carry help text from the first request on.

use std::net::SocketAddr;
use std::sync::Once;

use metrics::{describe_counter, describe_histogram};
use tracing::warn;

static INIT: Once = Once::new();

/// Install the global Prometheus recorder. Idempotent.
///
/// When PROMETHEUS_ADDR is set, an HTTP exporter serves /metrics there;
/// otherwise the recorder is in-process only and the macros record into it
/// without any listener.
pub fn init_metrics() {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let installed = match exporter_addr() {
            Some(addr) => {
                println!("[metrics] Prometheus exporter listening on http://{}/metrics", addr);
                builder.with_http_listener(addr).install()
            }
            None => builder.install_recorder().map(|_| ()),
        };
        match installed {
            Ok(()) => describe_feed_metrics(),
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

fn exporter_addr() -> Option<SocketAddr> {
    let addr_str = std::env::var("PROMETHEUS_ADDR").ok()?;
    match addr_str.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            warn!("Invalid PROMETHEUS_ADDR '{}', exporter disabled", addr_str);
            None
        }
    }
}

fn describe_feed_metrics() {
    describe_counter!(
        "feed_fetch_success_total",
        "Listings blob fetches that returned a document"
    );
    describe_counter!(
        "feed_fetch_error_total",
        "Listings blob fetches that failed"
    );
    describe_histogram!(
        "feed_fetch_payload_bytes",
        "Size of the fetched listings blob in bytes"
    );
    describe_counter!(
        "feed_transform_docs_total",
        "Listings documents handed to the transform"
    );
    describe_counter!(
        "feed_transform_doc_parse_errors_total",
        "Listings documents that failed to decode and were served header-only"
    );
    describe_counter!(
        "feed_rows_emitted_total",
        "CSV rows emitted across all transforms"
    );
    describe_counter!(
        "feed_records_skipped_total",
        "Job records skipped because they failed to decode"
    );
    describe_histogram!(
        "feed_transform_duration_seconds",
        "Wall time of one fetch-and-transform run"
    );
}
