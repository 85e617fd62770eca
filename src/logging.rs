use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging: human-readable console output plus a daily-rotated
/// JSON file under logs/. RUST_LOG still overrides the default filter.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let filter = EnvFilter::from_default_env().add_directive("jobs_feed=info".parse().unwrap());

    let file_appender = tracing_appender::rolling::daily("logs", "feed.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    // The guard flushes the file writer on drop; the subscriber is global
    // for the life of the process, so leak it.
    std::mem::forget(guard);
}
