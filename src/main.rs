use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

use jobs_feed::config::Config;
use jobs_feed::store::{build_store, FileStore, ListingsStore};
use jobs_feed::tasks::feed_once;
use jobs_feed::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "jobs_feed")]
#[command(about = "Careers job listings feed served as CSV")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server exposing the CSV feed
    Serve {
        /// Port to listen on (overrides config.toml)
        #[arg(long)]
        port: Option<u16>,
    },
    /// One-shot transform of a local listings file
    Transform {
        /// Path to a listings JSON document
        #[arg(long)]
        input: PathBuf,
        /// Write the CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch the raw listings blob from the configured store
    Fetch {
        /// Write the blob here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();
    metrics::init_metrics();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let store = build_store(&config.storage)?;
            println!("🌐 Serving the jobs feed from {}", store.describe());
            server::start_server(store, port).await?;
        }
        Commands::Transform { input, output } => {
            println!("🔄 Transforming {}...", input.display());
            let store: Arc<dyn ListingsStore> = Arc::new(FileStore::new(input));
            match feed_once(store).await {
                Ok(run) => match output {
                    Some(path) => {
                        std::fs::write(&path, &run.csv)?;
                        println!("\n📊 Transform results:");
                        println!("   Payload bytes: {}", run.payload_bytes);
                        println!("   Rows emitted:  {}", run.rows);
                        println!("   Skipped:       {}", run.skipped);
                        println!("   Output file:   {}", path.display());
                    }
                    None => print!("{}", run.csv),
                },
                Err(e) => {
                    error!("Transform failed: {}", e);
                    println!("❌ Transform failed: {}", e);
                }
            }
        }
        Commands::Fetch { output } => {
            let store = build_store(&config.storage)?;
            println!("📥 Fetching {}...", store.describe());
            match store.fetch().await {
                Ok(text) => match output {
                    Some(path) => {
                        std::fs::write(&path, &text)?;
                        println!("✅ Fetched {} bytes to {}", text.len(), path.display());
                    }
                    None => print!("{}", text),
                },
                Err(e) => {
                    error!("Fetch failed: {}", e);
                    println!("❌ Fetch failed: {}", e);
                }
            }
        }
    }
    Ok(())
}
