use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{FeedError, Result};

/// Where the listings blob comes from. The server and the CLI both go
/// through this seam, so tests and dev runs can point it at a local file.
#[async_trait]
pub trait ListingsStore: Send + Sync {
    /// Fetch the raw listings document text.
    async fn fetch(&self) -> Result<String>;

    /// Human-readable description of the backing location, for logs.
    fn describe(&self) -> String;
}

/// Listings blob in a Supabase-style storage bucket. Tries the public
/// object URL first, then retries the authorized URL with the API key when
/// the bucket is private.
pub struct ObjectStore {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
    key: String,
    api_key: Option<String>,
}

impl ObjectStore {
    pub fn new(base_url: &str, bucket: String, key: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            key,
            api_key,
        }
    }

    fn public_url(&self) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, self.key
        )
    }

    fn authorized_url(&self) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, self.key
        )
    }
}

#[async_trait]
impl ListingsStore for ObjectStore {
    async fn fetch(&self) -> Result<String> {
        let mut resp = self.client.get(self.public_url()).send().await?;
        if !resp.status().is_success() {
            if let Some(key) = &self.api_key {
                debug!(
                    "public object fetch returned {}, retrying authorized URL",
                    resp.status()
                );
                resp = self
                    .client
                    .get(self.authorized_url())
                    .header("Authorization", format!("Bearer {}", key))
                    .header("apikey", key.clone())
                    .send()
                    .await?;
            }
        }
        if !resp.status().is_success() {
            return Err(FeedError::Storage {
                message: format!(
                    "object fetch failed with {} for {}",
                    resp.status(),
                    self.describe()
                ),
            });
        }
        Ok(resp.text().await?)
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }
}

/// Listings blob on the local filesystem.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ListingsStore for FileStore {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FeedError::Storage {
                message: format!("reading {} failed: {}", self.path.display(), e),
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Build the store from config plus env, env winning so deploys can point
/// at a bucket without shipping a config file:
/// - SUPABASE_URL (e.g. https://xyzcompany.supabase.co) or SUPABASE_PROJECT_REF
/// - SUPABASE_BUCKET, SUPABASE_PREFIX (optional path prefix inside the bucket)
/// - SUPABASE_SERVICE_ROLE_KEY or SUPABASE_ANON_KEY (optional, private buckets)
pub fn build_store(config: &StorageConfig) -> Result<Arc<dyn ListingsStore>> {
    let env_base = std::env::var("SUPABASE_URL").ok().or_else(|| {
        std::env::var("SUPABASE_PROJECT_REF")
            .ok()
            .map(|r| format!("https://{}.supabase.co", r))
    });

    if let Some(base_url) = env_base.or_else(|| config.base_url.clone()) {
        let bucket = std::env::var("SUPABASE_BUCKET").unwrap_or_else(|_| config.bucket.clone());
        let prefix = std::env::var("SUPABASE_PREFIX").unwrap_or_default();
        let key = if prefix.is_empty() {
            config.object.clone()
        } else {
            format!("{}/{}", prefix.trim_end_matches('/'), config.object)
        };
        let api_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
            .ok();
        return Ok(Arc::new(ObjectStore::new(&base_url, bucket, key, api_key)));
    }

    if let Some(file) = &config.file {
        return Ok(Arc::new(FileStore::new(file.clone())));
    }

    Err(FeedError::Config(
        "no listings source configured; set SUPABASE_URL (or SUPABASE_PROJECT_REF), or [storage] base_url or file in config.toml".to_string(),
    ))
}
