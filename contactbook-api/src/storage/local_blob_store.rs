use super::BlobStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Largest photo accepted from a remote origin
pub const MAX_REMOTE_PHOTO_BYTES: usize = 10 * 1024 * 1024;

/// Stores photos as files below a directory and serves them from
/// `<public_base_url>/photos/<key>`.
///
/// Remote downloads are limited to the configured trusted origins; nothing
/// else is ever requested.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
    trusted_origins: Vec<String>,
    client: reqwest::Client,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, public_base_url: &str, fetch_timeout: Duration) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create photo directory {}", root.display()))?;

        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            trusted_origins: Vec::new(),
            client,
        })
    }

    /// Origins (scheme, host and optional path prefix) whose photos may be
    /// downloaded, e.g. `https://cdn.example.com/avatars`.
    pub fn with_trusted_origins(mut self, origins: Vec<String>) -> Self {
        self.trusted_origins = origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/'))
            .filter(|origin| !origin.is_empty())
            .map(|origin| format!("{}/", origin))
            .collect();
        self
    }

    /// Reads a stored object; `None` if the key is unknown.
    pub async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn photos_prefix(&self) -> String {
        format!("{}/photos/", self.public_base_url)
    }

    fn is_trusted_remote(&self, url: &str) -> bool {
        self.trusted_origins
            .iter()
            .any(|origin| url.starts_with(origin.as_str()))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()?;

        if let Some(length) = response.content_length() {
            if length > MAX_REMOTE_PHOTO_BYTES as u64 {
                anyhow::bail!("Photo at {} is too large ({} bytes)", url, length);
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > MAX_REMOTE_PHOTO_BYTES {
                anyhow::bail!("Photo at {} exceeds {} bytes", url, MAX_REMOTE_PHOTO_BYTES);
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(bytes)
    }

    /// Maps a key to a path below the root, refusing anything that could
    /// escape it.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_safe = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_safe {
            anyhow::bail!("Invalid blob key: {}", key);
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::debug!(
            "Stored blob {} ({} bytes, {})",
            key,
            bytes.len(),
            content_type
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{}", self.photos_prefix(), key)
    }

    fn serves_url(&self, url: &str) -> bool {
        url.starts_with(&self.photos_prefix()) || self.is_trusted_remote(url)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(key) = url.strip_prefix(&self.photos_prefix()) {
            return self
                .read(key)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Photo not found: {}", url));
        }

        if !self.is_trusted_remote(url) {
            anyhow::bail!("Refusing to fetch photo from untrusted URL {}", url);
        }

        self.download(url).await
    }
}
