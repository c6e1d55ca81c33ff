//! HTTP fetcher for the GeoLite2 archive.

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::utils::format_size;

const TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2000;

/// Maximum archive size (100 MB)
/// The Country CSV archive is a few MB
const MAX_ARCHIVE_SIZE: usize = 100 * 1024 * 1024;

/// HTTP client for fetching the dataset archive
pub struct Fetcher {
    client: Client,
    max_size: usize,
}

impl Fetcher {
    /// Create a new fetcher with default settings
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("embargo/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            max_size: MAX_ARCHIVE_SIZE,
        })
    }

    /// Download `url` into `dest`, returning the number of bytes written
    pub async fn download(&self, url: &str, dest: &Path) -> Result<usize> {
        info!("Downloading GeoIP archive from {}", url);

        let body = self
            .fetch_with_retry(url)
            .await
            .with_context(|| format!("Failed to download {}", url))?;

        crate::output::write_atomic(dest, &body)
            .with_context(|| format!("Failed to write archive to {:?}", dest))?;

        info!("Downloaded {}", format_size(body.len() as u64));
        Ok(body.len())
    }

    /// Fetch content with retry logic and size validation
    async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = RETRY_DELAY_MS * (1 << (attempt - 1));
                debug!("Retry {} after {}ms for {}", attempt, delay, url);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        if let Some(content_length) = response.content_length() {
                            if content_length as usize > self.max_size {
                                return Err(anyhow::anyhow!(
                                    "Response too large: {} bytes (max: {} bytes)",
                                    content_length,
                                    self.max_size
                                ));
                            }
                        }

                        let body = response
                            .bytes()
                            .await
                            .context("Failed to read response body")?;

                        if body.len() > self.max_size {
                            return Err(anyhow::anyhow!(
                                "Downloaded content too large: {} bytes (max: {} bytes)",
                                body.len(),
                                self.max_size
                            ));
                        }

                        return Ok(body.to_vec());
                    }
                    last_error = Some(anyhow::anyhow!("HTTP {}", response.status()));
                }
                Err(e) if e.is_builder() => {
                    // Malformed URL, retrying cannot help
                    return Err(e.into());
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }
}
