use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

pub mod rate_limit;

pub use rate_limit::{BackoffConfig, RateLimitedClient};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("modman/", env!("CARGO_PKG_VERSION"));

/// HTTP layer errors
#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Rate limit error: {message}")]
    RateLimitError { message: String },

    #[error("Request to {url} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    #[error("Semaphore acquire error: {source}")]
    SemaphoreError {
        #[from]
        source: tokio::sync::AcquireError,
    },

    #[error("Invalid job count: {count} (must be > 0)")]
    InvalidJobCount { count: usize },
}

/// Networking settings derived from `AppConfig`
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// Maximum number of concurrent downloads
    pub jobs: usize,
    /// HTTP client timeout in seconds
    pub timeout_seconds: u64,
    /// Attempts per request before giving up on 429s and connection failures
    pub retries: u32,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            timeout_seconds: 30,
            retries: 5,
        }
    }
}

/// Owns the shared HTTP client and the download concurrency budget
#[derive(Clone)]
pub struct NetworkingManager {
    http: Arc<RateLimitedClient>,
    semaphore: Arc<Semaphore>,
    jobs: usize,
}

impl NetworkingManager {
    pub fn new(config: NetworkingConfig) -> Result<Self, NetworkingError> {
        if config.jobs == 0 {
            return Err(NetworkingError::InvalidJobCount { count: config.jobs });
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        trace!(
            jobs = config.jobs,
            timeout = config.timeout_seconds,
            retries = config.retries,
            "networking manager initialized"
        );

        Ok(Self {
            http: Arc::new(RateLimitedClient::new(client).with_max_retries(config.retries)),
            semaphore: Arc::new(Semaphore::new(config.jobs)),
            jobs: config.jobs,
        })
    }

    /// Replace the retrying client, keeping the concurrency budget
    pub fn with_client(mut self, http: RateLimitedClient) -> Self {
        self.http = Arc::new(http);
        self
    }

    pub fn http(&self) -> Arc<RateLimitedClient> {
        self.http.clone()
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Wait for a download slot
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, NetworkingError> {
        Ok(self.semaphore.clone().acquire_owned().await?)
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
