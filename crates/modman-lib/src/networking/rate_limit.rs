use reqwest::{Client, Request, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use super::NetworkingError;

/// Seconds-until-reset header sent by Modrinth
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
/// Never sleep longer than this on a server supplied reset hint
const MAX_RESET_WAIT: Duration = Duration::from_secs(60);

/// Backoff strategy for rate limiting and transient failures
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Initial backoff duration
    pub initial: Duration,
    /// Maximum backoff duration
    pub max: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

/// HTTP client that retries 429 responses and connection failures
///
/// Retries are bounded by `max_retries`; any other status is handed back to
/// the caller untouched.
pub struct RateLimitedClient {
    client: Client,
    backoff_config: BackoffConfig,
    max_retries: u32,
    /// Current backoff state (duration for next retry)
    current_backoff: Arc<RwLock<Duration>>,
}

impl RateLimitedClient {
    pub fn new(client: Client) -> Self {
        Self::with_backoff(client, BackoffConfig::default())
    }

    pub fn with_backoff(client: Client, backoff_config: BackoffConfig) -> Self {
        let initial_backoff = backoff_config.initial;
        Self {
            client,
            backoff_config,
            max_retries: 5,
            current_backoff: Arc::new(RwLock::new(initial_backoff)),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute a request with rate limiting and backoff
    pub async fn execute(&self, request: Request) -> Result<Response, NetworkingError> {
        let url = request.url().to_string();
        let mut retry_count = 0;

        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| NetworkingError::RateLimitError {
                    message: "Failed to clone request for retry".to_string(),
                })?;

            let response = match self.client.execute(attempt).await {
                Ok(response) => response,
                Err(source) if is_transient(&source) => {
                    retry_count += 1;
                    if retry_count > self.max_retries {
                        return Err(NetworkingError::RetriesExhausted {
                            url,
                            attempts: retry_count,
                            source,
                        });
                    }

                    let backoff_duration = self.next_backoff().await;
                    warn!(
                        "Request to {} failed ({}), retrying in {:?} ({}/{})",
                        url, source, backoff_duration, retry_count, self.max_retries
                    );
                    tokio::time::sleep(backoff_duration).await;
                    continue;
                }
                Err(source) => return Err(source.into()),
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                retry_count += 1;

                if retry_count > self.max_retries {
                    return Err(NetworkingError::RateLimitError {
                        message: format!(
                            "Rate limit exceeded after {} retries for {}",
                            self.max_retries, url
                        ),
                    });
                }

                let backoff_duration = match reset_hint(&response) {
                    Some(wait) => wait,
                    None => self.next_backoff().await,
                };

                warn!(
                    "Rate limit hit (429), backing off for {:?} (retry {}/{})",
                    backoff_duration, retry_count, self.max_retries
                );

                tokio::time::sleep(backoff_duration).await;
                continue;
            }

            if response.status().is_success() {
                let mut current = self.current_backoff.write().await;
                *current = self.backoff_config.initial;
                trace!("Request successful, backoff reset");
            }

            debug!(status = %response.status(), "GET {}", url);
            return Ok(response);
        }
    }

    /// Make a GET request with rate limiting
    pub async fn get(&self, url: &str) -> Result<Response, NetworkingError> {
        let request = self.client.get(url).build()?;
        self.execute(request).await
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn next_backoff(&self) -> Duration {
        let mut current = self.current_backoff.write().await;
        let duration = *current;
        let next = Duration::from_secs_f64(duration.as_secs_f64() * self.backoff_config.multiplier);
        *current = next.min(self.backoff_config.max);
        duration
    }
}

fn is_transient(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

fn reset_hint(response: &Response) -> Option<Duration> {
    let seconds: u64 = response
        .headers()
        .get(RATE_LIMIT_RESET)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RESET_WAIT))
}

#[cfg(test)]
mod tests {
    include!("rate_limit.test.rs");
}
