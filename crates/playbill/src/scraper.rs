use std::time::Duration;

use reqwest::Client;

use crate::config::SelectorSet;
use crate::parser::{ParseError, extract_performances};
use crate::types::RawPerformance;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("Failed to fetch {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },
}

/// HTTP fetcher with bounded retries and linear backoff.
///
/// Each call to [`WebScraper::fetch`] is independent: attempts, backoff and
/// failure accounting never carry over between URLs.
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    backoff_base: Duration,
    max_retries: u32,
}

impl WebScraper {
    /// The wait before retry `n` is `backoff_base_secs * n` seconds.
    /// `max_retries` is the total number of attempts and is at least 1.
    pub fn new(
        timeout_secs: u64,
        backoff_base_secs: u64,
        max_retries: u32,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            backoff_base: Duration::from_secs(backoff_base_secs),
            max_retries: max_retries.max(1),
        })
    }

    /// Fetch a page body, retrying on transport errors and non-success
    /// statuses. Exhausting all attempts yields
    /// [`ScraperError::RetriesExhausted`] carrying the URL and attempt count.
    pub async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        for attempt in 1..=self.max_retries {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    log::warn!(
                        "Error fetching {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.backoff_base * attempt).await;
                    }
                }
            }
        }

        Err(ScraperError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_retries,
        })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// Fetch a program page and extract its raw performance records.
    pub async fn fetch_performances(
        &self,
        url: &str,
        selectors: &SelectorSet<'_>,
    ) -> Result<Vec<RawPerformance>, ScraperError> {
        let html = self.fetch(url).await?;
        let performances = extract_performances(&html, selectors)?;
        Ok(performances)
    }
}
