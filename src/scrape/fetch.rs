use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client};

use super::error::FetchError;

// Desktop browser strings; forums and reddit are less likely to serve a block page to these.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
];

#[derive(Clone, Debug)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub retries: u32,
    pub retry_wait: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy { timeout: Duration::from_secs(10), retries: 0, retry_wait: Duration::from_secs(5) }
    }
}

pub struct Fetcher {
    client: Client,
    policy: FetchPolicy,
    next_agent: AtomicUsize,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .build()?;
        Ok(Fetcher { client, policy, next_agent: AtomicUsize::new(0) })
    }

    fn user_agent(&self) -> &'static str {
        let i = self.next_agent.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[i % USER_AGENTS.len()]
    }

    /// One GET, plus `policy.retries` more after a fixed wait if it fails.
    /// `on_retry` sees each failed attempt that will be retried.
    pub async fn fetch_page<F>(&self, url: &str, mut on_retry: F) -> Result<String, FetchError>
    where
        F: FnMut(u32, &FetchError),
    {
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.policy.retries => {
                    attempt += 1;
                    on_retry(attempt, &e);
                    tokio::time::sleep(self.policy.retry_wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.user_agent())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        resp.text().await.map_err(|e| FetchError::from_reqwest(url, e))
    }
}
