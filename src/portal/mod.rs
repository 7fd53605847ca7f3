//! Client for the university intranet portal.
//!
//! The portal sits behind domain authentication and a private CA, so the
//! client carries a credential pair and an optional custom trust bundle.
//! Requests that come back 401 are retried with a freshly built session,
//! bounded by a [`RetryBudget`] that spans the whole client lifetime.

mod errors;
pub mod links;
pub mod table;
pub mod xml;

pub use errors::PortalError;

use rand::Rng;
use reqwest::{Certificate, StatusCode};
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Domain credential pair for the portal.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Re-authentication budget shared across all fetches of one client.
///
/// The ceiling applies cumulatively: five 401-triggered session rebuilds
/// anywhere in the client's lifetime exhaust it. Exhaustion resets the
/// budget so a later crawl stage gets a fresh allowance.
#[derive(Debug)]
pub struct RetryBudget {
    capacity: u32,
    remaining: u32,
}

impl RetryBudget {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            remaining: capacity,
        }
    }

    /// Spends one retry. Returns `false` (and resets to full) once the
    /// budget is exhausted.
    pub fn spend(&mut self) -> bool {
        if self.remaining == 0 {
            self.remaining = self.capacity;
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Authenticated HTTP client with politeness delays and bounded re-auth.
pub struct PortalClient {
    http: reqwest::Client,
    credentials: Credentials,
    root_cert: Option<Certificate>,
    budget: RetryBudget,
    /// Randomized delay before each fetch, in milliseconds. Empty range
    /// (0..=0) disables it; tests run without the delay.
    pause_ms: RangeInclusive<u64>,
}

impl PortalClient {
    pub fn new(
        credentials: Credentials,
        certificate_path: Option<&str>,
        pause_ms: RangeInclusive<u64>,
    ) -> Result<Self, PortalError> {
        let root_cert = match certificate_path {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|source| PortalError::Certificate {
                    path: path.to_owned(),
                    source,
                })?;
                Some(Certificate::from_pem(&pem).map_err(|source| {
                    PortalError::CertificateFormat {
                        path: path.to_owned(),
                        source,
                    }
                })?)
            }
            None => None,
        };
        let http = Self::build_session(root_cert.as_ref())?;
        Ok(Self {
            http,
            credentials,
            root_cert,
            budget: RetryBudget::new(5),
            pause_ms,
        })
    }

    fn build_session(root_cert: Option<&Certificate>) -> Result<reqwest::Client, PortalError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30));
        if let Some(cert) = root_cert {
            builder = builder.add_root_certificate(cert.clone());
        }
        builder.build().map_err(PortalError::Client)
    }

    /// Randomized short sleep between page fetches to keep the request
    /// rate polite. Not a correctness mechanism.
    async fn pause(&self) {
        if *self.pause_ms.end() == 0 {
            return;
        }
        let ms = rand::rng().random_range(self.pause_ms.clone());
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Fetches a page, returning its body on 200.
    ///
    /// A 401 rebuilds the session and retries the same URL until the
    /// retry budget runs out; exhaustion and any other non-200 status
    /// degrade to `Ok(None)` so callers can skip the item. Transport and
    /// TLS failures propagate.
    pub async fn fetch(&mut self, url: &str) -> Result<Option<String>, PortalError> {
        self.pause().await;
        loop {
            let response = self
                .http
                .get(url)
                .basic_auth(&self.credentials.username, Some(&self.credentials.password))
                .send()
                .await?;
            let status = response.status();
            if status.is_success() {
                debug!(url, %status, "page fetched");
                return Ok(Some(response.text().await?));
            }
            warn!(url, %status, "page denied");
            if status != StatusCode::UNAUTHORIZED {
                return Ok(None);
            }
            if !self.budget.spend() {
                warn!(url, "re-authentication budget exhausted, giving up");
                return Ok(None);
            }
            info!(
                url,
                remaining = self.budget.remaining(),
                "rebuilding authenticated session"
            );
            self.http = Self::build_session(self.root_cert.as_ref())?;
        }
    }
}

/// Collapses runs of whitespace and trims. Scraped cell and anchor text
/// is full of layout whitespace and non-breaking spaces.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
