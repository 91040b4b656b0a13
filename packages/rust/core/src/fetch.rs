//! Gated page retrieval.
//!
//! Every fetch goes through the [`PolicyGate`] first; a denial surfaces as
//! [`HerodexError::PolicyDenied`] so callers can tell it apart from
//! transport failures.

use herodex_policy::PolicyGate;
use herodex_shared::{HerodexError, Result, ScrapeConfig};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Maximum number of redirects to follow for a page.
const MAX_REDIRECTS: usize = 5;

/// HTTP client paired with the crawl-policy gate.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    gate: PolicyGate,
    agent: String,
}

impl PageFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| HerodexError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            gate: PolicyGate::new(&config.user_agent, config.policy_failure)?,
            agent: config.user_agent.clone(),
        })
    }

    /// Check the crawl policy, then fetch `url` and return its body.
    ///
    /// Non-2xx responses are network errors.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        self.gate.ensure_allowed(url, &self.agent).await?;

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| HerodexError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HerodexError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HerodexError::Network(format!("{url}: failed to read body: {e}")))?;

        debug!(%url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Page URL for a character: spaces become underscores and the name is
/// appended as a single percent-encoded path segment.
pub fn character_page_url(config: &ScrapeConfig, name: &str) -> Result<Url> {
    let mut url = config
        .base_url
        .join(&config.character_path)
        .map_err(|e| HerodexError::config(format!("invalid character_path: {e}")))?;

    let segment = name.trim().replace(' ', "_");
    if segment.is_empty() {
        return Err(HerodexError::validation("character name is empty"));
    }

    let base = url.to_string();
    url.path_segments_mut()
        .map_err(|_| HerodexError::validation(format!("{base} cannot take path segments")))?
        .pop_if_empty()
        .push(&segment);
    Ok(url)
}

/// Absolute URL of the roster page.
pub fn roster_page_url(config: &ScrapeConfig) -> Result<Url> {
    config
        .base_url
        .join(&config.roster_path)
        .map_err(|e| HerodexError::config(format!("invalid roster_path: {e}")))
}
