//! Crawl-policy gate: decides whether a URL may be fetched.
//!
//! The gate fetches `<origin>/robots.txt` on every call (no cache), parses it,
//! and evaluates the target path for the given agent token. When the policy
//! document cannot be retrieved the configured [`PolicyFailureMode`] decides;
//! the default is fail-open.

mod robots;

use std::time::Duration;

use herodex_shared::{HerodexError, PolicyFailureMode, Result};
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

pub use robots::RobotsTxt;

/// Maximum number of redirects to follow when fetching robots.txt.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for fetching robots.txt.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ---------------------------------------------------------------------------
// PolicyGate
// ---------------------------------------------------------------------------

/// Checks target URLs against their host's robots.txt.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    client: Client,
    on_failure: PolicyFailureMode,
}

impl PolicyGate {
    /// Build a gate with its own HTTP client.
    pub fn new(user_agent: &str, on_failure: PolicyFailureMode) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| HerodexError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, on_failure })
    }

    /// Whether `target` may be fetched by `agent_token`.
    ///
    /// Retrieval or parse failures are logged and resolved by the failure mode.
    #[instrument(skip_all, fields(url = %target))]
    pub async fn is_allowed(&self, target: &Url, agent_token: &str) -> bool {
        match fetch_policy(&self.client, target).await {
            Ok(robots) => {
                let allowed = robots.is_allowed(agent_token, &path_and_query(target));
                debug!(allowed, "crawl policy evaluated");
                allowed
            }
            Err(e) => {
                let allowed = self.on_failure == PolicyFailureMode::Open;
                warn!(
                    error = %e,
                    fail_open = allowed,
                    "crawl policy unavailable"
                );
                allowed
            }
        }
    }

    /// Like [`is_allowed`](Self::is_allowed), but maps a denial to
    /// [`HerodexError::PolicyDenied`].
    pub async fn ensure_allowed(&self, target: &Url, agent_token: &str) -> Result<()> {
        if self.is_allowed(target, agent_token).await {
            Ok(())
        } else {
            Err(HerodexError::policy_denied(target.as_str()))
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch and parse the robots.txt governing `target`.
///
/// A 4xx response means the site declares no policy, which allows everything.
/// Transport errors and 5xx responses are retrieval failures.
pub async fn fetch_policy(client: &Client, target: &Url) -> Result<RobotsTxt> {
    let robots_url = robots_url(target)?;

    let response = client
        .get(robots_url.as_str())
        .send()
        .await
        .map_err(|e| HerodexError::Network(format!("{robots_url}: {e}")))?;

    let status = response.status();
    if status.is_client_error() {
        debug!(%robots_url, %status, "no robots.txt, allowing all");
        return Ok(RobotsTxt::default());
    }
    if !status.is_success() {
        return Err(HerodexError::Network(format!("{robots_url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| HerodexError::Network(format!("{robots_url}: failed to read body: {e}")))?;

    Ok(RobotsTxt::parse(&body))
}

/// `<scheme>://<host>[:port]/robots.txt` for the target's origin.
fn robots_url(target: &Url) -> Result<Url> {
    if target.host_str().is_none() {
        return Err(HerodexError::validation(format!("URL has no host: {target}")));
    }
    target
        .join("/robots.txt")
        .map_err(|e| HerodexError::validation(format!("{target}: {e}")))
}

/// The part of a URL robots.txt rules are matched against.
fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(q) => format!("{}?{q}", url.path()),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AGENT: &str = "herodex/0.1.0";

    #[test]
    fn test_robots_url_strips_path() {
        let url = Url::parse("https://wiki.example.com/wiki/Hela?x=1").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "https://wiki.example.com/robots.txt"
        );
    }

    #[test]
    fn test_robots_url_keeps_port() {
        let url = Url::parse("http://localhost:3000/wiki/Hela").unwrap();
        assert_eq!(
            robots_url(&url).unwrap().as_str(),
            "http://localhost:3000/robots.txt"
        );
    }

    #[test]
    fn test_path_and_query() {
        let url = Url::parse("https://wiki.example.com/index.php?title=Hela").unwrap();
        assert_eq!(path_and_query(&url), "/index.php?title=Hela");
    }

    #[tokio::test]
    async fn test_gate_denies_disallowed_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /wiki/Secret\n"),
            )
            .mount(&server)
            .await;

        let gate = PolicyGate::new(AGENT, PolicyFailureMode::Open).unwrap();
        let base = Url::parse(&server.uri()).unwrap();

        assert!(!gate.is_allowed(&base.join("/wiki/Secret").unwrap(), AGENT).await);
        assert!(gate.is_allowed(&base.join("/wiki/Hela").unwrap(), AGENT).await);

        let err = gate
            .ensure_allowed(&base.join("/wiki/Secret").unwrap(), AGENT)
            .await
            .unwrap_err();
        assert!(matches!(err, HerodexError::PolicyDenied { .. }));
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let gate = PolicyGate::new(AGENT, PolicyFailureMode::Closed).unwrap();
        let target = Url::parse(&server.uri()).unwrap().join("/wiki/Hela").unwrap();
        assert!(gate.is_allowed(&target, AGENT).await);
    }

    #[tokio::test]
    async fn test_server_error_fails_open_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let target = Url::parse(&server.uri()).unwrap().join("/wiki/Hela").unwrap();

        let open = PolicyGate::new(AGENT, PolicyFailureMode::Open).unwrap();
        assert!(open.is_allowed(&target, AGENT).await);

        let closed = PolicyGate::new(AGENT, PolicyFailureMode::Closed).unwrap();
        assert!(!closed.is_allowed(&target, AGENT).await);
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_open() {
        // Nothing listens on port 9 (discard) in the test environment.
        let target = Url::parse("http://127.0.0.1:9/wiki/Hela").unwrap();
        let gate = PolicyGate::new(AGENT, PolicyFailureMode::Open).unwrap();
        assert!(gate.is_allowed(&target, AGENT).await);
    }
}
