//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the shared HTTP client
//! - The robots.txt gate (cached per origin, fail-open)
//! - Per-origin politeness spacing
//! - Identity rotation across requests
//! - Status and content-type checks

use crate::config::Config;
use crate::robots::{fetch_robots, RobotsRules};
use crate::state::HostState;
use crate::url::origin_key;
use crate::FetchError;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use url::Url;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Content types accepted as HTML
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// A successfully fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Page body
    pub body: String,
}

impl FetchedPage {
    /// Content-Type header value, if present
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

/// Options controlling fetch behavior
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub respect_robots: bool,
    pub request_timeout: Duration,
    pub robots_timeout: Duration,
    pub minimum_request_interval: Duration,
    pub user_agents: Vec<String>,
}

impl FetchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            respect_robots: config.crawler.respect_robots,
            request_timeout: config.crawler.request_timeout(),
            robots_timeout: config.crawler.robots_timeout(),
            minimum_request_interval: config.crawler.minimum_request_interval(),
            user_agents: config.identity.user_agents.clone(),
        }
    }
}

/// Builds an HTTP client with browser-like defaults
///
/// The `User-Agent` is not set here; it is chosen per request from the
/// identity pool.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(options: &FetchOptions) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .default_headers(headers)
        .timeout(options.request_timeout)
        .connect_timeout(std::cmp::min(options.request_timeout, Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages politely
///
/// One `Fetcher` is shared by all workers of a crawl. Per-origin state sits
/// behind a short-lived lock that is never held across an await.
pub struct Fetcher {
    client: Client,
    options: FetchOptions,
    hosts: Mutex<HashMap<String, HostState>>,
}

impl Fetcher {
    pub fn new(options: FetchOptions) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&options)?;
        Ok(Self {
            client,
            options,
            hosts: Mutex::new(HashMap::new()),
        })
    }

    /// Fetches a URL
    ///
    /// # Request Flow
    ///
    /// 1. robots.txt gate (when enabled): disallowed paths fail with
    ///    `RobotsDisallowed`; robots.txt failures allow everything
    /// 2. Wait for this origin's next politeness slot
    /// 3. GET with a randomly chosen identity, following redirects
    /// 4. Non-2xx/3xx final status fails with `Network`
    /// 5. Non-HTML content type fails with `UnsupportedContentType`
    ///
    /// # Returns
    ///
    /// The fetched page or a classified failure
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let origin = origin_key(url);

        if self.options.respect_robots {
            let robots = self.robots_for(url, &origin).await;
            if !robots.is_allowed(url.path()) {
                tracing::debug!("robots.txt disallows {}", url);
                return Err(FetchError::RobotsDisallowed {
                    url: url.to_string(),
                });
            }
        }

        let wait = self.reserve_slot(&origin);
        if !wait.is_zero() {
            tracing::debug!("Waiting {:?} before requesting {}", wait, url);
            tokio::time::sleep(wait).await;
        }

        let identity = self.pick_identity();
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, identity)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !(status.is_success() || status.is_redirection()) {
            return Err(FetchError::Network {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(FetchError::UnsupportedContentType {
                url: url.to_string(),
                content_type: if content_type.is_empty() {
                    "<missing>".to_string()
                } else {
                    content_type
                },
            });
        }

        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            headers,
            body,
        })
    }

    /// Returns cached robots rules for an origin, fetching them on first use
    async fn robots_for(&self, url: &Url, origin: &str) -> RobotsRules {
        if let Some(rules) = self.cached_robots(origin) {
            return rules;
        }

        let identity = self.pick_identity();
        let rules = fetch_robots(&self.client, url, &identity, self.options.robots_timeout).await;

        if let Ok(mut hosts) = self.hosts.lock() {
            let state = hosts.entry(origin.to_string()).or_insert_with(HostState::new);
            state.robots.get_or_insert_with(|| rules.clone());
        }

        rules
    }

    fn cached_robots(&self, origin: &str) -> Option<RobotsRules> {
        let hosts = self.hosts.lock().ok()?;
        hosts.get(origin).and_then(|state| state.robots.clone())
    }

    /// Reserves the next request slot for an origin and returns the wait
    fn reserve_slot(&self, origin: &str) -> Duration {
        let Ok(mut hosts) = self.hosts.lock() else {
            return Duration::ZERO;
        };
        let state = hosts.entry(origin.to_string()).or_insert_with(HostState::new);
        let interval = state.effective_interval(self.options.minimum_request_interval);
        let wait = state.reserve_slot(interval, Instant::now());
        tracing::trace!("Request {} to {} reserved", state.request_count, origin);
        wait
    }

    /// Picks a random identity from the pool
    pub fn pick_identity(&self) -> String {
        self.options
            .user_agents
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| format!("llmstxt-harvest/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Returns true if the Content-Type header names an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    HTML_CONTENT_TYPES.iter().any(|t| lower.contains(t))
}

fn classify_request_error(url: &Url, error: reqwest::Error) -> FetchError {
    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else if error.is_redirect() {
        format!("redirect error: {}", error)
    } else {
        error.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        status: error.status().map(|s| s.as_u16()),
        message,
    }
}
