//! robots.txt handling module
//!
//! Retrieval is fail-open: a missing, unreachable, slow or non-200 robots.txt
//! allows every path.

mod parser;

pub use parser::RobotsRules;

use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Returns the robots.txt location for the origin of `url`
pub fn robots_url(url: &Url) -> Option<Url> {
    let mut robots = url.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    if robots.host_str().is_none() {
        return None;
    }
    Some(robots)
}

/// Fetches and parses robots.txt for the origin of `url`
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - Any URL on the origin being checked
/// * `user_agent` - Identity sent with the request
/// * `timeout` - Request timeout; robots.txt uses a shorter budget than pages
///
/// # Returns
///
/// The parsed rules, or [`RobotsRules::allow_all`] on any failure
pub async fn fetch_robots(
    client: &Client,
    url: &Url,
    user_agent: &str,
    timeout: Duration,
) -> RobotsRules {
    let Some(robots_url) = robots_url(url) else {
        return RobotsRules::allow_all();
    };

    let response = match client
        .get(robots_url.clone())
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}", robots_url, e);
            return RobotsRules::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt at {} returned {}, allowing all",
            robots_url,
            response.status()
        );
        return RobotsRules::allow_all();
    }

    match response.text().await {
        Ok(body) => {
            let rules = RobotsRules::from_content(&body);
            tracing::debug!(
                "robots.txt at {}: {} disallow rules, crawl delay {:?}",
                robots_url,
                rules.disallowed().len(),
                rules.crawl_delay()
            );
            rules
        }
        Err(e) => {
            tracing::debug!("robots.txt body unreadable at {}: {}", robots_url, e);
            RobotsRules::allow_all()
        }
    }
}
