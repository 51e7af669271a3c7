use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};
use ureq::Agent;
use url::Url;

use super::{TimeWindow, TopicSource};
use crate::constants::{REDDIT_SCRAPE_URL, SCRAPE_SENTINEL, SCRAPE_USER_AGENT};
use crate::error::TrendartError;

/// Reads top post titles straight from a subreddit's listing page.
///
/// Depends on the old listing markup (`div.top-matter` wrapping `a.title`);
/// when that changes the scraper returns [`SCRAPE_SENTINEL`] instead of failing.
#[derive(Clone, Debug)]
pub struct RedditScraper {
    base_url: Url,
    user_agent: String,
}

impl RedditScraper {
    /// Scraper aimed at the public listing site.
    pub fn new() -> Result<Self, TrendartError> {
        Ok(Self::with_base_url(Url::parse(REDDIT_SCRAPE_URL)?))
    }

    /// Scraper aimed at an arbitrary host serving the same markup.
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            base_url,
            user_agent: SCRAPE_USER_AGENT.to_string(),
        }
    }

    /// Listing page URL for a subreddit and window.
    pub fn listing_url(&self, subreddit: &str, window: TimeWindow) -> Result<Url, TrendartError> {
        let mut url = self.base_url.join(&format!("r/{subreddit}/top/"))?;
        url.query_pairs_mut().append_pair("t", window.as_str());
        Ok(url)
    }
}

#[async_trait]
impl TopicSource for RedditScraper {
    async fn fetch_titles(
        &self,
        subreddit: &str,
        window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<String>, TrendartError> {
        let url = self.listing_url(subreddit, window)?;
        let user_agent = self.user_agent.clone();
        let html = tokio::task::spawn_blocking(move || fetch_listing_page(&url, &user_agent))
            .await
            .map_err(|err| TrendartError::Scrape(err.to_string()))??;
        parse_titles(&html, limit)
    }
}

/// Downloads a listing page as text.
///
/// Error statuses are not failures here: their body is returned like any
/// other page and the parser decides whether it held any titles.
pub fn fetch_listing_page(url: &Url, user_agent: &str) -> Result<String, TrendartError> {
    info!("Scraping {url}");
    let agent: Agent = Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .into();
    let mut response = agent
        .get(url.as_str())
        .header("User-Agent", user_agent)
        .call()?;
    let status = response.status();
    if !status.is_success() {
        warn!("Listing page answered {status}");
    }
    Ok(response.body_mut().read_to_string()?)
}

/// Byte offset of the `</div>` closing a div whose content starts at `start`,
/// or the end of `html` when it is never closed.
fn closing_div(div_tag_re: &Regex, html: &str, start: usize) -> usize {
    let mut depth = 1usize;
    for caps in div_tag_re.captures_iter(&html[start..]) {
        let Some(tag) = caps.get(0) else {
            continue;
        };
        if caps.get(1).is_some_and(|slash| !slash.is_empty()) {
            depth -= 1;
            if depth == 0 {
                return start + tag.start();
            }
        } else {
            depth += 1;
        }
    }
    html.len()
}

/// Pulls up to `limit` post titles out of listing markup.
///
/// Returns a single [`SCRAPE_SENTINEL`] entry when nothing matched.
pub fn parse_titles(html: &str, limit: usize) -> Result<Vec<String>, TrendartError> {
    let div_re = Regex::new(r"(?is)<div\b([^>]*)>")?;
    let div_tag_re = Regex::new(r"(?is)<(/?)div\b[^>]*>")?;
    let anchor_re = Regex::new(r"(?is)<a\b([^>]*)>(.*?)</a\s*>")?;
    let tag_re = Regex::new(r"(?s)<[^>]*>")?;
    let class_re = Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?;

    let has_class = |attrs: &str, wanted: &str| -> bool {
        class_re.captures(attrs).is_some_and(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .is_some_and(|value| value.as_str().split_whitespace().any(|c| c == wanted))
        })
    };

    let starts: Vec<usize> = div_re
        .captures_iter(html)
        .filter(|caps| {
            caps.get(1)
                .is_some_and(|attrs| has_class(attrs.as_str(), "top-matter"))
        })
        .filter_map(|caps| caps.get(0).map(|m| m.end()))
        .collect();

    let mut titles = Vec::new();
    for start in starts.into_iter().take(limit) {
        let end = closing_div(&div_tag_re, html, start);
        let block = &html[start..end];
        let title = anchor_re.captures_iter(block).find_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            if !has_class(attrs, "title") {
                return None;
            }
            let inner = caps.get(2)?.as_str();
            let text = tag_re.replace_all(inner, "");
            Some(html_escape::decode_html_entities(&text).trim().to_string())
        });
        if let Some(title) = title {
            titles.push(title);
        }
    }

    if titles.is_empty() {
        warn!("No trending topics found. The page structure might have changed.");
        titles.push(SCRAPE_SENTINEL.to_string());
    }
    Ok(titles)
}
