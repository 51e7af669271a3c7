//! Trending topic sources.
//!
//! Two ways of reading a subreddit's top posts: the authenticated API
//! ([`RedditApi`]) and a scrape of the public listing page ([`RedditScraper`]).

mod api;
mod scrape;

use std::fmt;

use async_trait::async_trait;

use crate::error::TrendartError;

pub use api::{Post, RedditApi, RedditCredentials};
pub use scrape::{RedditScraper, fetch_listing_page, parse_titles};

/// Reddit's `t=` filter for top listings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum TimeWindow {
    /// Past hour
    Hour,
    /// Past 24 hours
    #[default]
    Day,
    /// Past week
    Week,
    /// Past month
    Month,
    /// Past year
    Year,
    /// All time
    All,
}

impl TimeWindow {
    /// Value Reddit expects in the `t` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
            Self::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which topic source the pipeline reads from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum SourceKind {
    /// OAuth client-credentials API access
    #[default]
    Api,
    /// Unauthenticated scrape of the listing page
    Scrape,
}

/// Anything that can list the titles of a subreddit's top posts.
#[async_trait]
pub trait TopicSource: Send + Sync {
    /// Returns at most `limit` post titles, in ranking order.
    async fn fetch_titles(
        &self,
        subreddit: &str,
        window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<String>, TrendartError>;
}
