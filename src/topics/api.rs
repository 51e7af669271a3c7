use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{TimeWindow, TopicSource};
use crate::constants::{DEFAULT_REDDIT_USER_AGENT, REDDIT_API_URL, REDDIT_AUTH_URL};
use crate::error::TrendartError;

/// Reddit API application credentials.
#[derive(Clone, Debug, Default)]
pub struct RedditCredentials {
    /// Env: REDDIT_CLIENT_ID
    pub client_id: Option<String>,
    /// Env: REDDIT_CLIENT_SECRET
    pub client_secret: Option<String>,
    /// Env: REDDIT_USER_AGENT
    pub user_agent: String,
}

impl RedditCredentials {
    /// Credentials with the default user agent.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
        }
    }
}

/// A top post as returned by the listing endpoint.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Post {
    /// Post title, the only field the pipeline consumes
    pub title: String,
    /// Net votes
    #[serde(default)]
    pub score: i64,
    /// Link target
    #[serde(default)]
    pub url: String,
    /// Creation time in seconds since the epoch
    #[serde(default)]
    pub created_utc: f64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: Post,
}

/// Authenticated Reddit API client using the client-credentials grant.
#[derive(Clone, Debug)]
pub struct RedditApi {
    http: Client,
    auth_url: Url,
    api_url: Url,
    client_id: String,
    client_secret: String,
}

impl RedditApi {
    /// Builds a client; both the id and secret must be present.
    pub fn new(credentials: RedditCredentials) -> Result<Self, TrendartError> {
        let client_id = credentials
            .client_id
            .filter(|value| !value.is_empty())
            .ok_or(TrendartError::MissingCredential("REDDIT_CLIENT_ID"))?;
        let client_secret = credentials
            .client_secret
            .filter(|value| !value.is_empty())
            .ok_or(TrendartError::MissingCredential("REDDIT_CLIENT_SECRET"))?;

        let http = Client::builder()
            .user_agent(credentials.user_agent)
            .build()?;

        Ok(Self {
            http,
            auth_url: Url::parse(REDDIT_AUTH_URL)?,
            api_url: Url::parse(REDDIT_API_URL)?,
            client_id,
            client_secret,
        })
    }

    /// Points the client at different token and API endpoints.
    pub fn with_endpoints(mut self, auth_url: Url, api_url: Url) -> Self {
        self.auth_url = auth_url;
        self.api_url = api_url;
        self
    }

    async fn access_token(&self) -> Result<String, TrendartError> {
        let response = self
            .http
            .post(self.auth_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendartError::Http { status, body });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetches the top `limit` posts of `subreddit` within `window`.
    pub async fn top_posts(
        &self,
        subreddit: &str,
        window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<Post>, TrendartError> {
        let token = self.access_token().await?;
        let url = self.api_url.join(&format!("r/{subreddit}/top"))?;
        debug!("Requesting {url} t={window} limit={limit}");

        let limit_param = limit.to_string();
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("t", window.as_str()),
                ("limit", limit_param.as_str()),
                ("raw_json", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrendartError::Http { status, body });
        }

        let listing: Listing = response.json().await?;
        let posts: Vec<Post> = listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .take(limit)
            .collect();
        info!("Fetched {} posts from r/{subreddit}", posts.len());
        Ok(posts)
    }
}

#[async_trait]
impl TopicSource for RedditApi {
    async fn fetch_titles(
        &self,
        subreddit: &str,
        window: TimeWindow,
        limit: usize,
    ) -> Result<Vec<String>, TrendartError> {
        Ok(self
            .top_posts(subreddit, window, limit)
            .await?
            .into_iter()
            .map(|post| post.title)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_client_id_is_rejected() {
        let credentials = RedditCredentials {
            client_id: None,
            client_secret: Some("secret".to_string()),
            user_agent: DEFAULT_REDDIT_USER_AGENT.to_string(),
        };
        let err = RedditApi::new(credentials).expect_err("should fail");
        assert!(matches!(err, TrendartError::MissingCredential("REDDIT_CLIENT_ID")));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut credentials = RedditCredentials::new("id", "");
        credentials.user_agent = "test-agent/1.0".to_string();
        let err = RedditApi::new(credentials).expect_err("should fail");
        assert!(matches!(err, TrendartError::MissingCredential("REDDIT_CLIENT_SECRET")));
    }

    #[test]
    fn listing_decodes_posts() {
        let json = r#"{
            "kind": "Listing",
            "data": {
                "after": "t3_xyz",
                "children": [
                    {"kind": "t3", "data": {"title": "Solar farm opens", "score": 5120, "url": "https://example.org/a", "created_utc": 1718000000.0}},
                    {"kind": "t3", "data": {"title": "New bridge finished", "score": 77}}
                ]
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).expect("parse listing");
        let posts: Vec<Post> = listing.data.children.into_iter().map(|c| c.data).collect();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Solar farm opens");
        assert_eq!(posts[0].score, 5120);
        assert_eq!(posts[1].url, "");
    }
}
