use reqwest::StatusCode;
use trendart::constants::SCRAPE_SENTINEL;
use trendart::error::TrendartError;
use trendart::topics::{RedditApi, RedditCredentials, RedditScraper, TimeWindow, TopicSource};
use url::Url;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AUTH_ERROR: &str = r#"{"message": "Unauthorized", "error": 401}"#;

const NEW_LAYOUT: &str = "<html><body><shreddit-post>new layout</shreddit-post></body></html>";

fn listing(titles: &[&str]) -> serde_json::Value {
    let children: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            serde_json::json!({
                "kind": "t3",
                "data": {
                    "title": title,
                    "score": 1000 - i,
                    "url": format!("https://example.org/{i}"),
                    "created_utc": 1_718_000_000.0
                }
            })
        })
        .collect();
    serde_json::json!({"kind": "Listing", "data": {"children": children, "after": null}})
}

fn json_response(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

fn text_response(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_string(body)
}

fn api_for(server: &MockServer) -> RedditApi {
    let base = Url::parse(&server.uri()).expect("base url");
    let mut credentials = RedditCredentials::new("client-id", "client-secret");
    credentials.user_agent = "trendart-tests/0.1".to_string();
    RedditApi::new(credentials)
        .expect("api")
        .with_endpoints(base.join("api/v1/access_token").expect("auth url"), base)
}

#[tokio::test]
async fn api_returns_titles_in_rank_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header_exists("authorization"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(json_response(200, serde_json::json!({
            "access_token": "token-123",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/worldnews/top"))
        .and(query_param("t", "day"))
        .and(query_param("limit", "3"))
        .and(header("authorization", "Bearer token-123"))
        .and(header("user-agent", "trendart-tests/0.1"))
        .respond_with(json_response(200, listing(&[
            "Whales return to the bay",
            "City plants a million trees",
            "Old lighthouse restored",
            "Should be cut by the limit",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let titles = api_for(&server)
        .fetch_titles("worldnews", TimeWindow::Day, 3)
        .await
        .expect("fetch titles");
    assert_eq!(
        titles,
        vec![
            "Whales return to the bay",
            "City plants a million trees",
            "Old lighthouse restored",
        ]
    );
}

#[tokio::test]
async fn api_keeps_post_metadata_for_direct_callers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(json_response(200, serde_json::json!({"access_token": "t"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/technology/top"))
        .respond_with(json_response(200, listing(&["Chip ships"])))
        .mount(&server)
        .await;

    let posts = api_for(&server)
        .top_posts("technology", TimeWindow::Week, 10)
        .await
        .expect("fetch posts");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Chip ships");
    assert_eq!(posts[0].score, 1000);
    assert_eq!(posts[0].url, "https://example.org/0");
}

#[tokio::test]
async fn api_auth_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(text_response(401, AUTH_ERROR))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .fetch_titles("worldnews", TimeWindow::Day, 10)
        .await
        .expect_err("should fail");
    match err {
        TrendartError::Http { status, body } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("expected an HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn api_rate_limit_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(json_response(200, serde_json::json!({"access_token": "t"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/worldnews/top"))
        .respond_with(text_response(429, "Too Many Requests"))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .fetch_titles("worldnews", TimeWindow::Day, 10)
        .await
        .expect_err("should fail");
    assert!(err.is_http_status());
}

const LISTING_HTML: &str = r#"<!doctype html>
<html><body>
<div class="thing"><div class="entry"><div class="top-matter">
  <p class="title"><a class="title may-blank" href="/r/upliftingnews/1">Teen builds prosthetic hands for free</a></p>
</div></div></div>
<div class="thing"><div class="entry"><div class="top-matter">
  <p class="title"><a class="title may-blank" href="/r/upliftingnews/2">Rescued owl &quot;Hoot&quot; released</a></p>
</div></div></div>
</body></html>"#;

#[tokio::test(flavor = "multi_thread")]
async fn scraper_reads_listing_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/upliftingnews/top/"))
        .and(query_param("t", "day"))
        .respond_with(text_response(200, LISTING_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = RedditScraper::with_base_url(Url::parse(&server.uri()).expect("url"));
    let titles = scraper
        .fetch_titles("upliftingnews", TimeWindow::Day, 10)
        .await
        .expect("scrape");
    assert_eq!(
        titles,
        vec![
            "Teen builds prosthetic hands for free",
            "Rescued owl \"Hoot\" released",
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn scraper_returns_sentinel_when_markup_changed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/worldnews/top/"))
        .respond_with(text_response(200, NEW_LAYOUT))
        .mount(&server)
        .await;

    let scraper = RedditScraper::with_base_url(Url::parse(&server.uri()).expect("url"));
    let titles = scraper
        .fetch_titles("worldnews", TimeWindow::Day, 10)
        .await
        .expect("scrape");
    assert_eq!(titles, vec![SCRAPE_SENTINEL.to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn scraper_treats_error_pages_as_empty_listings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/worldnews/top/"))
        .respond_with(text_response(429, "<html><body>Too Many Requests</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let scraper = RedditScraper::with_base_url(Url::parse(&server.uri()).expect("url"));
    let titles = scraper
        .fetch_titles("worldnews", TimeWindow::Day, 10)
        .await
        .expect("scrape");
    assert_eq!(titles, vec![SCRAPE_SENTINEL.to_string()]);
}
