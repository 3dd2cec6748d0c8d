use crate::api::types::{PostPage, RemotePost};
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Header carrying the number of pages for the current query.
pub const TOTAL_PAGES_HEADER: &str = "X-WP-TotalPages";
/// Header carrying the number of posts for the current query.
pub const TOTAL_POSTS_HEADER: &str = "X-WP-Total";

/// Errors that can occur while talking to the content API.
///
/// One attempt is made per request; callers decide whether and when to retry.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Body was not the JSON shape we expect
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Client for the posts collection of a WordPress-style REST API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so
/// background tasks take their own copy.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ContentClient {
    /// Build a client rooted at `base_url` (e.g. `https://host/wp-json/wp/v2/`).
    ///
    /// A missing trailing slash is added so relative joins keep the last
    /// path segment.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(timeout)
            .user_agent(concat!("crfnews/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch one page of posts with embedded media and taxonomy.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Network`] - Connection or TLS errors
    /// - [`FetchError::Timeout`] - Request exceeded the client timeout
    /// - [`FetchError::HttpStatus`] - Non-2xx HTTP response (including the 400
    ///   the API sends for a page past the end)
    /// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
    /// - [`FetchError::Parse`] - Body was not a JSON array of posts
    pub async fn fetch_page(&self, page: u32, per_page: u32) -> Result<PostPage, FetchError> {
        let url = self.posts_url(&[
            ("_embed", String::new()),
            ("per_page", per_page.to_string()),
            ("page", page.to_string()),
        ])?;

        tracing::debug!(url = %url, page, per_page, "Fetching posts page");
        let (headers, bytes) = self.get(url).await?;
        let posts = parse_posts(&bytes)?;

        Ok(PostPage {
            total_pages: header_number(&headers, TOTAL_PAGES_HEADER),
            total_posts: header_number(&headers, TOTAL_POSTS_HEADER),
            posts,
        })
    }

    /// Fetch the post with the given slug, or `None` if the API returned an
    /// empty result set.
    pub async fn fetch_post_by_slug(&self, slug: &str) -> Result<Option<RemotePost>, FetchError> {
        let url = self.posts_url(&[("slug", slug.to_string()), ("_embed", String::new())])?;

        tracing::debug!(url = %url, slug, "Fetching post by slug");
        let (_, bytes) = self.get(url).await?;
        let mut posts = parse_posts(&bytes)?;

        if posts.is_empty() {
            return Ok(None);
        }
        Ok(Some(posts.swap_remove(0)))
    }

    fn posts_url(&self, params: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join("posts")
            .map_err(|e| FetchError::Parse(format!("Invalid API URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if value.is_empty() {
                    pairs.append_key_only(key);
                } else {
                    pairs.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<(HeaderMap, Vec<u8>), FetchError> {
        let response = tokio::time::timeout(self.timeout, self.http.get(url.clone()).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Content API returned an error status");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let headers = response.headers().clone();
        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        Ok((headers, bytes))
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn parse_posts(bytes: &[u8]) -> Result<Vec<RemotePost>, FetchError> {
    serde_json::from_slice(bytes).map_err(|e| FetchError::Parse(e.to_string()))
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ONE_POST: &str = r#"[{
        "id": 1,
        "date": "2024-05-10T14:30:00",
        "slug": "primeira",
        "title": {"rendered": "Primeira"},
        "excerpt": {"rendered": "<p>Resumo</p>"}
    }]"#;

    fn client_for(server: &MockServer) -> ContentClient {
        let base = Url::parse(&format!("{}/wp-json/wp/v2", server.uri())).unwrap();
        ContentClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_normalize_base_adds_trailing_slash() {
        let url = normalize_base(Url::parse("https://example.com/wp-json/wp/v2").unwrap());
        assert_eq!(url.as_str(), "https://example.com/wp-json/wp/v2/");

        let url = normalize_base(Url::parse("https://example.com/wp-json/wp/v2/").unwrap());
        assert_eq!(url.as_str(), "https://example.com/wp-json/wp/v2/");
    }

    #[tokio::test]
    async fn test_fetch_page_reads_total_pages_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "12"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ONE_POST)
                    .insert_header("Content-Type", "application/json")
                    .insert_header("X-WP-TotalPages", "4")
                    .insert_header("X-WP-Total", "40"),
            )
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_page(2, 12).await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.total_pages, Some(4));
        assert_eq!(page.total_posts, Some(40));
    }

    #[tokio::test]
    async fn test_fetch_page_without_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_POST))
            .mount(&server)
            .await;

        let page = client_for(&server).fetch_page(1, 12).await.unwrap();
        assert_eq!(page.total_pages, None);
        assert_eq!(page.total_posts, None);
    }

    #[tokio::test]
    async fn test_fetch_page_http_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_page(1, 12).await;
        match result {
            Err(FetchError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"code\": \"oops\"}"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_page(1, 12).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_by_slug_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wp/v2/posts"))
            .and(query_param("slug", "primeira"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_POST))
            .mount(&server)
            .await;

        let post = client_for(&server)
            .fetch_post_by_slug("primeira")
            .await
            .unwrap();
        assert_eq!(post.map(|p| p.id), Some(1));
    }

    #[tokio::test]
    async fn test_fetch_by_slug_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let post = client_for(&server)
            .fetch_post_by_slug("inexistente")
            .await
            .unwrap();
        assert!(post.is_none());
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ONE_POST)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/wp-json/wp/v2/", server.uri())).unwrap();
        let client = ContentClient::new(base, Duration::from_millis(50)).unwrap();
        let result = client.fetch_page(1, 12).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }
}
