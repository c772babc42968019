use crate::error::{Result, SearchError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";

/// Where the engine gets its pages from. The traversal code only ever talks
/// to this trait, so tests can swap in an in-memory graph and the CLI can
/// point at any MediaWiki install.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Resolve free-form input to the canonical page title.
    async fn resolve_title(&self, query: &str) -> Result<String>;

    /// Outbound links of a page, article namespace only.
    async fn links(&self, title: &str) -> Result<Vec<String>>;

    /// Category titles the page is filed under.
    async fn categories(&self, title: &str) -> Result<Vec<String>>;
}

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Deserialize)]
struct QueryBody {
    pages: HashMap<String, PageEntry>,
}

#[derive(Deserialize)]
struct PageEntry {
    #[serde(default)]
    links: Vec<TitleEntry>,
    #[serde(default)]
    categories: Vec<TitleEntry>,
}

#[derive(Deserialize)]
struct TitleEntry {
    #[serde(default)]
    ns: i64,
    title: String,
}

/// MediaWiki Action API client.
pub struct WikiClient {
    client: Client,
    api_url: Url,
    max_retries: usize,
}

impl WikiClient {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("wikihop/0.2 (https://github.com/trapdoorsec/wikihop)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            max_retries: 2,
        }
    }

    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// GET against the API with bounded retry on 429 and server errors.
    /// Everything else fails on the first attempt.
    async fn get_json(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let mut attempt = 0;
        let mut delay = Duration::from_millis(500);

        loop {
            match self.get_json_once(params).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    warn!(
                        "API request failed, retry {}/{}: {}",
                        attempt + 1,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json_once(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.api_url.clone())
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

impl Default for WikiClient {
    fn default() -> Self {
        Self::new()
    }
}

fn is_retryable(err: &SearchError) -> bool {
    match err {
        SearchError::HttpError(e) => e
            .status()
            .is_some_and(|s| s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error()),
        _ => false,
    }
}

#[async_trait]
impl PageSource for WikiClient {
    async fn resolve_title(&self, query: &str) -> Result<String> {
        debug!("Resolving title for {:?}", query);

        // opensearch responds positionally: [query, [titles], [descriptions], [urls]]
        let value = self
            .get_json(&[
                ("action", "opensearch"),
                ("namespace", "0"),
                ("limit", "max"),
                ("format", "json"),
                ("search", query),
            ])
            .await?;

        let suggestions = value
            .get(1)
            .and_then(|v| v.as_array())
            .ok_or_else(|| SearchError::ApiError("opensearch reply is not a result array".into()))?;

        match suggestions.first().and_then(|v| v.as_str()) {
            Some(title) => Ok(title.to_string()),
            None => Err(SearchError::TitleNotFound {
                query: query.to_string(),
            }),
        }
    }

    async fn links(&self, title: &str) -> Result<Vec<String>> {
        debug!("Fetching links of {:?}", title);

        let value = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "links"),
                ("pllimit", "max"),
                ("titles", title),
            ])
            .await?;

        let response: QueryResponse = serde_json::from_value(value)
            .map_err(|e| SearchError::ApiError(format!("bad links reply: {}", e)))?;

        // Missing page or linkless page both come back empty. The API caps
        // one reply at pllimit entries; continuation is not followed.
        let mut links = Vec::new();
        if let Some(body) = response.query {
            for page in body.pages.into_values() {
                links.extend(
                    page.links
                        .into_iter()
                        .filter(|l| l.ns == 0)
                        .map(|l| l.title),
                );
            }
        }
        Ok(links)
    }

    async fn categories(&self, title: &str) -> Result<Vec<String>> {
        debug!("Fetching categories of {:?}", title);

        let value = self
            .get_json(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "categories"),
                ("titles", title),
            ])
            .await?;

        let response: QueryResponse = serde_json::from_value(value)
            .map_err(|e| SearchError::ApiError(format!("bad categories reply: {}", e)))?;

        let mut categories = Vec::new();
        if let Some(body) = response.query {
            for page in body.pages.into_values() {
                categories.extend(page.categories.into_iter().map(|c| c.title));
            }
        }
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    async fn test_client(server: &MockServer) -> WikiClient {
        let api_url = Url::parse(&format!("{}/w/api.php", server.uri())).unwrap();
        WikiClient::new().with_api_url(api_url)
    }

    #[tokio::test]
    async fn resolve_title_takes_first_suggestion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "opensearch"))
            .and(query_param("search", "mexico city"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                "mexico city",
                ["Mexico City", "Mexico City Metro"],
                ["", ""],
                ["https://en.wikipedia.org/wiki/Mexico_City", ""]
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let title = client.resolve_title("mexico city").await.unwrap();
        assert_eq!(title, "Mexico City");
    }

    #[tokio::test]
    async fn resolve_title_reports_unknown_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("action", "opensearch"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!(["zzzzqqq", [], [], []])),
            )
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let err = client.resolve_title("zzzzqqq").await.unwrap_err();
        assert!(matches!(err, SearchError::TitleNotFound { ref query } if query == "zzzzqqq"));
    }

    #[tokio::test]
    async fn links_keeps_article_namespace_only() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "links"))
            .and(query_param("titles", "Coffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {
                    "pages": {
                        "604727": {
                            "pageid": 604727,
                            "title": "Coffee",
                            "links": [
                                {"ns": 0, "title": "Arabica"},
                                {"ns": 14, "title": "Category:Beverages"},
                                {"ns": 0, "title": "Brazil"},
                                {"ns": 1, "title": "Talk:Coffee"}
                            ]
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let links = client.links("Coffee").await.unwrap();
        assert_eq!(links, vec!["Arabica", "Brazil"]);
    }

    #[tokio::test]
    async fn linkless_page_yields_empty_list() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "links"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {
                    "pages": {
                        "-1": {"title": "Nothing here", "missing": ""}
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let links = client.links("Nothing here").await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn categories_come_back_as_titles() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "categories"))
            .and(query_param("titles", "Coffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "query": {
                    "pages": {
                        "604727": {
                            "title": "Coffee",
                            "categories": [
                                {"ns": 14, "title": "Category:Coffee"},
                                {"ns": 14, "title": "Category:Crops"}
                            ]
                        }
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = test_client(&server).await;
        let categories = client.categories("Coffee").await.unwrap();
        assert_eq!(categories, vec!["Category:Coffee", "Category:Crops"]);
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_succeed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!(["q", ["Answer"], [], []])),
            )
            .mount(&server)
            .await;

        let client = test_client(&server).await.with_retries(2);
        let title = client.resolve_title("q").await.unwrap();
        assert_eq!(title, "Answer");
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server).await.with_retries(3);
        let err = client.resolve_title("anything").await.unwrap_err();
        assert!(matches!(err, SearchError::HttpError(_)));
    }
}
