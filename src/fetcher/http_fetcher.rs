use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::app::Result;
use crate::config::ApiConfig;
use crate::fetcher::{ArticlePayload, Fetcher, HeadlinesQuery, NewsResponse, RemoteError, SearchQuery};

const TOP_HEADLINES_PATH: &str = "v2/top-headlines";
const EVERYTHING_PATH: &str = "v2/everything";

pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str());

        // Zero leaves the timeout to the transport default.
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Url::parse(&config.base_url)?,
            api_key: config.resolved_api_key(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> std::result::Result<Url, RemoteError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| RemoteError::Unexpected(format!("invalid endpoint {path}: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            if let Some(ref api_key) = self.api_key {
                pairs.append_pair("apiKey", api_key);
            }
        }

        Ok(url)
    }

    async fn get_articles(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<Vec<ArticlePayload>, RemoteError> {
        let url = self.endpoint(path, params)?;
        tracing::debug!("GET {}{}", self.base_url, path);

        let response = self.client.get(url).send().await.map_err(classify_transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify_transport)?;

        decode_response(status, &body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_top_headlines(
        &self,
        query: &HeadlinesQuery,
    ) -> std::result::Result<Vec<ArticlePayload>, RemoteError> {
        let mut params = vec![("country", query.country.clone())];
        if let Some(ref category) = query.category {
            params.push(("category", category.clone()));
        }
        params.push(("pageSize", query.page_size.to_string()));
        params.push(("page", query.page.to_string()));

        self.get_articles(TOP_HEADLINES_PATH, &params).await
    }

    async fn search_news(
        &self,
        query: &SearchQuery,
    ) -> std::result::Result<Vec<ArticlePayload>, RemoteError> {
        let params = [
            ("q", query.query.clone()),
            ("sortBy", query.sort_by.clone()),
            ("pageSize", query.page_size.to_string()),
            ("page", query.page.to_string()),
        ];

        self.get_articles(EVERYTHING_PATH, &params).await
    }
}

fn classify_transport(err: reqwest::Error) -> RemoteError {
    if err.is_decode() {
        RemoteError::Unexpected(err.to_string())
    } else {
        RemoteError::Network(err.to_string())
    }
}

/// Turn a raw HTTP answer into payloads or a classified failure.
pub(crate) fn decode_response(
    status: StatusCode,
    body: &[u8],
) -> std::result::Result<Vec<ArticlePayload>, RemoteError> {
    if !status.is_success() {
        return Err(RemoteError::api(Some(status.as_u16()), error_detail(status, body)));
    }

    let response: NewsResponse =
        serde_json::from_slice(body).map_err(|e| RemoteError::Unexpected(e.to_string()))?;

    if response.is_error() {
        return Err(RemoteError::api(Some(status.as_u16()), error_detail(status, body)));
    }

    response
        .articles
        .ok_or_else(|| RemoteError::api(None, "API returned success but no articles found."))
}

fn error_detail(status: StatusCode, body: &[u8]) -> String {
    if let Ok(NewsResponse {
        message: Some(message),
        ..
    }) = serde_json::from_slice::<NewsResponse>(body)
    {
        return message;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .map(String::from)
        .unwrap_or_else(|| "Unknown API error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    const OK_BODY: &str = r#"{"status":"ok","totalResults":2,"articles":[
        {"source":{"id":null,"name":"Wire"},"title":"One","url":"https://example.com/1"},
        {"title":"Two","url":"https://example.com/2"}
    ]}"#;

    #[test]
    fn test_decode_success() {
        let articles = decode_response(StatusCode::OK, OK_BODY.as_bytes()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].title.as_deref(), Some("Two"));
    }

    #[test]
    fn test_decode_non_2xx_uses_message_field() {
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        let err = decode_response(StatusCode::UNAUTHORIZED, body.as_bytes()).unwrap_err();
        assert_eq!(
            err,
            RemoteError::api(Some(401), "Your API key is invalid.")
        );
    }

    #[test]
    fn test_decode_non_2xx_falls_back_to_body_then_status() {
        let err = decode_response(StatusCode::BAD_GATEWAY, b"upstream down").unwrap_err();
        assert_eq!(err.to_string(), "API Error: upstream down (Code: 502)");

        let err = decode_response(StatusCode::SERVICE_UNAVAILABLE, b"").unwrap_err();
        assert_eq!(err.to_string(), "API Error: Service Unavailable (Code: 503)");
    }

    #[test]
    fn test_decode_missing_articles_is_api_error() {
        let err = decode_response(StatusCode::OK, br#"{"status":"ok","totalResults":0}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "API Error: API returned success but no articles found."
        );
    }

    #[test]
    fn test_decode_error_status_in_2xx_body() {
        let body = r#"{"status":"error","code":"rateLimited","message":"Too many requests"}"#;
        let err = decode_response(StatusCode::OK, body.as_bytes()).unwrap_err();
        assert_eq!(err, RemoteError::api(Some(200), "Too many requests"));
    }

    #[test]
    fn test_decode_malformed_json_is_unexpected() {
        let err = decode_response(StatusCode::OK, b"<html>").unwrap_err();
        assert_eq!(err.category(), "unexpected");
    }

    async fn headlines_handler(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        if params.get("apiKey").map(String::as_str) != Some("secret") {
            return (
                AxumStatus::UNAUTHORIZED,
                r#"{"status":"error","code":"apiKeyMissing","message":"Your API key is missing."}"#
                    .to_string(),
            );
        }
        if params.get("country").map(String::as_str) != Some("gb")
            || params.get("pageSize").map(String::as_str) != Some("20")
            || params.get("page").map(String::as_str) != Some("1")
        {
            return (AxumStatus::BAD_REQUEST, "bad query".to_string());
        }
        (AxumStatus::OK, OK_BODY.to_string())
    }

    async fn everything_handler(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let title = params.get("q").cloned().unwrap_or_default();
        let sort = params.get("sortBy").cloned().unwrap_or_default();
        let body = serde_json::json!({
            "status": "ok",
            "articles": [{"title": format!("{title} by {sort}"), "url": "https://example.com/s"}]
        });
        (AxumStatus::OK, body.to_string())
    }

    async fn spawn_test_server() -> (String, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route("/v2/top-headlines", get(headlines_handler))
            .route("/v2/everything", get(everything_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        let join_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server should run");
        });
        (format!("http://{address}"), join_handle)
    }

    fn fetcher_for(base_url: &str, api_key: Option<&str>) -> HttpFetcher {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(String::from),
            ..ApiConfig::default()
        };
        let mut fetcher = HttpFetcher::new(&config).unwrap();
        // Ignore NEWS_API_KEY from the test environment.
        fetcher.api_key = api_key.map(String::from);
        fetcher
    }

    #[tokio::test]
    async fn test_fetch_top_headlines_against_server() {
        let (base_url, server) = spawn_test_server().await;
        let fetcher = fetcher_for(&base_url, Some("secret"));

        let articles = fetcher
            .fetch_top_headlines(&HeadlinesQuery::new("gb"))
            .await
            .unwrap();
        assert_eq!(articles.len(), 2);

        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_without_key_is_api_error() {
        let (base_url, server) = spawn_test_server().await;
        let fetcher = fetcher_for(&base_url, None);

        let err = fetcher
            .fetch_top_headlines(&HeadlinesQuery::new("gb"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API Error: Your API key is missing. (Code: 401)");

        server.abort();
    }

    #[tokio::test]
    async fn test_search_news_sends_sort_order() {
        let (base_url, server) = spawn_test_server().await;
        let fetcher = fetcher_for(&base_url, Some("secret"));

        let articles = fetcher.search_news(&SearchQuery::new("rust")).await.unwrap();
        assert_eq!(articles[0].title.as_deref(), Some("rust by publishedAt"));

        server.abort();
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = fetcher_for(&format!("http://{address}"), Some("secret"));
        let err = fetcher
            .fetch_top_headlines(&HeadlinesQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "network");
    }
}
