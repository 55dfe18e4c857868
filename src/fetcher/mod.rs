pub mod http_fetcher;
pub mod payload;
pub mod single_flight;

use async_trait::async_trait;
use thiserror::Error;

pub use payload::{ArticlePayload, NewsResponse, SourcePayload};

pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Classified failure of a remote call.
///
/// The `Display` output is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The remote could not be reached (connect, DNS, timeout, body read).
    #[error("Network Error: {0}")]
    Network(String),

    /// The remote answered but signalled failure or sent an unusable success.
    #[error("API Error: {message}{}", code_suffix(.code))]
    Api { code: Option<u16>, message: String },

    #[error("Unexpected Error: {0}")]
    Unexpected(String),
}

fn code_suffix(code: &Option<u16>) -> String {
    code.map(|c| format!(" (Code: {c})")).unwrap_or_default()
}

impl RemoteError {
    pub fn api(code: Option<u16>, message: impl Into<String>) -> Self {
        RemoteError::Api {
            code,
            message: message.into(),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            RemoteError::Network(_) => "network",
            RemoteError::Api { .. } => "api",
            RemoteError::Unexpected(_) => "unexpected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeadlinesQuery {
    pub country: String,
    pub category: Option<String>,
    pub page_size: u32,
    pub page: u32,
}

impl HeadlinesQuery {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            category: None,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Default for HeadlinesQuery {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub sort_by: String,
    pub page_size: u32,
    pub page: u32,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            sort_by: "publishedAt".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }
}

#[async_trait]
pub trait Fetcher {
    async fn fetch_top_headlines(
        &self,
        query: &HeadlinesQuery,
    ) -> Result<Vec<ArticlePayload>, RemoteError>;

    async fn search_news(&self, query: &SearchQuery) -> Result<Vec<ArticlePayload>, RemoteError>;
}
