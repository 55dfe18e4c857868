//! Wire shapes of the NewsAPI v2 JSON responses.
//!
//! Every field is optional: absence means "unknown", never an error.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub total_results: Option<u32>,
    pub articles: Option<Vec<ArticlePayload>>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl NewsResponse {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePayload {
    pub source: Option<SourcePayload>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourcePayload {
    pub id: Option<String>,
    pub name: Option<String>,
}
