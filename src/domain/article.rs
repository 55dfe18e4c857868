use serde::{Deserialize, Serialize};

pub const UNKNOWN_SOURCE: &str = "Unknown Source";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// A cached headline as persisted in the local store.
///
/// `url` is the primary key. `published_at` is kept verbatim as the
/// ISO-8601 string the remote sent; it is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub source_name: Option<String>,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
    /// Epoch milliseconds at which the record was written.
    pub retrieved_at: i64,
}

impl ArticleRecord {
    pub fn new(url: impl Into<String>, title: impl Into<String>, retrieved_at: i64) -> Self {
        Self {
            url: url.into(),
            source_name: None,
            author: None,
            title: title.into(),
            description: None,
            url_to_image: None,
            published_at: None,
            content: None,
            retrieved_at,
        }
    }

    /// Records without a key or a title are never persisted.
    pub fn is_valid(&self) -> bool {
        !self.url.trim().is_empty() && !self.title.trim().is_empty()
    }
}

/// Display-ready article. Every field is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub source_name: String,
    pub author: String,
    pub title: String,
    pub description: String,
    pub url_to_image: String,
    pub published_at: String,
    pub content: String,
}

impl Article {
    /// Best available body text for display
    pub fn display_body(&self) -> &str {
        if self.content.is_empty() {
            &self.description
        } else {
            &self.content
        }
    }
}

impl From<&ArticleRecord> for Article {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            url: record.url.clone(),
            source_name: record
                .source_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            author: record
                .author
                .clone()
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            url_to_image: record.url_to_image.clone().unwrap_or_default(),
            published_at: record.published_at.clone().unwrap_or_default(),
            content: record.content.clone().unwrap_or_default(),
        }
    }
}

impl From<ArticleRecord> for Article {
    fn from(record: ArticleRecord) -> Self {
        Self::from(&record)
    }
}

pub fn to_articles(records: &[ArticleRecord]) -> Vec<Article> {
    records.iter().map(Article::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_for_missing_fields() {
        let record = ArticleRecord::new("https://example.com/a", "Headline", 0);
        let article = Article::from(&record);

        assert_eq!(article.source_name, UNKNOWN_SOURCE);
        assert_eq!(article.author, UNKNOWN_AUTHOR);
        assert_eq!(article.description, "");
        assert_eq!(article.url_to_image, "");
        assert_eq!(article.published_at, "");
        assert_eq!(article.content, "");
    }

    #[test]
    fn test_present_fields_are_kept() {
        let mut record = ArticleRecord::new("https://example.com/a", "Headline", 0);
        record.source_name = Some("Wire".into());
        record.author = Some("J. Doe".into());
        record.published_at = Some("2024-05-01T10:00:00Z".into());
        let article = Article::from(record);

        assert_eq!(article.source_name, "Wire");
        assert_eq!(article.author, "J. Doe");
        assert_eq!(article.published_at, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_is_valid_rejects_blank_key_or_title() {
        assert!(ArticleRecord::new("https://example.com/a", "T", 0).is_valid());
        assert!(!ArticleRecord::new("", "T", 0).is_valid());
        assert!(!ArticleRecord::new("https://example.com/a", "  ", 0).is_valid());
    }

    #[test]
    fn test_display_body_falls_back_to_description() {
        let mut record = ArticleRecord::new("https://example.com/a", "T", 0);
        record.description = Some("Summary".into());
        assert_eq!(Article::from(&record).display_body(), "Summary");

        record.content = Some("Full text".into());
        assert_eq!(Article::from(&record).display_body(), "Full text");
    }
}
