use crate::domain::{Article, ArticleRecord};
use crate::fetcher::ArticlePayload;

/// Validates remote payloads and maps them to records and articles.
///
/// Payloads missing a url or a title are dropped; the rest of the batch is
/// kept.
#[derive(Clone, Debug, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn to_record(&self, payload: ArticlePayload, retrieved_at: i64) -> Option<ArticleRecord> {
        let url = non_blank(payload.url)?;
        let title = non_blank(payload.title)?;

        Some(ArticleRecord {
            url,
            source_name: payload.source.and_then(|s| s.name),
            author: payload.author,
            title,
            description: payload.description,
            url_to_image: payload.url_to_image,
            published_at: payload.published_at,
            content: payload.content,
            retrieved_at,
        })
    }

    pub fn to_records(&self, payloads: Vec<ArticlePayload>, retrieved_at: i64) -> Vec<ArticleRecord> {
        let total = payloads.len();
        let records: Vec<_> = payloads
            .into_iter()
            .filter_map(|p| self.to_record(p, retrieved_at))
            .collect();

        if records.len() < total {
            tracing::debug!(
                "Dropped {} of {} payloads missing url or title",
                total - records.len(),
                total
            );
        }

        records
    }

    /// Map payloads straight to articles, skipping the store.
    pub fn to_articles(&self, payloads: Vec<ArticlePayload>) -> Vec<Article> {
        self.to_records(payloads, 0)
            .into_iter()
            .map(Article::from)
            .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UNKNOWN_AUTHOR, UNKNOWN_SOURCE};
    use crate::fetcher::SourcePayload;

    fn payload(url: Option<&str>, title: Option<&str>) -> ArticlePayload {
        ArticlePayload {
            url: url.map(String::from),
            title: title.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_payload_maps_all_fields() {
        let full = ArticlePayload {
            source: Some(SourcePayload {
                id: Some("wire".into()),
                name: Some("Wire".into()),
            }),
            author: Some("Ada".into()),
            title: Some("Headline".into()),
            description: Some("Desc".into()),
            url: Some("https://example.com/a".into()),
            url_to_image: Some("https://example.com/a.png".into()),
            published_at: Some("2024-05-01T10:00:00Z".into()),
            content: Some("Body".into()),
        };

        let record = Normalizer::new().to_record(full, 42).unwrap();
        assert_eq!(record.url, "https://example.com/a");
        assert_eq!(record.source_name.as_deref(), Some("Wire"));
        assert_eq!(record.published_at.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(record.retrieved_at, 42);
    }

    #[test]
    fn test_missing_url_or_title_dropped() {
        let normalizer = Normalizer::new();
        assert!(normalizer.to_record(payload(None, Some("T")), 0).is_none());
        assert!(normalizer.to_record(payload(Some("https://a"), None), 0).is_none());
        assert!(normalizer.to_record(payload(Some(""), Some("T")), 0).is_none());
        assert!(normalizer.to_record(payload(Some("https://a"), Some(" ")), 0).is_none());
    }

    #[test]
    fn test_batch_keeps_valid_subset() {
        let records = Normalizer::new().to_records(
            vec![
                payload(Some("https://a"), Some("A")),
                payload(Some("https://b"), None),
                payload(Some("https://c"), Some("C")),
                payload(None, Some("D")),
            ],
            7,
        );

        let urls: Vec<_> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a", "https://c"]);
        assert!(records.iter().all(|r| r.retrieved_at == 7));
    }

    #[test]
    fn test_to_articles_applies_defaults() {
        let articles = Normalizer::new().to_articles(vec![payload(Some("https://a"), Some("A"))]);
        assert_eq!(articles[0].source_name, UNKNOWN_SOURCE);
        assert_eq!(articles[0].author, UNKNOWN_AUTHOR);
    }
}
