use serde::{Deserialize, Serialize};

use crate::domain::{Article, Resource};

/// Screen state for the headline list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlinesState {
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub articles: Vec<Article>,
    pub error: Option<String>,
}

impl HeadlinesState {
    /// Guard against overlapping loads within one session.
    ///
    /// Returns `false` when a load is already running, or when a forced
    /// refresh is requested while one is still in flight. Otherwise marks
    /// the state as loading (or refreshing, when forced) and returns `true`.
    pub fn begin(&mut self, force_refresh: bool) -> bool {
        if self.is_loading || (force_refresh && self.is_refreshing) {
            return false;
        }
        self.is_loading = !force_refresh;
        self.is_refreshing = force_refresh;
        true
    }

    pub fn apply(&mut self, resource: Resource<Vec<Article>>, force_refresh: bool) {
        match resource {
            Resource::Success(articles) => {
                self.articles = articles;
                self.is_loading = false;
                self.is_refreshing = false;
                self.error = None;
            }
            Resource::Error { message, data } => {
                self.error = Some(message);
                if let Some(articles) = data {
                    self.articles = articles;
                }
                self.is_loading = false;
                self.is_refreshing = false;
            }
            Resource::Loading(loading) => {
                // The previous error stays visible while loading.
                self.is_loading = loading && !force_refresh;
                self.is_refreshing = loading && force_refresh;
            }
        }
    }

    /// A full-screen error is only warranted when nothing can be shown.
    pub fn is_blocking_error(&self) -> bool {
        self.error.is_some() && self.articles.is_empty()
    }
}

/// Screen state for a single article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailState {
    pub is_loading: bool,
    pub article: Option<Article>,
    pub error: Option<String>,
}

impl DetailState {
    pub fn apply(&mut self, resource: Resource<Option<Article>>) {
        *self = match resource {
            Resource::Success(article) => DetailState {
                article,
                ..Default::default()
            },
            Resource::Error { message, .. } => DetailState {
                error: Some(message),
                ..Default::default()
            },
            Resource::Loading(is_loading) => DetailState {
                is_loading,
                ..Default::default()
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArticleRecord;

    fn article(url: &str) -> Article {
        Article::from(ArticleRecord::new(url, "Title", 0))
    }

    #[test]
    fn test_begin_blocks_while_loading() {
        let mut state = HeadlinesState::default();
        assert!(state.begin(false));
        assert!(state.is_loading);
        assert!(!state.begin(false));
        assert!(!state.begin(true));
    }

    #[test]
    fn test_begin_blocks_second_forced_refresh() {
        let mut state = HeadlinesState::default();
        assert!(state.begin(true));
        assert!(state.is_refreshing);
        assert!(!state.is_loading);
        assert!(!state.begin(true));
    }

    #[test]
    fn test_begin_allowed_after_completion() {
        let mut state = HeadlinesState::default();
        assert!(state.begin(true));
        state.apply(Resource::Success(vec![article("https://a")]), true);
        assert!(state.begin(true));
    }

    #[test]
    fn test_error_keeps_previous_articles_without_data() {
        let mut state = HeadlinesState::default();
        state.apply(Resource::Success(vec![article("https://a")]), false);
        state.apply(Resource::error("Network Error: offline", None), false);

        assert_eq!(state.articles.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Network Error: offline"));
        assert!(!state.is_blocking_error());
    }

    #[test]
    fn test_error_with_stale_data_replaces_articles() {
        let mut state = HeadlinesState::default();
        state.apply(
            Resource::error("API Error: bad (Code: 500)", Some(vec![article("https://b")])),
            false,
        );
        assert_eq!(state.articles[0].url, "https://b");
    }

    #[test]
    fn test_blocking_error_when_empty() {
        let mut state = HeadlinesState::default();
        state.apply(Resource::error("Network Error: offline", Some(vec![])), false);
        assert!(state.is_blocking_error());
    }

    #[test]
    fn test_success_clears_error() {
        let mut state = HeadlinesState::default();
        state.apply(Resource::error("boom", None), false);
        state.apply(Resource::Success(vec![]), false);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_loading_flag_split_by_force() {
        let mut state = HeadlinesState::default();
        state.apply(Resource::Loading(true), true);
        assert!(state.is_refreshing);
        assert!(!state.is_loading);

        state.apply(Resource::Loading(true), false);
        assert!(state.is_loading);
        assert!(!state.is_refreshing);

        state.apply(Resource::Loading(false), false);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_detail_state_replaced_wholesale() {
        let mut state = DetailState::default();
        state.apply(Resource::Loading(true));
        assert!(state.is_loading);

        state.apply(Resource::Success(Some(article("https://a"))));
        assert!(!state.is_loading);
        assert!(state.article.is_some());

        state.apply(Resource::error("Article not found in local cache.", None));
        assert!(state.article.is_none());
        assert_eq!(state.error.as_deref(), Some("Article not found in local cache."));
    }
}
