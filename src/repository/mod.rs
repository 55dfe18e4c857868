//! Cache coordination between the remote headline source and the local store.
//!
//! Headline requests follow stale-while-revalidate: a snapshot of the store
//! decides whether a refresh is needed, a failed refresh is reported as an
//! `Error` carrying the stale snapshot, and the stream then always settles on
//! the live view of the store.

pub mod clock;
pub mod freshness;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures::stream::{unfold, BoxStream};
use futures::StreamExt;

use crate::app::Result;
use crate::domain::{to_articles, Article, ArticleRecord, Resource};
use crate::fetcher::single_flight::SingleFlight;
use crate::fetcher::{Fetcher, HeadlinesQuery, RemoteError, SearchQuery, DEFAULT_PAGE_SIZE};
use crate::normalizer::Normalizer;
use crate::store::{observe_all, observe_by_url, Store};

pub use clock::{Clock, FixedClock, SystemClock};
pub use freshness::{FreshnessPolicy, RefreshReason, DEFAULT_FRESHNESS_WINDOW};

pub const ARTICLE_NOT_FOUND: &str = "Article not found in local cache.";

type RefreshOutcome = std::result::Result<usize, RemoteError>;

#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    pub freshness: FreshnessPolicy,
    pub category: Option<String>,
    pub page_size: u32,
    /// Join concurrent refreshes of the same query instead of racing them.
    pub single_flight: bool,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            freshness: FreshnessPolicy::default(),
            category: None,
            page_size: DEFAULT_PAGE_SIZE,
            single_flight: true,
        }
    }
}

struct Inner<S> {
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    clock: Arc<dyn Clock>,
    options: RepositoryOptions,
    flights: SingleFlight<HeadlinesQuery, RefreshOutcome>,
}

impl<S: Store + Send + Sync + 'static> Inner<S> {
    async fn refresh(self: &Arc<Self>, query: HeadlinesQuery) -> RefreshOutcome {
        if !self.options.single_flight {
            return Arc::clone(self).fetch_and_replace(query).await;
        }

        let inner = Arc::clone(self);
        self.flights
            .run(query.clone(), move || inner.fetch_and_replace(query))
            .await
    }

    async fn fetch_and_replace(self: Arc<Self>, query: HeadlinesQuery) -> RefreshOutcome {
        let payloads = self.fetcher.fetch_top_headlines(&query).await?;
        let records = self
            .normalizer
            .to_records(payloads, self.clock.now_millis());

        // Past this point the write always lands, listener or not.
        self.store
            .replace_all(&records)
            .map_err(|e| RemoteError::Unexpected(format!("failed to update local cache: {e}")))
    }
}

/// Coordinates the remote source and the local store.
///
/// Cloning is cheap; clones share the same store, fetcher and in-flight
/// refresh table.
pub struct NewsRepository<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for NewsRepository<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store + Send + Sync + 'static> NewsRepository<S> {
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        options: RepositoryOptions,
    ) -> Self {
        Self::with_clock(store, fetcher, options, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        options: RepositoryOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                fetcher,
                normalizer: Normalizer::new(),
                clock,
                options,
                flights: SingleFlight::new(),
            }),
        }
    }

    /// Top headlines for `country`, refreshed from the network when needed.
    ///
    /// Emits `Loading(true)`, an optional `Error` carrying the stale snapshot
    /// if a refresh failed, then `Success` for the current store contents
    /// followed by `Loading(false)`. After that the stream emits `Success` on
    /// every store change until dropped.
    pub fn get_top_headlines(
        &self,
        force_refresh: bool,
        country: &str,
    ) -> BoxStream<'static, Resource<Vec<Article>>> {
        let query = HeadlinesQuery::new(country)
            .with_category(self.inner.options.category.clone())
            .with_page_size(self.inner.options.page_size);

        let flow = HeadlinesFlow {
            inner: Arc::clone(&self.inner),
            query,
            force_refresh,
            phase: Phase::Initializing,
            pending: VecDeque::new(),
            loading_cleared: false,
        };

        unfold(flow, |mut flow| async move {
            let item = flow.next_emission().await?;
            Some((item, flow))
        })
        .boxed()
    }

    /// A single cached article. Never goes to the network.
    pub fn get_article(&self, url: &str) -> BoxStream<'static, Resource<Option<Article>>> {
        let store = Arc::clone(&self.inner.store);
        let url = url.to_string();

        Box::pin(stream! {
            yield Resource::Loading(true);

            let mut lookup = observe_by_url(store, url.clone());
            while let Some(result) = lookup.next().await {
                match result {
                    Ok(Some(record)) => {
                        yield Resource::Success(Some(Article::from(record)));
                    }
                    Ok(None) => {
                        tracing::debug!("Article {} not in local cache", url);
                        yield Resource::error(ARTICLE_NOT_FOUND, None);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read article {}: {}", url, e);
                        yield Resource::error(format!("Error fetching article: {e}"), None);
                        break;
                    }
                }
            }

            yield Resource::Loading(false);
        })
    }

    /// Uncached keyword search.
    pub async fn search_news(
        &self,
        query: &str,
    ) -> std::result::Result<Vec<Article>, RemoteError> {
        let mut search = SearchQuery::new(query);
        search.page_size = self.inner.options.page_size;

        let payloads = self.inner.fetcher.search_news(&search).await?;
        Ok(self.inner.normalizer.to_articles(payloads))
    }

    /// Remove records retrieved more than `age` ago.
    pub fn prune(&self, age: Duration) -> Result<usize> {
        let age_ms = i64::try_from(age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = self.inner.clock.now_millis().saturating_sub(age_ms);
        let removed = self.inner.store.delete_older_than(cutoff)?;
        tracing::info!("Pruned {} cached articles", removed);
        Ok(removed)
    }

    pub fn clear(&self) -> Result<usize> {
        self.inner.store.delete_all()
    }
}

enum Phase {
    /// Nothing emitted yet.
    Initializing,
    /// Snapshot, freshness decision and optional network refresh.
    Refreshing,
    /// Following the store's live view.
    Live(BoxStream<'static, Result<Vec<ArticleRecord>>>),
    Finished,
}

struct HeadlinesFlow<S> {
    inner: Arc<Inner<S>>,
    query: HeadlinesQuery,
    force_refresh: bool,
    phase: Phase,
    pending: VecDeque<Resource<Vec<Article>>>,
    loading_cleared: bool,
}

impl<S: Store + Send + Sync + 'static> HeadlinesFlow<S> {
    async fn next_emission(&mut self) -> Option<Resource<Vec<Article>>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }

            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Initializing => {
                    self.phase = Phase::Refreshing;
                    return Some(Resource::Loading(true));
                }
                Phase::Refreshing => {
                    let inner = Arc::clone(&self.inner);
                    let query = self.query.clone();
                    if let Some(error) = revalidate(inner, query, self.force_refresh).await {
                        self.pending.push_back(error);
                    }
                    self.phase = Phase::Live(observe_all(Arc::clone(&self.inner.store)));
                }
                Phase::Live(mut updates) => match updates.next().await {
                    Some(Ok(records)) => {
                        self.pending.push_back(Resource::Success(to_articles(&records)));
                        if !self.loading_cleared {
                            self.loading_cleared = true;
                            self.pending.push_back(Resource::Loading(false));
                        }
                        self.phase = Phase::Live(updates);
                    }
                    Some(Err(e)) => {
                        tracing::warn!("Live headline view failed: {}", e);
                        self.pending
                            .push_back(Resource::error(format!("Error reading local cache: {e}"), None));
                        self.pending.push_back(Resource::Loading(false));
                    }
                    None => {
                        self.pending.push_back(Resource::Loading(false));
                    }
                },
                Phase::Finished => return None,
            }
        }
    }
}

/// Refresh from the network if the snapshot calls for it.
///
/// Returns the `Error` to emit when the refresh failed.
async fn revalidate<S: Store + Send + Sync + 'static>(
    inner: Arc<Inner<S>>,
    query: HeadlinesQuery,
    force_refresh: bool,
) -> Option<Resource<Vec<Article>>> {
    let snapshot = inner.store.get_all().unwrap_or_else(|e| {
        tracing::warn!("Could not read cache snapshot: {}", e);
        Vec::new()
    });

    let now = inner.clock.now_millis();
    let Some(reason) = inner
        .options
        .freshness
        .refresh_reason(&snapshot, force_refresh, now)
    else {
        tracing::debug!("Serving {} cached headlines for {}", snapshot.len(), query.country);
        return None;
    };

    tracing::info!("Refreshing headlines for {} ({})", query.country, reason);

    let country = query.country.clone();
    match inner.refresh(query).await {
        Ok(count) => {
            tracing::info!("Cached {} headlines for {}", count, country);
            None
        }
        Err(err) => {
            tracing::warn!("Headline refresh failed ({}): {}", err.category(), err);
            Some(Resource::error(err.to_string(), Some(to_articles(&snapshot))))
        }
    }
}
