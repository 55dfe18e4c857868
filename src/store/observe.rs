//! Live views over a [`Store`].
//!
//! Each view emits the current query result immediately, then re-queries and
//! emits again after every committed change. A view ends after yielding its
//! first error, or when the store's change channel closes.

use std::sync::Arc;

use async_stream::stream;
use futures::stream::BoxStream;

use crate::app::Result;
use crate::domain::ArticleRecord;
use crate::store::Store;

pub fn observe_all<S>(store: Arc<S>) -> BoxStream<'static, Result<Vec<ArticleRecord>>>
where
    S: Store + Send + Sync + 'static,
{
    observe(store, |store| store.get_all())
}

pub fn observe_by_url<S>(
    store: Arc<S>,
    url: String,
) -> BoxStream<'static, Result<Option<ArticleRecord>>>
where
    S: Store + Send + Sync + 'static,
{
    observe(store, move |store| store.get_by_url(&url))
}

fn observe<S, T, Q>(store: Arc<S>, query: Q) -> BoxStream<'static, Result<T>>
where
    S: Store + Send + Sync + 'static,
    T: Send + 'static,
    Q: Fn(&S) -> Result<T> + Send + 'static,
{
    let mut changes = store.changes();

    Box::pin(stream! {
        loop {
            // Mark the current version seen before reading so that a write
            // landing mid-query still wakes the next iteration.
            changes.borrow_and_update();
            let result = query(&*store);
            let failed = result.is_err();
            yield result;

            if failed || changes.changed().await.is_err() {
                break;
            }
        }
    })
}
