use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};

/// Deduplicates concurrent work by key.
///
/// While an operation for a key is in flight, further callers with the same
/// key await the existing operation and receive a clone of its output. The
/// operation is dropped once every caller waiting on it has gone away.
pub struct SingleFlight<K, T: Clone> {
    inflight: Mutex<HashMap<K, WeakShared<BoxFuture<'static, T>>>>,
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Run `make()` for `key`, or join the call already running for it.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let flight = self.join_or_start(key.clone(), make);
        let output = flight.clone().await;
        self.finish(&key, &flight);
        output
    }

    /// Number of keys with a live in-flight operation.
    #[cfg(test)]
    fn in_flight(&self) -> usize {
        match self.inflight.lock() {
            Ok(map) => map.values().filter(|w| w.upgrade().is_some()).count(),
            Err(_) => 0,
        }
    }

    fn join_or_start<F, Fut>(&self, key: K, make: F) -> Shared<BoxFuture<'static, T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut map = self.inflight.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = map.get(&key).and_then(WeakShared::upgrade) {
            tracing::debug!("Joining in-flight operation");
            return existing;
        }

        let flight = make().boxed().shared();
        if let Some(weak) = flight.downgrade() {
            map.insert(key, weak);
        }
        flight
    }

    fn finish(&self, key: &K, flight: &Shared<BoxFuture<'static, T>>) {
        let mut map = self.inflight.lock().unwrap_or_else(|e| e.into_inner());

        let finished = match map.get(key).map(WeakShared::upgrade) {
            Some(Some(current)) => current.ptr_eq(flight),
            Some(None) => true,
            None => false,
        };
        if finished {
            map.remove(key);
        }
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
