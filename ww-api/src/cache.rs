//! Per-key request deduplication.
//!
//! Callers asking for a key that is already in flight share the pending
//! request instead of issuing another one. Successful results are kept until
//! invalidated or evicted; failures are dropped so the next caller retries.
//! At most `limit` completed results are held, oldest evicted first.

use crate::error::ApiError;
use crate::query::RequestKey;
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::rc::Rc;

/// Completed results kept per cache by default.
pub const DEFAULT_CACHE_LIMIT: usize = 64;

type SharedFetch<T> = Shared<LocalBoxFuture<'static, Result<T, ApiError>>>;

enum Entry<T> {
    InFlight(SharedFetch<T>),
    Ready(T),
}

struct Entries<T> {
    map: HashMap<RequestKey, Entry<T>>,
    /// Keys of `Ready` entries, oldest first.
    ready: VecDeque<RequestKey>,
    limit: usize,
}

impl<T> Entries<T> {
    fn remove(&mut self, key: &RequestKey) {
        if let Some(Entry::Ready(_)) = self.map.remove(key) {
            self.ready.retain(|k| k != key);
        }
    }

    fn insert_ready(&mut self, key: RequestKey, value: T) {
        self.ready.retain(|k| k != &key);
        self.ready.push_back(key.clone());
        self.map.insert(key, Entry::Ready(value));
        while self.ready.len() > self.limit {
            if let Some(oldest) = self.ready.pop_front() {
                debug!("evicting cached result {}", oldest);
                self.map.remove(&oldest);
            }
        }
    }
}

/// Cheap to clone; clones share the same entries.
pub struct RequestCache<T> {
    entries: Rc<RefCell<Entries<T>>>,
}

impl<T> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<T> Default for RequestCache<T> {
    fn default() -> Self {
        Self::with_limit(DEFAULT_CACHE_LIMIT)
    }
}

impl<T> PartialEq for RequestCache<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<T> RequestCache<T> {
    /// Keep at most `limit` completed results (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: Rc::new(RefCell::new(Entries {
                map: HashMap::new(),
                ready: VecDeque::new(),
                limit: limit.max(1),
            })),
        }
    }
}

impl<T: Clone + 'static> RequestCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `key`, calling `fetch` only if nothing is cached or in flight.
    pub async fn get_or_fetch<F, Fut>(&self, key: &RequestKey, fetch: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let existing = match self.entries.borrow().map.get(key) {
            Some(Entry::Ready(value)) => return Ok(value.clone()),
            Some(Entry::InFlight(pending)) => Some(pending.clone()),
            None => None,
        };

        let pending = match existing {
            Some(pending) => {
                debug!("joining in-flight request {}", key);
                pending
            }
            None => {
                debug!("fetching {}", key);
                let pending = fetch().boxed_local().shared();
                self.entries
                    .borrow_mut()
                    .map
                    .insert(key.clone(), Entry::InFlight(pending.clone()));
                pending
            }
        };

        let result = pending.clone().await;

        let mut entries = self.entries.borrow_mut();
        let still_ours = matches!(
            entries.map.get(key),
            Some(Entry::InFlight(current)) if current.ptr_eq(&pending)
        );
        if still_ours {
            match &result {
                Ok(value) => entries.insert_ready(key.clone(), value.clone()),
                Err(e) => {
                    debug!("dropping failed request {}: {}", key, e);
                    entries.remove(key);
                }
            }
        }
        result
    }

    /// Cached value for `key`, if the request already completed.
    pub fn peek(&self, key: &RequestKey) -> Option<T> {
        match self.entries.borrow().map.get(key) {
            Some(Entry::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_in_flight(&self, key: &RequestKey) -> bool {
        matches!(self.entries.borrow().map.get(key), Some(Entry::InFlight(_)))
    }

    pub fn invalidate(&self, key: &RequestKey) {
        self.entries.borrow_mut().remove(key);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.borrow_mut();
        entries.map.clear();
        entries.ready.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use std::cell::Cell;

    #[tokio::test]
    async fn concurrent_callers_share_one_request() {
        let cache = RequestCache::<u32>::new();
        let key = RequestKey::new("windspeed|era5|40|-105|40|ensemble=false");
        let calls = Rc::new(Cell::new(0));
        let (tx, rx) = oneshot::channel::<u32>();

        let first = cache.get_or_fetch(&key, || {
            calls.set(calls.get() + 1);
            async move { rx.await.map_err(|_| ApiError::Cancelled) }
        });
        let second = cache.get_or_fetch(&key, || {
            calls.set(calls.get() + 1);
            async { Ok(0) }
        });
        let (a, b, _) = futures::join!(first, second, async move {
            tx.send(7).unwrap();
        });

        assert_eq!(a, Ok(7));
        assert_eq!(b, Ok(7));
        assert_eq!(calls.get(), 1);
        assert!(!cache.is_in_flight(&key));
        assert_eq!(cache.peek(&key), Some(7));
    }

    #[tokio::test]
    async fn completed_results_are_reused() {
        let cache = RequestCache::<String>::new();
        let key = RequestKey::new("power-curves|era5");
        let calls = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let calls = Rc::clone(&calls);
            let value = cache
                .get_or_fetch(&key, move || {
                    calls.set(calls.get() + 1);
                    async { Ok("nrel-reference-100kW".to_string()) }
                })
                .await;
            assert_eq!(value.unwrap(), "nrel-reference-100kW");
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = RequestCache::<u32>::new();
        let key = RequestKey::new("k");

        let failed = cache
            .get_or_fetch(&key, || async { Err(ApiError::Timeout) })
            .await;
        assert_eq!(failed, Err(ApiError::Timeout));
        assert!(cache.is_empty());

        let retried = cache.get_or_fetch(&key, || async { Ok(3) }).await;
        assert_eq!(retried, Ok(3));
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let cache = RequestCache::<u32>::new();
        let key = RequestKey::new("k");
        cache.get_or_fetch(&key, || async { Ok(1) }).await.unwrap();
        cache.invalidate(&key);
        let value = cache.get_or_fetch(&key, || async { Ok(2) }).await;
        assert_eq!(value, Ok(2));

        cache.clear();
        assert_eq!(cache.peek(&key), None);
    }

    #[tokio::test]
    async fn oldest_results_are_evicted_past_the_limit() {
        let cache = RequestCache::<u32>::with_limit(2);
        for (value, name) in [(0, "a"), (1, "b"), (2, "c")] {
            let key = RequestKey::new(name);
            cache.get_or_fetch(&key, move || async move { Ok(value) }).await.unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&RequestKey::new("a")), None);
        assert_eq!(cache.peek(&RequestKey::new("b")), Some(1));
        assert_eq!(cache.peek(&RequestKey::new("c")), Some(2));
    }

    #[tokio::test]
    async fn eviction_leaves_in_flight_requests_alone() {
        let cache = RequestCache::<u32>::with_limit(1);
        let pending = RequestKey::new("pending");
        let (tx, rx) = oneshot::channel::<u32>();
        let waiting = cache.get_or_fetch(&pending, || async move {
            rx.await.map_err(|_| ApiError::Cancelled)
        });
        let others = async {
            for name in ["x", "y"] {
                cache.get_or_fetch(&RequestKey::new(name), || async { Ok(0) }).await.unwrap();
            }
            assert!(cache.is_in_flight(&pending));
            tx.send(9).unwrap();
        };
        let (value, _) = futures::join!(waiting, others);
        assert_eq!(value, Ok(9));
        assert_eq!(cache.peek(&pending), Some(9));
        assert_eq!(cache.peek(&RequestKey::new("y")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_share_entries() {
        let cache = RequestCache::<u32>::new();
        let other = cache.clone();
        assert!(cache == other);
        assert!(cache != RequestCache::new());
    }
}
