//! Per-view fetch state.
//!
//! A [`Query`] remembers the key it is currently showing. Selecting a new key
//! flips it to loading; a response is only committed if its key is still the
//! selected one when it arrives, so a slow answer for an old position never
//! overwrites a newer one.

use crate::cache::RequestCache;
use crate::error::ApiError;
use crate::query::{ProductionQuery, RequestKey, TimePeriod, WindspeedQuery};
use crate::WindApi;
use log::{debug, warn};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use ww_core::production::{ProductionEstimate, WindEstimate};
use ww_core::settings::Settings;

/// What a view renders: loading flag, last good data, last error.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub is_loading: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            is_loading: false,
            data: None,
            error: None,
        }
    }
}

impl<T> FetchState<T> {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failed(error: ApiError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

type Listener<T> = Rc<dyn Fn(&FetchState<T>)>;

struct QueryInner<T> {
    key: Option<RequestKey>,
    state: FetchState<T>,
    listener: Option<Listener<T>>,
}

pub struct Query<T> {
    inner: Rc<RefCell<QueryInner<T>>>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueryInner {
                key: None,
                state: FetchState::default(),
                listener: None,
            })),
        }
    }
}

impl<T> PartialEq for Query<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone + 'static> Query<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FetchState<T> {
        self.inner.borrow().state.clone()
    }

    pub fn current_key(&self) -> Option<RequestKey> {
        self.inner.borrow().key.clone()
    }

    /// Call `listener` with the new state after every change.
    pub fn subscribe(&self, listener: impl Fn(&FetchState<T>) + 'static) {
        self.inner.borrow_mut().listener = Some(Rc::new(listener));
    }

    fn notify(&self) {
        let (listener, state) = {
            let inner = self.inner.borrow();
            (inner.listener.clone(), inner.state.clone())
        };
        if let Some(listener) = listener {
            listener(&state);
        }
    }

    /// Point the query at `key`. Returns `true` when a fetch is needed.
    ///
    /// `None` means the inputs are incomplete: the state goes back to idle.
    pub fn select(&self, key: Option<&RequestKey>) -> bool {
        let (changed, needs_fetch) = {
            let mut inner = self.inner.borrow_mut();
            match key {
                None => {
                    let changed = inner.key.take().is_some();
                    inner.state = FetchState::default();
                    (changed, false)
                }
                Some(key) if inner.key.as_ref() == Some(key) => (false, false),
                Some(key) => {
                    inner.key = Some(key.clone());
                    inner.state = FetchState::loading();
                    (true, true)
                }
            }
        };
        if changed {
            self.notify();
        }
        needs_fetch
    }

    /// Forget the selected key so the next [`Query::run`] fetches again.
    pub fn reset(&self) {
        self.select(None);
    }

    /// Await `key` through `cache` and commit it if still selected.
    pub async fn resolve<F, Fut>(
        &self,
        key: RequestKey,
        cache: &RequestCache<T>,
        fetch: F,
    ) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let result = cache.get_or_fetch(&key, fetch).await;

        {
            let mut inner = self.inner.borrow_mut();
            if inner.key.as_ref() != Some(&key) {
                debug!("ignoring superseded response for {}", key);
                return false;
            }
            inner.state = match result {
                Ok(data) => FetchState::ready(data),
                Err(e) => {
                    warn!("request {} failed: {}", key, e);
                    FetchState::failed(e)
                }
            };
        }
        self.notify();
        true
    }

    /// [`Query::select`] then, if needed, [`Query::resolve`].
    pub async fn run<F, Fut>(
        &self,
        key: RequestKey,
        cache: &RequestCache<T>,
        fetch: F,
    ) -> FetchState<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        if self.select(Some(&key)) {
            self.resolve(key, cache, fetch).await;
        }
        self.state()
    }
}

/// Windspeed for the current settings; idle when no request can be made.
pub async fn fetch_windspeed<A>(
    hook: &Query<WindEstimate>,
    cache: &RequestCache<WindEstimate>,
    api: &A,
    settings: &Settings,
) -> FetchState<WindEstimate>
where
    A: WindApi + Clone + 'static,
{
    match WindspeedQuery::from_settings(settings) {
        Some(request) => {
            let api = api.clone();
            hook.run(request.cache_key(), cache, move || async move {
                api.windspeed(&request).await
            })
            .await
        }
        None => {
            hook.select(None);
            hook.state()
        }
    }
}

/// Production for the current settings and `period`; idle when no request can be made.
pub async fn fetch_production<A>(
    hook: &Query<ProductionEstimate>,
    cache: &RequestCache<ProductionEstimate>,
    api: &A,
    settings: &Settings,
    period: TimePeriod,
) -> FetchState<ProductionEstimate>
where
    A: WindApi + Clone + 'static,
{
    match ProductionQuery::from_settings(settings, period) {
        Some(request) => {
            let api = api.clone();
            hook.run(request.cache_key(), cache, move || async move {
                api.energy_production(&request).await
            })
            .await
        }
        None => {
            hook.select(None);
            hook.state()
        }
    }
}
