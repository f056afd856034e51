//! Search-as-you-type over the geocoding service
//!
//! Keystrokes restart a debounce timer; each search that actually runs takes
//! a sequence number, and only the response carrying the latest number may
//! touch the visible state.

use super::client::PlaceLookup;
use super::models::{Place, SelectedLocation};
use super::resolver::select_place;
use crate::Result;
use crate::config::GeocodingConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// What the search box and its dropdown show
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Place>,
    pub show_results: bool,
    pub is_searching: bool,
    /// Notification text of the last failed search
    pub last_error: Option<String>,
}

struct Inner<L> {
    lookup: L,
    state: Mutex<SearchState>,
    latest: AtomicU64,
}

impl<L: PlaceLookup> Inner<L> {
    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_sequence(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, sequence: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == sequence
    }

    async fn run_search(&self, query: &str) {
        let sequence = self.next_sequence();

        if query.trim().is_empty() {
            let mut state = self.state();
            state.results.clear();
            state.show_results = false;
            state.is_searching = false;
            return;
        }

        self.state().is_searching = true;
        debug!(sequence, "Searching for '{}'", query);
        let outcome = self.lookup.search(query).await;

        if !self.is_latest(sequence) {
            debug!(sequence, "Discarding stale search response");
            return;
        }

        let mut state = self.state();
        state.is_searching = false;
        match outcome {
            Ok(results) => {
                state.results = results;
                state.show_results = true;
                state.last_error = None;
            }
            Err(e) => {
                warn!("Geocoding search failed: {}", e);
                state.results.clear();
                state.show_results = false;
                state.last_error = Some(e.user_message());
            }
        }
    }
}

/// Debounced, sequence-guarded location search
pub struct SearchSession<L> {
    inner: Arc<Inner<L>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
    min_query_len: usize,
}

impl<L: PlaceLookup + 'static> SearchSession<L> {
    pub fn new(lookup: L, debounce: Duration, min_query_len: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                lookup,
                state: Mutex::new(SearchState::default()),
                latest: AtomicU64::new(0),
            }),
            pending: Mutex::new(None),
            debounce,
            min_query_len,
        }
    }

    pub fn from_config(lookup: L, config: &GeocodingConfig) -> Self {
        Self::new(
            lookup,
            Duration::from_millis(config.debounce_ms),
            config.min_query_len,
        )
    }

    fn cancel_pending(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Record a keystroke.
    ///
    /// Short queries clear the dropdown immediately; anything else schedules a
    /// search after the debounce period, replacing any search still waiting
    /// for its timer.
    /// Must be called within a tokio runtime.
    pub fn on_query_changed(&self, query: &str) {
        self.cancel_pending();
        self.inner.state().query = query.to_string();

        if query.chars().count() < self.min_query_len {
            // Invalidate anything already in flight
            self.inner.next_sequence();
            let mut state = self.inner.state();
            state.results.clear();
            state.show_results = false;
            state.is_searching = false;
            return;
        }

        let inner = Arc::clone(&self.inner);
        let debounce = self.debounce;
        let query = query.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            // Later keystrokes abort only the wait, not a search in flight
            tokio::spawn(async move { inner.run_search(&query).await });
        });
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Search right away, as on pressing Enter.
    pub async fn search_now(&self, query: &str) {
        self.cancel_pending();
        self.inner.state().query = query.to_string();
        self.inner.run_search(query).await;
    }

    /// Pick a result: the query shows its name and the dropdown closes.
    pub fn select(&self, place: &Place) -> Result<SelectedLocation> {
        let selected = select_place(place)?;
        let mut state = self.inner.state();
        state.query = place.display_name.clone();
        state.show_results = false;
        Ok(selected)
    }

    pub fn close_results(&self) {
        self.inner.state().show_results = false;
    }

    #[must_use]
    pub fn state(&self) -> SearchState {
        self.inner.state().clone()
    }
}

impl<L> Drop for SearchSession<L> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
