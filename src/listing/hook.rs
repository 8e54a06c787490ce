use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

use super::debounce::{Debouncer, RequestSequence};
use super::error::ListError;
use super::pagination::{Page, Pagination};
use super::query::{ListQuery, SearchParams, SearchPatch};
use crate::error::ConsoleError;

/// Anything that can serve one page of rows for a query
#[async_trait]
pub trait ListSource: Send + Sync {
    type Item: Send + 'static;

    async fn fetch(&self, query: &ListQuery) -> Result<Page<Self::Item>, ConsoleError>;
}

/// Observable state of one list screen
#[derive(Debug, Clone, Serialize)]
pub struct ListState<T> {
    pub loading: bool,
    pub error: Option<String>,
    pub items: Vec<T>,
    pub upper_rate: Option<String>,
    pub stats: BTreeMap<String, Value>,
    pub pagination: Pagination,
    pub search: SearchParams,
}

impl<T> ListState<T> {
    fn new(search: SearchParams, page_size: u32) -> Self {
        Self {
            loading: false,
            error: None,
            items: Vec::new(),
            upper_rate: None,
            stats: BTreeMap::new(),
            pagination: Pagination::new(page_size),
            search,
        }
    }

    fn query(&self) -> ListQuery {
        ListQuery::new(self.pagination.current_page, self.pagination.page_size, self.search.clone())
    }
}

/// What happened to a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the visible rows
    Applied,
    /// A newer request was issued while this one was in flight
    Superseded,
    /// A later keystroke arrived within the quiet period
    Debounced,
    /// The list was destroyed; nothing was touched
    Unmounted,
}

/// Search, pagination and loading state for one list screen.
///
/// Responses are applied only when they belong to the latest request and the
/// list is still mounted, so a slow early response can never overwrite a
/// newer one.
pub struct ListData<S: ListSource> {
    source: S,
    state: Mutex<ListState<S::Item>>,
    initial_search: SearchParams,
    initial_page_size: u32,
    debouncer: Debouncer,
    sequence: RequestSequence,
    mounted: AtomicBool,
}

impl<S: ListSource> ListData<S> {
    pub fn new(source: S, initial_search: SearchParams, page_size: u32, quiet: Duration) -> Self {
        Self {
            state: Mutex::new(ListState::new(initial_search.clone(), page_size)),
            source,
            initial_search,
            initial_page_size: page_size,
            debouncer: Debouncer::new(quiet),
            sequence: RequestSequence::new(),
            mounted: AtomicBool::new(true),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> ListState<S::Item>
    where
        S::Item: Clone,
    {
        self.state.lock().await.clone()
    }

    pub async fn load(&self) -> Result<LoadOutcome, ConsoleError> {
        if !self.is_mounted() {
            return Ok(LoadOutcome::Unmounted);
        }

        let (query, ticket) = {
            let mut state = self.state.lock().await;
            state.search.validate_dates()?;
            state.loading = true;
            state.error = None;
            (state.query(), self.sequence.issue())
        };

        let result = self.source.fetch(&query).await;

        if !self.is_mounted() {
            return Ok(LoadOutcome::Unmounted);
        }
        if !self.sequence.is_latest(ticket) {
            tracing::debug!("discarding stale list response for page {}", query.page);
            return Ok(LoadOutcome::Superseded);
        }

        let mut state = self.state.lock().await;
        state.loading = false;
        match result {
            Ok(page) => {
                state.pagination.set_total(page.total_count);
                state.items = page.items;
                state.upper_rate = page.upper_rate;
                state.stats = page.stats;
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                state.error = Some(format!("Failed to load data: {}", e.user_message()));
                Err(e)
            }
        }
    }

    /// Debounced search: only the last call within the quiet period loads
    pub async fn search(&self, patch: SearchPatch) -> Result<LoadOutcome, ConsoleError> {
        if !self.debouncer.settle().await {
            return Ok(LoadOutcome::Debounced);
        }
        self.search_now(patch).await
    }

    /// Applies the patch, returns to page 1 and loads immediately
    pub async fn search_now(&self, patch: SearchPatch) -> Result<LoadOutcome, ConsoleError> {
        {
            let mut state = self.state.lock().await;
            state.search.apply(patch);
            state.pagination.current_page = 1;
        }
        self.load().await
    }

    pub async fn change_page(&self, page: u32) -> Result<LoadOutcome, ConsoleError> {
        if page == 0 {
            return Err(ListError::InvalidPage.into());
        }
        self.state.lock().await.pagination.current_page = page;
        self.load().await
    }

    pub async fn change_page_size(&self, page_size: u32) -> Result<LoadOutcome, ConsoleError> {
        if page_size == 0 {
            return Err(ListError::InvalidPageSize.into());
        }
        {
            let mut state = self.state.lock().await;
            state.pagination.page_size = page_size;
            state.pagination.current_page = 1;
        }
        self.load().await
    }

    /// Restores the initial search form and page size, then reloads
    pub async fn reset(&self) -> Result<LoadOutcome, ConsoleError> {
        self.debouncer.cancel();
        {
            let mut state = self.state.lock().await;
            state.search = self.initial_search.clone();
            state.pagination.page_size = self.initial_page_size;
            state.pagination.current_page = 1;
        }
        self.load().await
    }

    /// Updates the search form without loading
    pub async fn update_search_params(&self, patch: SearchPatch) {
        self.state.lock().await.search.apply(patch);
    }

    /// Marks the list unmounted; in-flight and future loads become no-ops
    pub fn destroy(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.debouncer.cancel();
    }
}
