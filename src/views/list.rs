//! Paginated list view model.
//!
//! A `ListView` owns one page of a resource and the controls around it: page
//! number, client-side search and status filter, and a two-step delete. Every
//! fetch goes through `Loading` and ends in `Ready` or `Failed`. Mutations are
//! always followed by a refetch so totals and pages never go stale.

use std::sync::Arc;

use crate::{
    client::Transport,
    models::Resource,
    refresh::{RefreshBus, RefreshSignal},
    services::ResourceService,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Ready,
    Failed(String),
}

pub struct ListView<R: Resource, T> {
    service: ResourceService<R, T>,
    state: ViewState,
    rows: Vec<R>,
    page: u32,
    page_size: u32,
    pages: u32,
    total: u64,
    search: String,
    status_filter: Option<String>,
    pending_delete: Option<R>,
    notice: Option<String>,
    refresh: Option<RefreshSignal>,
    publisher: Option<Arc<RefreshBus>>,
}

impl<R: Resource, T: Transport> ListView<R, T> {
    pub fn new(service: ResourceService<R, T>, page_size: u32) -> Self {
        Self {
            service,
            state: ViewState::Loading,
            rows: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            pages: 1,
            total: 0,
            search: String::new(),
            status_filter: None,
            pending_delete: None,
            notice: None,
            refresh: None,
            publisher: None,
        }
    }

    /// Re-fetch whenever `signal` reports a change
    pub fn with_refresh(mut self, signal: RefreshSignal) -> Self {
        self.refresh = Some(signal);
        self
    }

    /// Announce deletes made from this view on `bus`
    pub fn with_publisher(mut self, bus: Arc<RefreshBus>) -> Self {
        self.publisher = Some(bus);
        self
    }

    /// Start on `page` with `search` already applied; nothing is fetched yet
    pub fn starting_at(mut self, page: u32, search: &str) -> Self {
        self.page = page.max(1);
        self.search = search.to_string();
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Every row of the fetched page
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Rows after the search term and status filter
    pub fn visible_rows(&self) -> Vec<&R> {
        let needle = self.search.trim().to_lowercase();
        self.rows
            .iter()
            .filter(|row| needle.is_empty() || row.matches(&needle))
            .filter(|row| match &self.status_filter {
                Some(wanted) => row.status_label().as_deref() == Some(wanted.as_str()),
                None => true,
            })
            .collect()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Banner message left by a failed delete
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn pending_delete(&self) -> Option<&R> {
        self.pending_delete.as_ref()
    }

    /// Fetch the current page
    pub async fn load(&mut self) {
        self.state = ViewState::Loading;
        tracing::debug!(resource = %R::KIND, page = self.page, "Loading list");

        match self.service.list(self.page, self.page_size).await {
            Ok(page) => {
                self.rows = page.items;
                self.pages = page.pages;
                self.total = page.total;
                self.state = ViewState::Ready;
            }
            Err(e) => {
                tracing::warn!(resource = %R::KIND, page = self.page, error = %e, "Failed to load list");
                self.rows.clear();
                self.total = 0;
                self.state = ViewState::Failed(e.user_message(&format!("Failed to fetch {}", R::KIND)));
            }
        }
    }

    /// Re-fetch if the refresh signal moved since the last sync; returns whether it did
    pub async fn sync(&mut self) -> bool {
        let changed = self.refresh.as_mut().map_or(false, RefreshSignal::take_changed);
        if changed {
            self.load().await;
        }
        changed
    }

    pub async fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
        self.load().await;
    }

    pub async fn next_page(&mut self) {
        if self.has_next() {
            self.set_page(self.page + 1).await;
        }
    }

    pub async fn prev_page(&mut self) {
        if self.has_previous() {
            self.set_page(self.page - 1).await;
        }
    }

    /// Change the search term; the page is fetched again and then filtered locally
    pub async fn set_search(&mut self, term: &str) {
        if self.search == term {
            return;
        }
        self.search = term.to_string();
        self.load().await;
    }

    /// Restrict rows to one status; `None` shows all. Filters locally only.
    pub fn set_status_filter(&mut self, status: Option<&str>) {
        self.status_filter = status
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty() && s != "all");
    }

    /// Stage a row for deletion; nothing is sent until [`confirm_delete`](Self::confirm_delete)
    pub fn request_delete(&mut self, id: &str) -> Option<&R> {
        self.pending_delete = self.rows.iter().find(|row| row.id() == id).cloned();
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the staged row, then refetch. Returns whether the delete succeeded.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(target) = self.pending_delete.take() else {
            return false;
        };

        match self.service.delete(target.id()).await {
            Ok(_) => {
                self.notice = None;
                if let Some(bus) = &self.publisher {
                    bus.publish(R::KIND);
                    // Our own signal is covered by the refetch below
                    if let Some(signal) = self.refresh.as_mut() {
                        signal.take_changed();
                    }
                }
                self.load().await;
                // The last row of the last page is gone: show the page before it
                if self.rows.is_empty() && self.page > 1 && self.state == ViewState::Ready {
                    self.page -= 1;
                    self.load().await;
                }
                true
            }
            Err(e) => {
                tracing::warn!(resource = %R::KIND, id = target.id(), error = %e, "Delete failed");
                self.notice = Some(e.user_message(&format!("Failed to delete {}", R::KIND.label())));
                false
            }
        }
    }
}
