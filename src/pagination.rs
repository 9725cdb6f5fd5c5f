//! Paginated-list state machine shared by every screen that lists a resource.
//!
//! ```text
//! Idle ──trigger──▶ Loading ──ok──▶ Loaded
//!                      │  ▲
//!                      │  └──trigger (from any state)
//!                      └──err─▶ Failed
//! ```
//!
//! Every trigger issues a new fetch tagged with a sequence number. A
//! completion is applied only if its tag is the latest one issued; anything
//! older is dropped. The task of a superseded fetch is also aborted so a slow
//! request for a page nobody looks at any more does not keep running.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};
use crate::repository::Resource;
use crate::service::ResourceService;
use crate::types::{Id, PageRequest, PageResult, clamp_page};

pub type PageFuture<T> = Pin<Box<dyn Future<Output = Result<PageResult<T>>> + Send>>;

/// The "fetch page" operation a controller drives.
pub type PageFetcher<T> = Arc<dyn Fn(PageRequest) -> PageFuture<T> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What caused a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Activate,
    PageChange(u32),
    /// Always resets the target page to 1.
    PageSizeChange(u32),
    /// Same page and size again.
    Refresh,
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub request: PageRequest,
}

struct Completion<T> {
    seq: u64,
    result: Result<PageResult<T>>,
}

pub struct PaginationController<T> {
    fetcher: PageFetcher<T>,
    state: LoadState,
    items: Vec<T>,
    total: u64,
    page: u32,
    size: u32,
    pages: u32,
    has_loaded: bool,
    error: Option<ClientError>,
    latest_seq: u64,
    in_flight: Option<JoinHandle<()>>,
    tx: UnboundedSender<Completion<T>>,
    rx: UnboundedReceiver<Completion<T>>,
}

impl<T: Send + 'static> PaginationController<T> {
    pub fn new(fetcher: PageFetcher<T>, initial: PageRequest) -> Self {
        let initial = PageRequest::new(initial.page, initial.size);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        Self {
            fetcher,
            state: LoadState::Idle,
            items: Vec::new(),
            total: 0,
            page: initial.page,
            size: initial.size,
            pages: 1,
            has_loaded: false,
            error: None,
            latest_seq: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    // -----------------------------------------------------------------------
    // Visible state
    // -----------------------------------------------------------------------

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current page number (1-based).
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.size
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    // -----------------------------------------------------------------------
    // Triggers (spawn the fetch on the current Tokio runtime)
    // -----------------------------------------------------------------------

    pub fn activate(&mut self) -> FetchTicket {
        self.dispatch(Trigger::Activate)
    }

    /// Go to `page`, clamped into `[1, pages]` once the page count is known.
    pub fn set_page(&mut self, page: u32) -> FetchTicket {
        self.dispatch(Trigger::PageChange(page))
    }

    pub fn set_page_size(&mut self, size: u32) -> FetchTicket {
        self.dispatch(Trigger::PageSizeChange(size))
    }

    pub fn refresh(&mut self) -> FetchTicket {
        self.dispatch(Trigger::Refresh)
    }

    /// Issue `trigger` and spawn its fetch. Must be called from inside a
    /// Tokio runtime.
    pub fn dispatch(&mut self, trigger: Trigger) -> FetchTicket {
        let ticket = self.begin(trigger);
        if let Some(prev) = self.in_flight.take() {
            prev.abort();
        }
        let fut = (self.fetcher)(ticket.request);
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = fut.await;
            // The receiver lives as long as the controller.
            let _ = tx.send(Completion {
                seq: ticket.seq,
                result,
            });
        }));
        ticket
    }

    /// Wait until the latest issued fetch has been applied.
    ///
    /// Stale completions that arrive first are discarded along the way.
    /// Returns immediately when nothing is loading.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            let Some(done) = self.rx.recv().await else {
                return;
            };
            self.complete(done.seq, done.result);
        }
    }

    /// Apply whatever completions have already arrived, without waiting.
    /// Returns `true` if visible state changed.
    pub fn poll_completions(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            changed |= self.complete(done.seq, done.result);
        }
        changed
    }

    // -----------------------------------------------------------------------
    // State transitions
    // -----------------------------------------------------------------------

    /// Record a trigger: update the target page/size, move to `Loading`, and
    /// hand out the sequence number its completion must carry.
    ///
    /// Callers that run the fetch themselves pair this with [`complete`].
    ///
    /// [`complete`]: Self::complete
    pub fn begin(&mut self, trigger: Trigger) -> FetchTicket {
        match trigger {
            Trigger::Activate | Trigger::Refresh => {}
            Trigger::PageChange(page) => {
                self.page = if self.has_loaded {
                    clamp_page(page, self.pages)
                } else {
                    page.max(1)
                };
            }
            Trigger::PageSizeChange(size) => {
                self.size = size.max(1);
                self.page = 1;
            }
        }
        self.latest_seq += 1;
        self.state = LoadState::Loading;
        let ticket = FetchTicket {
            seq: self.latest_seq,
            request: PageRequest::new(self.page, self.size),
        };
        tracing::debug!(seq = ticket.seq, ?trigger, "pagination: fetch issued");
        ticket
    }

    /// Apply the outcome of fetch `seq` if it is still the latest one.
    ///
    /// On success the served `items`, `total`, `page`, `pages` (and `size`)
    /// replace the local values. On failure the error is recorded and the
    /// previously loaded items are kept. Returns `false` for a stale
    /// completion, which leaves visible state untouched.
    pub fn complete(&mut self, seq: u64, result: Result<PageResult<T>>) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "pagination: stale completion dropped");
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(page) => {
                self.items = page.items;
                self.total = page.total;
                self.page = page.page;
                self.pages = page.pages.max(1);
                if page.size > 0 {
                    self.size = page.size;
                }
                self.error = None;
                self.has_loaded = true;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                tracing::debug!("pagination: fetch {seq} failed: {e}");
                self.error = Some(e);
                self.state = LoadState::Failed;
            }
        }
        true
    }
}

impl<T: Resource> PaginationController<T> {
    /// A controller over the children of `parent_id` served by `service`.
    pub fn for_scope(service: ResourceService<T>, parent_id: Id, page_size: u32) -> Self {
        let fetcher: PageFetcher<T> = Arc::new(move |req: PageRequest| -> PageFuture<T> {
            let service = service.clone();
            Box::pin(async move { service.list_paginated(parent_id, req).await })
        });
        Self::new(fetcher, PageRequest::new(1, page_size))
    }
}

impl<T> Drop for PaginationController<T> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}
