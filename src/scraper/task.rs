//! Background searches
//!
//! `spawn_search` runs a search on the tokio runtime and hands back a
//! handle whose status can be polled, awaited or cancelled.

use crate::model::Collection;
use crate::scraper::session::{ScraperSession, SearchReport};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Progress of a background search
///
/// Both settled outcomes of a search that ran to the end carry its full
/// report.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Running,

    /// A collection was harvested
    Completed(Box<SearchReport>),

    /// The search ran to the end but produced no collection
    NoResults(Box<SearchReport>),

    Failed(String),
    Cancelled,
}

impl SearchStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, SearchStatus::Running)
    }

    pub fn report(&self) -> Option<&SearchReport> {
        match self {
            SearchStatus::Completed(report) | SearchStatus::NoResults(report) => Some(&**report),
            _ => None,
        }
    }

    /// The harvested collection of a completed search
    pub fn collection(&self) -> Option<&Collection> {
        self.report().and_then(|report| report.collection.as_ref())
    }
}

/// Handle to a search running in the background
#[derive(Debug)]
pub struct SearchHandle {
    term: String,
    status: Arc<watch::Sender<SearchStatus>>,
    task: JoinHandle<()>,
}

/// Starts a search for `term` on the current runtime
pub fn spawn_search(session: Arc<ScraperSession>, term: impl Into<String>) -> SearchHandle {
    let term = term.into();
    let (sender, _) = watch::channel(SearchStatus::Running);
    let status = Arc::new(sender);

    let task = {
        let status = Arc::clone(&status);
        let term = term.clone();
        tokio::spawn(async move {
            let report = Box::new(session.search(&term).await);
            let result = if report.collection.is_some() {
                SearchStatus::Completed(report)
            } else {
                SearchStatus::NoResults(report)
            };
            settle(&status, result);
        })
    };

    SearchHandle { term, status, task }
}

/// Replaces a `Running` status; a settled status is never overwritten
fn settle(status: &watch::Sender<SearchStatus>, next: SearchStatus) -> bool {
    status.send_if_modified(|current| {
        if current.is_finished() {
            return false;
        }
        *current = next;
        true
    })
}

impl SearchHandle {
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Current status without waiting
    pub fn status(&self) -> SearchStatus {
        self.status.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.status.borrow().is_finished()
    }

    /// Returns a receiver that observes every status change
    pub fn subscribe(&self) -> watch::Receiver<SearchStatus> {
        self.status.subscribe()
    }

    /// Aborts the search if it is still running
    pub fn cancel(&self) {
        if settle(&self.status, SearchStatus::Cancelled) {
            tracing::info!(term = %self.term, "search cancelled");
        }
        self.task.abort();
    }

    /// Waits for the search to settle
    pub async fn wait(mut self) -> SearchStatus {
        self.join().await
    }

    /// Waits up to `limit`, cancelling the search if it is still running
    pub async fn wait_timeout(mut self, limit: Duration) -> SearchStatus {
        let joined = tokio::time::timeout(limit, self.join()).await;
        match joined {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(term = %self.term, limit_secs = limit.as_secs(), "search timed out");
                self.cancel();
                self.status()
            }
        }
    }

    async fn join(&mut self) -> SearchStatus {
        match (&mut self.task).await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {
                settle(&self.status, SearchStatus::Cancelled);
            }
            Err(e) => {
                settle(&self.status, SearchStatus::Failed(e.to_string()));
            }
        }
        self.status()
    }
}
