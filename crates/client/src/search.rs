//! Debounced remote search by name.
//!
//! Keystroke-level input goes through [`SearchOrchestrator::submit`]; only the
//! last term of a burst reaches the backend. Results are published on a watch
//! channel, and a result never overwrites one from a newer submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use eventdesk_catalog::Event;

use crate::debounce::{Debouncer, TimerHandle};
use crate::gateway::EventGateway;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    /// No active search term.
    #[default]
    Idle,
    /// A term was submitted and is waiting for the quiet interval or the backend.
    Pending { term: String },
    Ready { term: String, events: Vec<Event> },
    Failed { term: String, message: String },
}

impl SearchState {
    pub fn term(&self) -> Option<&str> {
        match self {
            SearchState::Idle => None,
            SearchState::Pending { term }
            | SearchState::Ready { term, .. }
            | SearchState::Failed { term, .. } => Some(term),
        }
    }
}

/// Publishes a state only if no newer submission has published already.
#[derive(Debug)]
struct Publisher {
    tx: watch::Sender<SearchState>,
    latest: AtomicU64,
}

impl Publisher {
    fn publish(&self, seq: u64, next: SearchState) -> bool {
        // The watch lock serializes publishers, so the check and the write are atomic.
        self.tx.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) > seq {
                return false;
            }
            self.latest.store(seq, Ordering::SeqCst);
            *state = next;
            true
        })
    }
}

pub struct SearchOrchestrator<G> {
    gateway: Arc<G>,
    debouncer: Debouncer,
    publisher: Arc<Publisher>,
    submissions: AtomicU64,
}

impl<G> SearchOrchestrator<G>
where
    G: EventGateway + 'static,
{
    pub fn new(gateway: Arc<G>, quiet: Duration) -> Self {
        let (tx, _rx) = watch::channel(SearchState::Idle);
        Self {
            gateway,
            debouncer: Debouncer::new(quiet),
            publisher: Arc::new(Publisher {
                tx,
                latest: AtomicU64::new(0),
            }),
            submissions: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.publisher.tx.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.publisher.tx.borrow().clone()
    }

    /// Submit the current search input.
    ///
    /// A blank term cancels any pending search, publishes `Idle` and returns
    /// `None`. Otherwise the search is scheduled after the quiet interval.
    pub fn submit(&self, term: &str) -> Option<TimerHandle> {
        let seq = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        let term = term.trim().to_string();

        if term.is_empty() {
            self.debouncer.cancel();
            self.publisher.publish(seq, SearchState::Idle);
            return None;
        }

        self.publisher
            .publish(seq, SearchState::Pending { term: term.clone() });

        let gateway = Arc::clone(&self.gateway);
        let publisher = Arc::clone(&self.publisher);
        Some(self.debouncer.schedule(move || async move {
            tracing::debug!(%term, "running debounced search");
            let next = match gateway.search_by_name(&term).await {
                Ok(events) => SearchState::Ready { term, events },
                Err(err) => {
                    tracing::warn!(%term, error = %err, "search failed");
                    SearchState::Failed {
                        term,
                        message: err.to_string(),
                    }
                }
            };
            if !publisher.publish(seq, next) {
                tracing::debug!(seq, "discarding stale search result");
            }
        }))
    }
}
