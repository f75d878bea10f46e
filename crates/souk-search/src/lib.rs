//! Search-as-you-type scheduling for Souk.
//!
//! Keystrokes arrive much faster than the backend can answer. The
//! [`QueryScheduler`] sits between the search box and the product listing
//! call and does two things:
//!
//! - **Debounce.** A query is only dispatched once the text has been stable
//!   for [`SearchConfig::debounce`].
//! - **Supersede.** Every submission bumps a generation number. A fetch
//!   started for an older generation is abandoned as soon as a newer query
//!   is typed, so a slow stale response never overwrites fresh results.
//!
//! Text shorter than [`SearchConfig::min_query_len`] means "clear the
//! search" and is dispatched without waiting.
//!
//! # Integration
//!
//! ```ignore
//! let mut scheduler = QueryScheduler::new(SearchConfig::default());
//! let input = scheduler.input();      // handed to the text field
//!
//! loop {
//!     let query = scheduler.next_query().await;
//!     let fetch = products.list(&ProductQuery::default().search(query.text()));
//!     match scheduler.run(&query, fetch).await {
//!         SearchOutcome::Completed(result) => show(result),
//!         SearchOutcome::Superseded => {} // the next loop picks up the new text
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Search scheduling knobs.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How long the text must stay unchanged before it is sent.
    pub debounce: Duration,
    /// Trimmed text shorter than this clears the search instead of
    /// querying. Default: 1 (only empty text clears).
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(400),
            min_query_len: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Query / outcome
// ---------------------------------------------------------------------------

/// A query the scheduler decided to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    generation: u64,
    text: String,
    clear: bool,
}

impl Query {
    /// Submission number this query came from. Strictly increasing.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The trimmed search text. Empty when [`is_clear`](Self::is_clear).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when the caller should show the unfiltered list.
    pub fn is_clear(&self) -> bool {
        self.clear
    }
}

/// How a [`QueryScheduler::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<T> {
    /// The fetch finished while its query was still the latest.
    Completed(T),
    /// Newer text was submitted first; the fetch was dropped.
    Superseded,
}

impl<T> SearchOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Superseded => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Input handle
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Submitted {
    generation: u64,
    text: String,
}

/// The text-field side of a scheduler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct QueryInput {
    tx: Arc<watch::Sender<Submitted>>,
}

impl QueryInput {
    /// Records the latest text. Returns its generation.
    pub fn submit(&self, text: impl Into<String>) -> u64 {
        let text = text.into();
        let mut generation = 0;
        self.tx.send_modify(|s| {
            s.generation += 1;
            s.text = text;
            generation = s.generation;
        });
        trace!(generation, "search text submitted");
        generation
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Debounce-then-cancel scheduler. One per search box.
pub struct QueryScheduler {
    config: SearchConfig,
    input: QueryInput,
    rx: watch::Receiver<Submitted>,
    dispatched: u64,
}

impl QueryScheduler {
    pub fn new(config: SearchConfig) -> Self {
        let (tx, rx) = watch::channel(Submitted::default());
        Self {
            config,
            input: QueryInput { tx: Arc::new(tx) },
            rx,
            dispatched: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// A handle for submitting text from another task.
    pub fn input(&self) -> QueryInput {
        self.input.clone()
    }

    /// Shorthand for `self.input().submit(text)`.
    pub fn submit(&self, text: impl Into<String>) -> u64 {
        self.input.submit(text)
    }

    /// The generation of the most recent submission.
    pub fn latest_generation(&self) -> u64 {
        self.rx.borrow().generation
    }

    /// Whether `query` is still the latest submission.
    pub fn is_current(&self, query: &Query) -> bool {
        self.latest_generation() == query.generation
    }

    /// Waits for the next query worth sending.
    ///
    /// Resolves once submitted text has gone [`SearchConfig::debounce`]
    /// without changing, or immediately for a clear. Each submission is
    /// dispatched at most once. Pends while nothing new has been typed.
    pub async fn next_query(&mut self) -> Query {
        loop {
            if self.rx.borrow().generation == self.dispatched {
                // The scheduler owns a sender, so the channel can't close.
                let _ = self.rx.changed().await;
                continue;
            }

            let (generation, text) = {
                let current = self.rx.borrow_and_update();
                (current.generation, current.text.trim().to_string())
            };

            if text.chars().count() < self.config.min_query_len {
                self.dispatched = generation;
                debug!(generation, "search cleared");
                return Query {
                    generation,
                    text: String::new(),
                    clear: true,
                };
            }

            match tokio::time::timeout(self.config.debounce, self.rx.changed()).await {
                // Stable for the whole window.
                Err(_) => {
                    self.dispatched = generation;
                    debug!(generation, query = %text, "search dispatched");
                    return Query {
                        generation,
                        text,
                        clear: false,
                    };
                }
                // Typed again; restart the window on the new text.
                Ok(_) => trace!(generation, "search debounce restarted"),
            }
        }
    }

    /// Drives `fetch` for `query`, abandoning it if newer text arrives.
    ///
    /// Returns [`SearchOutcome::Superseded`] without polling `fetch` when
    /// the query is already stale.
    pub async fn run<F>(&self, query: &Query, fetch: F) -> SearchOutcome<F::Output>
    where
        F: Future,
    {
        let mut rx = self.input.tx.subscribe();
        let generation = query.generation;
        if rx.borrow().generation > generation {
            debug!(generation, "search stale before start");
            return SearchOutcome::Superseded;
        }

        tokio::select! {
            biased;
            output = fetch => SearchOutcome::Completed(output),
            _ = rx.wait_for(|s| s.generation > generation) => {
                debug!(generation, "search superseded");
                SearchOutcome::Superseded
            }
        }
    }
}

impl Default for QueryScheduler {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
