//! Latest-wins guard for overlapping queries.
//!
//! Callers that rerun the same logical query (a user editing input faster
//! than results arrive) take a ticket per run; only the run holding the
//! newest ticket may publish its outcome. Superseded outcomes are dropped,
//! never stored, so the observable value cannot go backwards.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of the value held by a [`QuerySlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Nothing started yet.
    Idle,
    /// The newest query is still in flight.
    Loading,
    /// The newest query committed a value.
    Success,
    /// The newest query failed.
    Error,
}

/// Ticket identifying one query generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

#[derive(Debug)]
struct SlotState<T> {
    status: QueryStatus,
    value: Option<T>,
}

/// Holds the outcome of the most recently started query.
#[derive(Debug)]
pub struct QuerySlot<T> {
    generation: AtomicU64,
    state: Mutex<SlotState<T>>,
}

impl<T> QuerySlot<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                status: QueryStatus::Idle,
                value: None,
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a new query generation.
    ///
    /// Moves the slot to `Loading` and drops the held value, so a rerun
    /// immediately stops exposing the superseded result.
    pub fn begin(&self) -> QueryTicket {
        let mut state = self.state();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.status = QueryStatus::Loading;
        state.value = None;
        QueryTicket(generation)
    }

    /// Publish a successful outcome. Returns false (and stores nothing)
    /// when a newer query has begun since the ticket was taken.
    pub fn commit(&self, ticket: QueryTicket, value: T) -> bool {
        let mut state = self.state();
        if !self.ticket_is_current(ticket) {
            return false;
        }
        state.status = QueryStatus::Success;
        state.value = Some(value);
        true
    }

    /// Publish a failure. Stale tickets are ignored the same way as in
    /// [`commit`](Self::commit).
    pub fn fail(&self, ticket: QueryTicket) -> bool {
        let mut state = self.state();
        if !self.ticket_is_current(ticket) {
            return false;
        }
        state.status = QueryStatus::Error;
        state.value = None;
        true
    }

    /// Whether no newer query has begun since this ticket was taken.
    pub fn is_latest(&self, ticket: QueryTicket) -> bool {
        self.ticket_is_current(ticket)
    }

    pub fn status(&self) -> QueryStatus {
        self.state().status
    }

    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state().value.clone()
    }

    /// Run one query under the guard: begin, await, then commit or fail.
    ///
    /// Returns whether the outcome was still current and got stored.
    pub async fn run<Fut, E>(&self, fut: Fut) -> bool
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let ticket = self.begin();
        match fut.await {
            Ok(value) => self.commit(ticket, value),
            Err(_) => self.fail(ticket),
        }
    }

    fn ticket_is_current(&self, ticket: QueryTicket) -> bool {
        ticket.0 == self.generation.load(Ordering::SeqCst)
    }
}

impl<T> Default for QuerySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
