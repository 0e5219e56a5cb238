//! Blocking work queue for the crawl.
//!
//! Mirrors the classic worker-queue discipline: producers push page units,
//! workers pop and acknowledge them with `task_done`, a coordinator awaits
//! `join` until every pushed unit has been acknowledged, then pushes one
//! stop signal per worker so nothing stays blocked on an empty queue.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

/// One unit handed to a crawl worker.
#[derive(Debug)]
pub(crate) enum Signal {
    /// A page to process, with its depth from the seed.
    Page(String, usize),
    /// Shut down: the frontier is drained.
    Stop,
}

#[derive(Default)]
struct FrontierState {
    queue: VecDeque<Signal>,
    /// Units pushed but not yet acknowledged via `task_done`.
    outstanding: usize,
}

/// Shared frontier queue with drain detection.
pub(crate) struct Frontier {
    state: Mutex<FrontierState>,
    wake: Notify,
    drained: Notify,
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Self { state: Mutex::new(FrontierState::default()), wake: Notify::new(), drained: Notify::new() }
    }

    /// Enqueue a page unit.
    pub(crate) async fn push(&self, url: String, depth: usize) {
        let mut state = self.state.lock().await;
        state.queue.push_back(Signal::Page(url, depth));
        state.outstanding += 1;
        drop(state);
        self.wake.notify_one();
    }

    /// Dequeue the next unit, waiting if the queue is currently empty.
    pub(crate) async fn pop(&self) -> Signal {
        loop {
            // Register interest before re-checking so a push between the
            // check and the await still wakes us.
            let notified = self.wake.notified();
            {
                let mut state = self.state.lock().await;
                if let Some(signal) = state.queue.pop_front() {
                    return signal;
                }
            }
            notified.await;
        }
    }

    /// Acknowledge completion of one page unit.
    pub(crate) async fn task_done(&self) {
        let mut state = self.state.lock().await;
        debug_assert!(state.outstanding > 0, "task_done without matching push");
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every pushed unit has been acknowledged.
    pub(crate) async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            {
                let state = self.state.lock().await;
                if state.outstanding == 0 {
                    return;
                }
            }
            notified.await;
        }
    }

    /// Push one stop signal per worker. Stop signals are not counted as
    /// outstanding work.
    pub(crate) async fn close(&self, workers: usize) {
        let mut state = self.state.lock().await;
        for _ in 0..workers {
            state.queue.push_back(Signal::Stop);
        }
        drop(state);
        for _ in 0..workers {
            self.wake.notify_one();
        }
    }
}
