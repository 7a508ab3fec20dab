//! Crawl frontier shared by the worker pool
//!
//! The frontier is a FIFO of [`CrawlTask`]s plus a count of tasks currently
//! being processed. Natural completion is detected when both reach zero: the
//! frontier closes itself and wakes every idle worker so the pool can drain.
//!
//! Workers take tasks as [`TaskLease`]s. A lease marks its task complete when
//! dropped, so a worker that bails out early (error, cancellation, panic)
//! never leaves the in-flight count stuck.

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use url::Url;

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Canonical URL of the page
    pub url: Url,

    /// Link distance from the seed (seed = 0)
    pub depth: u32,

    /// Page the link was found on; None for the seed
    pub referrer: Option<Url>,
}

impl CrawlTask {
    /// The depth-0 task for a seed URL
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            referrer: None,
        }
    }

    /// A task for a link found on this task's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
            referrer: Some(self.url.clone()),
        }
    }
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlTask>,
    in_flight: usize,
    closed: bool,
}

/// Work queue with completion detection
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
    max_depth: u32,
    max_dispatched_depth: AtomicU32,
}

impl Frontier {
    pub fn new(max_depth: u32) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
            max_depth,
            max_dispatched_depth: AtomicU32::new(0),
        }
    }

    /// Enqueues a task
    ///
    /// Returns false if the task is deeper than the session limit or the
    /// frontier has already closed.
    pub fn push(&self, task: CrawlTask) -> bool {
        if task.depth > self.max_depth {
            return false;
        }

        {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            state.queue.push_back(task);
        }

        self.notify.notify_waiters();
        true
    }

    /// Waits for the next task
    ///
    /// Returns None once the frontier is closed, either because the crawl
    /// finished naturally or because [`close`](Self::close) was called.
    pub async fn pop(self: &Arc<Self>) -> Option<TaskLease> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a push in between is not lost
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }

                if let Some(task) = state.queue.pop_front() {
                    state.in_flight += 1;
                    self.max_dispatched_depth
                        .fetch_max(task.depth, Ordering::SeqCst);
                    return Some(TaskLease {
                        frontier: Arc::clone(self),
                        task,
                    });
                }

                if state.in_flight == 0 {
                    state.closed = true;
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Closes the frontier; queued tasks are dropped and waiters return None
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.queue.clear();
        }
        self.notify.notify_waiters();
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.lock().closed
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Deepest task handed to a worker so far
    pub fn max_dispatched_depth(&self) -> u32 {
        self.max_dispatched_depth.load(Ordering::SeqCst)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    fn complete(&self) {
        let finished = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            if state.in_flight == 0 && state.queue.is_empty() {
                state.closed = true;
                true
            } else {
                false
            }
        };

        if finished {
            tracing::debug!("Frontier drained; closing");
            self.notify.notify_waiters();
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // The state is plain data, so a poisoned lock is still consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A dispatched task; completes itself on drop
#[derive(Debug)]
pub struct TaskLease {
    frontier: Arc<Frontier>,
    task: CrawlTask,
}

impl Deref for TaskLease {
    type Target = CrawlTask;

    fn deref(&self) -> &CrawlTask {
        &self.task
    }
}

impl Drop for TaskLease {
    fn drop(&mut self) {
        self.frontier.complete();
    }
}
