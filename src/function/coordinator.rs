//! Completion Coordinator
//!
//! A streaming execution finishes through two independent signals: the worker
//! thread's execute call returning (`task_complete`) and the consumer observing
//! the closed, drained stream (`stream_ended`). They arrive in either order,
//! possibly at the same instant on different threads. Teardown belongs to
//! whichever signal arrives second, and must happen exactly once.
//!
//! The coordinator owns the per-execution resources. The flag update and the
//! both-flags check happen under one lock, and the resources are handed out
//! (moved) to the caller that completes the pair. Dropping them is the teardown.

use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionState {
    pub task_complete: bool,
    pub stream_ended: bool,
}

impl CompletionState {
    pub fn is_finished(&self) -> bool {
        self.task_complete && self.stream_ended
    }
}

struct Inner<R> {
    state: CompletionState,
    resources: Option<R>,
}

pub struct CompletionCoordinator<R> {
    inner: Mutex<Inner<R>>,
}

impl<R> CompletionCoordinator<R> {
    pub fn new(resources: R) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CompletionState::default(),
                resources: Some(resources),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn signal(&self, mark: impl FnOnce(&mut CompletionState)) -> Option<R> {
        let mut inner = self.lock();
        mark(&mut inner.state);
        if inner.state.is_finished() {
            inner.resources.take()
        } else {
            None
        }
    }

    /// Records that the execute call has returned.
    ///
    /// Returns the resources if this call completed the pair; the caller tears down.
    pub fn task_completed(&self) -> Option<R> {
        self.signal(|state| state.task_complete = true)
    }

    /// Records that the stream was closed and fully delivered.
    ///
    /// Returns the resources if this call completed the pair; the caller tears down.
    pub fn stream_ended(&self) -> Option<R> {
        self.signal(|state| state.stream_ended = true)
    }

    pub fn state(&self) -> CompletionState {
        self.lock().state
    }

    pub fn is_torn_down(&self) -> bool {
        self.lock().resources.is_none()
    }
}
