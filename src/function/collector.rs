//! Result Collectors
//!
//! `ResultCollector` is the callback surface the cluster client drives while a
//! function executes. Two implementations:
//! - **`StreamingResultCollector`** forwards every call into a `ResultStream`.
//! - **`BufferedResultCollector`** keeps everything until the execution returns.
//!
//! Delivering anything after `on_complete` breaks the ordering guarantees of the
//! stream, so both collectors treat it as a fatal logic error and panic.

use super::stream::ResultStream;
use super::types::ResultItem;
use crate::cluster::marshal::NativeValue;
use crate::cluster::GridException;

use std::sync::{Arc, Mutex, MutexGuard};

pub trait ResultCollector: Send + Sync {
    /// One value produced by a target.
    fn on_result(&self, value: NativeValue);
    /// One target failed. Results from the remaining targets still follow.
    fn on_error(&self, error: GridException);
    /// No more results. Called exactly once.
    fn on_complete(&self);
}

fn protocol_violation(kind: &str) -> ! {
    tracing::error!("Result collector received a {} after end of results", kind);
    panic!("result collector received a {} after end of results", kind);
}

pub struct StreamingResultCollector {
    stream: Arc<ResultStream>,
}

impl StreamingResultCollector {
    pub fn new(stream: Arc<ResultStream>) -> Self {
        Self { stream }
    }
}

impl ResultCollector for StreamingResultCollector {
    fn on_result(&self, value: NativeValue) {
        tracing::trace!("Streaming result received");
        if !self.stream.append(ResultItem::Value(value)) {
            protocol_violation("result");
        }
    }

    fn on_error(&self, error: GridException) {
        tracing::trace!("Streaming per-target error received: {}", error);
        if !self.stream.append(ResultItem::Error(error)) {
            protocol_violation("error");
        }
    }

    fn on_complete(&self) {
        if !self.stream.close() {
            tracing::debug!("End of results signalled more than once");
        }
    }
}

#[derive(Default)]
struct Buffer {
    items: Vec<ResultItem>,
    ended: bool,
}

pub struct BufferedResultCollector {
    /// The end flag lives with the items so a push can never slip in after it.
    buffer: Mutex<Buffer>,
}

impl BufferedResultCollector {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Buffer::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, item: ResultItem, kind: &str) {
        let mut buffer = self.lock();
        if buffer.ended {
            drop(buffer);
            protocol_violation(kind);
        }
        buffer.items.push(item);
    }

    pub fn is_ended(&self) -> bool {
        self.lock().ended
    }

    /// Takes everything collected so far, in arrival order.
    pub fn take_results(&self) -> Vec<ResultItem> {
        std::mem::take(&mut self.lock().items)
    }
}

impl Default for BufferedResultCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCollector for BufferedResultCollector {
    fn on_result(&self, value: NativeValue) {
        self.push(ResultItem::Value(value), "result");
    }

    fn on_error(&self, error: GridException) {
        self.push(ResultItem::Error(error), "error");
    }

    fn on_complete(&self) {
        self.lock().ended = true;
    }
}
