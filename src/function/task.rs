//! Background Execution Task
//!
//! Runs a streaming execution. The blocking execute call goes to the blocking
//! worker pool; a dispatcher task on the caller's runtime drains the result
//! stream on every wake-up and turns items into `FunctionEvent`s.
//!
//! ## Lifecycle
//! 1. **Dispatch**: the worker starts `ClusterClient::execute` with a
//!    `StreamingResultCollector` feeding the stream.
//! 2. **Delivery**: each wake-up drains the stream in arrival order.
//! 3. **Completion**: the worker's result and the end of the stream are two
//!    separate signals recorded in a `CompletionCoordinator`. A failed execute
//!    emits its error, then closes the stream itself in case the collector
//!    was never reached.
//! 4. **Teardown**: whichever signal lands second emits `End` and releases the
//!    request and stream.
//!
//! There is no cancellation: once dispatched, an execution runs until the
//! cluster client reports success or failure.

use super::collector::{ResultCollector, StreamingResultCollector};
use super::coordinator::CompletionCoordinator;
use super::error::{translate_exception, FunctionError};
use super::stream::ResultStream;
use super::types::*;
use crate::cluster::marshal::to_host;
use crate::cluster::{ClusterClient, Execution, GridException};

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

/// The caller's end of a streaming execution.
///
/// Yields `data`/`error` events in arrival order, then exactly one `End`,
/// then `None`.
pub struct ExecutionHandle {
    id: ExecutionId,
    events: mpsc::UnboundedReceiver<FunctionEvent>,
}

impl ExecutionHandle {
    pub fn id(&self) -> &ExecutionId {
        &self.id
    }

    pub async fn next_event(&mut self) -> Option<FunctionEvent> {
        self.events.recv().await
    }

    /// Waits for the execution to finish and returns every event it emitted.
    pub async fn collect_events(mut self) -> Vec<FunctionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }
}

/// Per-execution state released at teardown.
struct TaskResources {
    request: ExecutionRequest,
    stream: Arc<ResultStream>,
}

/// Starts `execution` in the background and returns immediately.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_execution(
    cluster: Arc<dyn ClusterClient>,
    execution: Execution,
    request: ExecutionRequest,
) -> ExecutionHandle {
    let id = request.id.clone();
    let stream = Arc::new(ResultStream::new());
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    tracing::debug!(
        "Dispatching execution {} of function '{}'",
        id,
        execution.function_name
    );

    let collector: Arc<dyn ResultCollector> =
        Arc::new(StreamingResultCollector::new(stream.clone()));
    let worker = tokio::task::spawn_blocking(move || cluster.execute(&execution, collector));

    let dispatcher = Dispatcher {
        id: id.clone(),
        stream: stream.clone(),
        coordinator: CompletionCoordinator::new(TaskResources { request, stream }),
        events: events_tx,
    };
    tokio::spawn(dispatcher.run(worker));

    ExecutionHandle {
        id,
        events: events_rx,
    }
}

struct Dispatcher {
    id: ExecutionId,
    stream: Arc<ResultStream>,
    coordinator: CompletionCoordinator<TaskResources>,
    events: mpsc::UnboundedSender<FunctionEvent>,
}

impl Dispatcher {
    async fn run(self, mut worker: JoinHandle<Result<(), GridException>>) {
        let stream = self.stream.clone();
        let mut worker_done = false;

        let resources = loop {
            tokio::select! {
                joined = &mut worker, if !worker_done => {
                    worker_done = true;
                    if let Some(resources) = self.on_execute_complete(joined) {
                        break resources;
                    }
                }
                _ = stream.woken() => {
                    if let Some(resources) = self.on_wake() {
                        break resources;
                    }
                }
            }
        };

        self.teardown(resources);
    }

    fn on_wake(&self) -> Option<TaskResources> {
        // Read the flag first: a closed stream gets no more appends, so the
        // drain below is then final.
        let closed = self.stream.is_closed();
        self.deliver(self.stream.drain());

        if !closed {
            return None;
        }

        tracing::trace!("Execution {} stream ended", self.id);
        self.coordinator.stream_ended()
    }

    fn on_execute_complete(
        &self,
        joined: Result<Result<(), GridException>, JoinError>,
    ) -> Option<TaskResources> {
        let failure = match joined {
            Ok(Ok(())) => None,
            Ok(Err(exception)) => {
                tracing::error!("Execution {} failed: {}", self.id, exception);
                Some(translate_exception(&exception))
            }
            Err(join_error) => {
                let message = describe_join_error(join_error);
                tracing::error!("Execution {} worker aborted: {}", self.id, message);
                Some(FunctionError::Internal(message).to_error_value())
            }
        };

        let Some(error) = failure else {
            tracing::debug!("Execution {} completed", self.id);
            return self.coordinator.task_completed();
        };

        if self.stream.close() {
            tracing::debug!("Execution {} closed a stream the collector left open", self.id);
        }
        self.deliver(self.stream.drain());
        self.emit(FunctionEvent::Error(error));

        self.coordinator
            .task_completed()
            .or_else(|| self.coordinator.stream_ended())
    }

    fn deliver(&self, items: Vec<ResultItem>) {
        for item in items {
            let event = match item {
                ResultItem::Value(value) => match to_host(&value) {
                    Ok(host) => FunctionEvent::Data(host),
                    Err(e) => FunctionEvent::Error(FunctionError::from(e).to_error_value()),
                },
                ResultItem::Error(exception) => {
                    FunctionEvent::Error(translate_exception(&exception))
                }
            };
            self.emit(event);
        }
    }

    fn emit(&self, event: FunctionEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Execution {} has no listener, event dropped", self.id);
        }
    }

    fn teardown(self, resources: TaskResources) {
        self.emit(FunctionEvent::End);

        let TaskResources { request, stream } = resources;
        tracing::debug!(
            "Execution {} of function '{}' torn down (stream closed: {})",
            self.id,
            request.function_name,
            stream.is_closed()
        );
    }
}

fn describe_join_error(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let panic = error.into_panic();
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "execution worker panicked".to_string()
    }
}
