//! Function Execution Module
//!
//! Executes named functions on the cluster and hands results back either as one
//! aggregate value (synchronous mode) or as a stream of events (streaming mode).
//!
//! ## Streaming Architecture
//! ```text
//!   caller ─▶ builder ─▶ spawn_execution ─┬─▶ worker thread: ClusterClient::execute
//!                                         │        └─▶ StreamingResultCollector ─▶ ResultStream
//!                                         └─▶ dispatcher task ◀── wake ──────────────────┘
//!                                                  └─▶ ExecutionHandle: data* error* end
//! ```
//! The worker finishing and the stream ending are independent signals; the
//! `CompletionCoordinator` tears the execution down once both have arrived.
//!
//! ## Submodules
//! - **`types`**: Requests, result items and caller-facing events.
//! - **`error`**: Error taxonomy and translation of cluster exceptions.
//! - **`stream`**: The result queue shared between collector and dispatcher.
//! - **`collector`**: The collector capability and its streaming/buffered implementations.
//! - **`coordinator`**: Two-signal completion tracking.
//! - **`task`**: Background execution and event dispatch.
//! - **`sync`**: Blocking execute-and-aggregate.
//! - **`builder`**: Argument validation and pool resolution.
//! - **`service`**: The `execute_function` entry points.
//! - **`protocol`** / **`handlers`**: HTTP surface.

pub mod builder;
pub mod collector;
pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod service;
pub mod stream;
pub mod sync;
pub mod task;
pub mod types;
