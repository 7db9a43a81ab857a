//! Data-Grid Function Execution Library
//!
//! Lets a caller invoke a named function on a data-grid cluster and receive the
//! results either as one aggregated value or as an incremental event stream.
//! The binary (`main.rs`) exposes the same call over HTTP.
//!
//! ## Modules
//! - **`function`**: Request validation, synchronous execution, and the streaming
//!   pipeline (background task, result stream, collector, completion coordinator).
//! - **`cluster`**: The cluster-client capability consumed by `function`, value
//!   marshalling, key routing and an in-process cluster implementation.
//! - **`config`**: Node and executor settings.

pub mod cluster;
pub mod config;
pub mod function;
