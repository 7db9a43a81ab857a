//! Cluster Client Capability
//!
//! The data-grid client is consumed as an opaque capability: submit a function
//! execution, receive zero or more results through a collector, and get back
//! exactly one terminal signal (the `execute` call returning `Ok` or `Err`).
//!
//! ## Submodules
//! - **`marshal`**: Conversion between host values (`serde_json::Value`) and `NativeValue`.
//! - **`partitioner`**: Routes filter keys to the members owning them.
//! - **`local`**: An in-process cluster with a function registry and simulated members.

pub mod local;
pub mod marshal;
pub mod partitioner;


use crate::function::collector::ResultCollector;
use crate::function::types::FunctionTarget;
use marshal::NativeValue;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// An exception raised by the cluster client.
///
/// Cloned whenever it has to outlive the thread that raised it.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct GridException {
    pub name: String,
    pub message: String,
}

impl GridException {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A fully built execution: marshalled arguments and filter plus the resolved target.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub function_name: String,
    pub arguments: Option<NativeValue>,
    pub filter: Option<Vec<NativeValue>>,
    pub target: FunctionTarget,
}

/// The function-execution capability of a data-grid client.
///
/// `execute` blocks until every target has reported. Implementations call the
/// collector once per result, once per failed target, and exactly once to signal
/// the end of results. They may call it from threads the caller does not control.
pub trait ClusterClient: Send + Sync {
    fn execute(
        &self,
        execution: &Execution,
        collector: Arc<dyn ResultCollector>,
    ) -> Result<(), GridException>;
}
