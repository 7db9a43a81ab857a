use crate::cluster::marshal::NativeValue;
use crate::cluster::GridException;
use super::error::ErrorValue;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique identifier of one `executeFunction` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExecutionId(pub String);

impl ExecutionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How results are handed back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Block the calling thread and return one aggregate value.
    Synchronous,
    /// Return immediately with a handle that emits `data`/`error`/`end` events.
    #[default]
    Streaming,
}

/// Where a function runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FunctionTarget {
    /// Every server reachable through the named connection pool.
    Pool(String),
    /// The members hosting the named region, narrowed by the filter if one is given.
    Region(String),
}

/// A validated `executeFunction` call. Never mutated after it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub id: ExecutionId,
    pub function_name: String,
    pub arguments: Option<Value>,
    /// Keys used for data-affinity routing.
    pub filter: Option<Vec<Value>>,
    pub mode: ExecutionMode,
    pub pool_name: Option<String>,
}

/// One unit reported by the cluster for an execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    Value(NativeValue),
    Error(GridException),
}

/// What the caller observes in streaming mode.
///
/// Every execution ends with exactly one `End`, after all other events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "lowercase")]
pub enum FunctionEvent {
    Data(Value),
    Error(ErrorValue),
    End,
}
