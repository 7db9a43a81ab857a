//! HTTP Protocol Definitions
//!
//! Endpoints and DTOs for executing functions over HTTP. Synchronous calls
//! answer with `ExecuteFunctionResponse`; streaming calls answer with a
//! Server-Sent Events stream whose event names are `data`, `error` and `end`.

use super::error::ErrorValue;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ENDPOINT_EXECUTE_FUNCTION: &str = "/function/execute";
pub const ENDPOINT_LIST_FUNCTIONS: &str = "/function/list";

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteFunctionRequest {
    /// Kept untyped so a non-string name is reported as a validation error.
    #[serde(default)]
    pub name: Value,
    #[serde(default)]
    pub options: Option<Value>,
    /// Run on this region instead of a pool.
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExecuteFunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListFunctionsResponse {
    pub functions: Vec<String>,
}
