//! Error taxonomy for function execution.
//!
//! - Validation errors are raised before dispatch and never reach a worker thread.
//! - Per-target errors come from one failed member of a multi-member execution.
//! - Task failures are raised by the execute call itself.
//! - Internal errors are collector protocol violations.

use crate::cluster::marshal::MarshallingError;
use crate::cluster::GridException;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The host-visible form of an error: what the caller receives in `error` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
}

impl ErrorValue {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Translates a native cluster exception into a host-visible error value.
pub fn translate_exception(exception: &GridException) -> ErrorValue {
    ErrorValue::new(exception.name.clone(), exception.message.clone())
}

impl From<&GridException> for ErrorValue {
    fn from(exception: &GridException) -> Self {
        translate_exception(exception)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunctionError {
    #[error("{0}")]
    Validation(String),

    #[error("executeFunction: `{0}` is not a valid pool name")]
    PoolNotFound(String),

    #[error("executeFunction: no connection pools are configured")]
    NoPoolsAvailable,

    #[error(transparent)]
    Marshalling(#[from] MarshallingError),

    /// The execute call itself failed.
    #[error("{0}")]
    Task(ErrorValue),

    /// One target failed while others may have succeeded.
    #[error("{0}")]
    Target(ErrorValue),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FunctionError {
    /// True for errors detected before anything was sent to the cluster.
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            FunctionError::Validation(_)
                | FunctionError::PoolNotFound(_)
                | FunctionError::NoPoolsAvailable
                | FunctionError::Marshalling(_)
        )
    }

    pub fn to_error_value(&self) -> ErrorValue {
        match self {
            FunctionError::Task(value) | FunctionError::Target(value) => value.clone(),
            FunctionError::Marshalling(e) => ErrorValue::new("MarshallingError", e.to_string()),
            FunctionError::Internal(message) => ErrorValue::new("InternalError", message.clone()),
            other => ErrorValue::new("ValidationError", other.to_string()),
        }
    }
}
