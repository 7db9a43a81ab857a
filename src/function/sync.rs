//! Synchronous Executor
//!
//! Runs an execution on the calling thread, blocking it until every target has
//! reported, and folds the results into one value. Nothing partial is returned
//! on failure.

use super::collector::BufferedResultCollector;
use super::error::{translate_exception, FunctionError};
use super::types::ResultItem;
use crate::cluster::marshal::to_host;
use crate::cluster::{ClusterClient, Execution};
use crate::config::TargetErrorPolicy;

use serde_json::Value;
use std::sync::Arc;

/// Executes and aggregates.
///
/// A single value is returned as-is; any other count comes back as an array in
/// arrival order. Per-target errors are handled according to `target_errors`.
pub fn execute_synchronously(
    cluster: &dyn ClusterClient,
    execution: &Execution,
    target_errors: TargetErrorPolicy,
) -> Result<Value, FunctionError> {
    let collector = Arc::new(BufferedResultCollector::new());

    cluster
        .execute(execution, collector.clone())
        .map_err(|e| {
            tracing::error!(
                "Synchronous execution of '{}' failed: {}",
                execution.function_name,
                e
            );
            FunctionError::Task(translate_exception(&e))
        })?;

    if !collector.is_ended() {
        tracing::debug!(
            "Execution of '{}' returned without signalling end of results",
            execution.function_name
        );
    }

    let mut values = Vec::new();
    for item in collector.take_results() {
        match item {
            ResultItem::Value(value) => values.push(to_host(&value)?),
            ResultItem::Error(e) => match target_errors {
                TargetErrorPolicy::Fail => {
                    return Err(FunctionError::Target(translate_exception(&e)));
                }
                TargetErrorPolicy::Discard => {
                    tracing::warn!(
                        "Discarding per-target error from '{}': {}",
                        execution.function_name,
                        e
                    );
                }
            },
        }
    }

    tracing::debug!(
        "Synchronous execution of '{}' produced {} value(s)",
        execution.function_name,
        values.len()
    );

    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(Value::Array(values))
    }
}
