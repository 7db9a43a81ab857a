//! Execution Request Builder
//!
//! Validates the caller's `executeFunction(name, options)` arguments and resolves
//! the connection pool to run on. Every failure here is raised before anything
//! is sent to the cluster.
//!
//! The second argument is one of:
//! - absent / `null`: no arguments, streaming mode, default pool;
//! - an array: the function arguments;
//! - an object with any of `arguments`, `filter`, `synchronous`, `poolName`.

use super::error::FunctionError;
use super::types::{ExecutionId, ExecutionMode, ExecutionRequest};

use serde_json::{Map, Value};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const MISSING_NAME: &str = "You must provide the name of a function to execute.";
pub const INVALID_FILTER: &str = "You must pass an Array of keys as the filter for executeFunction().";
pub const INVALID_SYNCHRONOUS: &str =
    "You must pass true or false for the synchronous option for executeFunction().";
pub const INVALID_OPTIONS: &str =
    "You must pass either an Array of arguments or an options Object to executeFunction().";
pub const INVALID_POOL_NAME: &str = "You must pass a string as the poolName for executeFunction().";
pub const FILTER_ON_POOL: &str = "You cannot pass a filter to executeFunction for a Cache.";
pub const POOL_NAME_ON_REGION: &str = "You cannot pass a poolName to executeFunction for a Region.";

/// Builds a validated request from raw call arguments.
pub fn build_request(name: &Value, options: Option<&Value>) -> Result<ExecutionRequest, FunctionError> {
    let Value::String(function_name) = name else {
        return Err(FunctionError::Validation(MISSING_NAME.to_string()));
    };

    let mut request = ExecutionRequest {
        id: ExecutionId::new(),
        function_name: function_name.clone(),
        arguments: None,
        filter: None,
        mode: ExecutionMode::Streaming,
        pool_name: None,
    };

    match options {
        None | Some(Value::Null) => {}
        Some(Value::Array(_)) => request.arguments = options.cloned(),
        Some(Value::Object(map)) => apply_options(&mut request, map)?,
        Some(_) => return Err(FunctionError::Validation(INVALID_OPTIONS.to_string())),
    }

    tracing::trace!(
        "Built request {} for '{}' ({:?})",
        request.id,
        request.function_name,
        request.mode
    );

    Ok(request)
}

fn apply_options(request: &mut ExecutionRequest, options: &Map<String, Value>) -> Result<(), FunctionError> {
    for (key, value) in options {
        // An explicit null behaves like an absent key
        if value.is_null() {
            continue;
        }

        match key.as_str() {
            "arguments" => request.arguments = Some(value.clone()),
            "filter" => match value {
                Value::Array(keys) => request.filter = Some(keys.clone()),
                _ => return Err(FunctionError::Validation(INVALID_FILTER.to_string())),
            },
            "synchronous" => match value {
                Value::Bool(true) => request.mode = ExecutionMode::Synchronous,
                Value::Bool(false) => request.mode = ExecutionMode::Streaming,
                _ => return Err(FunctionError::Validation(INVALID_SYNCHRONOUS.to_string())),
            },
            "poolName" => match value {
                Value::String(pool_name) => request.pool_name = Some(pool_name.clone()),
                _ => return Err(FunctionError::Validation(INVALID_POOL_NAME.to_string())),
            },
            other => {
                return Err(FunctionError::Validation(format!(
                    "Unrecognized option `{}` for executeFunction().",
                    other
                )));
            }
        }
    }

    Ok(())
}

#[derive(Default)]
struct PoolTable {
    /// Registration order; the fallback picks the first entry.
    names: Vec<String>,
    default_pool: Option<String>,
}

/// The connection pools a node can execute functions through.
#[derive(Default)]
pub struct PoolRegistry {
    table: RwLock<PoolTable>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, PoolTable> {
        self.table.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PoolTable> {
        self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register_pool(&self, pool_name: &str) {
        let mut table = self.write();
        if !table.names.iter().any(|name| name == pool_name) {
            table.names.push(pool_name.to_string());
            tracing::info!("Registered pool: {}", pool_name);
        }
    }

    pub fn set_default_pool(&self, pool_name: &str) -> Result<(), FunctionError> {
        let mut table = self.write();
        if !table.names.iter().any(|name| name == pool_name) {
            return Err(FunctionError::PoolNotFound(pool_name.to_string()));
        }
        table.default_pool = Some(pool_name.to_string());
        Ok(())
    }

    pub fn pool_names(&self) -> Vec<String> {
        self.read().names.clone()
    }

    /// Resolves the pool an execution runs on.
    ///
    /// A named pool must exist. Without a name the default pool is used; if none
    /// is configured and `allow_fallback` is set, the first registered pool is
    /// picked. That fallback covers clients that have not set a default pool
    /// yet at startup, and is logged every time it is taken.
    pub fn resolve(&self, pool_name: Option<&str>, allow_fallback: bool) -> Result<String, FunctionError> {
        let table = self.read();

        if let Some(pool_name) = pool_name {
            return table
                .names
                .iter()
                .find(|name| name.as_str() == pool_name)
                .cloned()
                .ok_or_else(|| FunctionError::PoolNotFound(pool_name.to_string()));
        }

        if let Some(default_pool) = &table.default_pool {
            return Ok(default_pool.clone());
        }

        if !allow_fallback {
            return Err(FunctionError::NoPoolsAvailable);
        }

        let fallback = table.names.first().cloned().ok_or(FunctionError::NoPoolsAvailable)?;
        tracing::warn!(
            "No default pool configured, falling back to pool `{}`",
            fallback
        );
        Ok(fallback)
    }
}
