//! Public call surface: `execute_function` on a pool, or on a region.

use super::builder::{build_request, PoolRegistry, FILTER_ON_POOL, POOL_NAME_ON_REGION};
use super::error::FunctionError;
use super::sync::execute_synchronously;
use super::task::{spawn_execution, ExecutionHandle};
use super::types::{ExecutionMode, ExecutionRequest, FunctionTarget};
use crate::cluster::marshal::to_native;
use crate::cluster::{ClusterClient, Execution};
use crate::config::ExecutorConfig;

use serde_json::Value;
use std::sync::Arc;

/// What `execute_function` hands back, depending on the requested mode.
pub enum FunctionOutcome {
    /// Synchronous mode: the aggregated result.
    Value(Value),
    /// Streaming mode: a handle emitting `data`/`error`/`end` events.
    Stream(ExecutionHandle),
}

impl std::fmt::Debug for FunctionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionOutcome::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FunctionOutcome::Stream(handle) => f.debug_tuple("Stream").field(handle.id()).finish(),
        }
    }
}

pub struct FunctionService {
    cluster: Arc<dyn ClusterClient>,
    pools: Arc<PoolRegistry>,
    config: ExecutorConfig,
}

impl FunctionService {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        pools: Arc<PoolRegistry>,
        config: ExecutorConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            cluster,
            pools,
            config,
        })
    }

    pub fn pools(&self) -> &PoolRegistry {
        &self.pools
    }

    /// Executes a function on the servers of a pool.
    ///
    /// Synchronous mode blocks the calling thread. Streaming mode returns at
    /// once and must be called from within a Tokio runtime.
    pub fn execute_function(
        &self,
        name: &Value,
        options: Option<&Value>,
    ) -> Result<FunctionOutcome, FunctionError> {
        let prepared = self.prepare(name, options)?;
        self.run(prepared)
    }

    /// Executes a function on the members hosting `region`, routed by the filter keys.
    pub fn execute_function_on_region(
        &self,
        region: &str,
        name: &Value,
        options: Option<&Value>,
    ) -> Result<FunctionOutcome, FunctionError> {
        let prepared = self.prepare_on_region(region, name, options)?;
        self.run(prepared)
    }

    /// Validates a pool execution, resolves its pool and marshals its payload.
    ///
    /// Runs on the calling thread and never touches the cluster.
    pub fn prepare(
        &self,
        name: &Value,
        options: Option<&Value>,
    ) -> Result<PreparedExecution, FunctionError> {
        let request = build_request(name, options)?;

        if request.filter.is_some() {
            return Err(FunctionError::Validation(FILTER_ON_POOL.to_string()));
        }

        let pool = self
            .pools
            .resolve(request.pool_name.as_deref(), self.config.allow_pool_fallback)?;

        PreparedExecution::new(request, FunctionTarget::Pool(pool))
    }

    /// Region counterpart of [`FunctionService::prepare`].
    pub fn prepare_on_region(
        &self,
        region: &str,
        name: &Value,
        options: Option<&Value>,
    ) -> Result<PreparedExecution, FunctionError> {
        let request = build_request(name, options)?;

        if request.pool_name.is_some() {
            return Err(FunctionError::Validation(POOL_NAME_ON_REGION.to_string()));
        }

        PreparedExecution::new(request, FunctionTarget::Region(region.to_string()))
    }

    /// Hands a prepared execution to the cluster in its requested mode.
    pub fn run(&self, prepared: PreparedExecution) -> Result<FunctionOutcome, FunctionError> {
        let PreparedExecution { request, execution } = prepared;

        tracing::debug!(
            "Executing '{}' on {:?} ({:?})",
            execution.function_name,
            execution.target,
            request.mode
        );

        match request.mode {
            ExecutionMode::Synchronous => {
                let value = execute_synchronously(
                    self.cluster.as_ref(),
                    &execution,
                    self.config.target_errors,
                )?;
                Ok(FunctionOutcome::Value(value))
            }
            ExecutionMode::Streaming => Ok(FunctionOutcome::Stream(spawn_execution(
                self.cluster.clone(),
                execution,
                request,
            ))),
        }
    }
}

/// A validated, marshalled execution waiting to be run.
#[derive(Debug)]
pub struct PreparedExecution {
    request: ExecutionRequest,
    execution: Execution,
}

impl PreparedExecution {
    fn new(request: ExecutionRequest, target: FunctionTarget) -> Result<Self, FunctionError> {
        let execution = Execution {
            function_name: request.function_name.clone(),
            arguments: request.arguments.as_ref().map(to_native).transpose()?,
            filter: request
                .filter
                .as_ref()
                .map(|keys| keys.iter().map(to_native).collect::<Result<Vec<_>, _>>())
                .transpose()?,
            target,
        };

        Ok(Self { request, execution })
    }

    pub fn mode(&self) -> ExecutionMode {
        self.request.mode
    }

    pub fn request(&self) -> &ExecutionRequest {
        &self.request
    }
}
