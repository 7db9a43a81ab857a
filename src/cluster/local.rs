//! In-Process Cluster
//!
//! A `ClusterClient` backed by a registry of named functions and a fixed set of
//! simulated members. A function runs once per selected member; each member's
//! results are reported to the collector in member order, and a failing member
//! is reported as a per-target error without stopping the remaining members.

use super::marshal::NativeValue;
use super::partitioner::{MemberId, PartitionManager};
use super::{ClusterClient, Execution, GridException};
use crate::function::collector::ResultCollector;
use crate::function::types::FunctionTarget;

use dashmap::{DashMap, DashSet};
use std::sync::Arc;

/// What a function sees when it runs on one member.
#[derive(Debug, Clone)]
pub struct FunctionContext {
    pub member: MemberId,
    pub function_name: String,
    pub arguments: Option<NativeValue>,
    /// Filter keys owned by `member`. Empty when no filter was given.
    pub filter: Vec<NativeValue>,
}

/// A thread-safe function body. Returns the values this member produces.
pub type FunctionHandlerFn =
    Arc<dyn Fn(FunctionContext) -> Result<Vec<NativeValue>, GridException> + Send + Sync>;

pub struct LocalCluster {
    functions: DashMap<String, FunctionHandlerFn>,
    regions: DashSet<String>,
    partitioner: PartitionManager,
}

impl LocalCluster {
    /// Creates a cluster of `member_count` members with no functions registered.
    pub fn new(member_count: usize) -> Arc<Self> {
        let members = (0..member_count)
            .map(|i| MemberId(format!("member-{}", i)))
            .collect();

        Arc::new(Self {
            functions: DashMap::new(),
            regions: DashSet::new(),
            partitioner: PartitionManager::new(members),
        })
    }

    /// Registers a function under `function_name`, replacing any previous one.
    pub fn register<F>(&self, function_name: &str, handler: F)
    where
        F: Fn(FunctionContext) -> Result<Vec<NativeValue>, GridException> + Send + Sync + 'static,
    {
        self.functions
            .insert(function_name.to_string(), Arc::new(handler));

        tracing::info!("Registered function: {}", function_name);
    }

    pub fn add_region(&self, region_name: &str) {
        self.regions.insert(region_name.to_string());
        tracing::info!("Added region: {}", region_name);
    }

    pub fn members(&self) -> &[MemberId] {
        self.partitioner.members()
    }

    pub fn list_functions(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .functions
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn has_function(&self, function_name: &str) -> bool {
        self.functions.contains_key(function_name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Picks the members an execution runs on, with the filter keys each one owns.
    fn select_targets(
        &self,
        execution: &Execution,
    ) -> Result<Vec<(MemberId, Vec<NativeValue>)>, GridException> {
        if self.members().is_empty() {
            return Err(GridException::new(
                "NoAvailableServersException",
                "No servers are available to execute the function",
            ));
        }

        let everyone = || -> Vec<(MemberId, Vec<NativeValue>)> {
            self.members()
                .iter()
                .map(|member| (member.clone(), Vec::new()))
                .collect()
        };

        match &execution.target {
            FunctionTarget::Pool(_) => Ok(everyone()),
            FunctionTarget::Region(region) => {
                if !self.regions.contains(region) {
                    return Err(GridException::new(
                        "RegionDestroyedException",
                        format!("Region `{}` does not exist", region),
                    ));
                }

                let Some(filter) = &execution.filter else {
                    return Ok(everyone());
                };

                Ok(self
                    .partitioner
                    .route_keys(filter.clone(), NativeValue::routing_key))
            }
        }
    }
}

impl ClusterClient for LocalCluster {
    fn execute(
        &self,
        execution: &Execution,
        collector: Arc<dyn ResultCollector>,
    ) -> Result<(), GridException> {
        // Clone the handler out so the map shard is not held while it runs
        let handler = self
            .functions
            .get(&execution.function_name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                GridException::new(
                    "FunctionException",
                    format!("Unknown function: {}", execution.function_name),
                )
            })?;

        let targets = self.select_targets(execution)?;

        tracing::debug!(
            "Executing function '{}' on {} member(s)",
            execution.function_name,
            targets.len()
        );

        for (member, filter) in targets {
            let context = FunctionContext {
                member: member.clone(),
                function_name: execution.function_name.clone(),
                arguments: execution.arguments.clone(),
                filter,
            };

            match handler(context) {
                Ok(values) => {
                    tracing::trace!("Member {} produced {} value(s)", member, values.len());
                    for value in values {
                        collector.on_result(value);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Function '{}' failed on member {}: {}",
                        execution.function_name,
                        member,
                        e
                    );
                    collector.on_error(e);
                }
            }
        }

        collector.on_complete();
        Ok(())
    }
}
