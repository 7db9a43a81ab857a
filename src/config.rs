//! Node and executor configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// What synchronous mode does when one target fails but others succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetErrorPolicy {
    /// Fail the whole call with the first per-target error.
    #[default]
    Fail,
    /// Drop per-target errors and return the successful values only.
    Discard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub target_errors: TargetErrorPolicy,
    /// With no pool name and no default pool, run on the first registered pool.
    pub allow_pool_fallback: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            target_errors: TargetErrorPolicy::Fail,
            allow_pool_fallback: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_addr: SocketAddr,
    pub members: usize,
    pub pools: Vec<String>,
    pub default_pool: Option<String>,
    pub log_level: tracing::Level,
    pub executor: ExecutorConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 6000)),
            members: 3,
            pools: vec!["default".to_string()],
            default_pool: None,
            log_level: tracing::Level::INFO,
            executor: ExecutorConfig::default(),
        }
    }
}

impl NodeConfig {
    pub const USAGE: &'static str = "Usage: grid-node [--bind <addr:port>] [--members <n>] \
        [--pool <name>]... [--default-pool <name>] [--log-level <level>] \
        [--discard-target-errors] [--no-pool-fallback]";

    /// Parses command-line flags (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Self::default();
        let mut pools = Vec::new();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = || {
                args.get(i + 1)
                    .with_context(|| format!("{} requires a value", flag))
            };

            match flag {
                "--bind" => {
                    config.bind_addr = value()?
                        .parse()
                        .with_context(|| format!("invalid --bind address `{}`", args[i + 1]))?;
                    i += 2;
                }
                "--members" => {
                    config.members = value()?
                        .parse()
                        .with_context(|| format!("invalid --members count `{}`", args[i + 1]))?;
                    i += 2;
                }
                "--pool" => {
                    pools.push(value()?.clone());
                    i += 2;
                }
                "--default-pool" => {
                    config.default_pool = Some(value()?.clone());
                    i += 2;
                }
                "--log-level" => {
                    config.log_level = value()?
                        .parse()
                        .map_err(|_| anyhow::anyhow!("invalid --log-level `{}`", args[i + 1]))?;
                    i += 2;
                }
                "--discard-target-errors" => {
                    config.executor.target_errors = TargetErrorPolicy::Discard;
                    i += 1;
                }
                "--no-pool-fallback" => {
                    config.executor.allow_pool_fallback = false;
                    i += 1;
                }
                other => {
                    anyhow::bail!("unknown flag `{}`", other);
                }
            }
        }

        if !pools.is_empty() {
            config.pools = pools;
        }

        if let Some(default_pool) = &config.default_pool {
            if !config.pools.contains(default_pool) {
                config.pools.push(default_pool.clone());
            }
        }

        Ok(config)
    }
}
