use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use grid_functions::cluster::GridException;
use grid_functions::cluster::local::{FunctionContext, LocalCluster};
use grid_functions::cluster::marshal::NativeValue;
use grid_functions::config::NodeConfig;
use grid_functions::function::builder::PoolRegistry;
use grid_functions::function::handlers::{handle_execute_function, handle_list_functions};
use grid_functions::function::protocol::{ENDPOINT_EXECUTE_FUNCTION, ENDPOINT_LIST_FUNCTIONS};
use grid_functions::function::service::FunctionService;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match NodeConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", NodeConfig::USAGE);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!(
        "Starting node on {} with {} simulated member(s)",
        config.bind_addr,
        config.members
    );

    // 1. Cluster with the built-in functions:
    let cluster = LocalCluster::new(config.members);
    register_builtin_functions(&cluster);
    cluster.add_region("exampleRegion");

    // 2. Connection pools:
    let pools = Arc::new(PoolRegistry::new());
    for pool in &config.pools {
        pools.register_pool(pool);
    }
    if let Some(default_pool) = &config.default_pool {
        pools.set_default_pool(default_pool)?;
    }

    // 3. Function service:
    let service = FunctionService::new(cluster.clone(), pools, config.executor.clone());

    // 4. HTTP Router:
    let app = Router::new()
        .route(ENDPOINT_EXECUTE_FUNCTION, post(handle_execute_function))
        .route(ENDPOINT_LIST_FUNCTIONS, get(handle_list_functions))
        .layer(Extension(service))
        .layer(Extension(cluster));

    // 5. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn register_builtin_functions(cluster: &LocalCluster) {
    // Sums an array of integers; every member returns the same total.
    cluster.register("sumAll", |ctx: FunctionContext| {
        let Some(NativeValue::Vector(items)) = ctx.arguments else {
            return Err(GridException::new(
                "IllegalArgumentException",
                "sumAll expects an array of integers",
            ));
        };
        let mut total = 0i64;
        for item in &items {
            let value = item.as_i64().ok_or_else(|| {
                GridException::new("IllegalArgumentException", "sumAll expects integers only")
            })?;
            total = total.checked_add(value).ok_or_else(|| {
                GridException::new("ArithmeticException", "sumAll overflowed")
            })?;
        }
        Ok(vec![NativeValue::Int64(total)])
    });

    // Each member answers with its own id.
    cluster.register("broadcast", |ctx: FunctionContext| {
        Ok(vec![NativeValue::String(ctx.member.0)])
    });

    cluster.register("echo", |ctx: FunctionContext| {
        Ok(vec![ctx.arguments.unwrap_or(NativeValue::Null)])
    });

    // Returns the filter keys routed to each member.
    cluster.register("ownedKeys", |ctx: FunctionContext| Ok(ctx.filter));
}
