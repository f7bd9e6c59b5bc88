use anyhow::{Context, Result};
use manipulator_core::config::CoreConfig;
use manipulator_core::control::TrajectoryStack;
use manipulator_core::lifecycle::LifecycleNode;
use manipulator_core::sink::JsonLinesSink;
use std::env;
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/trajectory_params.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Initializing Trajectory Node...");

    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_CONFIG_PATH);

    let config = if Path::new(config_path).exists() {
        tracing::info!("Loading configuration from: {}", config_path);
        CoreConfig::from_file(config_path)
            .with_context(|| format!("failed to load config from '{}'", config_path))?
    } else {
        tracing::warn!("Configuration file '{}' not found, using defaults", config_path);
        CoreConfig::default()
    };

    let period = Duration::from_millis(config.node.period_ms.max(1));
    let mut stack = TrajectoryStack::new(config);
    stack.on_configure()?;
    stack.on_activate()?;
    let path = stack.demo_path();

    // Trajectories go to stdout, logs to stderr
    let mut sink = JsonLinesSink::new(std::io::stdout());
    let mut timer = tokio::time::interval(period);

    tracing::info!("Trajectory Node initialized. Planning every {:?}", period);
    loop {
        tokio::select! {
            _ = timer.tick() => {
                if let Err(e) = stack.plan_and_publish(&path, &mut sink) {
                    tracing::error!("Planning cycle failed: {}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down Trajectory Node");
                break;
            }
        }
    }

    stack.on_deactivate()?;
    stack.on_cleanup()?;
    Ok(())
}
