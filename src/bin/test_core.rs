use anyhow::{Context, Result};
use manipulator_core::config::CoreConfig;
use manipulator_core::control::TrajectoryStack;
use manipulator_core::sink::MemorySink;
use manipulator_core::ManipulatorCore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Initializing Manipulator Core...");

    let mut config = CoreConfig::default();
    config.node.print_trajectory = true;

    let mut core = ManipulatorCore::new();
    core.register(TrajectoryStack::new(config));
    core.init().context("failed to initialize core")?;
    tracing::info!("Core initialized successfully!");

    let stack = core
        .trajectory_stack_mut()
        .context("trajectory stack is not registered")?;
    let path = stack.demo_path();
    tracing::info!("Smoothing path with {} waypoints", path.len());

    let mut sink = MemorySink::new();
    let status = stack.plan_and_publish(&path, &mut sink)?;
    tracing::info!("Publish status: {:?}", status);

    if let Some(msg) = sink.last() {
        if let Some(last) = msg.points.last() {
            tracing::info!(
                "Trajectory lasts {:.3} s over {} points",
                last.time_from_start.as_secs_f64(),
                msg.points.len()
            );
        }
    }

    core.shutdown().context("failed to shut down core")?;
    tracing::info!("Core shutdown successfully!");
    Ok(())
}
