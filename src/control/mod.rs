//! Control module for the manipulator
pub mod trajectory;

use self::trajectory::{PublishStatus, Trajectory};
use crate::common::Waypoint;
use crate::config::CoreConfig;
use crate::error::{Result, TrajectoryError};
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use crate::robot::{JointLimitsRobot, RobotModel};
use crate::sink::TrajectorySink;
use std::any::Any;
use std::sync::Arc;

/// Trajectory stack: owns the trajectory buffer between planning cycles
pub struct TrajectoryStack {
    base: LifecycleNodeBase,
    config: CoreConfig,
    trajectory: Option<Trajectory>,
}

impl TrajectoryStack {
    /// Create a new, unconfigured trajectory stack
    pub fn new(config: CoreConfig) -> Self {
        TrajectoryStack {
            base: LifecycleNodeBase::new("trajectory_stack"),
            config,
            trajectory: None,
        }
    }

    pub fn state(&self) -> State {
        self.base.get_state()
    }

    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }

    /// The path configured for the periodic node
    pub fn demo_path(&self) -> Vec<Waypoint> {
        self.config
            .node
            .demo_path
            .iter()
            .map(|q| Waypoint::from_row_slice(q))
            .collect()
    }

    /// Run one planning cycle: clear, smooth `path` and publish the result
    pub fn plan_and_publish(
        &mut self,
        path: &[Waypoint],
        sink: &mut dyn TrajectorySink,
    ) -> Result<PublishStatus> {
        if !self.base.is_active() {
            return Err(TrajectoryError::Lifecycle(format!(
                "{} is not active",
                self.base.name
            )));
        }
        let trajectory = self.trajectory.as_mut().ok_or_else(|| {
            TrajectoryError::Lifecycle("trajectory stack is not configured".to_string())
        })?;

        trajectory.clear();
        trajectory.add_path(path)?;
        trajectory.publish(sink, self.config.node.time_delay, self.config.node.print_trajectory)
    }
}

impl LifecycleNode for TrajectoryStack {
    fn on_configure(&mut self) -> Result<()> {
        let robot: Arc<dyn RobotModel> = Arc::new(JointLimitsRobot::from_config(&self.config.robot)?);
        let settings = self.config.planner.resolve();
        self.trajectory = Some(Trajectory::new(settings, robot)?);
        self.base.transition(State::Inactive)
    }

    fn on_activate(&mut self) -> Result<()> {
        self.base.transition(State::Active)
    }

    fn on_deactivate(&mut self) -> Result<()> {
        if let Some(trajectory) = self.trajectory.as_mut() {
            trajectory.clear();
        }
        self.base.transition(State::Inactive)
    }

    fn on_cleanup(&mut self) -> Result<()> {
        self.base.transition(State::Unconfigured)?;
        self.trajectory = None;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
