//! Trajectory generation module
//!
//! Turns a coarse joint-space path into a sampled trajectory of chained quintic
//! splines: [`preprocess`] subdivides the path, [`chain`] stitches splines through
//! the refined waypoints and [`sampler`] discretizes each segment. [`Trajectory`]
//! owns the resulting points and hands them to a [`TrajectorySink`].
pub mod chain;
pub mod preprocess;
pub mod quintic;
pub mod sampler;
pub mod spline;

use self::chain::SplineChainBuilder;
use self::preprocess::{check_dimensions, preprocess_path};
use self::quintic::QuinticSplineFactory;
use self::sampler::sample_segment;
use self::spline::SplineFactory;
use crate::common::Waypoint;
use crate::config::{PlannerConfig, PlannerSettings};
use crate::error::{Result, TrajectoryError};
use crate::msg::{Header, JointTrajectory, JointTrajectoryPoint, TimeStamp};
use crate::robot::{RobotModel, SUPPORTED_DOFS};
use crate::sink::TrajectorySink;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A sampled trajectory point at an absolute time
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub position: Waypoint,
    pub velocity: Waypoint,
    pub acceleration: Waypoint,
}

impl TrajectoryPoint {
    fn to_msg(&self) -> JointTrajectoryPoint {
        JointTrajectoryPoint {
            positions: self.position.iter().copied().collect(),
            velocities: self.velocity.iter().copied().collect(),
            accelerations: self.acceleration.iter().copied().collect(),
            time_from_start: TimeStamp::from_secs_f64(self.time),
        }
    }
}

/// Result of a publish request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Published { points: usize },
    /// Nothing to publish, the sink was not called
    Empty,
}

/// Ordered trajectory buffer with smoothing import and sink export
pub struct Trajectory {
    settings: PlannerSettings,
    robot: Arc<dyn RobotModel>,
    spline_factory: Box<dyn SplineFactory>,
    joint_names: Vec<String>,
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Create an empty trajectory using quintic splines for `robot`
    pub fn new(settings: PlannerSettings, robot: Arc<dyn RobotModel>) -> Result<Self> {
        let factory = QuinticSplineFactory::new(Arc::clone(&robot));
        Self::with_spline_factory(settings, robot, Box::new(factory))
    }

    /// Create an empty trajectory with a custom spline implementation
    pub fn with_spline_factory(
        settings: PlannerSettings,
        robot: Arc<dyn RobotModel>,
        spline_factory: Box<dyn SplineFactory>,
    ) -> Result<Self> {
        let num_dofs = robot.num_dofs();
        if num_dofs != SUPPORTED_DOFS {
            error!("Such number of robot DOFs ({}) is not supported!", num_dofs);
            return Err(TrajectoryError::UnsupportedDof(num_dofs));
        }

        // Re-resolve so hand-built settings get the same positivity guarantee
        let settings = PlannerConfig {
            max_edge_length: Some(settings.max_edge_length),
            trajectory_max_time_step: Some(settings.trajectory_max_time_step),
        }
        .resolve();

        Ok(Trajectory {
            settings,
            joint_names: robot.joint_names(),
            robot,
            spline_factory,
            points: Vec::new(),
        })
    }

    pub fn settings(&self) -> PlannerSettings {
        self.settings
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Time of the last point, zero for an empty trajectory
    pub fn end_time(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.time)
    }

    /// Append a point; missing velocity or acceleration is zero
    pub fn add_point(
        &mut self,
        time: f64,
        position: Waypoint,
        velocity: Option<Waypoint>,
        acceleration: Option<Waypoint>,
    ) {
        let n = position.len();
        self.points.push(TrajectoryPoint {
            time,
            velocity: velocity.unwrap_or_else(|| Waypoint::zeros(n)),
            acceleration: acceleration.unwrap_or_else(|| Waypoint::zeros(n)),
            position,
        });
    }

    /// Append raw waypoints at the given absolute times, without smoothing
    pub fn add_path_with_times(&mut self, path: &[Waypoint], times: &[f64]) -> Result<()> {
        if path.len() != times.len() {
            return Err(TrajectoryError::LengthMismatch {
                path: path.len(),
                times: times.len(),
            });
        }
        for (q, &t) in path.iter().zip(times) {
            self.add_point(t, q.clone(), None, None);
        }
        Ok(())
    }

    /// Append a smoothed trajectory through `path`.
    ///
    /// The path is subdivided, chained into quintic segments and sampled with the
    /// configured time step. Sampling starts at the current end time. The first
    /// waypoint is emitted at rest only when the trajectory is empty. On error the
    /// trajectory is left unchanged.
    pub fn add_path(&mut self, path: &[Waypoint]) -> Result<()> {
        let first = path.first().ok_or(TrajectoryError::EmptyPath)?;
        check_dimensions(path, self.robot.num_dofs())?;

        let refined: Vec<Waypoint> = preprocess_path(path, self.settings.max_edge_length)?
            .into_iter()
            .map(|state| state.coord)
            .collect();

        let start_time = self.end_time();
        let mut new_points = Vec::new();
        if self.points.is_empty() {
            let n = first.len();
            new_points.push(TrajectoryPoint {
                time: start_time,
                position: first.clone(),
                velocity: Waypoint::zeros(n),
                acceleration: Waypoint::zeros(n),
            });
        }

        if refined.len() >= 2 {
            let chain = SplineChainBuilder::new(self.spline_factory.as_ref()).build(&refined)?;
            let step = self.settings.trajectory_max_time_step;
            let mut offset = start_time;
            for segment in &chain.segments {
                new_points.extend(sample_segment(segment.spline.as_ref(), offset, segment.duration, step));
                offset += segment.duration;
            }
            info!(
                "Smoothed {} waypoints into {} segments lasting {:.3} s",
                refined.len(),
                chain.segments.len(),
                chain.duration()
            );
        }

        self.points.extend(new_points);
        Ok(())
    }

    /// Remove all points
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Build the message published for a given delay
    pub fn to_msg(&self, time_delay: f64) -> JointTrajectory {
        JointTrajectory {
            header: Header {
                stamp: TimeStamp::from_secs_f64(time_delay),
                frame_id: String::new(),
            },
            joint_names: self.joint_names.clone(),
            points: self.points.iter().map(TrajectoryPoint::to_msg).collect(),
        }
    }

    /// Publish the trajectory, delayed by `time_delay` seconds.
    ///
    /// An empty trajectory is not published and only logs a warning.
    pub fn publish(
        &self,
        sink: &mut dyn TrajectorySink,
        time_delay: f64,
        print: bool,
    ) -> Result<PublishStatus> {
        if !(time_delay >= 0.0) {
            return Err(TrajectoryError::InvalidParameter {
                name: "time_delay",
                reason: format!("must be non-negative, got {}", time_delay),
            });
        }
        if self.points.is_empty() {
            warn!("There are no trajectory points to be published!");
            return Ok(PublishStatus::Empty);
        }

        sink.publish(&self.to_msg(time_delay))?;
        if print {
            self.dump(time_delay);
        }
        info!("Publishing trajectory with {} points", self.points.len());
        Ok(PublishStatus::Published {
            points: self.points.len(),
        })
    }

    /// Log every point. Returns false when the layout is not the 6-DOF one.
    pub fn dump(&self, time_delay: f64) -> bool {
        let layout_ok = self.points.first().map_or(false, |p| p.position.len() == SUPPORTED_DOFS)
            && self.points.iter().all(|p| {
                p.position.len() == SUPPORTED_DOFS
                    && p.velocity.len() == SUPPORTED_DOFS
                    && p.acceleration.len() == SUPPORTED_DOFS
            });
        if !layout_ok {
            warn!("Cannot print trajectory!");
            return false;
        }

        info!("Trajectory points: ");
        for (i, p) in self.points.iter().enumerate() {
            info!("Num. {}.\t Time: {:.6} [s]", i, p.time + time_delay);
            info!("\t Position:     {}", format_joints(&p.position));
            info!("\t Velocity:     {}", format_joints(&p.velocity));
            info!("\t Acceleration: {}", format_joints(&p.acceleration));
        }
        true
    }
}

fn format_joints(values: &Waypoint) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
    format!("({})", parts.join(", "))
}
