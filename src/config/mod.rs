//! # Trajectory Configuration
//!
//! Configuration for the trajectory planner, the robot limits and the periodic
//! planning node, loaded from a single TOML file.
//!
//! ```toml
//! [planner]
//! max_edge_length = 0.1
//! trajectory_max_time_step = 0.1
//!
//! [robot]
//! num_dofs = 6
//! max_velocity = 3.0
//! max_acceleration = [10.0, 10.0, 10.0, 20.0, 20.0, 20.0]
//!
//! [node]
//! period_ms = 1000
//! time_delay = 0.5
//! demo_path = [[0, 0, 0, 0, 0, 0], [1, 0.5, 0, 0, 0, 0]]
//! ```
//!
//! Every value may be omitted. Missing planner values fall back to their
//! defaults with a warning.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const DEFAULT_MAX_EDGE_LENGTH: f64 = 0.1;
pub const DEFAULT_TRAJECTORY_MAX_TIME_STEP: f64 = 0.1;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

impl CoreConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Raw `[planner]` section, as written in the file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlannerConfig {
    pub max_edge_length: Option<f64>,
    pub trajectory_max_time_step: Option<f64>,
}

/// Validated planner parameters, both strictly positive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    pub max_edge_length: f64,
    pub trajectory_max_time_step: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        PlannerSettings {
            max_edge_length: DEFAULT_MAX_EDGE_LENGTH,
            trajectory_max_time_step: DEFAULT_TRAJECTORY_MAX_TIME_STEP,
        }
    }
}

impl PlannerConfig {
    /// Resolve missing or non-positive values to their defaults.
    pub fn resolve(&self) -> PlannerSettings {
        PlannerSettings {
            max_edge_length: positive_or_default(
                "max_edge_length",
                self.max_edge_length,
                DEFAULT_MAX_EDGE_LENGTH,
            ),
            trajectory_max_time_step: positive_or_default(
                "trajectory_max_time_step",
                self.trajectory_max_time_step,
                DEFAULT_TRAJECTORY_MAX_TIME_STEP,
            ),
        }
    }
}

fn positive_or_default(name: &str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 && v.is_finite() => v,
        Some(v) => {
            warn!("Planner parameter `{}` must be positive (got {}), using default value of {}", name, v, default);
            default
        }
        None => {
            warn!("Planner parameter `{}` is not defined! Using default value of {}", name, default);
            default
        }
    }
}

/// A joint limit given either once for all joints or per joint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum JointLimit {
    Uniform(f64),
    PerJoint(Vec<f64>),
}

impl JointLimit {
    /// Expand to one value per joint, `None` if the per-joint list has the wrong length
    pub fn expand(&self, num_dofs: usize) -> Option<Vec<f64>> {
        match self {
            JointLimit::Uniform(v) => Some(vec![*v; num_dofs]),
            JointLimit::PerJoint(values) if values.len() == num_dofs => Some(values.clone()),
            JointLimit::PerJoint(_) => None,
        }
    }
}

/// `[robot]` section: DOF count and joint limits
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RobotConfig {
    pub num_dofs: usize,
    pub joint_names: Option<Vec<String>>,
    pub position_min: JointLimit,
    pub position_max: JointLimit,
    pub max_velocity: JointLimit,
    pub max_acceleration: JointLimit,
    pub max_jerk: JointLimit,
    /// Longest duration a single spline segment may take (s)
    pub max_segment_time: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            num_dofs: 6,
            joint_names: None,
            position_min: JointLimit::Uniform(-2.0 * std::f64::consts::PI),
            position_max: JointLimit::Uniform(2.0 * std::f64::consts::PI),
            max_velocity: JointLimit::Uniform(3.0),
            max_acceleration: JointLimit::Uniform(10.0),
            max_jerk: JointLimit::Uniform(100.0),
            max_segment_time: 10.0,
        }
    }
}

/// `[node]` section: periodic planning loop parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    pub period_ms: u64,
    /// Delay in seconds stamped on every published trajectory
    pub time_delay: f64,
    pub print_trajectory: bool,
    pub demo_path: Vec<Vec<f64>>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            period_ms: 1000,
            time_delay: 0.0,
            print_trajectory: false,
            demo_path: vec![
                vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                vec![0.5, -0.3, 0.2, 0.0, 0.4, 0.0],
                vec![1.0, 0.0, 0.5, -0.2, 0.0, 0.3],
            ],
        }
    }
}
