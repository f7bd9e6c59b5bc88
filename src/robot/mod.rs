//! Robot model capability: DOF count, joint names and joint limits

use crate::config::RobotConfig;
use crate::error::{Result, TrajectoryError};
use std::fmt::Debug;

/// The only DOF layout the trajectory pipeline supports
pub const SUPPORTED_DOFS: usize = 6;

/// Trait for robot models consumed by the trajectory pipeline
pub trait RobotModel: Debug + Send + Sync {
    /// Number of independently controlled joints
    fn num_dofs(&self) -> usize;

    /// Joint names in controller order
    fn joint_names(&self) -> Vec<String>;

    /// Lower and upper position bound of a joint
    fn position_limits(&self, joint: usize) -> (f64, f64);

    fn max_velocity(&self, joint: usize) -> f64;

    fn max_acceleration(&self, joint: usize) -> f64;

    fn max_jerk(&self, joint: usize) -> f64;

    /// Longest duration a single spline segment may take
    fn max_segment_time(&self) -> f64;
}

/// Robot described purely by per-joint limits
#[derive(Debug, Clone)]
pub struct JointLimitsRobot {
    joint_names: Vec<String>,
    position_min: Vec<f64>,
    position_max: Vec<f64>,
    max_velocity: Vec<f64>,
    max_acceleration: Vec<f64>,
    max_jerk: Vec<f64>,
    max_segment_time: f64,
}

impl JointLimitsRobot {
    /// Build a robot from its configuration section
    pub fn from_config(config: &RobotConfig) -> Result<Self> {
        let n = config.num_dofs;
        let expand = |name: &'static str, limit: &crate::config::JointLimit| {
            limit.expand(n).ok_or_else(|| TrajectoryError::InvalidParameter {
                name,
                reason: format!("expected {} values", n),
            })
        };

        let joint_names = match &config.joint_names {
            Some(names) if names.len() == n => names.clone(),
            Some(names) => {
                return Err(TrajectoryError::InvalidParameter {
                    name: "joint_names",
                    reason: format!("expected {} names, got {}", n, names.len()),
                })
            }
            None => (1..=n).map(|i| format!("joint{}", i)).collect(),
        };

        let robot = JointLimitsRobot {
            joint_names,
            position_min: expand("position_min", &config.position_min)?,
            position_max: expand("position_max", &config.position_max)?,
            max_velocity: expand("max_velocity", &config.max_velocity)?,
            max_acceleration: expand("max_acceleration", &config.max_acceleration)?,
            max_jerk: expand("max_jerk", &config.max_jerk)?,
            max_segment_time: config.max_segment_time,
        };
        robot.validate()?;
        Ok(robot)
    }

    fn validate(&self) -> Result<()> {
        let positive = [
            ("max_velocity", &self.max_velocity),
            ("max_acceleration", &self.max_acceleration),
            ("max_jerk", &self.max_jerk),
        ];
        for (name, values) in positive {
            if values.iter().any(|v| !(*v > 0.0)) {
                return Err(TrajectoryError::InvalidParameter {
                    name,
                    reason: "limits must be positive".to_string(),
                });
            }
        }
        if self
            .position_min
            .iter()
            .zip(&self.position_max)
            .any(|(lo, hi)| lo >= hi)
        {
            return Err(TrajectoryError::InvalidParameter {
                name: "position_min",
                reason: "lower bound must be below upper bound".to_string(),
            });
        }
        if !(self.max_segment_time > 0.0) {
            return Err(TrajectoryError::InvalidParameter {
                name: "max_segment_time",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl RobotModel for JointLimitsRobot {
    fn num_dofs(&self) -> usize {
        self.joint_names.len()
    }

    fn joint_names(&self) -> Vec<String> {
        self.joint_names.clone()
    }

    fn position_limits(&self, joint: usize) -> (f64, f64) {
        (self.position_min[joint], self.position_max[joint])
    }

    fn max_velocity(&self, joint: usize) -> f64 {
        self.max_velocity[joint]
    }

    fn max_acceleration(&self, joint: usize) -> f64 {
        self.max_acceleration[joint]
    }

    fn max_jerk(&self, joint: usize) -> f64 {
        self.max_jerk[joint]
    }

    fn max_segment_time(&self) -> f64 {
        self.max_segment_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JointLimit;

    #[test]
    fn test_default_robot_has_six_named_joints() {
        let robot = JointLimitsRobot::from_config(&RobotConfig::default()).unwrap();
        assert_eq!(robot.num_dofs(), 6);
        assert_eq!(robot.joint_names()[0], "joint1");
        assert_eq!(robot.joint_names()[5], "joint6");
    }

    #[test]
    fn test_per_joint_limits() {
        let config = RobotConfig {
            max_velocity: JointLimit::PerJoint(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            ..RobotConfig::default()
        };
        let robot = JointLimitsRobot::from_config(&config).unwrap();
        assert_eq!(robot.max_velocity(3), 4.0);
    }

    #[test]
    fn test_rejects_wrong_limit_count() {
        let config = RobotConfig {
            max_jerk: JointLimit::PerJoint(vec![1.0, 2.0]),
            ..RobotConfig::default()
        };
        assert!(matches!(
            JointLimitsRobot::from_config(&config),
            Err(TrajectoryError::InvalidParameter { name: "max_jerk", .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_limits() {
        let config = RobotConfig {
            max_velocity: JointLimit::Uniform(0.0),
            ..RobotConfig::default()
        };
        assert!(JointLimitsRobot::from_config(&config).is_err());
    }
}
