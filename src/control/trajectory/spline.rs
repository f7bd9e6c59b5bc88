//! Spline capability used by the chain builder

use crate::common::Waypoint;
use std::fmt::Debug;

/// Position, velocity and acceleration of all joints at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryState {
    pub position: Waypoint,
    pub velocity: Waypoint,
    pub acceleration: Waypoint,
}

impl BoundaryState {
    /// A state at rest at `position`
    pub fn at_rest(position: Waypoint) -> Self {
        let n = position.len();
        BoundaryState {
            position,
            velocity: Waypoint::zeros(n),
            acceleration: Waypoint::zeros(n),
        }
    }

    /// Evaluate a spline at time `t`
    pub fn of(spline: &dyn Spline, t: f64) -> Self {
        BoundaryState {
            position: spline.position(t),
            velocity: spline.velocity(t),
            acceleration: spline.acceleration(t),
        }
    }
}

/// A time-parameterized segment from a fixed start state to a target waypoint
pub trait Spline: Debug + Send + Sync {
    /// Solve the segment towards `target`, returning whether a feasible one exists
    fn compute(&mut self, target: &Waypoint) -> bool;

    fn position(&self, t: f64) -> Waypoint;

    fn velocity(&self, t: f64) -> Waypoint;

    fn acceleration(&self, t: f64) -> Waypoint;

    /// Natural duration of the segment, valid after a successful `compute`
    fn time_final(&self) -> f64;
}

/// Creates unsolved splines anchored at a start state
pub trait SplineFactory: Send + Sync {
    fn create(&self, start: BoundaryState) -> Box<dyn Spline>;
}
