//! Common utilities and types for the manipulator

/// Common types and utilities used across the codebase
pub mod types {
    use nalgebra::DVector;

    /// A configuration-space point, one component per joint
    pub type Waypoint = DVector<f64>;

    /// How a path state was produced during subdivision
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum StateStatus {
        None,
        Advanced,
        Reached,
    }

    /// A waypoint tagged with its subdivision status
    #[derive(Debug, Clone, PartialEq)]
    pub struct PathState {
        pub coord: Waypoint,
        pub status: StateStatus,
    }

    impl PathState {
        pub fn new(coord: Waypoint, status: StateStatus) -> Self {
            PathState { coord, status }
        }
    }

    /// Euclidean distance between two configurations
    pub fn distance(a: &Waypoint, b: &Waypoint) -> f64 {
        (a - b).norm()
    }
}

pub use types::{PathState, StateStatus, Waypoint};
