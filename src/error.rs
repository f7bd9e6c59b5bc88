//! Error types for trajectory generation.

use thiserror::Error;

/// Errors raised while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors raised by trajectory sinks.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sink is closed")]
    Closed,
}

/// Errors that can occur while building, sampling or publishing a trajectory.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// Only the 6-DOF profile is supported.
    #[error("robot with {0} DOFs is not supported")]
    UnsupportedDof(usize),

    #[error("path contains no waypoints")]
    EmptyPath,

    /// A waypoint does not have one component per joint.
    #[error("waypoint {index} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("path has {path} waypoints but {times} time instances")]
    LengthMismatch { path: usize, times: usize },

    /// The first spline of a chain could not be computed. The limits in the
    /// robot configuration do not admit even a short rest-to-rest move.
    #[error("initial spline towards waypoint {target_index} is infeasible")]
    BootstrapInfeasible { target_index: usize },

    /// The hand-off search ran out of iterations without a feasible continuation.
    #[error("no feasible hand-off towards waypoint {target_index} after {evaluations} evaluations")]
    PlanningInfeasible {
        target_index: usize,
        evaluations: usize,
    },

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("lifecycle error: {0}")]
    Lifecycle(String),
}

pub type Result<T> = std::result::Result<T, TrajectoryError>;
