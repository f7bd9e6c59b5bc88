//! Geometric subdivision of a path by a maximal edge length

use crate::common::types::distance;
use crate::common::{PathState, StateStatus, Waypoint};
use crate::error::{Result, TrajectoryError};

/// Subdivide `path` so that consecutive states are at most `max_edge_length` apart.
///
/// The first waypoint is copied with status `None`. Every inserted intermediate
/// point is `Advanced`, and every input waypoint after the first is reproduced
/// exactly with status `Reached`.
pub fn preprocess_path(path: &[Waypoint], max_edge_length: f64) -> Result<Vec<PathState>> {
    if !(max_edge_length > 0.0) {
        return Err(TrajectoryError::InvalidParameter {
            name: "max_edge_length",
            reason: format!("must be positive, got {}", max_edge_length),
        });
    }
    let first = path.first().ok_or(TrajectoryError::EmptyPath)?;
    check_dimensions(path, first.len())?;

    let mut refined = vec![PathState::new(first.clone(), StateStatus::None)];
    for pair in path.windows(2) {
        let target = &pair[1];
        let mut current = pair[0].clone();
        loop {
            let dist = distance(&current, target);
            if max_edge_length < dist {
                current += (target - &current) * (max_edge_length / dist);
                refined.push(PathState::new(current.clone(), StateStatus::Advanced));
            } else {
                refined.push(PathState::new(target.clone(), StateStatus::Reached));
                break;
            }
        }
    }
    Ok(refined)
}

/// Check that every waypoint has `expected` finite components
pub fn check_dimensions(path: &[Waypoint], expected: usize) -> Result<()> {
    if let Some(index) = path.iter().position(|q| q.len() != expected) {
        return Err(TrajectoryError::DimensionMismatch {
            index,
            expected,
            found: path[index].len(),
        });
    }
    match path.iter().position(|q| q.iter().any(|x| !x.is_finite())) {
        Some(index) => Err(TrajectoryError::InvalidParameter {
            name: "path",
            reason: format!("waypoint {} has a non-finite component", index),
        }),
        None => Ok(()),
    }
}
