//! Fixed-step sampling of a spline segment

use super::spline::Spline;
use super::TrajectoryPoint;

/// Relative slack absorbing rounding in `duration / max_time_step`
const STEP_COUNT_SLACK: f64 = 1e-9;

/// Sample `spline` over `[0, duration]` at `offset + k * max_time_step`, k = 1, 2, ...
///
/// The last sample is placed at exactly `offset + duration`. A zero duration
/// yields a single sample at `offset`.
///
/// The sample count is `ceil(duration / max_time_step)`, computed with a relative
/// slack of 1e-9 so that a duration which is a multiple of the step up to
/// rounding gets no extra sample. Within that slack the final gap may exceed
/// `max_time_step` by less than `1e-9 * max_time_step`.
pub fn sample_segment(
    spline: &dyn Spline,
    offset: f64,
    duration: f64,
    max_time_step: f64,
) -> Vec<TrajectoryPoint> {
    let steps = ((duration / max_time_step) - STEP_COUNT_SLACK).ceil().max(1.0) as usize;

    (1..=steps)
        .map(|k| {
            let t = if k == steps {
                duration
            } else {
                (k as f64 * max_time_step).min(duration)
            };
            TrajectoryPoint {
                time: offset + t,
                position: spline.position(t),
                velocity: spline.velocity(t),
                acceleration: spline.acceleration(t),
            }
        })
        .collect()
}
