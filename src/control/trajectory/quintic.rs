//! Fifth-order polynomial spline between a moving start state and a target at rest

use super::spline::{BoundaryState, Spline, SplineFactory};
use crate::common::Waypoint;
use crate::robot::RobotModel;
use std::sync::Arc;

/// Shortest duration a segment is allowed to have
const MIN_DURATION: f64 = 1e-3;
/// Growth factor of the duration search
const DURATION_GROWTH: f64 = 1.5;
/// Bisection steps refining the duration once a feasible one is bracketed
const REFINE_STEPS: usize = 12;
/// Intervals in the dense limit check over [0, T]
const CHECK_INTERVALS: usize = 64;
const LIMIT_TOLERANCE: f64 = 1e-9;

// Peak |v|, |a| and |j| of a rest-to-rest quintic over distance h in time T are
// 15/8 h/T, 10/sqrt(3) h/T^2 and 60 h/T^3.
const PEAK_VELOCITY_FACTOR: f64 = 1.875;
const PEAK_ACCELERATION_FACTOR: f64 = 5.773_502_691_896_258;
const PEAK_JERK_FACTOR: f64 = 60.0;

/// Quintic spline whose duration is the shortest one respecting the robot limits
#[derive(Debug, Clone)]
pub struct QuinticSpline {
    robot: Arc<dyn RobotModel>,
    start: BoundaryState,
    /// Polynomial coefficients, `coeffs[k]` multiplies t^k
    coeffs: [Waypoint; 6],
    time_final: f64,
}

impl QuinticSpline {
    pub fn new(robot: Arc<dyn RobotModel>, start: BoundaryState) -> Self {
        let n = start.position.len();
        let coeffs = [
            start.position.clone(),
            start.velocity.clone(),
            &start.acceleration * 0.5,
            Waypoint::zeros(n),
            Waypoint::zeros(n),
            Waypoint::zeros(n),
        ];
        QuinticSpline {
            robot,
            start,
            coeffs,
            time_final: 0.0,
        }
    }

    pub fn start(&self) -> &BoundaryState {
        &self.start
    }

    fn coefficients(&self, target: &Waypoint, duration: f64) -> [Waypoint; 6] {
        let q0 = &self.start.position;
        let v0 = &self.start.velocity;
        let a0 = &self.start.acceleration;
        let t = duration;
        let (t2, t3, t4, t5) = (t * t, t * t * t, t * t * t * t, t * t * t * t * t);
        let h = target - q0;

        let c3 = (&h * 20.0 - v0 * (12.0 * t) - a0 * (3.0 * t2)) / (2.0 * t3);
        let c4 = (&h * -30.0 + v0 * (16.0 * t) + a0 * (3.0 * t2)) / (2.0 * t4);
        let c5 = (&h * 12.0 - v0 * (6.0 * t) - a0 * t2) / (2.0 * t5);

        [q0.clone(), v0.clone(), a0 * 0.5, c3, c4, c5]
    }

    /// Duration below which the rest-to-rest profile would already break a limit
    fn duration_lower_bound(&self, target: &Waypoint) -> f64 {
        let robot = &self.robot;
        (0..target.len())
            .map(|j| {
                let h = (target[j] - self.start.position[j]).abs();
                let by_velocity = PEAK_VELOCITY_FACTOR * h / robot.max_velocity(j);
                let by_acceleration = (PEAK_ACCELERATION_FACTOR * h / robot.max_acceleration(j)).sqrt();
                let by_jerk = (PEAK_JERK_FACTOR * h / robot.max_jerk(j)).cbrt();
                by_velocity.max(by_acceleration).max(by_jerk)
            })
            .fold(MIN_DURATION, f64::max)
    }

    fn respects_limits(&self, coeffs: &[Waypoint; 6], duration: f64) -> bool {
        let robot = &self.robot;
        for k in 0..=CHECK_INTERVALS {
            let t = duration * k as f64 / CHECK_INTERVALS as f64;
            for j in 0..coeffs[0].len() {
                let c = |i: usize| coeffs[i][j];
                let q = c(0) + t * (c(1) + t * (c(2) + t * (c(3) + t * (c(4) + t * c(5)))));
                let v = c(1) + t * (2.0 * c(2) + t * (3.0 * c(3) + t * (4.0 * c(4) + t * 5.0 * c(5))));
                let a = 2.0 * c(2) + t * (6.0 * c(3) + t * (12.0 * c(4) + t * 20.0 * c(5)));
                let jerk = 6.0 * c(3) + t * (24.0 * c(4) + t * 60.0 * c(5));

                let (q_min, q_max) = robot.position_limits(j);
                // NaN must fail this check
                let within = q >= q_min - LIMIT_TOLERANCE
                    && q <= q_max + LIMIT_TOLERANCE
                    && v.abs() <= robot.max_velocity(j) * (1.0 + LIMIT_TOLERANCE)
                    && a.abs() <= robot.max_acceleration(j) * (1.0 + LIMIT_TOLERANCE)
                    && jerk.abs() <= robot.max_jerk(j) * (1.0 + LIMIT_TOLERANCE);
                if !within {
                    return false;
                }
            }
        }
        true
    }

    fn is_feasible(&self, target: &Waypoint, duration: f64) -> bool {
        self.respects_limits(&self.coefficients(target, duration), duration)
    }

    fn clamp_time(&self, t: f64) -> f64 {
        t.clamp(0.0, self.time_final)
    }
}

impl Spline for QuinticSpline {
    fn compute(&mut self, target: &Waypoint) -> bool {
        if target.len() != self.start.position.len()
            || target.len() != self.robot.num_dofs()
            || target.iter().any(|x| !x.is_finite())
        {
            return false;
        }
        let max_time = self.robot.max_segment_time();

        let mut feasible = self.duration_lower_bound(target);
        let mut infeasible = None;
        if feasible > max_time {
            return false;
        }
        while !self.is_feasible(target, feasible) {
            if feasible >= max_time {
                return false;
            }
            infeasible = Some(feasible);
            feasible = (feasible * DURATION_GROWTH).min(max_time);
        }

        if let Some(mut lower) = infeasible {
            for _ in 0..REFINE_STEPS {
                let mid = 0.5 * (lower + feasible);
                if self.is_feasible(target, mid) {
                    feasible = mid;
                } else {
                    lower = mid;
                }
            }
        }

        self.coeffs = self.coefficients(target, feasible);
        self.time_final = feasible;
        true
    }

    fn position(&self, t: f64) -> Waypoint {
        let t = self.clamp_time(t);
        let c = &self.coeffs;
        &c[0] + (&c[1] + (&c[2] + (&c[3] + (&c[4] + &c[5] * t) * t) * t) * t) * t
    }

    fn velocity(&self, t: f64) -> Waypoint {
        let t = self.clamp_time(t);
        let c = &self.coeffs;
        &c[1] + (&c[2] * 2.0 + (&c[3] * 3.0 + (&c[4] * 4.0 + &c[5] * (5.0 * t)) * t) * t) * t
    }

    fn acceleration(&self, t: f64) -> Waypoint {
        let t = self.clamp_time(t);
        let c = &self.coeffs;
        &c[2] * 2.0 + (&c[3] * 6.0 + (&c[4] * 12.0 + &c[5] * (20.0 * t)) * t) * t
    }

    fn time_final(&self) -> f64 {
        self.time_final
    }
}

/// Creates [`QuinticSpline`]s for one robot
#[derive(Debug, Clone)]
pub struct QuinticSplineFactory {
    robot: Arc<dyn RobotModel>,
}

impl QuinticSplineFactory {
    pub fn new(robot: Arc<dyn RobotModel>) -> Self {
        QuinticSplineFactory { robot }
    }
}

impl SplineFactory for QuinticSplineFactory {
    fn create(&self, start: BoundaryState) -> Box<dyn Spline> {
        Box::new(QuinticSpline::new(Arc::clone(&self.robot), start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RobotConfig;
    use crate::robot::JointLimitsRobot;
    use approx::assert_abs_diff_eq;

    fn robot() -> Arc<dyn RobotModel> {
        Arc::new(JointLimitsRobot::from_config(&RobotConfig::default()).unwrap())
    }

    fn target() -> Waypoint {
        Waypoint::from_vec(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn test_rest_to_rest_boundary_conditions() {
        let mut spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        assert!(spline.compute(&target()));

        let t_final = spline.time_final();
        assert!(t_final > 0.0);
        assert_abs_diff_eq!(spline.position(0.0), Waypoint::zeros(6), epsilon = 1e-12);
        assert_abs_diff_eq!(spline.position(t_final), target(), epsilon = 1e-9);
        assert_abs_diff_eq!(spline.velocity(t_final), Waypoint::zeros(6), epsilon = 1e-9);
        assert_abs_diff_eq!(spline.acceleration(t_final), Waypoint::zeros(6), epsilon = 1e-9);
    }

    #[test]
    fn test_moving_start_is_honoured() {
        let start = BoundaryState {
            position: Waypoint::zeros(6),
            velocity: Waypoint::from_element(6, 0.2),
            acceleration: Waypoint::from_element(6, -0.5),
        };
        let mut spline = QuinticSpline::new(robot(), start.clone());
        assert!(spline.compute(&Waypoint::from_element(6, 0.3)));

        assert_abs_diff_eq!(spline.velocity(0.0), start.velocity, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.acceleration(0.0), start.acceleration, epsilon = 1e-12);
        let t_final = spline.time_final();
        assert_abs_diff_eq!(spline.position(t_final), Waypoint::from_element(6, 0.3), epsilon = 1e-9);
    }

    #[test]
    fn test_duration_respects_velocity_limit() {
        let mut spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        assert!(spline.compute(&target()));
        let peak = (0..=200)
            .map(|k| spline.velocity(spline.time_final() * k as f64 / 200.0)[0].abs())
            .fold(0.0, f64::max);
        assert!(peak <= 3.0 + 1e-6);
    }

    #[test]
    fn test_unreachable_target_is_infeasible() {
        let mut spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        assert!(!spline.compute(&Waypoint::from_element(6, 100.0)));
    }

    #[test]
    fn test_dimension_mismatch_is_infeasible() {
        let mut spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        assert!(!spline.compute(&Waypoint::zeros(3)));
    }

    #[test]
    fn test_non_finite_target_is_infeasible() {
        let mut spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        let mut bad = target();
        bad[0] = f64::NAN;
        assert!(!spline.compute(&bad));
        bad[0] = f64::INFINITY;
        assert!(!spline.compute(&bad));
    }

    #[test]
    fn test_nan_coefficients_violate_limits() {
        let spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        let mut coeffs = spline.coefficients(&target(), 2.0);
        assert!(spline.respects_limits(&coeffs, 2.0));

        coeffs[3][0] = f64::NAN;
        assert!(!spline.respects_limits(&coeffs, 2.0));
    }

    #[test]
    fn test_evaluation_is_clamped_to_duration() {
        let mut spline = QuinticSpline::new(robot(), BoundaryState::at_rest(Waypoint::zeros(6)));
        assert!(spline.compute(&target()));
        assert_eq!(spline.position(spline.time_final() + 5.0), spline.position(spline.time_final()));
        assert_eq!(spline.position(-1.0), spline.position(0.0));
    }
}
