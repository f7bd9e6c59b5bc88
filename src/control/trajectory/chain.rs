//! Chaining of feasible spline segments through a refined waypoint sequence
//!
//! The first segment runs from rest towards the third waypoint (or the second one
//! for two-point paths). For every further waypoint a hand-off time is searched
//! inside the current segment: the state of the current segment at that time
//! becomes the start of a trial segment towards the waypoint three positions
//! ahead. The search bisects towards later hand-off times and, after a fixed
//! number of failures, evaluates the end of the current segment once. If that
//! evaluation fails as well the path is rejected.

use super::spline::{BoundaryState, Spline, SplineFactory};
use crate::common::Waypoint;
use crate::error::{Result, TrajectoryError};
use tracing::debug;

/// Infeasible midpoints tolerated before the search jumps to the segment end
pub const MAX_HANDOFF_FAILURES: usize = 5;

/// A chained segment and the part of it that is actually executed
#[derive(Debug)]
pub struct ChainSegment {
    pub spline: Box<dyn Spline>,
    /// Hand-off time, or the natural duration for the last segment
    pub duration: f64,
}

/// Outcome of one hand-off search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handoff {
    /// Index of the waypoint the new segment targets
    pub target_index: usize,
    /// Accepted hand-off time within the previous segment
    pub time: f64,
    /// Feasibility evaluations spent, including the accepted one
    pub evaluations: usize,
    /// Whether the end-of-segment fallback produced the hand-off
    pub forced: bool,
}

/// Ordered spline segments with continuity at every hand-off
#[derive(Debug)]
pub struct SplineChain {
    pub segments: Vec<ChainSegment>,
    pub handoffs: Vec<Handoff>,
}

impl SplineChain {
    /// Sum of the executed durations of all segments
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}

/// Builds a [`SplineChain`] using splines from a [`SplineFactory`]
pub struct SplineChainBuilder<'a> {
    factory: &'a dyn SplineFactory,
    max_failures: usize,
}

impl<'a> SplineChainBuilder<'a> {
    pub fn new(factory: &'a dyn SplineFactory) -> Self {
        SplineChainBuilder {
            factory,
            max_failures: MAX_HANDOFF_FAILURES,
        }
    }

    /// Override the number of tolerated midpoint failures
    pub fn with_max_failures(mut self, max_failures: usize) -> Self {
        self.max_failures = max_failures;
        self
    }

    /// Build a chain starting at rest on `waypoints[0]`. Requires at least two waypoints.
    pub fn build(&self, waypoints: &[Waypoint]) -> Result<SplineChain> {
        if waypoints.len() < 2 {
            return Err(TrajectoryError::InvalidParameter {
                name: "waypoints",
                reason: format!("a spline chain needs at least 2 waypoints, got {}", waypoints.len()),
            });
        }

        let first_target = if waypoints.len() == 2 { 1 } else { 2 };
        let mut current = self
            .factory
            .create(BoundaryState::at_rest(waypoints[0].clone()));
        if !current.compute(&waypoints[first_target]) {
            return Err(TrajectoryError::BootstrapInfeasible {
                target_index: first_target,
            });
        }

        let mut segments = Vec::with_capacity(waypoints.len().saturating_sub(2));
        let mut handoffs = Vec::with_capacity(waypoints.len().saturating_sub(3));

        for target_index in 3..waypoints.len() {
            let (handoff, next) = self.search_handoff(current.as_ref(), &waypoints[target_index], target_index)?;
            debug!(
                "Hand-off towards waypoint {} at t = {:.4} s after {} evaluations{}",
                target_index,
                handoff.time,
                handoff.evaluations,
                if handoff.forced { " (forced)" } else { "" }
            );
            segments.push(ChainSegment {
                spline: current,
                duration: handoff.time,
            });
            handoffs.push(handoff);
            current = next;
        }

        let duration = current.time_final();
        segments.push(ChainSegment {
            spline: current,
            duration,
        });

        Ok(SplineChain { segments, handoffs })
    }

    /// Bisect for a hand-off time in `current` from which `target` is reachable.
    ///
    /// At most `max_failures + 1` evaluations are made; the last one is always at
    /// the end of `current`.
    fn search_handoff(
        &self,
        current: &dyn Spline,
        target: &Waypoint,
        target_index: usize,
    ) -> Result<(Handoff, Box<dyn Spline>)> {
        let mut t_min = 0.0;
        let t_max = current.time_final();
        let mut failures = 0;

        for evaluation in 1..=self.max_failures + 1 {
            let t = if failures >= self.max_failures {
                t_max
            } else {
                (t_min + t_max) / 2.0
            };
            let mut trial = self.factory.create(BoundaryState::of(current, t));
            if trial.compute(target) {
                let handoff = Handoff {
                    target_index,
                    time: t,
                    evaluations: evaluation,
                    forced: failures >= self.max_failures,
                };
                return Ok((handoff, trial));
            }

            failures += 1;
            t_min = t;
        }

        Err(TrajectoryError::PlanningInfeasible {
            target_index,
            evaluations: self.max_failures + 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Spline of fixed duration whose position encodes time in every joint
    #[derive(Debug)]
    struct ClockSpline {
        start: f64,
        duration: f64,
        feasible: bool,
    }

    impl Spline for ClockSpline {
        fn compute(&mut self, _target: &Waypoint) -> bool {
            self.feasible
        }
        fn position(&self, t: f64) -> Waypoint {
            Waypoint::from_element(6, self.start + t)
        }
        fn velocity(&self, _t: f64) -> Waypoint {
            Waypoint::from_element(6, 1.0)
        }
        fn acceleration(&self, _t: f64) -> Waypoint {
            Waypoint::zeros(6)
        }
        fn time_final(&self) -> f64 {
            self.duration
        }
    }

    /// Feasible bootstrap, then feasibility decided by `accept` on the start time
    struct ClockFactory<F: Fn(usize, f64) -> bool + Send + Sync> {
        duration: f64,
        accept: F,
        created: AtomicUsize,
        starts: Mutex<Vec<f64>>,
    }

    impl<F: Fn(usize, f64) -> bool + Send + Sync> ClockFactory<F> {
        fn new(duration: f64, accept: F) -> Self {
            ClockFactory {
                duration,
                accept,
                created: AtomicUsize::new(0),
                starts: Mutex::new(Vec::new()),
            }
        }
    }

    impl<F: Fn(usize, f64) -> bool + Send + Sync> SplineFactory for ClockFactory<F> {
        fn create(&self, start: BoundaryState) -> Box<dyn Spline> {
            let index = self.created.fetch_add(1, Ordering::SeqCst);
            let start = start.position[0];
            self.starts.lock().unwrap().push(start);
            Box::new(ClockSpline {
                start,
                duration: self.duration,
                feasible: index == 0 || (self.accept)(index, start),
            })
        }
    }

    fn path(n: usize) -> Vec<Waypoint> {
        (0..n).map(|i| Waypoint::from_element(6, i as f64)).collect()
    }

    #[test]
    fn test_two_waypoints_single_segment() {
        let factory = ClockFactory::new(2.0, |_, _| true);
        let chain = SplineChainBuilder::new(&factory).build(&path(2)).unwrap();
        assert_eq!(chain.segments.len(), 1);
        assert!(chain.handoffs.is_empty());
        assert_eq!(chain.segments[0].duration, 2.0);
    }

    #[test]
    fn test_first_feasible_midpoint_is_accepted() {
        let factory = ClockFactory::new(2.0, |_, _| true);
        let chain = SplineChainBuilder::new(&factory).build(&path(5)).unwrap();

        assert_eq!(chain.handoffs.len(), 2);
        assert!(chain.handoffs.iter().all(|h| h.evaluations == 1 && !h.forced));
        assert_eq!(chain.segments.len(), 3);
        assert_eq!(chain.segments[0].duration, 1.0);
        assert_eq!(chain.segments[2].duration, 2.0);
        assert_eq!(chain.duration(), 4.0);
    }

    #[test]
    fn test_search_moves_towards_later_handoffs() {
        // Accept only hand-offs in the last quarter of the first segment
        let factory = ClockFactory::new(4.0, |_, start| start >= 3.0);
        let chain = SplineChainBuilder::new(&factory).build(&path(4)).unwrap();

        let handoff = chain.handoffs[0];
        assert_eq!(handoff.evaluations, 2);
        assert_eq!(handoff.time, 3.0);
        assert_eq!(*factory.starts.lock().unwrap(), vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_always_failing_search_stops_after_fallback() {
        let factory = ClockFactory::new(1.0, |_, _| false);
        let result = SplineChainBuilder::new(&factory).build(&path(4));

        assert!(matches!(
            result,
            Err(TrajectoryError::PlanningInfeasible {
                target_index: 3,
                evaluations: 6
            })
        ));
        let starts = factory.starts.lock().unwrap().clone();
        // bootstrap, five bisection midpoints, then exactly the segment end
        assert_eq!(starts, vec![0.0, 0.5, 0.75, 0.875, 0.9375, 0.96875, 1.0]);
    }

    #[test]
    fn test_fallback_at_segment_end_succeeds() {
        let factory = ClockFactory::new(1.0, |_, start| start == 1.0);
        let chain = SplineChainBuilder::new(&factory).build(&path(4)).unwrap();

        assert_eq!(chain.handoffs[0].evaluations, 6);
        assert!(chain.handoffs[0].forced);
        assert_eq!(chain.handoffs[0].time, 1.0);
    }

    #[test]
    fn test_zero_failures_evaluates_segment_end_only() {
        let factory = ClockFactory::new(1.0, |_, _| false);
        let result = SplineChainBuilder::new(&factory)
            .with_max_failures(0)
            .build(&path(4));

        assert!(matches!(
            result,
            Err(TrajectoryError::PlanningInfeasible {
                target_index: 3,
                evaluations: 1
            })
        ));
        assert_eq!(*factory.starts.lock().unwrap(), vec![0.0, 1.0]);

        let factory = ClockFactory::new(1.0, |_, start| start == 1.0);
        let chain = SplineChainBuilder::new(&factory)
            .with_max_failures(0)
            .build(&path(4))
            .unwrap();
        assert_eq!(chain.handoffs[0].time, 1.0);
        assert!(chain.handoffs[0].forced);
    }

    #[test]
    fn test_infeasible_bootstrap() {
        struct Never;
        impl SplineFactory for Never {
            fn create(&self, start: BoundaryState) -> Box<dyn Spline> {
                Box::new(ClockSpline {
                    start: start.position[0],
                    duration: 1.0,
                    feasible: false,
                })
            }
        }
        let result = SplineChainBuilder::new(&Never).build(&path(3));
        assert!(matches!(
            result,
            Err(TrajectoryError::BootstrapInfeasible { target_index: 2 })
        ));
    }

    #[test]
    fn test_single_waypoint_is_rejected() {
        let factory = ClockFactory::new(1.0, |_, _| true);
        assert!(SplineChainBuilder::new(&factory).build(&path(1)).is_err());
    }
}
