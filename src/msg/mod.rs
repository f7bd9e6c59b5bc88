//! Joint trajectory message types handed to trajectory sinks

use serde::{Deserialize, Serialize};

/// Time split into whole seconds and a nanosecond remainder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStamp {
    pub sec: i32,
    pub nanosec: u32,
}

const NANOS_PER_SEC: i64 = 1_000_000_000;

impl TimeStamp {
    /// Convert fractional seconds, rounded to the nearest nanosecond.
    ///
    /// Seconds are floored, so `nanosec` is always the non-negative offset into
    /// the second: -0.25 s becomes `sec = -1, nanosec = 750_000_000`.
    pub fn from_secs_f64(seconds: f64) -> Self {
        let total = (seconds * 1e9).round() as i64;
        TimeStamp {
            sec: total.div_euclid(NANOS_PER_SEC) as i32,
            nanosec: total.rem_euclid(NANOS_PER_SEC) as u32,
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub stamp: TimeStamp,
    pub frame_id: String,
}

/// A single sampled point of a joint trajectory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointTrajectoryPoint {
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
    pub time_from_start: TimeStamp,
}

/// Ordered joint trajectory, the unit of publishing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointTrajectory {
    pub header: Header,
    pub joint_names: Vec<String>,
    pub points: Vec<JointTrajectoryPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_split() {
        let stamp = TimeStamp::from_secs_f64(2.25);
        assert_eq!(stamp.sec, 2);
        assert_eq!(stamp.nanosec, 250_000_000);
    }

    #[test]
    fn test_timestamp_whole_seconds() {
        let stamp = TimeStamp::from_secs_f64(3.0);
        assert_eq!(stamp, TimeStamp { sec: 3, nanosec: 0 });
        assert_eq!(stamp.as_secs_f64(), 3.0);
    }

    #[test]
    fn test_timestamp_rounding_carries_into_seconds() {
        let stamp = TimeStamp::from_secs_f64(0.9999999999);
        assert_eq!(stamp, TimeStamp { sec: 1, nanosec: 0 });
    }

    #[test]
    fn test_negative_timestamp_keeps_fraction() {
        let stamp = TimeStamp::from_secs_f64(-0.25);
        assert_eq!(stamp, TimeStamp { sec: -1, nanosec: 750_000_000 });
        assert_eq!(stamp.as_secs_f64(), -0.25);

        let stamp = TimeStamp::from_secs_f64(-2.0);
        assert_eq!(stamp, TimeStamp { sec: -2, nanosec: 0 });
    }
}
