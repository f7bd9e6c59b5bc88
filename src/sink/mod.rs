//! Destinations for finished trajectories

use crate::error::SinkError;
use crate::msg::JointTrajectory;
use std::io::Write;

/// Trait for consumers of published trajectories
pub trait TrajectorySink: Send {
    /// Publish one complete trajectory
    fn publish(&mut self, trajectory: &JointTrajectory) -> Result<(), SinkError>;
}

/// Keeps every published trajectory in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    published: Vec<JointTrajectory>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn published(&self) -> &[JointTrajectory] {
        &self.published
    }

    pub fn last(&self) -> Option<&JointTrajectory> {
        self.published.last()
    }
}

impl TrajectorySink for MemorySink {
    fn publish(&mut self, trajectory: &JointTrajectory) -> Result<(), SinkError> {
        self.published.push(trajectory.clone());
        Ok(())
    }
}

/// Writes each trajectory as one line of JSON
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> TrajectorySink for JsonLinesSink<W> {
    fn publish(&mut self, trajectory: &JointTrajectory) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, trajectory)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
