//! Lifecycle management for manipulator components

use crate::error::{Result, TrajectoryError};
use std::any::Any;
use tracing::info;

/// Trait for components that follow a lifecycle pattern
pub trait LifecycleNode: Send + Sync {
    /// Load parameters and allocate resources
    fn on_configure(&mut self) -> Result<()>;

    /// Start serving requests
    fn on_activate(&mut self) -> Result<()>;

    /// Stop serving requests, keeping the configuration
    fn on_deactivate(&mut self) -> Result<()>;

    /// Release everything acquired in `on_configure`
    fn on_cleanup(&mut self) -> Result<()>;

    /// Convert to Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// State of a lifecycle node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unconfigured,
    Inactive,
    Active,
}

impl State {
    fn can_transition_to(self, next: State) -> bool {
        matches!(
            (self, next),
            (State::Unconfigured, State::Inactive)
                | (State::Inactive, State::Active)
                | (State::Active, State::Inactive)
                | (State::Inactive, State::Unconfigured)
        )
    }
}

/// Name and state bookkeeping shared by lifecycle nodes
#[derive(Debug)]
pub struct LifecycleNodeBase {
    pub name: String,
    state: State,
}

impl LifecycleNodeBase {
    pub fn new(name: &str) -> Self {
        LifecycleNodeBase {
            name: name.to_string(),
            state: State::Unconfigured,
        }
    }

    pub fn get_state(&self) -> State {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: State) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(TrajectoryError::Lifecycle(format!(
                "{}: cannot go from {:?} to {:?}",
                self.name, self.state, next
            )));
        }
        info!("{}: {:?} -> {:?}", self.name, self.state, next);
        self.state = next;
        Ok(())
    }
}
