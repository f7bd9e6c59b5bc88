pub mod common;
pub mod config;
pub mod control;
pub mod error;
pub mod lifecycle;
pub mod msg;
pub mod robot;
pub mod sink;

pub use crate::error::{Result, TrajectoryError};

use crate::control::TrajectoryStack;
use crate::lifecycle::LifecycleNode;

/// Core functionality for the manipulator
pub struct ManipulatorCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl Default for ManipulatorCore {
    fn default() -> Self {
        Self::new()
    }
}

impl ManipulatorCore {
    /// Create a new instance of ManipulatorCore
    pub fn new() -> Self {
        ManipulatorCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Configure and activate all registered components, in registration order
    pub fn init(&mut self) -> Result<()> {
        for component in &mut self.components {
            component.on_configure()?;
            component.on_activate()?;
        }
        Ok(())
    }

    /// Deactivate and clean up all registered components, in reverse order
    pub fn shutdown(&mut self) -> Result<()> {
        for component in self.components.iter_mut().rev() {
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        Ok(())
    }

    /// Get a mutable reference to the trajectory stack, if one is registered
    pub fn trajectory_stack_mut(&mut self) -> Option<&mut TrajectoryStack> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<TrajectoryStack>())
    }
}
