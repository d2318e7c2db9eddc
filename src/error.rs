//! Error types for the simulation library.

use thiserror::Error;

/// Errors reported by mutating operations on a [`crate::Simulator`].
///
/// Numerical infeasibility during a step is *not* represented here: an
/// over-constrained agent always degrades to the penalty-minimizing solver
/// and produces a valid velocity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A configuration value was rejected before entering simulation state.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Operation referenced an agent id that was never created or has been
    /// removed.
    #[error("unknown agent id {0}")]
    UnknownAgent(usize),

    /// Operation referenced an obstacle vertex that does not exist.
    #[error("unknown obstacle vertex {0}")]
    UnknownObstacle(usize),

    /// An obstacle polyline needs at least two vertices.
    #[error("obstacle needs at least two vertices, got {0}")]
    DegenerateObstacle(usize),

    /// `do_step` was called with a non-positive or non-finite time step.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f64),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
