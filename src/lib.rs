//! # Avoidance Core
//!
//! A local collision-avoidance library for disk-shaped agents sharing a
//! continuous 2D workspace, built around Optimal Reciprocal Collision
//! Avoidance (ORCA).
//!
//! ## Pipeline
//!
//! Each call to [`Simulator::do_step`] runs the same four stages:
//!
//! 1. Rebuild a k-d tree over a snapshot of agent positions.
//! 2. For each agent, query nearby agents and obstacle segments.
//! 3. Convert every neighbor into a half-plane constraint on the agent's
//!    next velocity and solve a small linear program for the feasible
//!    velocity closest to the agent's preferred velocity, with a
//!    violation-minimizing fallback when the constraints conflict.
//! 4. Commit all velocities at once and integrate positions.
//!
//! Every agent is solved against the same snapshot, so processing order
//! never biases who gives way, and two runs from the same state produce
//! identical trajectories.
//!
//! ## What this library does not do
//!
//! Preferred velocities come from the caller (a global planner, steering
//! logic, player input); this crate only turns them into collision-free
//! committed velocities. Rendering, scene I/O and path planning live
//! elsewhere.
//!
//! ## Usage
//!
//! ```
//! use avoidance_core::{Point, Simulator, Vector2D};
//!
//! let mut sim = Simulator::new();
//! let a = sim.add_agent(Point::new(-5.0, 0.0))?;
//! let b = sim.add_agent(Point::new(5.0, 0.0))?;
//! sim.set_pref_velocity(a, Vector2D::new(1.0, 0.0))?;
//! sim.set_pref_velocity(b, Vector2D::new(-1.0, 0.0))?;
//!
//! for _ in 0..100 {
//!     sim.do_step(0.25)?;
//! }
//! assert!(sim.agent_position(a)?.x > sim.agent_position(b)?.x);
//! # Ok::<(), avoidance_core::SimulationError>(())
//! ```

pub mod agent;
pub mod error;
pub mod kdtree;
pub mod linear_program;
pub mod obstacle;
pub mod orca;
pub mod simulator;
pub mod structs;

pub use agent::AgentParams;
pub use error::{Result, SimulationError};
pub use obstacle::ObstacleVertex;
pub use simulator::Simulator;
pub use structs::{OrcaLine, Point, Vector2D, EPSILON};
