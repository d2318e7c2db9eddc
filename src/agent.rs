//! Agent state and configuration.

use crate::error::{Result, SimulationError};
use crate::structs::{Point, Vector2D};

/// Tunable per-agent parameters.
///
/// Validated once when an agent is created (or a parameter is updated), so
/// the stepping pipeline never has to re-check them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentParams {
    /// How far away other agents are still considered as neighbors.
    pub neighbor_dist: f64,
    /// Cap on the number of agent neighbors entering the avoidance
    /// constraints. Zero makes the agent ignore other agents entirely.
    pub max_neighbors: usize,
    /// Look-ahead window for agent-agent avoidance, in seconds.
    pub time_horizon: f64,
    /// Look-ahead window for agent-obstacle avoidance, in seconds.
    pub time_horizon_obst: f64,
    /// Disk radius of the agent body.
    pub radius: f64,
    /// Upper bound on the magnitude of any committed velocity.
    pub max_speed: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        AgentParams {
            neighbor_dist: 15.0,
            max_neighbors: 10,
            time_horizon: 5.0,
            time_horizon_obst: 5.0,
            radius: 0.5,
            max_speed: 2.0,
        }
    }
}

impl AgentParams {
    /// Rejects configurations before they can enter simulation state.
    pub fn validate(&self) -> Result<()> {
        check_positive("radius", self.radius)?;
        check_non_negative("max_speed", self.max_speed)?;
        check_positive("neighbor_dist", self.neighbor_dist)?;
        check_positive("time_horizon", self.time_horizon)?;
        check_positive("time_horizon_obst", self.time_horizon_obst)?;
        Ok(())
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

pub(crate) fn check_finite_point(name: &'static str, point: Point) -> Result<()> {
    if point.x.is_finite() && point.y.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter {
            name,
            value: if point.x.is_finite() { point.y } else { point.x },
        })
    }
}

pub(crate) fn check_finite_vector(name: &'static str, vector: Vector2D) -> Result<()> {
    if vector.x.is_finite() && vector.y.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter {
            name,
            value: if vector.x.is_finite() {
                vector.y
            } else {
                vector.x
            },
        })
    }
}

/// Complete state of one simulated agent.
///
/// Position and velocity are written only by the simulator's commit phase;
/// the preferred velocity is supplied externally between steps.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: usize,
    pub position: Point,
    pub velocity: Vector2D,
    pub pref_velocity: Vector2D,
    pub params: AgentParams,
}

impl Agent {
    pub fn new(id: usize, position: Point, velocity: Vector2D, params: AgentParams) -> Self {
        Agent {
            id,
            position,
            velocity,
            pref_velocity: Vector2D::zero(),
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(AgentParams::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_radius() {
        let params = AgentParams {
            radius: 0.0,
            ..AgentParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(SimulationError::InvalidParameter {
                name: "radius",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_negative_max_speed() {
        let params = AgentParams {
            max_speed: -1.0,
            ..AgentParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_max_speed_is_allowed() {
        // A pinned agent is a legal configuration.
        let params = AgentParams {
            max_speed: 0.0,
            ..AgentParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite_horizon() {
        let params = AgentParams {
            time_horizon: f64::INFINITY,
            ..AgentParams::default()
        };
        assert!(params.validate().is_err());

        let params = AgentParams {
            time_horizon_obst: f64::NAN,
            ..AgentParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_zero_max_neighbors_is_allowed() {
        let params = AgentParams {
            max_neighbors: 0,
            ..AgentParams::default()
        };
        assert!(params.validate().is_ok());
    }
}
