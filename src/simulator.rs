//! # Simulation Orchestration
//!
//! [`Simulator`] owns the agents, the static obstacles and both spatial
//! indices, and drives the per-step pipeline: rebuild the agent index from a
//! position snapshot, build every agent's constraints against that same
//! snapshot, solve, then commit all velocities and positions at once.
//!
//! The read-then-commit split is the load-bearing property of the whole
//! system: no agent ever sees another agent's already-updated velocity
//! within a step, so processing order cannot bias which agent gives way.

use std::collections::HashMap;

use log::{debug, trace};

use crate::agent::{check_finite_point, check_finite_vector, Agent, AgentParams};
use crate::error::{Result, SimulationError};
use crate::kdtree::{AgentKdTree, ObstacleKdTree};
use crate::obstacle::ObstacleSet;
use crate::orca;
use crate::structs::{Point, Vector2D};

/// Owns all simulation state and exposes the stepping contract.
///
/// Agents are addressed by opaque ids that are never reused; operations on a
/// removed or never-created id fail with [`SimulationError::UnknownAgent`]
/// and leave the simulation untouched.
#[derive(Debug, Default)]
pub struct Simulator {
    agents: Vec<Agent>,
    slots: HashMap<usize, usize>,
    next_agent_id: usize,
    defaults: AgentParams,
    default_velocity: Vector2D,
    obstacles: ObstacleSet,
    obstacle_tree: ObstacleKdTree,
    obstacles_dirty: bool,
    global_time: f64,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator::default()
    }

    /// Creates a simulator whose [`Simulator::add_agent`] uses the given
    /// parameters and initial velocity.
    pub fn with_defaults(defaults: AgentParams, initial_velocity: Vector2D) -> Result<Self> {
        defaults.validate()?;
        check_finite_vector("initial_velocity", initial_velocity)?;
        Ok(Simulator {
            defaults,
            default_velocity: initial_velocity,
            ..Simulator::default()
        })
    }

    /// Replaces the default parameters used for subsequently added agents.
    pub fn set_agent_defaults(&mut self, defaults: AgentParams) -> Result<()> {
        defaults.validate()?;
        self.defaults = defaults;
        Ok(())
    }

    /// Adds an agent with the default parameters and returns its id.
    pub fn add_agent(&mut self, position: Point) -> Result<usize> {
        self.add_agent_with_params(position, self.defaults, self.default_velocity)
    }

    /// Adds a fully specified agent and returns its id.
    pub fn add_agent_with_params(
        &mut self,
        position: Point,
        params: AgentParams,
        velocity: Vector2D,
    ) -> Result<usize> {
        params.validate()?;
        check_finite_point("position", position)?;
        check_finite_vector("velocity", velocity)?;

        let id = self.next_agent_id;
        self.next_agent_id += 1;
        self.slots.insert(id, self.agents.len());
        self.agents.push(Agent::new(id, position, velocity, params));
        trace!("added agent {} at ({}, {})", id, position.x, position.y);
        Ok(id)
    }

    /// Removes an agent. It is excluded from the next index rebuild, and its
    /// id fails lookups from now on.
    pub fn remove_agent(&mut self, id: usize) -> Result<()> {
        let slot = self
            .slots
            .remove(&id)
            .ok_or(SimulationError::UnknownAgent(id))?;
        self.agents.swap_remove(slot);
        if slot < self.agents.len() {
            // The former last agent moved into the freed slot.
            self.slots.insert(self.agents[slot].id, slot);
        }
        trace!("removed agent {}", id);
        Ok(())
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Total simulated time committed so far.
    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    fn slot(&self, id: usize) -> Result<usize> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(SimulationError::UnknownAgent(id))
    }

    fn agent(&self, id: usize) -> Result<&Agent> {
        Ok(&self.agents[self.slot(id)?])
    }

    fn agent_mut(&mut self, id: usize) -> Result<&mut Agent> {
        let slot = self.slot(id)?;
        Ok(&mut self.agents[slot])
    }

    // ---- Agent accessors -------------------------------------------------

    pub fn agent_position(&self, id: usize) -> Result<Point> {
        Ok(self.agent(id)?.position)
    }

    pub fn agent_velocity(&self, id: usize) -> Result<Vector2D> {
        Ok(self.agent(id)?.velocity)
    }

    pub fn agent_pref_velocity(&self, id: usize) -> Result<Vector2D> {
        Ok(self.agent(id)?.pref_velocity)
    }

    pub fn agent_params(&self, id: usize) -> Result<AgentParams> {
        Ok(self.agent(id)?.params)
    }

    pub fn agent_radius(&self, id: usize) -> Result<f64> {
        Ok(self.agent(id)?.params.radius)
    }

    pub fn agent_max_speed(&self, id: usize) -> Result<f64> {
        Ok(self.agent(id)?.params.max_speed)
    }

    pub fn agent_neighbor_dist(&self, id: usize) -> Result<f64> {
        Ok(self.agent(id)?.params.neighbor_dist)
    }

    pub fn agent_max_neighbors(&self, id: usize) -> Result<usize> {
        Ok(self.agent(id)?.params.max_neighbors)
    }

    pub fn agent_time_horizon(&self, id: usize) -> Result<f64> {
        Ok(self.agent(id)?.params.time_horizon)
    }

    pub fn agent_time_horizon_obst(&self, id: usize) -> Result<f64> {
        Ok(self.agent(id)?.params.time_horizon_obst)
    }

    // ---- Agent mutators --------------------------------------------------

    /// Sets the preferred velocity an external planner wants this agent to
    /// take on the next step.
    pub fn set_pref_velocity(&mut self, id: usize, velocity: Vector2D) -> Result<()> {
        check_finite_vector("pref_velocity", velocity)?;
        self.agent_mut(id)?.pref_velocity = velocity;
        Ok(())
    }

    pub fn set_agent_position(&mut self, id: usize, position: Point) -> Result<()> {
        check_finite_point("position", position)?;
        self.agent_mut(id)?.position = position;
        Ok(())
    }

    pub fn set_agent_velocity(&mut self, id: usize, velocity: Vector2D) -> Result<()> {
        check_finite_vector("velocity", velocity)?;
        self.agent_mut(id)?.velocity = velocity;
        Ok(())
    }

    pub fn set_agent_radius(&mut self, id: usize, radius: f64) -> Result<()> {
        self.update_params(id, |params| params.radius = radius)
    }

    pub fn set_agent_max_speed(&mut self, id: usize, max_speed: f64) -> Result<()> {
        self.update_params(id, |params| params.max_speed = max_speed)
    }

    pub fn set_agent_neighbor_dist(&mut self, id: usize, neighbor_dist: f64) -> Result<()> {
        self.update_params(id, |params| params.neighbor_dist = neighbor_dist)
    }

    pub fn set_agent_max_neighbors(&mut self, id: usize, max_neighbors: usize) -> Result<()> {
        self.update_params(id, |params| params.max_neighbors = max_neighbors)
    }

    pub fn set_agent_time_horizon(&mut self, id: usize, time_horizon: f64) -> Result<()> {
        self.update_params(id, |params| params.time_horizon = time_horizon)
    }

    pub fn set_agent_time_horizon_obst(&mut self, id: usize, time_horizon_obst: f64) -> Result<()> {
        self.update_params(id, |params| params.time_horizon_obst = time_horizon_obst)
    }

    fn update_params<F: FnOnce(&mut AgentParams)>(&mut self, id: usize, apply: F) -> Result<()> {
        let slot = self.slot(id)?;
        let mut params = self.agents[slot].params;
        apply(&mut params);
        params.validate()?;
        self.agents[slot].params = params;
        Ok(())
    }

    // ---- Obstacles -------------------------------------------------------

    /// Registers an obstacle polyline and returns the index of its first
    /// vertex. Not visible to agents until [`Simulator::process_obstacles`]
    /// runs.
    pub fn add_obstacle(&mut self, vertices: &[Point]) -> Result<usize> {
        let id = self.obstacles.add_polyline(vertices)?;
        self.obstacles_dirty = true;
        Ok(id)
    }

    /// Finalizes the registered obstacles and (re)builds their spatial
    /// index. Call once after all obstacles are added; idempotent.
    pub fn process_obstacles(&mut self) {
        self.obstacle_tree = ObstacleKdTree::build(&mut self.obstacles);
        self.obstacles_dirty = false;
        debug!(
            "processed obstacles: {} vertices after splits",
            self.obstacles.len()
        );
    }

    pub fn num_obstacle_vertices(&self) -> usize {
        self.obstacles.len()
    }

    pub fn obstacle_vertex(&self, vertex_no: usize) -> Result<Point> {
        if vertex_no >= self.obstacles.len() {
            return Err(SimulationError::UnknownObstacle(vertex_no));
        }
        Ok(self.obstacles.get(vertex_no).point)
    }

    /// Whether `p1` and `p2` can see each other with clearance `radius`
    /// given the processed obstacles.
    pub fn query_visibility(&self, p1: Point, p2: Point, radius: f64) -> bool {
        self.obstacle_tree
            .query_visibility(&self.obstacles, p1, p2, radius)
    }

    // ---- Stepping --------------------------------------------------------

    /// Advances the simulation by `dt` seconds.
    ///
    /// All new velocities are computed against the same snapshot of
    /// positions and velocities; nothing is committed until every agent has
    /// been solved. This call is total with respect to crowding: infeasible
    /// constraint sets degrade internally and never surface as errors.
    pub fn do_step(&mut self, dt: f64) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimulationError::InvalidTimeStep(dt));
        }
        if self.obstacles_dirty {
            debug!("stepping with unprocessed obstacles; they are not visible yet");
        }

        let entries: Vec<(Point, usize)> = self
            .agents
            .iter()
            .enumerate()
            .map(|(slot, agent)| (agent.position, slot))
            .collect();
        let agent_tree = AgentKdTree::build(entries);
        trace!("rebuilt agent index over {} agents", self.agents.len());

        let mut new_velocities = Vec::with_capacity(self.agents.len());
        for (slot, agent) in self.agents.iter().enumerate() {
            let range_sq = agent.params.neighbor_dist * agent.params.neighbor_dist;
            let agent_neighbors = agent_tree.query_neighbors(
                agent.position,
                range_sq,
                agent.params.max_neighbors,
                Some(slot),
            );
            let neighbor_refs: Vec<&Agent> = agent_neighbors
                .iter()
                .map(|&(_, neighbor_slot)| &self.agents[neighbor_slot])
                .collect();

            let obstacle_range =
                agent.params.time_horizon_obst * agent.params.max_speed + agent.params.radius;
            let obstacle_neighbors = self.obstacle_tree.query_neighbors(
                &self.obstacles,
                agent.position,
                obstacle_range * obstacle_range,
            );

            new_velocities.push(orca::compute_new_velocity(
                agent,
                &neighbor_refs,
                &obstacle_neighbors,
                &self.obstacles,
                dt,
            ));
        }

        // Commit phase: fast, non-interruptible, after every solve is done.
        for (agent, velocity) in self.agents.iter_mut().zip(new_velocities) {
            agent.velocity = velocity;
            agent.position = agent.position + velocity * dt;
        }
        self.global_time += dt;
        Ok(())
    }
}
