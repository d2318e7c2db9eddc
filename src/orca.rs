//! # ORCA - Optimal Reciprocal Collision Avoidance
//!
//! Builds the half-plane constraints for one agent and solves for its new
//! velocity, following "Reciprocal n-body Collision Avoidance" by van den
//! Berg et al. (ISRR 2011).
//!
//! ## Constraint construction
//!
//! Each neighboring agent induces a truncated velocity-obstacle cone in
//! relative velocity space. The minimal change `u` that moves the current
//! relative velocity out of (or keeps it off) the cone is split evenly
//! between the two agents, which makes the avoidance reciprocal: both agents
//! running this computation independently over the same snapshot produce
//! complementary constraints without communicating. Obstacle segments are
//! not reciprocal; the agent absorbs the entire required change, and their
//! constraints are listed before all agent constraints so the infeasibility
//! fallback relaxes agent constraints first.
//!
//! ## Symmetry breaking
//!
//! Two agents in a perfectly mirrored head-on configuration produce mirrored
//! constraints forever and would brake to a standstill without ever passing.
//! Whenever at least one constraint is active against the preferred
//! velocity, the optimization point is nudged sideways (toward the
//! preference's counterclockwise perpendicular). Both agents of a mirrored
//! pair derive mirrored nudges, so their evasions complement each other, and
//! because only the optimization point moves, no avoidance constraint is
//! ever weakened by the tie-break.

use log::trace;

use crate::agent::Agent;
use crate::linear_program::{linear_program_2d, linear_program_3d, LinearProgram2dResult};
use crate::obstacle::ObstacleSet;
use crate::structs::{OrcaLine, Vector2D, EPSILON};

/// Relative magnitude of the symmetry-breaking nudge. Needs to be large
/// enough to create meaningful lateral movement within a few steps but small
/// enough not to disturb unconstrained motion.
const PERTURBATION_EPSILON: f64 = 0.1;

/// Computes a new, safe velocity for `agent` against its current neighbors.
///
/// `obstacle_neighbors` lists facing obstacle segments as `(distance
/// squared, start-vertex index)` pairs, nearest first; `neighbors` lists
/// nearby agents, nearest first. Infeasible constraint sets are absorbed by
/// the violation-minimizing fallback, so this always produces a velocity
/// with magnitude at most the agent's maximum speed.
pub fn compute_new_velocity(
    agent: &Agent,
    neighbors: &[&Agent],
    obstacle_neighbors: &[(f64, usize)],
    obstacles: &ObstacleSet,
    time_step: f64,
) -> Vector2D {
    let mut lines = obstacle_orca_lines(agent, obstacle_neighbors, obstacles);
    let num_obstacle_lines = lines.len();

    for other in neighbors {
        lines.push(agent_orca_line(agent, other, time_step));
    }

    let opt_velocity = perturbed_preference(agent, &lines);

    match linear_program_2d(&lines, agent.params.max_speed, opt_velocity, false) {
        LinearProgram2dResult::Feasible(velocity) => velocity,
        LinearProgram2dResult::Infeasible { index, partial } => {
            trace!(
                "agent {}: constraints infeasible at line {} of {}, minimizing violation",
                agent.id,
                index,
                lines.len()
            );
            linear_program_3d(&lines, num_obstacle_lines, index, partial, agent.params.max_speed)
        }
    }
}

/// Returns the optimization point for the linear program: the preferred
/// velocity, nudged sideways when some constraint is active against it.
fn perturbed_preference(agent: &Agent, lines: &[OrcaLine]) -> Vector2D {
    let pref = agent.pref_velocity;

    let max_speed_sq = agent.params.max_speed * agent.params.max_speed;
    let clipped = if pref.magnitude_sq() > max_speed_sq {
        pref.normalize() * agent.params.max_speed
    } else {
        pref
    };

    let constrained = lines
        .iter()
        .any(|line| line.direction.det(&(line.point - clipped)) > 0.0);
    if constrained {
        pref + pref.perpendicular() * PERTURBATION_EPSILON
    } else {
        pref
    }
}

/// Builds the reciprocal half-plane constraint induced on `agent` by the
/// neighboring agent `other`.
fn agent_orca_line(agent: &Agent, other: &Agent, time_step: f64) -> OrcaLine {
    let relative_position = other.position - agent.position;
    let relative_velocity = agent.velocity - other.velocity;
    let dist_sq = relative_position.magnitude_sq();
    let combined_radius = agent.params.radius + other.params.radius;
    let combined_radius_sq = combined_radius * combined_radius;

    let direction;
    let u;

    if dist_sq > combined_radius_sq {
        // No current overlap: work on the cone truncated at the horizon.
        let inv_time_horizon = 1.0 / agent.params.time_horizon;
        let w = relative_velocity - relative_position * inv_time_horizon;
        let w_length_sq = w.magnitude_sq();
        let dot_product = w.dot(&relative_position);

        if dot_product < 0.0 && dot_product * dot_product >= combined_radius_sq * w_length_sq {
            // Project on the cut-off circle. The boundary configuration
            // between circle and legs lands here, which pins the tie-break;
            // both projections coincide there anyway.
            let w_length = w_length_sq.sqrt();
            let unit_w = w * (1.0 / w_length);

            direction = Vector2D::new(unit_w.y, -unit_w.x);
            u = unit_w * (combined_radius * inv_time_horizon - w_length);
        } else {
            // Project on the nearer leg.
            let leg = (dist_sq - combined_radius_sq).sqrt();

            if relative_position.det(&w) > 0.0 {
                direction = Vector2D::new(
                    relative_position.x * leg - relative_position.y * combined_radius,
                    relative_position.x * combined_radius + relative_position.y * leg,
                ) * (1.0 / dist_sq);
            } else {
                direction = -(Vector2D::new(
                    relative_position.x * leg + relative_position.y * combined_radius,
                    -relative_position.x * combined_radius + relative_position.y * leg,
                ) * (1.0 / dist_sq));
            }

            let dot_product = relative_velocity.dot(&direction);
            u = direction * dot_product - relative_velocity;
        }
    } else {
        // Already overlapping: the most conservative constraint, separating
        // the disks within the current step.
        let inv_time_step = 1.0 / time_step;
        let w = relative_velocity - relative_position * inv_time_step;
        let w_length = w.magnitude();
        let unit_w = w.normalize();

        direction = Vector2D::new(unit_w.y, -unit_w.x);
        u = unit_w * (combined_radius * inv_time_step - w_length);
    }

    // Reciprocity: this agent takes half the required change.
    OrcaLine::new(agent.velocity + u * 0.5, direction)
}

/// Builds the half-plane constraints induced on `agent` by the given
/// obstacle segments. The agent takes the entire required velocity change,
/// and segments already excluded by an earlier constraint (typically the two
/// sides of a convex corner) are skipped to keep corners from becoming
/// over-constrained.
fn obstacle_orca_lines(
    agent: &Agent,
    obstacle_neighbors: &[(f64, usize)],
    obstacles: &ObstacleSet,
) -> Vec<OrcaLine> {
    let mut lines: Vec<OrcaLine> = Vec::new();

    let inv_time_horizon_obst = 1.0 / agent.params.time_horizon_obst;
    let radius = agent.params.radius;
    let radius_sq = radius * radius;
    let position = agent.position;
    let velocity = agent.velocity;

    for &(_, vertex) in obstacle_neighbors {
        let mut obstacle1 = vertex;
        let mut obstacle2 = obstacles.get(obstacle1).next;

        let relative_position1 = obstacles.get(obstacle1).point - position;
        let relative_position2 = obstacles.get(obstacle2).point - position;

        // Skip this segment if its velocity obstacle is already excluded by
        // constraints from previously handled segments.
        let already_covered = lines.iter().any(|line| {
            (relative_position1 * inv_time_horizon_obst - line.point).det(&line.direction)
                - inv_time_horizon_obst * radius
                >= -EPSILON
                && (relative_position2 * inv_time_horizon_obst - line.point).det(&line.direction)
                    - inv_time_horizon_obst * radius
                    >= -EPSILON
        });
        if already_covered {
            continue;
        }

        let dist_sq1 = relative_position1.magnitude_sq();
        let dist_sq2 = relative_position2.magnitude_sq();

        let obstacle_vector = obstacles.get(obstacle2).point - obstacles.get(obstacle1).point;
        let s = (-relative_position1).dot(&obstacle_vector) / obstacle_vector.magnitude_sq();
        let dist_sq_line = (-relative_position1 - obstacle_vector * s).magnitude_sq();

        if s < 0.0 && dist_sq1 <= radius_sq {
            // Colliding with the left vertex; non-convex vertices produce
            // nothing of their own.
            if obstacles.get(obstacle1).is_convex {
                lines.push(OrcaLine::new(
                    Vector2D::zero(),
                    Vector2D::new(-relative_position1.y, relative_position1.x).normalize(),
                ));
            }
            continue;
        } else if s > 1.0 && dist_sq2 <= radius_sq {
            // Colliding with the right vertex; left to the neighboring
            // segment when that segment faces the agent.
            if obstacles.get(obstacle2).is_convex
                && relative_position2.det(&obstacles.get(obstacle2).unit_dir) >= 0.0
            {
                lines.push(OrcaLine::new(
                    Vector2D::zero(),
                    Vector2D::new(-relative_position2.y, relative_position2.x).normalize(),
                ));
            }
            continue;
        } else if (0.0..=1.0).contains(&s) && dist_sq_line <= radius_sq {
            // Colliding with the segment interior.
            lines.push(OrcaLine::new(
                Vector2D::zero(),
                -obstacles.get(obstacle1).unit_dir,
            ));
            continue;
        }

        // Not colliding: build the velocity obstacle flanked by its legs.
        let left_leg_direction;
        let right_leg_direction;

        if s < 0.0 && dist_sq_line <= radius_sq {
            // Viewed obliquely, the left vertex alone defines the obstacle.
            if !obstacles.get(obstacle1).is_convex {
                continue;
            }
            obstacle2 = obstacle1;

            let leg1 = (dist_sq1 - radius_sq).sqrt();
            left_leg_direction = Vector2D::new(
                relative_position1.x * leg1 - relative_position1.y * radius,
                relative_position1.x * radius + relative_position1.y * leg1,
            ) * (1.0 / dist_sq1);
            right_leg_direction = Vector2D::new(
                relative_position1.x * leg1 + relative_position1.y * radius,
                -relative_position1.x * radius + relative_position1.y * leg1,
            ) * (1.0 / dist_sq1);
        } else if s > 1.0 && dist_sq_line <= radius_sq {
            // Viewed obliquely, the right vertex alone defines the obstacle.
            if !obstacles.get(obstacle2).is_convex {
                continue;
            }
            obstacle1 = obstacle2;

            let leg2 = (dist_sq2 - radius_sq).sqrt();
            left_leg_direction = Vector2D::new(
                relative_position2.x * leg2 - relative_position2.y * radius,
                relative_position2.x * radius + relative_position2.y * leg2,
            ) * (1.0 / dist_sq2);
            right_leg_direction = Vector2D::new(
                relative_position2.x * leg2 + relative_position2.y * radius,
                -relative_position2.x * radius + relative_position2.y * leg2,
            ) * (1.0 / dist_sq2);
        } else {
            // Usual situation: one leg per vertex, flattened at non-convex
            // vertices.
            if obstacles.get(obstacle1).is_convex {
                let leg1 = (dist_sq1 - radius_sq).sqrt();
                left_leg_direction = Vector2D::new(
                    relative_position1.x * leg1 - relative_position1.y * radius,
                    relative_position1.x * radius + relative_position1.y * leg1,
                ) * (1.0 / dist_sq1);
            } else {
                left_leg_direction = -obstacles.get(obstacle1).unit_dir;
            }

            if obstacles.get(obstacle2).is_convex {
                let leg2 = (dist_sq2 - radius_sq).sqrt();
                right_leg_direction = Vector2D::new(
                    relative_position2.x * leg2 + relative_position2.y * radius,
                    -relative_position2.x * radius + relative_position2.y * leg2,
                ) * (1.0 / dist_sq2);
            } else {
                right_leg_direction = obstacles.get(obstacle1).unit_dir;
            }
        }

        // A leg can never point into a neighboring segment at a convex
        // vertex; use the neighbor's cut-off line there instead. Velocities
        // projected on such a foreign leg get no constraint from this
        // segment.
        let left_neighbor = obstacles.get(obstacle1).prev;
        let mut is_left_leg_foreign = false;
        let mut is_right_leg_foreign = false;

        let mut left_leg_direction = left_leg_direction;
        let mut right_leg_direction = right_leg_direction;

        if obstacles.get(obstacle1).is_convex
            && left_leg_direction.det(&-obstacles.get(left_neighbor).unit_dir) >= 0.0
        {
            left_leg_direction = -obstacles.get(left_neighbor).unit_dir;
            is_left_leg_foreign = true;
        }
        if obstacles.get(obstacle2).is_convex
            && right_leg_direction.det(&obstacles.get(obstacle2).unit_dir) <= 0.0
        {
            right_leg_direction = obstacles.get(obstacle2).unit_dir;
            is_right_leg_foreign = true;
        }

        let left_cutoff = (obstacles.get(obstacle1).point - position) * inv_time_horizon_obst;
        let right_cutoff = (obstacles.get(obstacle2).point - position) * inv_time_horizon_obst;
        let cutoff_vec = right_cutoff - left_cutoff;

        // Project the current velocity on the velocity obstacle.
        let t = if obstacle1 == obstacle2 {
            0.5
        } else {
            (velocity - left_cutoff).dot(&cutoff_vec) / cutoff_vec.magnitude_sq()
        };
        let t_left = (velocity - left_cutoff).dot(&left_leg_direction);
        let t_right = (velocity - right_cutoff).dot(&right_leg_direction);

        if (t < 0.0 && t_left < 0.0) || (obstacle1 == obstacle2 && t_left < 0.0 && t_right < 0.0) {
            // Project on the left cut-off circle.
            let unit_w = (velocity - left_cutoff).normalize();
            lines.push(OrcaLine::new(
                left_cutoff + unit_w * (radius * inv_time_horizon_obst),
                Vector2D::new(unit_w.y, -unit_w.x),
            ));
            continue;
        } else if t > 1.0 && t_right < 0.0 {
            // Project on the right cut-off circle.
            let unit_w = (velocity - right_cutoff).normalize();
            lines.push(OrcaLine::new(
                right_cutoff + unit_w * (radius * inv_time_horizon_obst),
                Vector2D::new(unit_w.y, -unit_w.x),
            ));
            continue;
        }

        // Project on the left leg, right leg, or cut-off line, whichever is
        // closest to the current velocity.
        let dist_sq_cutoff = if t < 0.0 || t > 1.0 || obstacle1 == obstacle2 {
            f64::INFINITY
        } else {
            (velocity - (left_cutoff + cutoff_vec * t)).magnitude_sq()
        };
        let dist_sq_left = if t_left < 0.0 {
            f64::INFINITY
        } else {
            (velocity - (left_cutoff + left_leg_direction * t_left)).magnitude_sq()
        };
        let dist_sq_right = if t_right < 0.0 {
            f64::INFINITY
        } else {
            (velocity - (right_cutoff + right_leg_direction * t_right)).magnitude_sq()
        };

        if dist_sq_cutoff <= dist_sq_left && dist_sq_cutoff <= dist_sq_right {
            let direction = -obstacles.get(obstacle1).unit_dir;
            lines.push(OrcaLine::new(
                left_cutoff + direction.perpendicular() * (radius * inv_time_horizon_obst),
                direction,
            ));
        } else if dist_sq_left <= dist_sq_right {
            if is_left_leg_foreign {
                continue;
            }
            let direction = left_leg_direction;
            lines.push(OrcaLine::new(
                left_cutoff + direction.perpendicular() * (radius * inv_time_horizon_obst),
                direction,
            ));
        } else {
            if is_right_leg_foreign {
                continue;
            }
            let direction = -right_leg_direction;
            lines.push(OrcaLine::new(
                right_cutoff + direction.perpendicular() * (radius * inv_time_horizon_obst),
                direction,
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentParams;
    use crate::structs::Point;
    use approx::assert_relative_eq;

    fn make_agent(id: usize, position: Point, velocity: Vector2D, radius: f64) -> Agent {
        let params = AgentParams {
            radius,
            ..AgentParams::default()
        };
        Agent::new(id, position, velocity, params)
    }

    #[test]
    fn test_isolated_agent_commits_preference_exactly() {
        let mut agent = make_agent(0, Point::new(0.0, 0.0), Vector2D::zero(), 0.5);
        agent.pref_velocity = Vector2D::new(1.0, 0.25);

        let set = ObstacleSet::new();
        let result = compute_new_velocity(&agent, &[], &[], &set, 0.25);
        assert_eq!(result, Vector2D::new(1.0, 0.25));
    }

    #[test]
    fn test_isolated_agent_clipped_to_max_speed() {
        let mut agent = make_agent(0, Point::new(0.0, 0.0), Vector2D::zero(), 0.5);
        agent.pref_velocity = Vector2D::new(3.0, 4.0); // magnitude 5 > max 2

        let set = ObstacleSet::new();
        let result = compute_new_velocity(&agent, &[], &[], &set, 0.25);
        assert_relative_eq!(result.x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(result.y, 1.6, epsilon = 1e-12);
    }

    #[test]
    fn test_slack_constraint_leaves_preference_exact() {
        // A neighbor ahead but moving away never activates its constraint,
        // so no tie-break nudge is applied.
        let mut agent = make_agent(0, Point::new(0.0, 0.0), Vector2D::new(0.5, 0.0), 0.5);
        agent.pref_velocity = Vector2D::new(0.5, 0.0);
        let other = make_agent(1, Point::new(10.0, 0.0), Vector2D::new(2.0, 0.0), 0.5);

        let set = ObstacleSet::new();
        let result = compute_new_velocity(&agent, &[&other], &[], &set, 0.25);
        assert_eq!(result, Vector2D::new(0.5, 0.0));
    }

    #[test]
    fn test_cap_leg_boundary_resolves_to_cap() {
        // Exact boundary between the cut-off circle and the leg regions:
        // relative position (5, 0), combined radius 3, horizon 1 and
        // relative velocity (2, 4) give w = (-3, 4) with
        // dot(w, p)^2 == r^2 |w|^2 exactly. The cap branch must be taken,
        // and at the boundary both projections agree on the constraint.
        let params = AgentParams {
            radius: 1.5,
            time_horizon: 1.0,
            ..AgentParams::default()
        };
        let agent = Agent::new(0, Point::new(0.0, 0.0), Vector2D::new(2.0, 4.0), params);
        let other = Agent::new(1, Point::new(5.0, 0.0), Vector2D::zero(), params);

        let line = agent_orca_line(&agent, &other, 0.25);
        assert_relative_eq!(line.direction.x, 0.8, epsilon = 1e-12);
        assert_relative_eq!(line.direction.y, 0.6, epsilon = 1e-12);
        assert_relative_eq!(line.point.x, 2.6, epsilon = 1e-12);
        assert_relative_eq!(line.point.y, 3.2, epsilon = 1e-12);
    }

    #[test]
    fn test_overlapping_agents_use_time_step_cutoff() {
        // Disks already overlap: the constraint separates them within the
        // current step, not within the horizon.
        let agent = make_agent(0, Point::new(0.0, 0.0), Vector2D::zero(), 0.5);
        let other = make_agent(1, Point::new(0.5, 0.0), Vector2D::zero(), 0.5);

        let line = agent_orca_line(&agent, &other, 0.1);
        // w = -(0.5, 0) / 0.1 = (-5, 0); u = (1/0.1 - 5) * (-1, 0).
        assert_relative_eq!(line.point.x, -2.5, epsilon = 1e-12);
        assert_relative_eq!(line.point.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(line.direction.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(line.direction.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reciprocal_lines_are_mirrored() {
        let agent_a = make_agent(0, Point::new(-2.0, 0.0), Vector2D::new(1.0, 0.0), 0.5);
        let agent_b = make_agent(1, Point::new(2.0, 0.0), Vector2D::new(-1.0, 0.0), 0.5);

        let line_a = agent_orca_line(&agent_a, &agent_b, 0.25);
        let line_b = agent_orca_line(&agent_b, &agent_a, 0.25);

        assert_relative_eq!(line_a.point.x, -line_b.point.x, epsilon = 1e-12);
        assert_relative_eq!(line_a.point.y, -line_b.point.y, epsilon = 1e-12);
        assert_relative_eq!(line_a.direction.x, -line_b.direction.x, epsilon = 1e-12);
        assert_relative_eq!(line_a.direction.y, -line_b.direction.y, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_deadlock_breaks_laterally() {
        // Mirrored head-on agents: the tie-break nudge must produce opposite
        // lateral components while the committed velocities stay exact
        // negations of each other.
        let mut agent_a = make_agent(0, Point::new(-5.0, 0.0), Vector2D::zero(), 0.5);
        let mut agent_b = make_agent(1, Point::new(5.0, 0.0), Vector2D::zero(), 0.5);
        agent_a.pref_velocity = Vector2D::new(1.0, 0.0);
        agent_b.pref_velocity = Vector2D::new(-1.0, 0.0);

        let set = ObstacleSet::new();
        let velocity_a = compute_new_velocity(&agent_a, &[&agent_b], &[], &set, 0.25);
        let velocity_b = compute_new_velocity(&agent_b, &[&agent_a], &[], &set, 0.25);

        assert!(velocity_a.y > 0.0, "agent A should veer, got {:?}", velocity_a);
        assert_relative_eq!(velocity_a.x, -velocity_b.x, epsilon = 1e-12);
        assert_relative_eq!(velocity_a.y, -velocity_b.y, epsilon = 1e-12);
    }

    #[test]
    fn test_wall_constraint_takes_full_responsibility() {
        // Agent above a wall, moving straight at it. The wall's cut-off line
        // must absorb the entire velocity change (no reciprocal halving).
        let params = AgentParams {
            radius: 0.5,
            time_horizon_obst: 2.0,
            ..AgentParams::default()
        };
        let agent = Agent::new(0, Point::new(0.0, 2.0), Vector2D::new(0.0, -1.0), params);

        let mut set = ObstacleSet::new();
        set.add_polyline(&[Point::new(-5.0, 0.0), Point::new(5.0, 0.0)])
            .unwrap();
        // Vertex 1 starts the segment whose right side faces the agent.
        let lines = obstacle_orca_lines(&agent, &[(4.0, 1)], &set);

        assert_eq!(lines.len(), 1);
        assert_relative_eq!(lines[0].direction.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(lines[0].direction.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(lines[0].point.y, -0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_neighbor_segments_yield_one_constraint() {
        // A wall cut in two by an index split: the second half is already
        // covered by the first half's constraint.
        let params = AgentParams {
            radius: 0.5,
            time_horizon_obst: 2.0,
            ..AgentParams::default()
        };
        let agent = Agent::new(0, Point::new(0.0, 2.0), Vector2D::new(0.0, -1.0), params);

        let mut set = ObstacleSet::new();
        set.add_polyline(&[Point::new(5.0, 0.0), Point::new(-5.0, 0.0)])
            .unwrap();
        let mid = set.split_segment(0, Point::new(0.0, 0.0));

        let lines = obstacle_orca_lines(&agent, &[(4.0, 0), (4.0, mid)], &set);
        assert_eq!(lines.len(), 1, "collinear halves must not double-constrain");
    }

    #[test]
    fn test_crowded_agent_stays_speed_bounded() {
        // Surrounded on all sides at close range: whatever the solver does,
        // the committed velocity respects the speed limit.
        let mut agent = make_agent(0, Point::new(0.0, 0.0), Vector2D::zero(), 0.5);
        agent.pref_velocity = Vector2D::new(2.0, 0.0);

        let ring: Vec<Agent> = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::PI / 3.0;
                make_agent(
                    i + 1,
                    Point::new(1.05 * angle.cos(), 1.05 * angle.sin()),
                    Vector2D::zero(),
                    0.5,
                )
            })
            .collect();
        let refs: Vec<&Agent> = ring.iter().collect();

        let set = ObstacleSet::new();
        let result = compute_new_velocity(&agent, &refs, &[], &set, 0.25);
        assert!(result.x.is_finite() && result.y.is_finite());
        assert!(result.magnitude() <= agent.params.max_speed + EPSILON);
    }
}
