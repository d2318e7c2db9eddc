//! # Incremental Linear Programming in Velocity Space
//!
//! Finds the velocity closest to a preferred velocity inside the
//! intersection of half-plane constraints and a maximum-speed disk. The 2D
//! program processes constraints one at a time: as long as the running
//! optimum satisfies the new constraint nothing changes; otherwise the new
//! optimum lies exactly on the new constraint's boundary and is found by a
//! 1D program along that line, clipped by the disk and all earlier
//! half-planes.
//!
//! When the 2D program is infeasible, a fallback program minimizes the
//! maximum amount by which the remaining constraints are violated.
//! Constraints derived from obstacles are never relaxed there, so in a
//! hopeless crowd an agent will brush other agents before it clips a wall.

use crate::structs::{OrcaLine, Vector2D, EPSILON};

/// Outcome of the 2D program.
#[derive(Debug, Clone, Copy)]
pub enum LinearProgram2dResult {
    /// All constraints hold; carries the optimal velocity.
    Feasible(Vector2D),
    /// No point satisfies the constraint at `index` together with its
    /// predecessors. `partial` is the optimum over the first `index`
    /// constraints only.
    Infeasible { index: usize, partial: Vector2D },
}

/// Computes the best velocity under all `lines` and the speed disk,
/// degrading to the violation-minimizing program when the constraints have
/// an empty intersection. `num_obstacle_lines` counts the obstacle-derived
/// prefix of `lines`, which the fallback keeps as hard constraints.
pub fn solve(
    lines: &[OrcaLine],
    num_obstacle_lines: usize,
    pref_velocity: Vector2D,
    max_speed: f64,
) -> Vector2D {
    match linear_program_2d(lines, max_speed, pref_velocity, false) {
        LinearProgram2dResult::Feasible(velocity) => velocity,
        LinearProgram2dResult::Infeasible { index, partial } => {
            linear_program_3d(lines, num_obstacle_lines, index, partial, max_speed)
        }
    }
}

/// Solves the 1D program on the boundary of constraint `line_no`: the
/// feasible parameter interval along the line is clipped by the speed disk
/// and by every earlier half-plane, then the interval point nearest the
/// optimization target is picked. Returns `None` when the interval is empty.
fn linear_program_1d(
    lines: &[OrcaLine],
    line_no: usize,
    radius: f64,
    opt_velocity: Vector2D,
    direction_opt: bool,
) -> Option<Vector2D> {
    let line = &lines[line_no];
    let dot_product = line.point.dot(&line.direction);
    let discriminant = dot_product * dot_product + radius * radius - line.point.magnitude_sq();

    if discriminant < 0.0 {
        // The speed disk does not reach this constraint's boundary.
        return None;
    }

    let sqrt_discriminant = discriminant.sqrt();
    let mut t_left = -dot_product - sqrt_discriminant;
    let mut t_right = -dot_product + sqrt_discriminant;

    for prev in &lines[..line_no] {
        let denominator = line.direction.det(&prev.direction);
        let numerator = prev.direction.det(&(line.point - prev.point));

        if denominator.abs() <= EPSILON {
            // The boundaries are parallel.
            if numerator < 0.0 {
                return None;
            }
            continue;
        }

        let t = numerator / denominator;
        if denominator >= 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }

        if t_left > t_right {
            return None;
        }
    }

    let t = if direction_opt {
        // Optimize direction: take the extreme point of the interval.
        if opt_velocity.dot(&line.direction) > 0.0 {
            t_right
        } else {
            t_left
        }
    } else {
        // Optimize closest point: project the target onto the line and clamp.
        let t = line.direction.dot(&(opt_velocity - line.point));
        t.clamp(t_left, t_right)
    };

    Some(line.point + line.direction * t)
}

/// Solves the 2D program incrementally. With `direction_opt` the target is a
/// unit direction to maximize along (used by the fallback program) instead
/// of a point to stay close to.
pub fn linear_program_2d(
    lines: &[OrcaLine],
    radius: f64,
    opt_velocity: Vector2D,
    direction_opt: bool,
) -> LinearProgram2dResult {
    let mut result = if direction_opt {
        // opt_velocity is a unit vector in this mode.
        opt_velocity * radius
    } else if opt_velocity.magnitude_sq() > radius * radius {
        opt_velocity.normalize() * radius
    } else {
        opt_velocity
    };

    for (i, line) in lines.iter().enumerate() {
        if line.direction.det(&(line.point - result)) > 0.0 {
            // The running optimum violates this constraint; the new optimum
            // is on its boundary or the program is infeasible.
            match linear_program_1d(lines, i, radius, opt_velocity, direction_opt) {
                Some(new_result) => result = new_result,
                None => {
                    return LinearProgram2dResult::Infeasible {
                        index: i,
                        partial: result,
                    }
                }
            }
        }
    }

    LinearProgram2dResult::Feasible(result)
}

/// Violation-minimizing fallback, entered when the 2D program failed at
/// `begin_line`. Walks the remaining constraints and, for each one more
/// violated than the current worst, maximizes the signed distance to it
/// subject to the obstacle prefix and the bisectors of the already-relaxed
/// agent constraints. The returned velocity stays inside the speed disk.
pub fn linear_program_3d(
    lines: &[OrcaLine],
    num_obstacle_lines: usize,
    begin_line: usize,
    partial: Vector2D,
    radius: f64,
) -> Vector2D {
    let mut result = partial;
    let mut distance = 0.0;

    for i in begin_line..lines.len() {
        if lines[i].direction.det(&(lines[i].point - result)) <= distance {
            continue;
        }

        // Obstacle constraints stay as they are.
        let mut proj_lines: Vec<OrcaLine> = lines[..num_obstacle_lines].to_vec();

        for j in num_obstacle_lines..i {
            let determinant = lines[i].direction.det(&lines[j].direction);

            let point = if determinant.abs() <= EPSILON {
                if lines[i].direction.dot(&lines[j].direction) > 0.0 {
                    // Same-direction parallel constraints are redundant here.
                    continue;
                }
                (lines[i].point + lines[j].point) * 0.5
            } else {
                let offset = lines[j].direction.det(&(lines[i].point - lines[j].point));
                lines[i].point + lines[i].direction * (offset / determinant)
            };

            let direction = (lines[j].direction - lines[i].direction).normalize();
            proj_lines.push(OrcaLine::new(point, direction));
        }

        // Maximize into the violated half-plane. On failure keep the
        // previous result, which satisfied the projected constraints up to
        // numerical precision.
        let opt_direction = lines[i].direction.perpendicular();
        if let LinearProgram2dResult::Feasible(new_result) =
            linear_program_2d(&proj_lines, radius, opt_direction, true)
        {
            result = new_result;
        }

        distance = lines[i].direction.det(&(lines[i].point - result));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(px: f64, py: f64, dx: f64, dy: f64) -> OrcaLine {
        OrcaLine::new(Vector2D::new(px, py), Vector2D::new(dx, dy))
    }

    #[test]
    fn test_no_constraints_returns_preference() {
        let result = solve(&[], 0, Vector2D::new(1.0, 0.5), 2.0);
        assert_eq!(result, Vector2D::new(1.0, 0.5));
    }

    #[test]
    fn test_no_constraints_clips_to_speed_disk() {
        let result = solve(&[], 0, Vector2D::new(6.0, 8.0), 5.0);
        assert_relative_eq!(result.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(result.y, 4.0, epsilon = 1e-12);
        assert_relative_eq!(result.magnitude(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_satisfied_constraint_leaves_preference() {
        // Feasible half-plane y >= -1; the preference already satisfies it.
        let lines = vec![line(0.0, -1.0, 1.0, 0.0)];
        let result = solve(&lines, 0, Vector2D::new(0.5, 0.5), 2.0);
        assert_eq!(result, Vector2D::new(0.5, 0.5));
    }

    #[test]
    fn test_violated_constraint_projects_onto_boundary() {
        // Feasible half-plane x <= 0.5 (line through (0.5, 0) pointing +y).
        let lines = vec![line(0.5, 0.0, 0.0, 1.0)];
        let result = solve(&lines, 0, Vector2D::new(1.0, 0.3), 2.0);
        assert_relative_eq!(result.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(result.y, 0.3, epsilon = 1e-9);
    }

    #[test]
    fn test_two_constraints_corner() {
        // x <= 0.5 and y <= 0.25, preference outside both: the optimum is
        // the corner.
        let lines = vec![line(0.5, 0.0, 0.0, 1.0), line(0.0, 0.25, -1.0, 0.0)];
        let result = solve(&lines, 0, Vector2D::new(1.0, 1.0), 2.0);
        assert_relative_eq!(result.x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(result.y, 0.25, epsilon = 1e-9);
    }

    #[test]
    fn test_boundary_clamped_to_speed_disk() {
        // Feasible half-plane y >= 0.8 with unit max speed: the closest
        // point to a preference pointing down-right lies on the circle.
        let lines = vec![line(0.0, 0.8, 1.0, 0.0)];
        let result = solve(&lines, 0, Vector2D::new(1.0, -1.0), 1.0);
        assert_relative_eq!(result.y, 0.8, epsilon = 1e-9);
        assert_relative_eq!(result.x, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_infeasible_pair_reports_failing_index() {
        // x >= 1 and x <= -1 cannot both hold.
        let lines = vec![line(1.0, 0.0, 0.0, -1.0), line(-1.0, 0.0, 0.0, 1.0)];
        match linear_program_2d(&lines, 2.0, Vector2D::new(2.0, 0.0), false) {
            LinearProgram2dResult::Infeasible { index, .. } => assert_eq!(index, 1),
            LinearProgram2dResult::Feasible(v) => panic!("expected infeasible, got {:?}", v),
        }
    }

    #[test]
    fn test_fallback_balances_opposing_constraints() {
        // The violation-minimizing compromise between x >= 1 and x <= -1 is
        // the axis between them.
        let lines = vec![line(1.0, 0.0, 0.0, -1.0), line(-1.0, 0.0, 0.0, 1.0)];
        let result = solve(&lines, 0, Vector2D::new(2.0, 0.0), 2.0);
        assert_relative_eq!(result.x, 0.0, epsilon = 1e-6);
        assert!(result.magnitude() <= 2.0 + EPSILON);
    }

    #[test]
    fn test_fallback_keeps_obstacle_constraint_hard() {
        // Obstacle line demands y <= -0.5; two conflicting agent lines force
        // the fallback. The result must still satisfy the obstacle line.
        let lines = vec![
            line(0.0, -0.5, -1.0, 0.0),
            line(1.0, 0.0, 0.0, -1.0),
            line(-1.0, 0.0, 0.0, 1.0),
        ];
        let result = solve(&lines, 1, Vector2D::new(0.0, 1.0), 2.0);
        assert!(
            result.y <= -0.5 + 1e-6,
            "obstacle constraint violated: {:?}",
            result
        );
    }

    #[test]
    fn test_result_never_exceeds_speed_limit() {
        // Heavily over-constrained: whatever comes out stays in the disk.
        let lines = vec![
            line(0.9, 0.0, 0.0, -1.0),
            line(-0.9, 0.0, 0.0, 1.0),
            line(0.0, 0.9, 1.0, 0.0),
            line(0.0, -0.9, -1.0, 0.0),
        ];
        let result = solve(&lines, 0, Vector2D::new(3.0, 3.0), 1.5);
        assert!(result.magnitude() <= 1.5 + 1e-6);
    }

    #[test]
    fn test_parallel_redundant_constraints() {
        // Two parallel constraints with the same feasible side: the tighter
        // one wins and the program stays feasible.
        let lines = vec![line(0.5, 0.0, 0.0, 1.0), line(0.3, 0.0, 0.0, 1.0)];
        let result = solve(&lines, 0, Vector2D::new(1.0, 0.0), 2.0);
        assert_relative_eq!(result.x, 0.3, epsilon = 1e-9);
    }
}
