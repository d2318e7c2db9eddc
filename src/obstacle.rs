//! Static obstacle storage.
//!
//! Obstacles are polylines whose vertices live in one shared arena. Each
//! vertex also represents the directed segment from itself to its `next`
//! vertex, which is the unit the spatial index and the constraint builder
//! operate on. Convexity relative to the neighboring segments is computed
//! once at registration time and drives corner handling during avoidance.

use crate::error::{Result, SimulationError};
use crate::structs::{left_of, Point, Vector2D};

/// One vertex of a registered obstacle, doubly linked by arena index.
#[derive(Debug, Clone)]
pub struct ObstacleVertex {
    pub point: Point,
    /// Unit direction toward the `next` vertex.
    pub unit_dir: Vector2D,
    /// Whether the corner at this vertex is convex as seen from the
    /// traversable side. Non-convex corners never define velocity-obstacle
    /// legs of their own.
    pub is_convex: bool,
    pub prev: usize,
    pub next: usize,
}

/// Arena of obstacle vertices shared by all registered polylines.
///
/// Vertices listed counterclockwise keep agents outside the enclosed region;
/// a clockwise bounding polygon keeps agents inside it. The spatial index
/// may append additional vertices when it splits segments during
/// construction, so the arena can grow past what was registered directly.
#[derive(Debug, Default)]
pub struct ObstacleSet {
    vertices: Vec<ObstacleVertex>,
}

impl ObstacleSet {
    pub fn new() -> Self {
        ObstacleSet {
            vertices: Vec::new(),
        }
    }

    /// Registers a polyline of at least two vertices and returns the arena
    /// index of its first vertex. The last vertex is linked back to the
    /// first, so a two-vertex polyline behaves as a free-standing wall
    /// segment blocking from both sides.
    pub fn add_polyline(&mut self, points: &[Point]) -> Result<usize> {
        if points.len() < 2 {
            return Err(SimulationError::DegenerateObstacle(points.len()));
        }
        for p in points {
            if !p.x.is_finite() {
                return Err(SimulationError::InvalidParameter {
                    name: "obstacle vertex x",
                    value: p.x,
                });
            }
            if !p.y.is_finite() {
                return Err(SimulationError::InvalidParameter {
                    name: "obstacle vertex y",
                    value: p.y,
                });
            }
        }

        let first = self.vertices.len();
        let count = points.len();
        for (i, &point) in points.iter().enumerate() {
            let index = first + i;
            let prev = if i == 0 { first + count - 1 } else { index - 1 };
            let next = if i == count - 1 { first } else { index + 1 };

            let next_point = points[(i + 1) % count];
            let unit_dir = (next_point - point).normalize();
            let is_convex = if count == 2 {
                true
            } else {
                let prev_point = points[(i + count - 1) % count];
                left_of(prev_point, point, next_point) >= 0.0
            };

            self.vertices.push(ObstacleVertex {
                point,
                unit_dir,
                is_convex,
                prev,
                next,
            });
        }

        Ok(first)
    }

    /// Inserts a vertex created by splitting the segment that starts at
    /// `before`, and returns its arena index. Used by the spatial index
    /// during construction; split points always sit on a segment interior
    /// and are therefore flat (convex) corners.
    pub(crate) fn split_segment(&mut self, before: usize, point: Point) -> usize {
        let index = self.vertices.len();
        let after = self.vertices[before].next;
        let unit_dir = self.vertices[before].unit_dir;

        self.vertices.push(ObstacleVertex {
            point,
            unit_dir,
            is_convex: true,
            prev: before,
            next: after,
        });
        self.vertices[before].next = index;
        self.vertices[after].prev = index;

        index
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn get(&self, index: usize) -> &ObstacleVertex {
        &self.vertices[index]
    }

    /// Endpoints of the directed segment starting at `index`.
    pub fn segment(&self, index: usize) -> (Point, Point) {
        let v = &self.vertices[index];
        (v.point, self.vertices[v.next].point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_polyline_rejects_single_vertex() {
        let mut set = ObstacleSet::new();
        let result = set.add_polyline(&[Point::new(0.0, 0.0)]);
        assert_eq!(result, Err(SimulationError::DegenerateObstacle(1)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_polyline_rejects_non_finite() {
        let mut set = ObstacleSet::new();
        let result = set.add_polyline(&[Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)]);
        assert!(result.is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_two_vertex_segment_links_and_convexity() {
        let mut set = ObstacleSet::new();
        let id = set
            .add_polyline(&[Point::new(0.0, 0.0), Point::new(4.0, 0.0)])
            .unwrap();
        assert_eq!(id, 0);
        assert_eq!(set.len(), 2);

        let v0 = set.get(0);
        let v1 = set.get(1);
        assert_eq!(v0.next, 1);
        assert_eq!(v0.prev, 1);
        assert_eq!(v1.next, 0);
        assert_eq!(v1.prev, 0);
        // Both directions are represented, so the wall blocks from each side.
        assert_eq!(v0.unit_dir, Vector2D::new(1.0, 0.0));
        assert_eq!(v1.unit_dir, Vector2D::new(-1.0, 0.0));
        assert!(v0.is_convex);
        assert!(v1.is_convex);
    }

    #[test]
    fn test_ccw_square_is_convex_everywhere() {
        let mut set = ObstacleSet::new();
        set.add_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();

        for i in 0..4 {
            assert!(set.get(i).is_convex, "vertex {} should be convex", i);
        }
        assert_eq!(set.get(3).next, 0);
        assert_eq!(set.get(0).prev, 3);
    }

    #[test]
    fn test_concave_corner_is_flagged() {
        // An L-shaped hexagon traversed counterclockwise has exactly one
        // reflex corner, at the inner elbow.
        let mut set = ObstacleSet::new();
        set.add_polyline(&[
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 2.0),
            Point::new(0.0, 2.0),
        ])
        .unwrap();

        let convex: Vec<bool> = (0..6).map(|i| set.get(i).is_convex).collect();
        assert_eq!(convex, vec![true, true, true, false, true, true]);
    }

    #[test]
    fn test_second_polyline_offsets_indices() {
        let mut set = ObstacleSet::new();
        set.add_polyline(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)])
            .unwrap();
        let id = set
            .add_polyline(&[Point::new(5.0, 5.0), Point::new(6.0, 5.0)])
            .unwrap();
        assert_eq!(id, 2);
        assert_eq!(set.get(2).next, 3);
        assert_eq!(set.get(3).next, 2);
    }

    #[test]
    fn test_split_segment_relinks() {
        let mut set = ObstacleSet::new();
        set.add_polyline(&[Point::new(0.0, 0.0), Point::new(4.0, 0.0)])
            .unwrap();

        let mid = set.split_segment(0, Point::new(2.0, 0.0));
        assert_eq!(mid, 2);
        assert_eq!(set.get(0).next, 2);
        assert_eq!(set.get(2).prev, 0);
        assert_eq!(set.get(2).next, 1);
        assert_eq!(set.get(1).prev, 2);
        assert_eq!(set.get(2).unit_dir, set.get(0).unit_dir);
        assert!(set.get(2).is_convex);

        let (a, b) = set.segment(0);
        assert_eq!(a, Point::new(0.0, 0.0));
        assert_eq!(b, Point::new(2.0, 0.0));
    }
}
