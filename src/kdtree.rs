//! # Spatial Indexing
//!
//! Two independent trees keep neighbor lookups sub-linear:
//!
//! - **AgentKdTree**: a balanced k-d tree over a snapshot of agent
//!   positions, rebuilt from scratch every step and immutable afterwards.
//! - **ObstacleKdTree**: a binary partition over obstacle segments, built
//!   once per obstacle-set change. Segments straddling a split line are cut
//!   in two at build time, which appends vertices to the obstacle arena.
//!
//! All range tests compare squared distances. Neighbor candidates at equal
//! distance are ordered by entity index, so two runs over the same snapshot
//! always see identical neighbor sets.

use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;

use crate::obstacle::ObstacleSet;
use crate::structs::{dist_sq_point_segment, left_of, Point, EPSILON};

/// Buckets below this size are stored as leaves.
const MAX_LEAF_SIZE: usize = 10;

#[derive(Debug, Clone)]
struct AgentTreeNode {
    begin: usize,
    end: usize,
    left: Option<usize>,
    right: Option<usize>,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

/// K-d tree over `(position, agent slot)` entries.
#[derive(Debug, Default)]
pub struct AgentKdTree {
    entries: Vec<(Point, usize)>,
    nodes: Vec<AgentTreeNode>,
    root: Option<usize>,
}

impl AgentKdTree {
    /// Consumes a snapshot of agent positions and returns a tree ready for
    /// queries.
    pub fn build(mut entries: Vec<(Point, usize)>) -> Self {
        let mut nodes = Vec::new();
        let len = entries.len();
        let root = if len == 0 {
            None
        } else {
            Some(build_agent_tree_recursive(&mut entries, 0, len, &mut nodes))
        };
        AgentKdTree {
            entries,
            nodes,
            root,
        }
    }

    /// Returns up to `max_neighbors` entries within `range_sq` of `point`,
    /// sorted ascending by `(squared distance, slot)`. The entry whose slot
    /// equals `skip` is excluded, so an agent can query around itself.
    pub fn query_neighbors(
        &self,
        point: Point,
        range_sq: f64,
        max_neighbors: usize,
        skip: Option<usize>,
    ) -> Vec<(f64, usize)> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        if max_neighbors == 0 {
            return Vec::new();
        }

        let mut heap: PriorityQueue<usize, (OrderedFloat<f64>, usize)> = PriorityQueue::new();
        let mut range_sq = range_sq;
        self.query_recursive(root, point, skip, max_neighbors, &mut range_sq, &mut heap);

        let mut result: Vec<(f64, usize)> = heap
            .into_iter()
            .map(|(slot, (dist, _))| (dist.into_inner(), slot))
            .collect();
        result.sort_by_key(|&(dist, slot)| (OrderedFloat(dist), slot));
        result
    }

    fn query_recursive(
        &self,
        node_index: usize,
        point: Point,
        skip: Option<usize>,
        max_neighbors: usize,
        range_sq: &mut f64,
        heap: &mut PriorityQueue<usize, (OrderedFloat<f64>, usize)>,
    ) {
        let node = &self.nodes[node_index];

        let (Some(left), Some(right)) = (node.left, node.right) else {
            for &(position, slot) in &self.entries[node.begin..node.end] {
                if Some(slot) == skip {
                    continue;
                }
                let dist_sq = point.distance_sq(&position);
                if dist_sq <= *range_sq {
                    heap.push(slot, (OrderedFloat(dist_sq), slot));
                    if heap.len() > max_neighbors {
                        heap.pop();
                    }
                    if heap.len() == max_neighbors {
                        if let Some((_, &(worst, _))) = heap.peek() {
                            *range_sq = worst.into_inner();
                        }
                    }
                }
            }
            return;
        };

        let dist_left = self.dist_sq_to_box(left, point);
        let dist_right = self.dist_sq_to_box(right, point);

        let (near, near_dist, far, far_dist) = if dist_left < dist_right {
            (left, dist_left, right, dist_right)
        } else {
            (right, dist_right, left, dist_left)
        };
        if near_dist <= *range_sq {
            self.query_recursive(near, point, skip, max_neighbors, range_sq, heap);
            if far_dist <= *range_sq {
                self.query_recursive(far, point, skip, max_neighbors, range_sq, heap);
            }
        }
    }

    fn dist_sq_to_box(&self, node_index: usize, point: Point) -> f64 {
        let node = &self.nodes[node_index];
        let dx = (node.min_x - point.x).max(0.0) + (point.x - node.max_x).max(0.0);
        let dy = (node.min_y - point.y).max(0.0) + (point.y - node.max_y).max(0.0);
        dx * dx + dy * dy
    }
}

fn build_agent_tree_recursive(
    entries: &mut Vec<(Point, usize)>,
    begin: usize,
    end: usize,
    nodes: &mut Vec<AgentTreeNode>,
) -> usize {
    let mut min_x = entries[begin].0.x;
    let mut max_x = min_x;
    let mut min_y = entries[begin].0.y;
    let mut max_y = min_y;
    for &(position, _) in &entries[begin + 1..end] {
        min_x = min_x.min(position.x);
        max_x = max_x.max(position.x);
        min_y = min_y.min(position.y);
        max_y = max_y.max(position.y);
    }

    let node_index = nodes.len();
    nodes.push(AgentTreeNode {
        begin,
        end,
        left: None,
        right: None,
        min_x,
        max_x,
        min_y,
        max_y,
    });

    if end - begin > MAX_LEAF_SIZE {
        // Split on the axis with the larger spread, at its midpoint.
        let is_vertical = max_x - min_x > max_y - min_y;
        let split_value = if is_vertical {
            0.5 * (max_x + min_x)
        } else {
            0.5 * (max_y + min_y)
        };
        let coord = |p: &Point| if is_vertical { p.x } else { p.y };

        let mut left = begin;
        let mut right = end;
        while left < right {
            while left < right && coord(&entries[left].0) < split_value {
                left += 1;
            }
            while right > left && coord(&entries[right - 1].0) >= split_value {
                right -= 1;
            }
            if left < right {
                entries.swap(left, right - 1);
                left += 1;
                right -= 1;
            }
        }
        if left == begin {
            // All entries coincide at the split value; force progress.
            left += 1;
        }

        let left_child = build_agent_tree_recursive(entries, begin, left, nodes);
        let right_child = build_agent_tree_recursive(entries, left, end, nodes);
        nodes[node_index].left = Some(left_child);
        nodes[node_index].right = Some(right_child);
    }

    node_index
}

#[derive(Debug, Clone)]
struct ObstacleTreeNode {
    vertex: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Binary partition over obstacle segments.
#[derive(Debug, Default)]
pub struct ObstacleKdTree {
    nodes: Vec<ObstacleTreeNode>,
    root: Option<usize>,
}

impl ObstacleKdTree {
    pub fn new() -> Self {
        ObstacleKdTree {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Builds the partition over every segment currently in `set`. Segments
    /// crossing a chosen split line are divided, growing the arena, which is
    /// why the set is taken mutably.
    pub fn build(set: &mut ObstacleSet) -> Self {
        let mut nodes = Vec::new();
        let ids: Vec<usize> = (0..set.len()).collect();
        let root = build_obstacle_tree_recursive(ids, set, &mut nodes);
        ObstacleKdTree { nodes, root }
    }

    /// Returns segments (by start-vertex index) whose distance to `position`
    /// is within `range_sq` and which face the query point, sorted ascending
    /// by `(squared distance, vertex index)`.
    pub fn query_neighbors(
        &self,
        set: &ObstacleSet,
        position: Point,
        range_sq: f64,
    ) -> Vec<(f64, usize)> {
        let mut result = Vec::new();
        self.query_recursive(self.root, set, position, range_sq, &mut result);
        result.sort_by_key(|&(dist, vertex)| (OrderedFloat(dist), vertex));
        result
    }

    fn query_recursive(
        &self,
        node: Option<usize>,
        set: &ObstacleSet,
        position: Point,
        range_sq: f64,
        out: &mut Vec<(f64, usize)>,
    ) {
        let Some(index) = node else {
            return;
        };
        let node = &self.nodes[index];
        let (p1, p2) = set.segment(node.vertex);
        let agent_left = left_of(p1, p2, position);

        let (near, far) = if agent_left >= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        self.query_recursive(near, set, position, range_sq, out);

        let dist_sq_line = agent_left * agent_left / (p2 - p1).magnitude_sq();
        if dist_sq_line < range_sq {
            if agent_left < 0.0 {
                // The segment is only an obstacle when seen from its right.
                let dist_sq = dist_sq_point_segment(p1, p2, position);
                if dist_sq < range_sq {
                    out.push((dist_sq, node.vertex));
                }
            }
            self.query_recursive(far, set, position, range_sq, out);
        }
    }

    /// Whether `q1` and `q2` are mutually visible with clearance `radius`.
    pub fn query_visibility(&self, set: &ObstacleSet, q1: Point, q2: Point, radius: f64) -> bool {
        self.visibility_recursive(self.root, set, q1, q2, radius)
    }

    fn visibility_recursive(
        &self,
        node: Option<usize>,
        set: &ObstacleSet,
        q1: Point,
        q2: Point,
        radius: f64,
    ) -> bool {
        let Some(index) = node else {
            return true;
        };
        let node = &self.nodes[index];
        let (p1, p2) = set.segment(node.vertex);

        let q1_left = left_of(p1, p2, q1);
        let q2_left = left_of(p1, p2, q2);
        let inv_length = 1.0 / (p2 - p1).magnitude_sq();
        let radius_sq = radius * radius;

        if q1_left >= 0.0 && q2_left >= 0.0 {
            self.visibility_recursive(node.left, set, q1, q2, radius)
                && ((q1_left * q1_left * inv_length >= radius_sq
                    && q2_left * q2_left * inv_length >= radius_sq)
                    || self.visibility_recursive(node.right, set, q1, q2, radius))
        } else if q1_left <= 0.0 && q2_left <= 0.0 {
            self.visibility_recursive(node.right, set, q1, q2, radius)
                && ((q1_left * q1_left * inv_length >= radius_sq
                    && q2_left * q2_left * inv_length >= radius_sq)
                    || self.visibility_recursive(node.left, set, q1, q2, radius))
        } else {
            // The query endpoints straddle the segment's line: the segment
            // itself must clear the sight line and both subtrees must agree.
            let p1_left = left_of(q1, q2, p1);
            let p2_left = left_of(q1, q2, p2);
            let inv_length_q = 1.0 / (q2 - q1).magnitude_sq();

            p1_left * p2_left >= 0.0
                && p1_left * p1_left * inv_length_q > radius_sq
                && p2_left * p2_left * inv_length_q > radius_sq
                && self.visibility_recursive(node.left, set, q1, q2, radius)
                && self.visibility_recursive(node.right, set, q1, q2, radius)
        }
    }
}

fn build_obstacle_tree_recursive(
    ids: Vec<usize>,
    set: &mut ObstacleSet,
    nodes: &mut Vec<ObstacleTreeNode>,
) -> Option<usize> {
    if ids.is_empty() {
        return None;
    }

    // Pick the segment whose line splits the rest most evenly, breaking
    // ties toward fewer cut segments.
    let mut optimal = 0;
    let mut min_left = ids.len();
    let mut min_right = ids.len();

    for (candidate, &i1) in ids.iter().enumerate() {
        let mut left_size = 0usize;
        let mut right_size = 0usize;
        let (pi1, pi2) = set.segment(i1);

        for (other, &j1) in ids.iter().enumerate() {
            if other == candidate {
                continue;
            }
            let (pj1, pj2) = set.segment(j1);
            let j1_left = left_of(pi1, pi2, pj1);
            let j2_left = left_of(pi1, pi2, pj2);

            if j1_left >= -EPSILON && j2_left >= -EPSILON {
                left_size += 1;
            } else if j1_left <= EPSILON && j2_left <= EPSILON {
                right_size += 1;
            } else {
                left_size += 1;
                right_size += 1;
            }

            if (left_size.max(right_size), left_size.min(right_size))
                >= (min_left.max(min_right), min_left.min(min_right))
            {
                break;
            }
        }

        if (left_size.max(right_size), left_size.min(right_size))
            < (min_left.max(min_right), min_left.min(min_right))
        {
            min_left = left_size;
            min_right = right_size;
            optimal = candidate;
        }
    }

    let split_id = ids[optimal];
    let (pi1, pi2) = set.segment(split_id);
    let mut left_ids = Vec::with_capacity(min_left);
    let mut right_ids = Vec::with_capacity(min_right);

    for (other, &j1) in ids.iter().enumerate() {
        if other == optimal {
            continue;
        }
        let (pj1, pj2) = set.segment(j1);
        let j1_left = left_of(pi1, pi2, pj1);
        let j2_left = left_of(pi1, pi2, pj2);

        if j1_left >= -EPSILON && j2_left >= -EPSILON {
            left_ids.push(j1);
        } else if j1_left <= EPSILON && j2_left <= EPSILON {
            right_ids.push(j1);
        } else {
            // The segment crosses the split line; cut it at the crossing.
            let t = (pi2 - pi1).det(&(pj1 - pi1)) / (pi2 - pi1).det(&(pj1 - pj2));
            let split_point = pj1 + (pj2 - pj1) * t;
            let new_id = set.split_segment(j1, split_point);

            if j1_left > 0.0 {
                left_ids.push(j1);
                right_ids.push(new_id);
            } else {
                right_ids.push(j1);
                left_ids.push(new_id);
            }
        }
    }

    let node_index = nodes.len();
    nodes.push(ObstacleTreeNode {
        vertex: split_id,
        left: None,
        right: None,
    });
    let left = build_obstacle_tree_recursive(left_ids, set, nodes);
    let right = build_obstacle_tree_recursive(right_ids, set, nodes);
    nodes[node_index].left = left;
    nodes[node_index].right = right;
    Some(node_index)
}
