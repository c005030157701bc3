use slotmap::SlotMap;

use crate::error::TopologyError;
use crate::math::{voxel_to_point, Point3, Voxel};

use super::NodeId;

slotmap::new_key_type! {
    /// Unique identifier for a line in a [`Network`].
    pub struct LineId;
}

slotmap::new_key_type! {
    /// Unique identifier for an intersection in a [`Network`].
    pub struct IntersectionId;
}

/// What bounds one end of a [`Line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    /// The chain stops next to (or, for direct links, at) a junction node.
    Intersection { node: NodeId, position: Voxel },
    /// A degree-1 pixel.
    Endpoint,
    /// The chain closes on itself without touching a junction.
    Loop,
}

/// A maximal chain of skeleton pixels between junctions and/or endpoints.
#[derive(Debug, Clone)]
pub struct Line {
    /// Node ids in traversal order.
    pub nodes: Vec<NodeId>,
    /// Grid positions, parallel to `nodes`.
    pub points: Vec<Voxel>,
    pub start: LineEnd,
    pub end: LineEnd,
}

impl Line {
    /// Number of nodes in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the chain has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` for orphan loops.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.start == LineEnd::Loop
    }

    /// Node ids sorted ascending. Two chains with the same key hold the same
    /// pixels, whatever their direction or starting point.
    #[must_use]
    pub fn canonical_key(&self) -> Vec<NodeId> {
        canonical_key(&self.nodes)
    }
}

pub(crate) fn canonical_key(nodes: &[NodeId]) -> Vec<NodeId> {
    let mut key = nodes.to_vec();
    key.sort_unstable();
    key
}

/// A skeleton node with three or more neighbours.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub node: NodeId,
    pub position: Voxel,
    /// Immediate neighbours: the first step of each radiating line.
    pub neighbors: Vec<NodeId>,
    /// Lines radiating from this node, one per neighbour.
    pub lines: Vec<LineId>,
}

/// The lines and intersections extracted from one skeleton.
#[derive(Debug, Default)]
pub struct Network {
    lines: SlotMap<LineId, Line>,
    intersections: SlotMap<IntersectionId, Intersection>,
}

impl Network {
    /// Creates a new, empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_line(&mut self, line: Line) -> LineId {
        self.lines.insert(line)
    }

    pub(crate) fn add_intersection(&mut self, intersection: Intersection) -> IntersectionId {
        self.intersections.insert(intersection)
    }

    /// Returns the line, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in this network.
    pub fn line(&self, id: LineId) -> Result<&Line, TopologyError> {
        self.lines
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("line".into()))
    }

    /// Returns the intersection, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the intersection is not in this network.
    pub fn intersection(&self, id: IntersectionId) -> Result<&Intersection, TopologyError> {
        self.intersections
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("intersection".into()))
    }

    /// Iterates over lines in discovery order.
    pub fn lines(&self) -> impl Iterator<Item = (LineId, &Line)> {
        self.lines.iter()
    }

    /// Iterates over intersections in discovery order.
    pub fn intersections(&self) -> impl Iterator<Item = (IntersectionId, &Intersection)> {
        self.intersections.iter()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.intersections.is_empty()
    }

    /// Waypoints for building a road along `id`.
    ///
    /// Junction centres bounding the line are attached at its ends so
    /// adjacent roads meet; orphan loops repeat their first point to close.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in this network.
    pub fn waypoints(&self, id: LineId) -> Result<Vec<Point3>, TopologyError> {
        let line = self.line(id)?;
        let mut out = Vec::with_capacity(line.len() + 2);

        if let LineEnd::Intersection { node, position } = line.start {
            if line.nodes.first() != Some(&node) {
                out.push(voxel_to_point(&position));
            }
        }
        out.extend(line.points.iter().map(voxel_to_point));
        match line.end {
            LineEnd::Intersection { node, position } if line.nodes.last() != Some(&node) => {
                out.push(voxel_to_point(&position));
            }
            LineEnd::Loop => {
                if let Some(first) = line.points.first() {
                    out.push(voxel_to_point(first));
                }
            }
            _ => {}
        }
        Ok(out)
    }
}
