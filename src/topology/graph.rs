use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{Result, TopologyError};
use crate::math::Voxel;
use crate::raster::Raster;

/// Identifier of a skeleton pixel in an adjacency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read-only pixel adjacency.
///
/// Implementations are immutable after construction and symmetric: if `a`
/// lists `b` as a neighbour, `b` lists `a`.
pub trait Adjacency {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// All node ids in ascending order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Neighbours of `id` in ascending order; empty for unknown ids.
    fn neighbors(&self, id: NodeId) -> &[NodeId];

    /// Grid position of `id`.
    fn coordinate(&self, id: NodeId) -> Option<Voxel>;

    /// Number of neighbours of `id`.
    fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Returns `true` if the graph has no nodes.
    fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

/// Dense adjacency in compressed sparse row form.
///
/// Node ids are contiguous `0..n`. Built once from a skeleton raster (ids in
/// raster scan order) or from an explicit edge list.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    offsets: Vec<usize>,
    targets: Vec<NodeId>,
    coordinates: Vec<Voxel>,
}

impl AdjacencyGraph {
    /// Builds the adjacency of all foreground pixels of `raster`.
    ///
    /// Face neighbours are always adjacent. Diagonal neighbours are adjacent
    /// only when no foreground pixel lies on a shorter route between them, so
    /// a thinned staircase or the arm next to a junction stays a simple chain.
    /// An empty raster yields an empty graph.
    #[must_use]
    pub fn from_raster(raster: &Raster) -> Self {
        let mut node_at: HashMap<usize, NodeId> = HashMap::new();
        let mut coordinates = Vec::new();
        for v in raster.foreground() {
            if let Some(i) = raster.index(v.x, v.y, v.z) {
                node_at.insert(i, NodeId(coordinates.len()));
                coordinates.push(v);
            }
        }

        let mut offsets = Vec::with_capacity(coordinates.len() + 1);
        let mut targets = Vec::new();
        offsets.push(0);
        for v in &coordinates {
            let mut neighbors: Vec<NodeId> = NEIGHBOR_OFFSETS
                .iter()
                .filter(|d| is_linked(raster, v, d))
                .filter_map(|d| raster.index(v.x + d[0], v.y + d[1], v.z + d[2]))
                .filter_map(|i| node_at.get(&i).copied())
                .collect();
            neighbors.sort_unstable();
            targets.extend(neighbors);
            offsets.push(targets.len());
        }

        tracing::debug!(
            nodes = coordinates.len(),
            links = targets.len() / 2,
            "built skeleton adjacency"
        );

        Self {
            offsets,
            targets,
            coordinates,
        }
    }

    /// Builds a graph from node coordinates and undirected edges.
    ///
    /// Edges are symmetrized; duplicates and self-links are dropped.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::NodeNotFound` if an edge references an id
    /// outside `0..coordinates.len()`.
    pub fn from_edges(coordinates: Vec<Voxel>, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        let n = coordinates.len();
        let mut sets = vec![BTreeSet::new(); n];
        for &(a, b) in edges {
            for id in [a, b] {
                if id.0 >= n {
                    return Err(TopologyError::NodeNotFound(id).into());
                }
            }
            if a != b {
                sets[a.0].insert(b);
                sets[b.0].insert(a);
            }
        }

        let mut offsets = Vec::with_capacity(n + 1);
        let mut targets = Vec::new();
        offsets.push(0);
        for set in sets {
            targets.extend(set);
            offsets.push(targets.len());
        }
        Ok(Self {
            offsets,
            targets,
            coordinates,
        })
    }
}

impl Adjacency for AdjacencyGraph {
    fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        (0..self.coordinates.len()).map(NodeId).collect()
    }

    fn neighbors(&self, id: NodeId) -> &[NodeId] {
        if id.0 >= self.coordinates.len() {
            return &[];
        }
        &self.targets[self.offsets[id.0]..self.offsets[id.0 + 1]]
    }

    fn coordinate(&self, id: NodeId) -> Option<Voxel> {
        self.coordinates.get(id.0).copied()
    }
}

#[derive(Debug, Clone)]
struct SparseNode {
    coordinate: Voxel,
    neighbors: Vec<NodeId>,
}

/// Hash-map adjacency for graphs whose ids are not contiguous.
///
/// Built from coordinate-format (row, column) link pairs, the form a sparse
/// pixel graph is usually exported in.
#[derive(Debug, Clone, Default)]
pub struct SparseAdjacency {
    nodes: HashMap<NodeId, SparseNode>,
    ids: Vec<NodeId>,
}

impl SparseAdjacency {
    /// Builds the graph from node coordinates and parallel `rows`/`cols`
    /// link arrays.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidRaster` when the link arrays differ in
    /// length, or `TopologyError::NodeNotFound` when a link references a node
    /// without a coordinate.
    pub fn from_coo(
        coordinates: HashMap<NodeId, Voxel>,
        rows: &[NodeId],
        cols: &[NodeId],
    ) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(TopologyError::InvalidRaster(format!(
                "{} rows but {} columns",
                rows.len(),
                cols.len()
            ))
            .into());
        }

        let mut sets: HashMap<NodeId, BTreeSet<NodeId>> =
            coordinates.keys().map(|&id| (id, BTreeSet::new())).collect();
        for (&a, &b) in rows.iter().zip(cols) {
            if a == b {
                continue;
            }
            sets.get_mut(&a)
                .ok_or(TopologyError::NodeNotFound(a))?
                .insert(b);
            sets.get_mut(&b)
                .ok_or(TopologyError::NodeNotFound(b))?
                .insert(a);
        }

        let mut ids: Vec<NodeId> = coordinates.keys().copied().collect();
        ids.sort_unstable();
        let nodes = coordinates
            .into_iter()
            .map(|(id, coordinate)| {
                let neighbors = sets.remove(&id).unwrap_or_default().into_iter().collect();
                (
                    id,
                    SparseNode {
                        coordinate,
                        neighbors,
                    },
                )
            })
            .collect();
        Ok(Self { nodes, ids })
    }
}

impl Adjacency for SparseAdjacency {
    fn node_count(&self) -> usize {
        self.ids.len()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.ids.clone()
    }

    fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.neighbors.as_slice())
            .unwrap_or(&[])
    }

    fn coordinate(&self, id: NodeId) -> Option<Voxel> {
        self.nodes.get(&id).map(|n| n.coordinate)
    }
}

/// The 26 neighbour offsets of a voxel; planar rasters only reach the 8
/// with `dy == 0`.
const NEIGHBOR_OFFSETS: [[i64; 3]; 26] = {
    let mut out = [[0_i64; 3]; 26];
    let mut k = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    out[k] = [dx, dy, dz];
                    k += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    out
};

/// Whether the link `v -> v + d` is kept: the target is foreground and no
/// foreground voxel sits at a proper sub-step of `d`.
fn is_linked(raster: &Raster, v: &Voxel, d: &[i64; 3]) -> bool {
    if !raster.get(v.x + d[0], v.y + d[1], v.z + d[2]) {
        return false;
    }
    // Sub-steps keep a subset of the non-zero components of `d`.
    for mask in 1..7_u8 {
        let step = [
            if mask & 1 != 0 { d[0] } else { 0 },
            if mask & 2 != 0 { d[1] } else { 0 },
            if mask & 4 != 0 { d[2] } else { 0 },
        ];
        if step == [0, 0, 0] || step == *d {
            continue;
        }
        if raster.get(v.x + step[0], v.y + step[1], v.z + step[2]) {
            return false;
        }
    }
    true
}
