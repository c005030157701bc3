use std::collections::{HashMap, HashSet};

use crate::error::{Result, TopologyError};
use crate::math::Voxel;

use super::network::canonical_key;
use super::{Adjacency, Intersection, Line, LineEnd, LineId, Network, NodeId};

/// Splits a skeleton adjacency graph into lines and intersections.
///
/// Nodes are visited in descending order of degree (ties by ascending id).
/// Every node of degree 3 or more becomes an [`Intersection`] and a chain is
/// walked from each of its neighbours. Chains not reached from any junction
/// are then walked from their lowest-id endpoint, and, on request, closed
/// loops of degree-2 nodes from their lowest-id node.
///
/// Chains holding the same node ids are kept once, whatever the direction
/// or starting node they were discovered from.
pub struct TopologyParser<'a, G: Adjacency> {
    graph: &'a G,
}

/// Mutable state of one parse.
struct ParseState {
    network: Network,
    keys: HashMap<Vec<NodeId>, LineId>,
    claimed: HashSet<NodeId>,
    duplicates: usize,
}

/// A chain walked from a seed node.
struct Chain {
    nodes: Vec<NodeId>,
    end: LineEnd,
}

impl<'a, G: Adjacency> TopologyParser<'a, G> {
    /// Creates a new parser over `graph`.
    #[must_use]
    pub fn new(graph: &'a G) -> Self {
        Self { graph }
    }

    /// Parses the graph.
    ///
    /// Isolated pixels (degree 0) are ignored. Closed loops without any
    /// junction are only extracted when `include_orphan_loops` is set.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::EmptyTopology` if the graph has no nodes.
    pub fn parse(&self, include_orphan_loops: bool) -> Result<Network> {
        if self.graph.is_empty() {
            return Err(TopologyError::EmptyTopology.into());
        }

        let mut order = self.graph.node_ids();
        // Stable: equal degrees keep ascending ids.
        order.sort_by_key(|&id| std::cmp::Reverse(self.graph.degree(id)));

        let mut state = ParseState {
            network: Network::new(),
            keys: HashMap::new(),
            claimed: HashSet::new(),
            duplicates: 0,
        };

        for &node in order.iter().filter(|&&id| self.is_junction(id)) {
            self.parse_intersection(node, &mut state)?;
        }

        for &node in order.iter().filter(|&&id| self.graph.degree(id) == 1) {
            if state.claimed.contains(&node) {
                continue;
            }
            let chain = self.walk(None, node)?;
            self.record(chain.nodes, LineEnd::Endpoint, chain.end, &mut state)?;
        }

        if include_orphan_loops {
            for &node in order.iter().filter(|&&id| self.graph.degree(id) == 2) {
                if state.claimed.contains(&node) {
                    continue;
                }
                let chain = self.walk(None, node)?;
                let start = if chain.end == LineEnd::Loop {
                    LineEnd::Loop
                } else {
                    LineEnd::Endpoint
                };
                self.record(chain.nodes, start, chain.end, &mut state)?;
            }
        }

        tracing::debug!(
            lines = state.network.line_count(),
            intersections = state.network.intersection_count(),
            duplicates = state.duplicates,
            "parsed skeleton topology"
        );
        Ok(state.network)
    }

    fn is_junction(&self, id: NodeId) -> bool {
        self.graph.degree(id) >= 3
    }

    fn position(&self, id: NodeId) -> Result<Voxel> {
        Ok(self
            .graph
            .coordinate(id)
            .ok_or(TopologyError::NodeNotFound(id))?)
    }

    fn junction_end(&self, id: NodeId) -> Result<LineEnd> {
        Ok(LineEnd::Intersection {
            node: id,
            position: self.position(id)?,
        })
    }

    fn parse_intersection(&self, node: NodeId, state: &mut ParseState) -> Result<()> {
        let start = self.junction_end(node)?;
        let neighbors = self.graph.neighbors(node).to_vec();
        let mut lines = Vec::with_capacity(neighbors.len());

        for &next in &neighbors {
            let id = if self.is_junction(next) {
                // Two junctions touching directly: the line is the link itself.
                let end = self.junction_end(next)?;
                self.record(vec![node, next], start, end, state)?
            } else {
                let chain = self.walk(Some(node), next)?;
                self.record(chain.nodes, start, chain.end, state)?
            };
            lines.push(id);
        }

        state.network.add_intersection(Intersection {
            node,
            position: self.position(node)?,
            neighbors,
            lines,
        });
        Ok(())
    }

    /// Follows the chain starting at `first`, coming from `prev`, until it
    /// reaches a junction, a dead end, or a node it already holds.
    fn walk(&self, prev: Option<NodeId>, first: NodeId) -> Result<Chain> {
        let mut nodes = vec![first];
        let mut visited = HashSet::from([first]);
        let mut prev = prev;
        let mut current = first;

        let end = loop {
            let next = self
                .graph
                .neighbors(current)
                .iter()
                .copied()
                .find(|&n| Some(n) != prev);
            let Some(next) = next else {
                break LineEnd::Endpoint;
            };
            if self.is_junction(next) {
                break self.junction_end(next)?;
            }
            if !visited.insert(next) {
                break LineEnd::Loop;
            }
            nodes.push(next);
            prev = Some(current);
            current = next;
        };

        Ok(Chain { nodes, end })
    }

    /// Adds a line unless a line with the same node ids exists; returns the
    /// id of the retained line either way.
    fn record(
        &self,
        nodes: Vec<NodeId>,
        start: LineEnd,
        end: LineEnd,
        state: &mut ParseState,
    ) -> Result<LineId> {
        let key = canonical_key(&nodes);
        if let Some(&existing) = state.keys.get(&key) {
            state.duplicates += 1;
            tracing::trace!(first = %nodes[0], "dropped duplicate chain");
            return Ok(existing);
        }

        let points = nodes
            .iter()
            .map(|&id| self.position(id))
            .collect::<Result<Vec<_>>>()?;
        state.claimed.extend(nodes.iter().copied());
        let id = state.network.add_line(Line {
            nodes,
            points,
            start,
            end,
        });
        state.keys.insert(key, id);
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::raster::Raster;
    use crate::topology::{AdjacencyGraph, SparseAdjacency};

    fn parse_ascii(text: &str, orphans: bool) -> Network {
        let raster = Raster::from_ascii(text).unwrap();
        let graph = AdjacencyGraph::from_raster(&raster);
        TopologyParser::new(&graph).parse(orphans).unwrap()
    }

    fn line_lengths(net: &Network) -> Vec<usize> {
        let mut v: Vec<usize> = net.lines().map(|(_, l)| l.len()).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn straight_run_is_one_line() {
        let net = parse_ascii("#######\n", false);
        assert_eq!(net.intersection_count(), 0);
        assert_eq!(line_lengths(&net), vec![7]);
        let (_, line) = net.lines().next().unwrap();
        assert_eq!(line.start, LineEnd::Endpoint);
        assert_eq!(line.end, LineEnd::Endpoint);
        assert_eq!(line.points[0], Voxel::new(0, 0, 0));
        assert_eq!(line.points[6], Voxel::new(6, 0, 0));
    }

    #[test]
    fn cross_has_one_intersection_and_four_arms() {
        let net = parse_ascii(
            "..#..\n\
             ..#..\n\
             #####\n\
             ..#..\n\
             ..#..\n",
            false,
        );
        assert_eq!(net.intersection_count(), 1);
        assert_eq!(line_lengths(&net), vec![2, 2, 2, 2]);

        let (_, centre) = net.intersections().next().unwrap();
        assert_eq!(centre.position, Voxel::new(2, 0, 2));
        assert_eq!(centre.neighbors.len(), 4);
        assert_eq!(centre.lines.len(), 4);

        for (_, line) in net.lines() {
            assert_eq!(
                line.start,
                LineEnd::Intersection {
                    node: centre.node,
                    position: centre.position
                }
            );
            assert_eq!(line.end, LineEnd::Endpoint);
            // Runs from the centre's neighbour out to the tip.
            let first = line.points[0] - centre.position;
            assert_eq!(first.abs().sum(), 1);
            let tip = line.points[1] - centre.position;
            assert_eq!(tip.abs().sum(), 2);
        }
    }

    #[test]
    fn shared_bridge_is_kept_once() {
        let net = parse_ascii(
            "#...#\n\
             #...#\n\
             #####\n\
             #...#\n\
             #...#\n",
            false,
        );
        assert_eq!(net.intersection_count(), 2);
        assert_eq!(line_lengths(&net), vec![2, 2, 2, 2, 3]);

        let bridges: Vec<Vec<LineId>> = net
            .intersections()
            .map(|(_, i)| {
                i.lines
                    .iter()
                    .copied()
                    .filter(|&l| net.line(l).unwrap().len() == 3)
                    .collect()
            })
            .collect();
        assert_eq!(bridges[0].len(), 1);
        assert_eq!(bridges[0], bridges[1]);
    }

    #[test]
    fn adjacent_junctions_share_a_direct_line() {
        let coordinates = (0..6).map(|x| Voxel::new(x, 0, 0)).collect();
        let edges = [(0, 1), (0, 2), (0, 3), (1, 4), (1, 5)].map(|(a, b)| (NodeId(a), NodeId(b)));
        let graph = AdjacencyGraph::from_edges(coordinates, &edges).unwrap();
        let net = TopologyParser::new(&graph).parse(false).unwrap();

        assert_eq!(net.intersection_count(), 2);
        assert_eq!(net.line_count(), 5);
        let direct: Vec<&Line> = net.lines().map(|(_, l)| l).filter(|l| l.len() == 2).collect();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].canonical_key(), vec![NodeId(0), NodeId(1)]);
        assert!(matches!(direct[0].end, LineEnd::Intersection { node: NodeId(1), .. }));
    }

    #[test]
    fn loop_through_a_junction_is_kept_once() {
        let coordinates = (0..5).map(|x| Voxel::new(x, 0, 0)).collect();
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (0, 4)].map(|(a, b)| (NodeId(a), NodeId(b)));
        let graph = AdjacencyGraph::from_edges(coordinates, &edges).unwrap();
        let net = TopologyParser::new(&graph).parse(false).unwrap();

        assert_eq!(net.intersection_count(), 1);
        assert_eq!(line_lengths(&net), vec![1, 3]);
        let ring = net.lines().map(|(_, l)| l).find(|l| l.len() == 3).unwrap();
        assert!(matches!(ring.start, LineEnd::Intersection { node: NodeId(0), .. }));
        assert!(matches!(ring.end, LineEnd::Intersection { node: NodeId(0), .. }));
    }

    #[test]
    fn orphan_loop_needs_the_flag() {
        let ring = "####\n\
                    #..#\n\
                    #..#\n\
                    ####\n";
        let without = parse_ascii(ring, false);
        assert!(without.is_empty());

        let with = parse_ascii(ring, true);
        assert_eq!(with.intersection_count(), 0);
        assert_eq!(line_lengths(&with), vec![12]);
        let (id, line) = with.lines().next().unwrap();
        assert!(line.is_loop());
        assert_eq!(line.end, LineEnd::Loop);
        assert_eq!(with.waypoints(id).unwrap().len(), 13);
    }

    #[test]
    fn isolated_pixels_are_ignored() {
        let net = parse_ascii("#.#\n", true);
        assert!(net.is_empty());
    }

    #[test]
    fn empty_graph_is_an_error() {
        let graph = AdjacencyGraph::from_raster(&Raster::new(3, 1, 3));
        let err = TopologyParser::new(&graph).parse(false);
        assert!(matches!(
            err,
            Err(crate::RoadweaveError::Topology(TopologyError::EmptyTopology))
        ));
    }

    #[test]
    fn sparse_graph_parses_like_dense() {
        let coordinates = [(10, 0), (20, 1), (30, 2), (40, 3)]
            .into_iter()
            .map(|(id, x)| (NodeId(id), Voxel::new(x, 0, 0)))
            .collect();
        let rows = [NodeId(10), NodeId(20), NodeId(30)];
        let cols = [NodeId(20), NodeId(30), NodeId(40)];
        let graph = SparseAdjacency::from_coo(coordinates, &rows, &cols).unwrap();
        let net = TopologyParser::new(&graph).parse(false).unwrap();

        assert_eq!(net.intersection_count(), 0);
        let (_, line) = net.lines().next().unwrap();
        assert_eq!(line.nodes, vec![NodeId(10), NodeId(20), NodeId(30), NodeId(40)]);
    }

    #[test]
    fn diagonal_arms_meet_at_one_junction() {
        let net = parse_ascii(
            "#...#\n\
             .#.#.\n\
             ..#..\n\
             ..#..\n\
             ..#..\n",
            false,
        );
        assert_eq!(net.intersection_count(), 1);
        assert_eq!(line_lengths(&net), vec![2, 2, 2]);
        let (_, junction) = net.intersections().next().unwrap();
        assert_eq!(junction.position, Voxel::new(2, 0, 2));
    }
}
