//! Extraction of a Kuratowski subdivision from a failed strong planarity test
//!
//! The child segments of the failing segment are bridges of its fundamental
//! cycle, made of the spine, the closing back arc and the tree path from the
//! low point down to the tail. Two bridges that overlap cannot lie on the
//! same side of that cycle, and the test fails exactly when their overlap
//! graph has an odd cycle. Such a cycle is searched among the segments of the
//! conflicting component, each of its bridges is cut down to the attachments
//! that witness its overlaps, and the subdivision is taken from the union of
//! the fundamental cycle and the reduced bridges.

mod linkage;

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use self::linkage::overlap;
use super::dfs::{EdgeType, PalmTree};
use super::segments::{SegmentId, SegmentTree};
use crate::attributes::{EdgeMap, NodeMap};
use crate::graph::{ArcId, EdgeId, IncidenceGraph, NodeId};
use crate::witness::subdivision;
use crate::PlanarityError;

/// Colours describing a Kuratowski subdivision of a biconnected graph
///
/// Edges with a colour form the subdivision, edges sharing a colour form one
/// path between branch nodes. Branch nodes of a `K_{3,3}` get colours `0` and
/// `2` for the two classes, branch nodes of a `K_5` get colour `1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinorColouring {
    pub node_colour: NodeMap<Option<usize>>,
    pub edge_colour: EdgeMap<Option<usize>>,
}

impl MinorColouring {
    /// Edges of the subdivision
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_colour
            .iter()
            .filter_map(|(e, colour)| colour.map(|_| e))
    }
}

/// Segments involved in a failed test
pub(crate) struct Conflict {
    pub father: Option<SegmentId>,
    pub seg: SegmentId,
    pub left: Vec<SegmentId>,
    pub right: Vec<SegmentId>,
    /// Child of `seg` that could not be placed, `None` if `seg` itself
    /// conflicts with the spine of `father`
    pub disturbing: Option<SegmentId>,
}

/// A bridge of the fundamental cycle
struct Bridge {
    /// Ascending preorder numbers
    attachments: Vec<usize>,
    body: Body,
}

enum Body {
    /// Child segment of the failing segment
    Segment(SegmentId),
    /// Rest of the cycle of the father segment, running from the tail of the
    /// failing segment to its low point
    Path(Vec<EdgeId>),
}

impl Bridge {
    fn segment(seg: SegmentId, attachments: &[usize]) -> Self {
        let mut attachments = attachments.to_vec();
        attachments.sort_unstable();
        attachments.dedup();
        Self {
            attachments,
            body: Body::Segment(seg),
        }
    }
}

impl Conflict {
    pub fn extract<G: IncidenceGraph>(
        self,
        graph: &G,
        tree: &PalmTree,
        segments: &SegmentTree,
        attachments: &[Vec<usize>],
    ) -> Result<MinorColouring, PlanarityError> {
        let walker = Walker {
            graph,
            tree,
            segments,
            by_preorder: tree.nodes_by_preorder(),
        };

        let disturbing = match self.disturbing {
            Some(child) => Bridge::segment(child, &attachments[child]),
            None => {
                let father = self
                    .father
                    .ok_or(PlanarityError::Internal("root segment conflicts with itself"))?;
                debug!(segment = self.seg, father, "segment conflicts with its father");
                walker.father_path(father, self.seg)?
            }
        };

        let mut bridges = vec![disturbing];
        bridges.extend(
            self.left
                .iter()
                .chain(&self.right)
                .map(|&s| Bridge::segment(s, &attachments[s])),
        );
        let cycle = match odd_cycle(&bridges) {
            Some(cycle) => cycle,
            None => {
                debug!(segment = self.seg, "no odd cycle in the component, trying all tested children");
                bridges.truncate(1);
                bridges.extend(
                    segments[self.seg]
                        .children
                        .iter()
                        .filter(|&&s| Some(s) != self.disturbing && !attachments[s].is_empty())
                        .map(|&s| Bridge::segment(s, &attachments[s])),
                );
                odd_cycle(&bridges).ok_or(PlanarityError::Internal("overlap graph of the segments is bipartite"))?
            }
        };
        debug!(length = cycle.len(), "odd cycle of overlapping segments");

        let mut keep: Vec<Vec<usize>> = vec![Vec::new(); bridges.len()];
        for (k, &i) in cycle.iter().enumerate() {
            let j = cycle[(k + 1) % cycle.len()];
            let found = overlap(&bridges[i].attachments, &bridges[j].attachments)
                .ok_or(PlanarityError::Internal("neighbours on the odd cycle do not overlap"))?;
            let (first, second) = found.witnesses();
            keep[i].extend_from_slice(first);
            keep[j].extend_from_slice(second);
        }

        let mut used = EdgeMap::new(graph.edge_count(), false);
        walker.fundamental_cycle(self.seg, &mut used)?;
        for &i in &cycle {
            keep[i].sort_unstable();
            keep[i].dedup();
            trace!(bridge = i, keep = ?keep[i], "reduce bridge");
            walker.reduce(&bridges[i], &keep[i], &mut used)?;
        }

        let edges: Vec<EdgeId> = used.iter().filter_map(|(e, &u)| u.then_some(e)).collect();
        let witness = subdivision(graph, &edges)?;
        Ok(MinorColouring {
            node_colour: witness.node_colour,
            edge_colour: witness.edge_colour,
        })
    }
}

/// Odd cycle in the overlap graph of `bridges`, listed in cycle order
///
/// The breadth-first search starts at the first bridge, so a cycle through
/// or close to it is preferred.
fn odd_cycle(bridges: &[Bridge]) -> Option<Vec<usize>> {
    let n = bridges.len();
    let mut depth: Vec<Option<usize>> = vec![None; n];
    let mut parent: Vec<usize> = (0..n).collect();

    for root in 0..n {
        if depth[root].is_some() {
            continue;
        }
        depth[root] = Some(0);
        let mut queue = VecDeque::from([root]);
        while let Some(u) = queue.pop_front() {
            let du = depth[u]?;
            for v in 0..n {
                if v == u || overlap(&bridges[u].attachments, &bridges[v].attachments).is_none() {
                    continue;
                }
                match depth[v] {
                    None => {
                        depth[v] = Some(du + 1);
                        parent[v] = u;
                        queue.push_back(v);
                    }
                    Some(dv) if dv == du => return Some(close_cycle(&parent, u, v)),
                    Some(_) => {}
                }
            }
        }
    }
    None
}

/// Join two bridges of equal depth through their BFS ancestors
fn close_cycle(parent: &[usize], u: usize, v: usize) -> Vec<usize> {
    let (mut up, mut down) = (vec![u], vec![v]);
    let (mut a, mut b) = (u, v);
    while parent[a] != parent[b] {
        a = parent[a];
        b = parent[b];
        up.push(a);
        down.push(b);
    }
    let mut cycle = vec![parent[a]];
    cycle.extend(up.into_iter().rev());
    cycle.extend(down);
    cycle
}

/// Walks of the palm tree that collect the edges of the subdivision
struct Walker<'a, G> {
    graph: &'a G,
    tree: &'a PalmTree,
    segments: &'a SegmentTree,
    by_preorder: Vec<NodeId>,
}

impl<G: IncidenceGraph> Walker<'_, G> {
    fn node(&self, preorder: usize) -> Result<NodeId, PlanarityError> {
        self.by_preorder
            .get(preorder)
            .copied()
            .ok_or(PlanarityError::Internal("preorder number out of range"))
    }

    /// Tree arcs from `v` up to its ancestor with preorder number `top`
    fn climb(&self, mut v: NodeId, top: usize, path: &mut Vec<EdgeId>) -> Result<(), PlanarityError> {
        while self.tree.preorder[v] != top {
            if self.tree.preorder[v] < top {
                return Err(PlanarityError::Internal("node is no ancestor on the tree path"));
            }
            let a = self.tree.pred[v].ok_or(PlanarityError::Internal("walked above the DFS root"))?;
            path.push(a.edge());
            v = self.graph.start_node(a);
        }
        Ok(())
    }

    /// Spine arcs of `seg` from the arc leaving `from` down to the closing
    /// back arc
    fn spine_from(&self, seg: SegmentId, from: NodeId, path: &mut Vec<EdgeId>) -> Result<(), PlanarityError> {
        let segment = &self.segments[seg];
        let mut g = segment.arc;
        while self.graph.start_node(g) != from {
            g = advance(self.graph, self.tree, g)?;
        }
        loop {
            path.push(g.edge());
            if g == segment.low_edge {
                return Ok(());
            }
            g = advance(self.graph, self.tree, g)?;
        }
    }

    fn fundamental_cycle(&self, seg: SegmentId, used: &mut EdgeMap<bool>) -> Result<(), PlanarityError> {
        let segment = &self.segments[seg];
        let tail = self.graph.start_node(segment.arc);
        let low = self.tree.end_preorder(self.graph, segment.low_edge);
        let mut path = Vec::new();
        self.spine_from(seg, tail, &mut path)?;
        self.climb(tail, low, &mut path)?;
        for e in path {
            used[e] = true;
        }
        Ok(())
    }

    /// The father spine below the tail of `seg`, the back arc closing it and
    /// the tree path from the low point of `father` down to that of `seg`
    fn father_path(&self, father: SegmentId, seg: SegmentId) -> Result<Bridge, PlanarityError> {
        let segment = &self.segments[seg];
        let tail = self.graph.start_node(segment.arc);
        let low = self.tree.end_preorder(self.graph, segment.low_edge);
        let mut path = Vec::new();
        self.spine_from(father, tail, &mut path)?;
        let father_low = self
            .tree
            .end_preorder(self.graph, self.segments[father].low_edge);
        self.climb(self.node(low)?, father_low, &mut path)?;
        Ok(Bridge {
            attachments: vec![low, self.tree.preorder[tail]],
            body: Body::Path(path),
        })
    }

    /// Mark the part of `bridge` that connects the attachments in `keep`
    fn reduce(&self, bridge: &Bridge, keep: &[usize], used: &mut EdgeMap<bool>) -> Result<(), PlanarityError> {
        let seg = match &bridge.body {
            Body::Path(path) => {
                for &e in path {
                    used[e] = true;
                }
                return Ok(());
            }
            Body::Segment(seg) => *seg,
        };

        let arc = self.segments[seg].arc;
        if self.tree.edge_type[arc] != EdgeType::Tree {
            used[arc.edge()] = true;
            return Ok(());
        }

        let tail = self.tree.start_preorder(self.graph, arc);
        let top = self.graph.end_node(arc);
        let back_to = self.back_arcs_below(top);
        let mut path = Vec::new();
        for &w in keep {
            if w == tail {
                path.push(arc.edge());
                continue;
            }
            let &back = back_to
                .get(&w)
                .ok_or(PlanarityError::Internal("attachment without a back arc"))?;
            path.push(back.edge());
            self.climb(self.graph.start_node(back), self.tree.preorder[top], &mut path)?;
        }
        for e in path {
            used[e] = true;
        }
        Ok(())
    }

    /// First back arc from the subtree of `top` to each ancestor
    fn back_arcs_below(&self, top: NodeId) -> HashMap<usize, ArcId> {
        let mut back_to = HashMap::new();
        let mut stack = vec![top];
        while let Some(v) = stack.pop() {
            for a in self.graph.rotation(v) {
                match self.tree.edge_type[a] {
                    EdgeType::Tree => stack.push(self.graph.end_node(a)),
                    EdgeType::Back => {
                        back_to
                            .entry(self.tree.end_preorder(self.graph, a))
                            .or_insert(a);
                    }
                    _ => {}
                }
            }
        }
        back_to
    }
}

/// Next arc on a spine
fn advance<G: IncidenceGraph>(graph: &G, tree: &PalmTree, g: ArcId) -> Result<ArcId, PlanarityError> {
    if tree.edge_type[g] != EdgeType::Tree {
        return Err(PlanarityError::Internal("spine ended early"));
    }
    graph
        .first(graph.end_node(g))
        .ok_or(PlanarityError::Internal("spine node without incidences"))
}
