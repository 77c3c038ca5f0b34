use derive_more::{Display, From, Into};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};
use serde::Serialize;

use crate::attributes::{ArcMap, NodeMap};
use crate::PlanarityError;

/// Index of a node, `0..node_count()`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display, Serialize,
)]
pub struct NodeId(pub usize);

/// Index of an undirected edge, `0..edge_count()`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display, Serialize,
)]
pub struct EdgeId(pub usize);

/// Index of an arc, `0..arc_count()`
///
/// Edge `e` owns the forward arc `2e` and the backward arc `2e + 1`; both arcs
/// are reverses of each other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Display, Serialize,
)]
pub struct ArcId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }

    /// The arc running from the first to the second end node
    pub fn forward(self) -> ArcId {
        ArcId(2 * self.0)
    }

    /// The arc running from the second to the first end node
    pub fn backward(self) -> ArcId {
        ArcId(2 * self.0 + 1)
    }
}

impl ArcId {
    pub fn index(self) -> usize {
        self.0
    }

    /// The arc of the same edge in opposite direction
    pub fn reverse(self) -> ArcId {
        ArcId(self.0 ^ 1)
    }

    /// The undirected edge this arc belongs to
    pub fn edge(self) -> EdgeId {
        EdgeId(self.0 >> 1)
    }

    pub fn is_forward(self) -> bool {
        self.0 & 1 == 0
    }
}

/// Read access to a graph whose incidence lists are circular arc orders
///
/// Every node owns the circular list of arcs starting at it. [`first`] breaks
/// the circle, [`right`] steps to the next arc. When the graph is planar and
/// embedded, these lists form a rotation system.
///
/// [`first`]: IncidenceGraph::first
/// [`right`]: IncidenceGraph::right
pub trait IncidenceGraph {
    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn arc_count(&self) -> usize {
        2 * self.edge_count()
    }

    /// First arc of the incidence list of `v`, `None` for isolated nodes
    fn first(&self, v: NodeId) -> Option<ArcId>;

    /// Successor of `a` in the incidence list of its start node
    fn right(&self, a: ArcId) -> ArcId;

    fn start_node(&self, a: ArcId) -> NodeId;

    fn end_node(&self, a: ArcId) -> NodeId {
        self.start_node(a.reverse())
    }

    /// Iterate the incidence list of `v`, starting at [`IncidenceGraph::first`]
    fn rotation(&self, v: NodeId) -> Rotation<'_, Self> {
        let first = self.first(v);
        Rotation {
            graph: self,
            first,
            next: first,
        }
    }

    fn nodes(&self) -> impl Iterator<Item = NodeId> {
        (0..self.node_count()).map(NodeId)
    }

    fn arcs(&self) -> impl Iterator<Item = ArcId> {
        (0..self.arc_count()).map(ArcId)
    }

    fn edges(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edge_count()).map(EdgeId)
    }

    fn is_loop(&self, e: EdgeId) -> bool {
        self.start_node(e.forward()) == self.end_node(e.forward())
    }
}

/// Write access to the incidence order, used to install an embedding
pub trait IncidenceGraphMut: IncidenceGraph {
    /// Make `a` the first arc of the incidence list of `v`
    ///
    /// # Errors
    /// Rejects arcs which do not start at `v`
    fn set_first(&mut self, v: NodeId, a: ArcId) -> Result<(), PlanarityError>;

    /// Move `a2` directly behind `a1` in their common incidence list
    ///
    /// The list stays a single circle, the remaining arcs keep their relative
    /// order.
    ///
    /// # Errors
    /// Rejects arcs with different start nodes
    fn set_right(&mut self, a1: ArcId, a2: ArcId) -> Result<(), PlanarityError>;
}

/// Iterator over the incidence list of a node
pub struct Rotation<'a, G: ?Sized> {
    graph: &'a G,
    first: Option<ArcId>,
    next: Option<ArcId>,
}

impl<G: IncidenceGraph + ?Sized> Iterator for Rotation<'_, G> {
    type Item = ArcId;

    fn next(&mut self) -> Option<ArcId> {
        let current = self.next?;
        let right = self.graph.right(current);
        self.next = (Some(right) != self.first).then_some(right);
        Some(current)
    }
}

/// Undirected multigraph with doubly-linked circular incidence lists
///
/// Loops and parallel edges are allowed. New arcs are appended at the end of
/// the incidence list of their start node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseGraph {
    start: Vec<NodeId>,
    right: Vec<ArcId>,
    left: Vec<ArcId>,
    first: Vec<Option<ArcId>>,
}

impl SparseGraph {
    /// Create a graph with `n` isolated nodes
    pub fn new(n: usize) -> Self {
        Self {
            first: vec![None; n],
            ..Default::default()
        }
    }

    /// Create a graph on `n` nodes from a list of node index pairs
    ///
    /// # Panics
    /// Panics if an endpoint is out of bounds
    pub fn from_edges<I>(n: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut graph = Self::new(n);
        for (u, v) in edges {
            graph.add_edge(NodeId(u), NodeId(v));
        }
        graph
    }

    /// Copy the structure of any graph implementing petgraph's visitor traits
    ///
    /// Node `i` of the result is the node with index `i` in `graph`, edges keep
    /// the order of `edge_references`. Direction is ignored.
    pub fn from_petgraph<G>(graph: G) -> Self
    where
        G: IntoEdgeReferences + NodeIndexable,
    {
        let mut result = Self::new(graph.node_bound());
        for edge in graph.edge_references() {
            result.add_edge(
                NodeId(graph.to_index(edge.source())),
                NodeId(graph.to_index(edge.target())),
            );
        }
        result
    }

    pub fn add_node(&mut self) -> NodeId {
        self.first.push(None);
        NodeId(self.first.len() - 1)
    }

    /// Add the edge `{u, v}` whose forward arc starts at `u`
    ///
    /// # Panics
    /// Panics if `u` or `v` is out of bounds
    pub fn add_edge(&mut self, u: NodeId, v: NodeId) -> EdgeId {
        assert!(
            u.0 < self.first.len() && v.0 < self.first.len(),
            "edge ({u}, {v}) refers to a node out of bounds"
        );
        let edge = EdgeId(self.start.len() / 2);
        for (arc, node) in [(edge.forward(), u), (edge.backward(), v)] {
            self.start.push(node);
            self.right.push(arc);
            self.left.push(arc);
            self.link_last(node, arc);
        }
        edge
    }

    fn link_last(&mut self, v: NodeId, a: ArcId) {
        match self.first[v.0] {
            None => self.first[v.0] = Some(a),
            Some(first) => {
                let last = self.left[first.0];
                self.right[last.0] = a;
                self.left[a.0] = last;
                self.right[a.0] = first;
                self.left[first.0] = a;
            }
        }
    }

    pub fn left(&self, a: ArcId) -> ArcId {
        self.left[a.0]
    }

    /// Install a rotation system given by face predecessors
    ///
    /// `pred[a]` is the reverse of the arc preceding `a` at `start_node(a)`.
    /// All successors are assigned simultaneously.
    ///
    /// # Errors
    /// Rejects predecessor arrays which are not a permutation of the arcs of
    /// each node.
    pub fn reorder_incidences(&mut self, pred: &ArcMap<ArcId>) -> Result<(), PlanarityError> {
        let mut seen = ArcMap::new(self.arc_count(), false);
        for a in self.arcs() {
            let b = pred[a].reverse();
            if self.start_node(b) != self.start_node(a) {
                return Err(PlanarityError::MismatchingStartNodes(b, a));
            }
            if std::mem::replace(&mut seen[b], true) {
                return Err(PlanarityError::ArcPlacement(b));
            }
        }
        for index in 0..self.arc_count() {
            let b = pred[ArcId(index)].reverse();
            self.right[b.0] = ArcId(index);
            self.left[index] = b;
        }
        Ok(())
    }

    /// Label every node with the index of its connected component
    ///
    /// Returns the labels and the number of components.
    pub fn connected_components(&self) -> (NodeMap<usize>, usize) {
        let mut component = NodeMap::new(self.node_count(), usize::MAX);
        let mut count = 0;
        let mut queue = Vec::new();
        for root in self.nodes() {
            if component[root] != usize::MAX {
                continue;
            }
            component[root] = count;
            queue.push(root);
            while let Some(v) = queue.pop() {
                for a in self.rotation(v) {
                    let w = self.end_node(a);
                    if component[w] == usize::MAX {
                        component[w] = count;
                        queue.push(w);
                    }
                }
            }
            count += 1;
        }
        (component, count)
    }

    pub fn is_connected(&self) -> bool {
        self.connected_components().1 <= 1
    }
}

impl IncidenceGraph for SparseGraph {
    fn node_count(&self) -> usize {
        self.first.len()
    }

    fn edge_count(&self) -> usize {
        self.start.len() / 2
    }

    fn first(&self, v: NodeId) -> Option<ArcId> {
        self.first[v.0]
    }

    fn right(&self, a: ArcId) -> ArcId {
        self.right[a.0]
    }

    fn start_node(&self, a: ArcId) -> NodeId {
        self.start[a.0]
    }
}

impl IncidenceGraphMut for SparseGraph {
    fn set_first(&mut self, v: NodeId, a: ArcId) -> Result<(), PlanarityError> {
        if self.start_node(a) != v {
            return Err(PlanarityError::ArcNotAtNode(a, v));
        }
        self.first[v.0] = Some(a);
        Ok(())
    }

    fn set_right(&mut self, a1: ArcId, a2: ArcId) -> Result<(), PlanarityError> {
        if a1 == a2 {
            return Ok(());
        }
        if self.start_node(a1) != self.start_node(a2) {
            return Err(PlanarityError::MismatchingStartNodes(a1, a2));
        }

        let a2l = self.left[a2.0];
        let a1r = self.right[a1.0];
        let a2r = self.right[a2.0];
        if a1r == a2 {
            return Ok(());
        }

        self.right[a1.0] = a2;
        self.left[a2.0] = a1;
        self.right[a2.0] = a1r;
        self.left[a1r.0] = a2;
        self.right[a2l.0] = a2r;
        self.left[a2r.0] = a2l;
        Ok(())
    }
}
