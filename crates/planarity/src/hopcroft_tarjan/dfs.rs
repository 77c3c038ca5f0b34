use tracing::trace;

use crate::attributes::{ArcMap, EdgeMap, NodeMap};
use crate::graph::{ArcId, IncidenceGraph, NodeId};
use crate::PlanarityError;

/// Marker for low points of edges the DFS did not classify
pub(crate) const UNDEFINED: usize = usize::MAX;

/// Role of an arc in the palm tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeType {
    /// Not used by the palm tree, the reverse arc of a tree or back arc
    Free,
    Tree,
    Back,
}

/// Palm tree of a connected graph together with the low points of all edges
///
/// Low points are preorder numbers. For a back arc `v -> w` they are
/// `(preorder(w), preorder(v))`, for a tree arc they are the two smallest
/// distinct preorder numbers reachable from its subtree.
#[derive(Debug, Clone)]
pub(crate) struct PalmTree {
    pub root: NodeId,
    pub pred: NodeMap<Option<ArcId>>,
    pub preorder: NodeMap<usize>,
    pub postorder: NodeMap<usize>,
    pub edge_type: ArcMap<EdgeType>,
    pub low1: EdgeMap<usize>,
    pub low2: EdgeMap<usize>,
}

#[derive(Clone, Copy)]
struct Frame {
    node: NodeId,
    first: ArcId,
    cursor: Option<ArcId>,
}

impl PalmTree {
    /// Explore `graph` from `root` in incidence order
    ///
    /// # Errors
    /// Fails with [`PlanarityError::NotConnected`] if some node is unreachable
    pub fn explore<G: IncidenceGraph>(graph: &G, root: NodeId) -> Result<Self, PlanarityError> {
        let n = graph.node_count();
        let mut tree = Self {
            root,
            pred: NodeMap::new(n, None),
            preorder: NodeMap::new(n, UNDEFINED),
            postorder: NodeMap::new(n, UNDEFINED),
            edge_type: ArcMap::new(graph.arc_count(), EdgeType::Free),
            low1: EdgeMap::new(graph.edge_count(), UNDEFINED),
            low2: EdgeMap::new(graph.edge_count(), UNDEFINED),
        };

        let mut visited = 1;
        let mut post = 0;
        tree.preorder[root] = 0;

        let mut stack = Vec::new();
        if let Some(first) = graph.first(root) {
            stack.push(Frame {
                node: root,
                first,
                cursor: Some(first),
            });
        } else {
            tree.postorder[root] = 0;
        }

        while let Some(top) = stack.len().checked_sub(1) {
            let Frame { node: v, first, cursor } = stack[top];
            let Some(a) = cursor else {
                stack.pop();
                tree.postorder[v] = post;
                post += 1;
                tree.aggregate_low_points(graph, v);
                continue;
            };

            let next = graph.right(a);
            stack[top].cursor = (next != first).then_some(next);

            let w = graph.end_node(a);
            if tree.preorder[w] == UNDEFINED {
                tree.edge_type[a] = EdgeType::Tree;
                tree.pred[w] = Some(a);
                tree.preorder[w] = visited;
                visited += 1;
                let first = graph.first(w).unwrap_or(a.reverse());
                stack.push(Frame {
                    node: w,
                    first,
                    cursor: Some(first),
                });
            } else if let Some(p) = tree.pred[v] {
                if tree.preorder[w] < tree.preorder[graph.start_node(p)] {
                    tree.edge_type[a] = EdgeType::Back;
                    tree.low1[a.edge()] = tree.preorder[w];
                    tree.low2[a.edge()] = tree.preorder[v];
                }
            }
        }

        if visited < n {
            return Err(PlanarityError::NotConnected {
                root,
                reached: visited,
                nodes: n,
            });
        }
        trace!(nodes = n, "palm tree complete");
        Ok(tree)
    }

    /// Low points of the tree arcs leaving `v`, all children must be done
    fn aggregate_low_points<G: IncidenceGraph>(&mut self, graph: &G, v: NodeId) {
        for a in graph.rotation(v) {
            if self.edge_type[a] != EdgeType::Tree {
                continue;
            }
            let w = graph.end_node(a);
            let mut l1 = self.preorder[w];
            let mut l2 = l1;
            for b in graph.rotation(w) {
                let kind = self.edge_type[b];
                if kind == EdgeType::Free {
                    continue;
                }
                let low1 = self.low1[b.edge()];
                if low1 < l1 {
                    l2 = l1;
                    l1 = low1;
                } else if low1 > l1 && low1 < l2 {
                    l2 = low1;
                }
                if kind == EdgeType::Tree && self.low2[b.edge()] < l2 {
                    l2 = self.low2[b.edge()];
                }
            }
            self.low1[a.edge()] = l1;
            if self.preorder[w] != l1 && self.preorder[w] < l2 {
                l2 = self.preorder[w];
            }
            self.low2[a.edge()] = l2;
        }
    }

    /// Check that no node separates the graph
    ///
    /// The root must have a single tree child and every other tree arc
    /// `u -> w` must reach strictly above `u`.
    ///
    /// # Errors
    /// Reports a cut node as [`PlanarityError::NotBiconnected`]
    pub fn check_biconnected<G: IncidenceGraph>(&self, graph: &G) -> Result<(), PlanarityError> {
        let mut root_children = 0;
        for a in graph.arcs() {
            if self.edge_type[a] != EdgeType::Tree {
                continue;
            }
            let u = graph.start_node(a);
            if u == self.root {
                root_children += 1;
                if root_children > 1 {
                    return Err(PlanarityError::NotBiconnected(u));
                }
            } else if self.low1[a.edge()] >= self.preorder[u] {
                return Err(PlanarityError::NotBiconnected(u));
            }
        }
        Ok(())
    }

    pub fn start_preorder<G: IncidenceGraph>(&self, graph: &G, a: ArcId) -> usize {
        self.preorder[graph.start_node(a)]
    }

    pub fn end_preorder<G: IncidenceGraph>(&self, graph: &G, a: ArcId) -> usize {
        self.preorder[graph.end_node(a)]
    }

    /// Nodes listed by preorder number
    pub fn nodes_by_preorder(&self) -> Vec<NodeId> {
        let mut order = vec![self.root; self.preorder.len()];
        for (v, &number) in self.preorder.iter() {
            if let Some(slot) = order.get_mut(number) {
                *slot = v;
            }
        }
        order
    }
}
