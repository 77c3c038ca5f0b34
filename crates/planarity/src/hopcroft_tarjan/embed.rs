use std::collections::LinkedList;

use tracing::trace;

use super::dfs::{EdgeType, PalmTree};
use super::segments::{SegmentId, SegmentTree};
use crate::attributes::ArcMap;
use crate::graph::{ArcId, IncidenceGraphMut, NodeId};
use crate::PlanarityError;

type Arcs = LinkedList<ArcId>;

fn prepend(target: &mut Arcs, mut other: Arcs) {
    other.append(target);
    *target = other;
}

/// A segment whose spine is being walked
struct Frame {
    seg: SegmentId,
    canonical: bool,
    /// Last spine arc placed, and its start node
    g: ArcId,
    v: NodeId,
    /// Next child segment to embed
    next: usize,
    u: Arcs,
    al: Arcs,
    ar: Arcs,
    /// Side of the child segment embedded above this frame
    waiting: Option<bool>,
}

impl Frame {
    fn merge(&mut self, right: bool, mut u2: Arcs, mut a2: Arcs) {
        if right {
            prepend(&mut self.u, u2);
            self.ar.append(&mut a2);
        } else {
            self.u.append(&mut u2);
            prepend(&mut self.al, a2);
        }
        self.next += 1;
    }
}

/// Turns the side assignment of a successful test into rotations
///
/// Every segment is drawn along its spine from the bottom up. Child segments
/// on the right are put in front of the pending rotation, those on the left
/// behind it. Back arcs that return to an ancestor stay in the lists `AL`
/// and `AR` until the walk reaches that ancestor. Segments nest as deep as
/// the DFS tree, so the walk keeps its own stack of frames.
pub(crate) struct Embedder<'a, G> {
    graph: &'a mut G,
    tree: &'a PalmTree,
    segments: &'a SegmentTree,
    pred_arc: ArcMap<Option<ArcId>>,
}

impl<'a, G: IncidenceGraphMut> Embedder<'a, G> {
    pub fn new(graph: &'a mut G, tree: &'a PalmTree, segments: &'a SegmentTree) -> Self {
        let pred_arc = ArcMap::new(graph.arc_count(), None);
        Self {
            graph,
            tree,
            segments,
            pred_arc,
        }
    }

    /// Embed all segments and return the predecessor of every arc in the
    /// rotation at its start node
    pub fn run(mut self) -> Result<ArcMap<ArcId>, PlanarityError> {
        let segments = self.segments;
        let mut stack = vec![self.enter(SegmentTree::ROOT, false)];
        let mut done: Option<(Arcs, Arcs)> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some((u2, a2)) = done.take() {
                let right = frame
                    .waiting
                    .take()
                    .ok_or(PlanarityError::Internal("embedded segment without a parent"))?;
                frame.merge(right, u2, a2);
            }

            let segment = &segments[frame.seg];
            if frame.g == segment.arc {
                let low_edge = segment.low_edge;
                let Some(finished) = stack.pop() else { break };
                let Frame { u, mut al, mut ar, .. } = finished;
                al.push_back(low_edge.reverse());
                al.append(&mut ar);
                done = Some((u, al));
                continue;
            }

            if let Some(&child) = segment.children.get(frame.next) {
                let child_arc = segments[child].arc;
                if self.graph.start_node(child_arc) == frame.v {
                    let right = frame.canonical != segments[child].alpha_left;
                    if self.tree.edge_type[child_arc] == EdgeType::Tree {
                        frame.waiting = Some(right);
                        let entered = self.enter(child, right);
                        stack.push(entered);
                    } else {
                        frame.merge(
                            right,
                            [child_arc].into_iter().collect(),
                            [child_arc.reverse()].into_iter().collect(),
                        );
                    }
                    continue;
                }
            }

            let g = self.tree.pred[frame.v].ok_or(PlanarityError::Internal("segment spine above the root"))?;
            let v = self.graph.start_node(g);
            frame.g = g;
            frame.v = v;
            frame.u.push_front(g.reverse());
            self.install(self.graph.end_node(g), &frame.u)?;

            frame.u.clear();
            while let Some(&back) = frame.ar.back() {
                if self.graph.start_node(back) != v {
                    break;
                }
                frame.ar.pop_back();
                frame.u.push_front(back);
            }
            frame.u.push_back(g);
            while let Some(&front) = frame.al.front() {
                if self.graph.start_node(front) != v {
                    break;
                }
                frame.al.pop_front();
                frame.u.push_back(front);
            }
        }

        let (mut rotation, mut pending) =
            done.ok_or(PlanarityError::Internal("root segment was not embedded"))?;
        rotation.append(&mut pending);
        self.install(self.tree.root, &rotation)?;

        self.pred_arc
            .iter()
            .map(|(a, pred)| pred.ok_or(PlanarityError::ArcPlacement(a)))
            .collect()
    }

    /// Start the walk up the spine of `seg` at its closing back arc
    fn enter(&self, seg: SegmentId, canonical: bool) -> Frame {
        let segment = &self.segments[seg];
        trace!(seg_arc = ?segment.arc, right = canonical != segment.alpha_left, "embed segment");
        let low_edge = segment.low_edge;
        Frame {
            seg,
            canonical,
            g: low_edge,
            v: self.graph.start_node(low_edge),
            next: 0,
            u: [low_edge].into_iter().collect(),
            al: Arcs::new(),
            ar: Arcs::new(),
            waiting: None,
        }
    }

    /// Make `rotation` the incidence order of `node`
    fn install(&mut self, node: NodeId, rotation: &Arcs) -> Result<(), PlanarityError> {
        let (Some(&first), Some(&last)) = (rotation.front(), rotation.back()) else {
            return Err(PlanarityError::Internal("empty rotation"));
        };
        self.graph.set_first(node, first)?;
        let mut b = last;
        for &a in rotation {
            if self.pred_arc[a].is_some() {
                return Err(PlanarityError::ArcPlacement(a));
            }
            if a != first {
                self.graph.set_right(b, a)?;
            }
            self.pred_arc[a] = Some(b.reverse());
            b = a;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{IncidenceGraph, SparseGraph};
    use crate::hopcroft_tarjan::reorder::reorder;
    use crate::hopcroft_tarjan::strong::StrongPlanarity;
    use test_log::test;

    fn embed(n: usize, edges: &[(usize, usize)]) -> (SparseGraph, ArcMap<ArcId>) {
        let mut graph = SparseGraph::from_edges(n, edges.iter().copied());
        let tree = PalmTree::explore(&graph, NodeId(0)).unwrap();
        reorder(&mut graph, &tree).unwrap();
        let start = graph.first(NodeId(0)).unwrap();
        let mut segments = SegmentTree::build(&graph, &tree, start).unwrap();
        assert!(StrongPlanarity::new(&graph, &tree, &mut segments, false)
            .run()
            .unwrap());
        let pred = Embedder::new(&mut graph, &tree, &segments).run().unwrap();
        (graph, pred)
    }

    fn rotations(graph: &SparseGraph) -> Vec<Vec<usize>> {
        graph
            .nodes()
            .map(|v| graph.rotation(v).map(|a| a.index()).collect())
            .collect()
    }

    fn face_count(graph: &SparseGraph) -> usize {
        let mut seen = vec![false; graph.arc_count()];
        let mut faces = 0;
        for a in graph.arcs() {
            if seen[a.index()] {
                continue;
            }
            faces += 1;
            let mut b = a;
            while !seen[b.index()] {
                seen[b.index()] = true;
                b = graph.right(b.reverse());
            }
        }
        faces
    }

    #[test]
    fn test_cycle() {
        let (graph, _) = embed(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(rotations(&graph), vec![vec![0, 7], vec![1, 2], vec![3, 4], vec![5, 6]]);
        assert_eq!(face_count(&graph), 2);
    }

    #[test]
    fn test_k4() {
        let (graph, pred) = embed(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(
            rotations(&graph),
            vec![vec![4, 0, 2], vec![1, 8, 6], vec![7, 10, 3], vec![11, 9, 5]]
        );
        assert_eq!(face_count(&graph), 4);
        for a in graph.arcs() {
            assert_eq!(graph.right(pred[a].reverse()), a);
        }
    }

    #[test]
    fn test_hexagon_with_chords() {
        let (graph, _) = embed(
            6,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (1, 3), (2, 4)],
        );
        assert_eq!(
            rotations(&graph),
            vec![
                vec![0, 11],
                vec![1, 12, 2],
                vec![3, 4, 14],
                vec![5, 13, 6],
                vec![7, 8, 15],
                vec![9, 10],
            ]
        );
        assert_eq!(face_count(&graph), 4);
    }

    #[test]
    fn test_embedding_twice_gives_the_same_rotation() {
        let mut graph = SparseGraph::from_edges(
            5,
            [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2), (0, 3), (1, 3)],
        );
        let tree = PalmTree::explore(&graph, NodeId(0)).unwrap();
        reorder(&mut graph, &tree).unwrap();
        let start = graph.first(NodeId(0)).unwrap();
        let mut segments = SegmentTree::build(&graph, &tree, start).unwrap();
        assert!(StrongPlanarity::new(&graph, &tree, &mut segments, false)
            .run()
            .unwrap());

        let mut again = graph.clone();
        let pred = Embedder::new(&mut graph, &tree, &segments).run().unwrap();
        let pred_again = Embedder::new(&mut again, &tree, &segments).run().unwrap();
        assert_eq!(pred, pred_again);
        assert_eq!(rotations(&graph), rotations(&again));
        assert_eq!(face_count(&graph), 8 - 5 + 2);
    }

    #[test]
    fn test_install_rejects_second_placement() {
        let mut graph = SparseGraph::from_edges(3, [(0, 1), (1, 2), (2, 0)]);
        let tree = PalmTree::explore(&graph, NodeId(0)).unwrap();
        reorder(&mut graph, &tree).unwrap();
        let start = graph.first(NodeId(0)).unwrap();
        let segments = SegmentTree::build(&graph, &tree, start).unwrap();
        let mut embedder = Embedder::new(&mut graph, &tree, &segments);
        let rotation: Arcs = [ArcId(0), ArcId(5)].into_iter().collect();
        embedder.install(NodeId(0), &rotation).unwrap();
        assert_eq!(
            embedder.install(NodeId(0), &rotation),
            Err(PlanarityError::ArcPlacement(ArcId(0)))
        );
    }
}
