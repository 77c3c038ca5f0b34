use std::collections::{LinkedList, VecDeque};

use tracing::{debug, trace};

use super::dfs::PalmTree;
use super::kuratowski::{Conflict, MinorColouring};
use super::segments::{SegmentId, SegmentTree};
use crate::graph::IncidenceGraph;
use crate::PlanarityError;

/// Side of a segment relative to the spine of its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Attachments and segments collected on one side of a component
#[derive(Debug, Default)]
struct SideList {
    /// Descending preorder numbers
    att: LinkedList<usize>,
    segments: LinkedList<SegmentId>,
}

impl SideList {
    fn reaches_above(&self, low: usize) -> bool {
        self.att.front().is_some_and(|&front| front > low)
    }

    fn prepend(&mut self, mut other: SideList) {
        other.att.append(&mut self.att);
        other.segments.append(&mut self.segments);
        *self = other;
    }

    fn trim(&mut self, tail: usize) {
        while self.att.front().is_some_and(|&front| front >= tail) {
            self.att.pop_front();
        }
    }
}

/// Connected component of the interlacement graph of the segments seen so far
///
/// Segments on opposite sides interlace, so every component is bipartite as
/// long as the graph is planar.
#[derive(Debug, Default)]
struct Component {
    sides: [SideList; 2],
}

impl Component {
    fn side(&self, side: Side) -> &SideList {
        &self.sides[side as usize]
    }

    fn side_mut(&mut self, side: Side) -> &mut SideList {
        &mut self.sides[side as usize]
    }

    fn flip(&mut self) {
        self.sides.swap(0, 1);
    }

    /// Swap sides so that the left side stays at or below `low`
    ///
    /// Returns `false` if both sides reach above `low`.
    fn settle(&mut self, low: usize) -> bool {
        if self.side(Side::Left).reaches_above(low) {
            self.flip();
        }
        !self.side(Side::Left).reaches_above(low)
    }

    fn conflicts_with(&self, low: usize) -> bool {
        self.sides.iter().any(|side| side.reaches_above(low))
    }

    fn absorb(&mut self, newer: Component) {
        let [left, right] = newer.sides;
        self.side_mut(Side::Left).prepend(left);
        self.side_mut(Side::Right).prepend(right);
    }

    fn segments(&self, side: Side) -> Vec<SegmentId> {
        self.side(side).segments.iter().copied().collect()
    }
}

/// A segment whose children are being tested one after the other
struct Frame {
    father: Option<SegmentId>,
    seg: SegmentId,
    /// Index of the next child to test
    next: usize,
    components: VecDeque<Component>,
}

impl Frame {
    fn new(father: Option<SegmentId>, seg: SegmentId) -> Self {
        Self {
            father,
            seg,
            next: 0,
            components: VecDeque::new(),
        }
    }
}

/// Strong planarity test over the segment tree
///
/// The segment tree is as deep as the DFS tree, so the test walks it with an
/// explicit stack of frames.
pub(crate) struct StrongPlanarity<'a, G> {
    graph: &'a G,
    tree: &'a PalmTree,
    segments: &'a mut SegmentTree,
    /// Transient attachment lists, tail first
    attachments: Vec<Vec<usize>>,
    extract_minor: bool,
    minor: Option<Result<MinorColouring, PlanarityError>>,
}

impl<'a, G: IncidenceGraph> StrongPlanarity<'a, G> {
    pub fn new(
        graph: &'a G,
        tree: &'a PalmTree,
        segments: &'a mut SegmentTree,
        extract_minor: bool,
    ) -> Self {
        let attachments = vec![Vec::new(); segments.len()];
        Self {
            graph,
            tree,
            segments,
            attachments,
            extract_minor,
            minor: None,
        }
    }

    /// Run the test from the root segment
    ///
    /// On success the `alpha_left` flags of the segment tree describe a valid
    /// side assignment. A failed test keeps the extraction result, if one was
    /// requested, for [`StrongPlanarity::take_minor`].
    pub fn run(&mut self) -> Result<bool, PlanarityError> {
        let mut stack = vec![Frame::new(None, SegmentTree::ROOT)];
        let mut heads: Option<Vec<usize>> = None;

        while let Some(frame) = stack.last_mut() {
            if let Some(att) = heads.take() {
                if !self.place_child(frame, att)? {
                    return Ok(false);
                }
            }
            if let Some(&child) = self.segments[frame.seg].children.get(frame.next) {
                frame.next += 1;
                let father = Some(frame.seg);
                stack.push(Frame::new(father, child));
                continue;
            }
            let Some(frame) = stack.pop() else { break };
            match self.finish(frame)? {
                Some(att) => heads = Some(att),
                None => return Ok(false),
            }
        }

        trace!(?heads, "root attachments");
        Ok(true)
    }

    /// Outcome of the extraction triggered by a failed test
    pub fn take_minor(&mut self) -> Option<Result<MinorColouring, PlanarityError>> {
        self.minor.take()
    }

    fn low1(&self, seg: SegmentId) -> usize {
        self.tree.low1[self.segments[seg].arc.edge()]
    }

    fn tail(&self, seg: SegmentId) -> usize {
        self.tree.start_preorder(self.graph, self.segments[seg].arc)
    }

    /// Add the child tested last, whose attachments are `att`, to the
    /// interlacement components of its parent
    ///
    /// Returns `false` if the child interlaces both sides of a component.
    fn place_child(&mut self, frame: &mut Frame, att: Vec<usize>) -> Result<bool, PlanarityError> {
        let seg = frame.seg;
        let i = frame.next - 1;
        let children = &self.segments[seg].children;
        let child = *children
            .get(i)
            .ok_or(PlanarityError::Internal("tested child missing from its parent"))?;
        let next_child = children.get(i + 1).copied();

        self.attachments[child] = att;
        let child_low = self.low1(child);
        let components = &mut frame.components;

        let mut conflicting = 0;
        while let Some(component) = components.get_mut(conflicting) {
            if !component.conflicts_with(child_low) {
                break;
            }
            if !component.settle(child_low) {
                debug!(segment = seg, child, "interlacement graph is not bipartite");
                if self.extract_minor {
                    let tail = self.tail(child);
                    self.attachments[child].insert(0, tail);
                    let conflict = Conflict {
                        father: frame.father,
                        seg,
                        left: component.segments(Side::Left),
                        right: component.segments(Side::Right),
                        disturbing: Some(child),
                    };
                    self.extract(conflict);
                }
                return Ok(false);
            }
            conflicting += 1;
        }

        if conflicting == 0 {
            components.push_front(Component::default());
        }
        for _ in 1..conflicting {
            let Some(newer) = components.pop_front() else {
                break;
            };
            if let Some(older) = components.front_mut() {
                older.absorb(newer);
            }
        }

        let tail = self.tail(child);
        let Some(front) = components.front_mut() else {
            return Err(PlanarityError::Internal("component list drained while merging"));
        };
        let left = front.side_mut(Side::Left);
        for &x in self.attachments[child].iter().rev() {
            left.att.push_front(x);
        }
        left.segments.push_front(child);
        self.attachments[child].insert(0, tail);

        let next_tail = match next_child {
            Some(next) => self.tail(next),
            None => self.tail(seg),
        };
        while let Some(front) = components.front_mut() {
            front.sides.iter_mut().for_each(|side| side.trim(next_tail));
            if front.sides.iter().any(|side| !side.att.is_empty()) {
                break;
            }
            for &s in &front.side(Side::Left).segments {
                self.segments[s].alpha_left = true;
            }
            components.pop_front();
        }
        Ok(true)
    }

    /// Close a segment whose children all passed, returning its descending
    /// attachment list
    ///
    /// `None` signals that the segment is not strongly planar.
    fn finish(&mut self, frame: Frame) -> Result<Option<Vec<usize>>, PlanarityError> {
        let Frame {
            father,
            seg,
            mut components,
            ..
        } = frame;

        let low = self.low1(seg);
        for index in (0..components.len()).rev() {
            let component = &mut components[index];
            if !component.settle(low) {
                debug!(segment = seg, "segment is not strongly planar");
                if self.extract_minor {
                    let conflict = Conflict {
                        father,
                        seg,
                        left: component.segments(Side::Left),
                        right: component.segments(Side::Right),
                        disturbing: None,
                    };
                    self.extract(conflict);
                }
                return Ok(None);
            }
        }

        let mut heads = Vec::new();
        for component in &components {
            heads.extend(component.side(Side::Right).att.iter().copied());
            heads.extend(component.side(Side::Left).att.iter().copied());
            for &s in &component.side(Side::Left).segments {
                self.segments[s].alpha_left = true;
            }
        }
        heads.push(self.tree.end_preorder(self.graph, self.segments[seg].low_edge));
        heads.dedup();

        for &child in &self.segments[seg].children {
            self.attachments[child].clear();
        }
        Ok(Some(heads))
    }

    fn extract(&mut self, conflict: Conflict) {
        let result = conflict.extract(self.graph, self.tree, &*self.segments, &self.attachments);
        if let Err(err) = &result {
            debug!(%err, "Kuratowski extraction failed");
        }
        self.minor = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, SparseGraph};
    use crate::hopcroft_tarjan::reorder::reorder;
    use test_log::test;

    fn test_graph(n: usize, edges: &[(usize, usize)]) -> (bool, SegmentTree) {
        let mut graph = SparseGraph::from_edges(n, edges.iter().copied());
        let tree = PalmTree::explore(&graph, NodeId(0)).unwrap();
        reorder(&mut graph, &tree).unwrap();
        let start = graph.first(NodeId(0)).unwrap();
        let mut segments = SegmentTree::build(&graph, &tree, start).unwrap();
        let planar = StrongPlanarity::new(&graph, &tree, &mut segments, false)
            .run()
            .unwrap();
        (planar, segments)
    }

    #[test]
    fn test_k4_is_planar() {
        let (planar, segments) = test_graph(
            4,
            &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
        );
        assert!(planar);
        let child = segments[SegmentTree::ROOT].children[0];
        assert!(segments[child].alpha_left);
        assert!(!segments[segments[child].children[0]].alpha_left);
    }

    #[test]
    fn test_interlaced_chords_take_opposite_sides() {
        let (planar, segments) = test_graph(
            6,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (1, 3), (2, 4)],
        );
        assert!(planar);
        let children = &segments[SegmentTree::ROOT].children;
        assert_ne!(
            segments[children[0]].alpha_left,
            segments[children[1]].alpha_left
        );
    }

    #[test]
    fn test_k5_is_not_planar() {
        let edges: Vec<_> = (0..5)
            .flat_map(|u| (u + 1..5).map(move |v| (u, v)))
            .collect();
        let (planar, _) = test_graph(5, &edges);
        assert!(!planar);
    }

    #[test]
    fn test_k33_is_not_planar() {
        let edges: Vec<_> = (0..3)
            .flat_map(|u| (3..6).map(move |v| (u, v)))
            .collect();
        let (planar, _) = test_graph(6, &edges);
        assert!(!planar);
    }

    #[test]
    fn test_deep_segment_tree() {
        let n = 20_000;
        let edges: Vec<_> = (0..n - 1)
            .map(|i| (i, i + 1))
            .chain((0..n - 2).map(|i| (i, i + 2)))
            .collect();
        let (planar, _) = test_graph(n, &edges);
        assert!(planar);
    }
}
