use super::dfs::{EdgeType, PalmTree};
use crate::graph::{ArcId, IncidenceGraph};
use crate::PlanarityError;

pub(crate) type SegmentId = usize;

/// A path of the palm tree together with the segments emanating from it
///
/// The path starts with `arc`, follows the first incidences down the tree and
/// closes with the back arc `low_edge`.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub arc: ArcId,
    pub low_edge: ArcId,
    /// Set when the tester places the segment on the left side
    pub alpha_left: bool,
    /// Child segments, deepest emanation first
    pub children: Vec<SegmentId>,
}

impl Segment {
    fn new(arc: ArcId) -> Self {
        Self {
            arc,
            low_edge: arc,
            alpha_left: false,
            children: Vec::new(),
        }
    }
}

/// Arena holding the segment tree of a reordered palm tree
#[derive(Debug, Clone)]
pub(crate) struct SegmentTree {
    pub segments: Vec<Segment>,
}

impl SegmentTree {
    pub const ROOT: SegmentId = 0;

    /// Build the segment tree rooted at the path starting with `start`
    ///
    /// # Errors
    /// Fails with [`PlanarityError::MissingLowEdge`] if a path leaves the tree
    /// through an unclassified arc
    pub fn build<G: IncidenceGraph>(
        graph: &G,
        tree: &PalmTree,
        start: ArcId,
    ) -> Result<Self, PlanarityError> {
        let mut segments = vec![Segment::new(start)];
        let mut pending = vec![Self::ROOT];

        while let Some(id) = pending.pop() {
            let mut g = segments[id].arc;
            let mut groups: Vec<Vec<ArcId>> = Vec::new();
            while tree.edge_type[g] == EdgeType::Tree {
                let u = graph.end_node(g);
                g = graph.first(u).ok_or(PlanarityError::MissingLowEdge(segments[id].arc))?;
                groups.push(
                    graph
                        .rotation(u)
                        .skip(1)
                        .filter(|&a| tree.edge_type[a] != EdgeType::Free)
                        .collect(),
                );
            }
            if tree.edge_type[g] != EdgeType::Back {
                return Err(PlanarityError::MissingLowEdge(segments[id].arc));
            }

            let children: Vec<SegmentId> = groups
                .into_iter()
                .rev()
                .flatten()
                .map(|arc| {
                    segments.push(Segment::new(arc));
                    segments.len() - 1
                })
                .collect();
            pending.extend(&children);
            segments[id].low_edge = g;
            segments[id].children = children;
        }

        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl std::ops::Index<SegmentId> for SegmentTree {
    type Output = Segment;

    fn index(&self, id: SegmentId) -> &Segment {
        &self.segments[id]
    }
}

impl std::ops::IndexMut<SegmentId> for SegmentTree {
    fn index_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id]
    }
}
