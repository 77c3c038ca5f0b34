//! Faces of the rotation system stored in a graph

use petgraph::unionfind::UnionFind;
use serde::Serialize;
use tracing::debug;

use crate::attributes::ArcMap;
use crate::graph::{ArcId, IncidenceGraph, IncidenceGraphMut};
use crate::PlanarityError;

/// Face index of every arc and the arc cycle of every face
///
/// Arc `a` lies on the face to its left, and the arc following `a` on that
/// face is `right(reverse(a))`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Faces {
    face_of: ArcMap<usize>,
    faces: Vec<Vec<ArcId>>,
}

/// Trace all faces of the current incidence order of `graph`
pub fn faces<G: IncidenceGraph>(graph: &G) -> Faces {
    let mut face_of = ArcMap::new(graph.arc_count(), usize::MAX);
    let mut faces = Vec::new();
    for a in graph.arcs() {
        if face_of[a] != usize::MAX {
            continue;
        }
        let mut cycle = Vec::new();
        let mut b = a;
        while face_of[b] == usize::MAX {
            face_of[b] = faces.len();
            cycle.push(b);
            b = graph.right(b.reverse());
        }
        faces.push(cycle);
    }
    debug!(faces = faces.len(), "faces traced");
    Faces { face_of, faces }
}

impl Faces {
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face_of(&self, a: ArcId) -> usize {
        self.face_of[a]
    }

    pub fn face(&self, index: usize) -> &[ArcId] {
        &self.faces[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[ArcId]> {
        self.faces.iter().map(Vec::as_slice)
    }

    /// Index of a face with the most arcs
    pub fn largest(&self) -> Option<usize> {
        (0..self.faces.len()).max_by_key(|&i| self.faces[i].len())
    }

    /// Check Euler's formula for every connected component of `graph`
    ///
    /// A component with edges contributes `n - m + f = 2`, an isolated node
    /// contributes `1`. Equality holds if and only if the rotation system is
    /// planar.
    pub fn euler_characteristic_holds<G: IncidenceGraph>(&self, graph: &G) -> bool {
        let mut components = UnionFind::new(graph.node_count());
        for e in graph.edges() {
            let a = e.forward();
            components.union(graph.start_node(a).index(), graph.end_node(a).index());
        }
        let mut has_edges = vec![false; graph.node_count()];
        for a in graph.arcs() {
            has_edges[components.find(graph.start_node(a).index())] = true;
        }
        let (mut isolated, mut with_edges) = (0, 0);
        for v in graph.nodes() {
            if components.find(v.index()) != v.index() {
                continue;
            }
            if has_edges[v.index()] {
                with_edges += 1;
            } else {
                isolated += 1;
            }
        }
        graph.node_count() + self.faces.len() == graph.edge_count() + 2 * with_edges + isolated
    }
}

/// Make the face left of `a` the exterior face
///
/// Every arc of the face becomes the first incidence of its start node, so
/// the incidence lists start on the exterior.
///
/// # Errors
/// Propagates rejected incidence updates
pub fn mark_exterior_face<G: IncidenceGraphMut>(graph: &mut G, a: ArcId) -> Result<(), PlanarityError> {
    let mut b = a;
    loop {
        graph.set_first(graph.start_node(b), b)?;
        b = graph.right(b.reverse());
        if b == a {
            return Ok(());
        }
    }
}
