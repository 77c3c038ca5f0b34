//! Kuratowski subdivisions as certificates of non-planarity

use serde::Serialize;
use tracing::debug;

use crate::attributes::{EdgeMap, NodeMap};
use crate::graph::{EdgeId, IncidenceGraph, NodeId, SparseGraph};
use crate::planar::{Outcome, Planarity, PlanarityConfig};
use crate::PlanarityError;

/// The two forbidden graphs of Kuratowski's theorem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
pub enum KuratowskiKind {
    #[display("K5")]
    K5,
    #[display("K3,3")]
    K33,
}

impl KuratowskiKind {
    fn branch_degree(self) -> usize {
        match self {
            KuratowskiKind::K5 => 4,
            KuratowskiKind::K33 => 3,
        }
    }

    fn path_count(self) -> usize {
        match self {
            KuratowskiKind::K5 => 10,
            KuratowskiKind::K33 => 9,
        }
    }
}

/// A subdivision of `K5` or `K3,3` inside some graph
///
/// Branch nodes of a `K3,3` are coloured `0` and `2` by class, branch nodes
/// of a `K5` are coloured `1`. Every subdivided path carries its own edge
/// colour, starting at `1`. Nodes and edges outside the subdivision are
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KuratowskiSubgraph {
    pub kind: KuratowskiKind,
    pub node_colour: NodeMap<Option<usize>>,
    pub edge_colour: EdgeMap<Option<usize>>,
}

impl KuratowskiSubgraph {
    /// Check that `edges` form a subdivision of `K5` or `K3,3` in `graph`
    ///
    /// Returns `None` for any other edge set, including subdivisions with
    /// additional edges attached.
    pub fn classify<G, I>(graph: &G, edges: I) -> Option<Self>
    where
        G: IncidenceGraph,
        I: IntoIterator<Item = EdgeId>,
    {
        let mut incident: Vec<Vec<(EdgeId, NodeId)>> = vec![Vec::new(); graph.node_count()];
        for e in edges {
            let (u, v) = (graph.start_node(e.forward()), graph.end_node(e.forward()));
            if u == v {
                return None;
            }
            incident[u.index()].push((e, v));
            incident[v.index()].push((e, u));
        }

        let branch: Vec<NodeId> = graph
            .nodes()
            .filter(|v| incident[v.index()].len() > 2)
            .collect();
        let kind = match branch.len() {
            5 => KuratowskiKind::K5,
            6 => KuratowskiKind::K33,
            _ => return None,
        };
        if branch
            .iter()
            .any(|v| incident[v.index()].len() != kind.branch_degree())
            || incident.iter().any(|list| list.len() == 1)
        {
            return None;
        }

        let mut edge_colour = EdgeMap::new(graph.edge_count(), None);
        let mut paths: Vec<(NodeId, NodeId)> = Vec::new();
        for &b in &branch {
            for &(e, next) in &incident[b.index()] {
                if edge_colour[e].is_some() {
                    continue;
                }
                let colour = Some(paths.len() + 1);
                edge_colour[e] = colour;
                let (mut prev_edge, mut v) = (e, next);
                while incident[v.index()].len() == 2 {
                    let &(e, w) = incident[v.index()]
                        .iter()
                        .find(|&&(f, _)| f != prev_edge)?;
                    if edge_colour[e].is_some() {
                        return None;
                    }
                    edge_colour[e] = colour;
                    (prev_edge, v) = (e, w);
                }
                if v == b {
                    return None;
                }
                paths.push((b, v));
            }
        }
        // Paths through degree two nodes only form cycles apart from the rest
        if incident
            .iter()
            .flatten()
            .any(|&(e, _)| edge_colour[e].is_none())
        {
            return None;
        }
        if paths.len() != kind.path_count() {
            return None;
        }

        let index_of = |v: NodeId| branch.iter().position(|&b| b == v);
        let mut adjacent = [[false; 6]; 6];
        for &(u, v) in &paths {
            let (i, j) = (index_of(u)?, index_of(v)?);
            if adjacent[i][j] {
                return None;
            }
            adjacent[i][j] = true;
            adjacent[j][i] = true;
        }

        let mut node_colour = NodeMap::new(graph.node_count(), None);
        match kind {
            KuratowskiKind::K5 => {
                for &b in &branch {
                    node_colour[b] = Some(1);
                }
            }
            KuratowskiKind::K33 => {
                let class: Vec<bool> = (0..6).map(|j| !adjacent[0][j]).collect();
                if class.iter().filter(|&&c| c).count() != 3 {
                    return None;
                }
                for i in 0..6 {
                    for j in 0..6 {
                        if adjacent[i][j] == (class[i] == class[j]) {
                            return None;
                        }
                    }
                }
                for (i, &b) in branch.iter().enumerate() {
                    node_colour[b] = Some(if class[i] { 0 } else { 2 });
                }
            }
        }

        Some(Self {
            kind,
            node_colour,
            edge_colour,
        })
    }

    /// Edges of the subdivision
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_colour
            .iter()
            .filter_map(|(e, colour)| colour.map(|_| e))
    }

    /// The five or six nodes of degree greater than two
    pub fn branch_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.node_colour
            .iter()
            .filter_map(|(v, colour)| colour.map(|_| v))
    }
}

/// Find a Kuratowski subdivision among the non-planar edge set `edges`
///
/// Paths through nodes of degree two are contracted into single edges
/// first, then the contracted graph is minimised and its edges are expanded
/// back into paths of `graph`.
pub(crate) fn subdivision<G: IncidenceGraph>(
    graph: &G,
    edges: &[EdgeId],
) -> Result<KuratowskiSubgraph, PlanarityError> {
    let skeleton = Skeleton::contract(graph, edges);
    let all: Vec<EdgeId> = skeleton.graph.edges().collect();
    let kept = minimise(&skeleton.graph, &all)?;
    debug!(edges = edges.len(), skeleton = all.len(), kept = kept.len(), "subdivision found");
    let expanded = kept
        .iter()
        .flat_map(|e| skeleton.paths[e.index()].iter().copied());
    KuratowskiSubgraph::classify(graph, expanded)
        .ok_or(PlanarityError::Internal("minimal non-planar edge set is no subdivision"))
}

/// Homeomorphic image of an edge set on its nodes of degree other than two
struct Skeleton {
    graph: SparseGraph,
    /// Edges of the original graph behind each skeleton edge
    paths: Vec<Vec<EdgeId>>,
}

impl Skeleton {
    fn contract<G: IncidenceGraph>(graph: &G, edges: &[EdgeId]) -> Self {
        let mut incident: Vec<Vec<(EdgeId, NodeId)>> = vec![Vec::new(); graph.node_count()];
        for &e in edges {
            let (u, v) = (graph.start_node(e.forward()), graph.end_node(e.forward()));
            incident[u.index()].push((e, v));
            incident[v.index()].push((e, u));
        }
        let mut index = NodeMap::new(graph.node_count(), None);
        let mut nodes = 0;
        for v in graph.nodes() {
            let degree = incident[v.index()].len();
            if degree > 0 && degree != 2 {
                index[v] = Some(nodes);
                nodes += 1;
            }
        }

        let mut used = EdgeMap::new(graph.edge_count(), false);
        let mut ends = Vec::new();
        let mut paths = Vec::new();
        let mut trace_from = |s: NodeId, index: &NodeMap<Option<usize>>, used: &mut EdgeMap<bool>| {
            for &(e, w) in &incident[s.index()] {
                if used[e] {
                    continue;
                }
                used[e] = true;
                let mut path = vec![e];
                let (mut prev, mut cur) = (e, w);
                while index[cur].is_none() {
                    let Some(&(next, far)) = incident[cur.index()].iter().find(|&&(f, _)| f != prev) else {
                        break;
                    };
                    used[next] = true;
                    path.push(next);
                    prev = next;
                    cur = far;
                }
                ends.push((s, cur));
                paths.push(path);
            }
        };

        for v in graph.nodes() {
            if index[v].is_some() {
                trace_from(v, &index, &mut used);
            }
        }
        // Cycles of degree two nodes get one of their nodes as a branch node
        for &e in edges {
            if !used[e] {
                let s = graph.start_node(e.forward());
                index[s] = Some(nodes);
                nodes += 1;
                trace_from(s, &index, &mut used);
            }
        }

        let skeleton = SparseGraph::from_edges(
            nodes,
            ends.iter().map(|&(u, v)| (index[u].unwrap_or_default(), index[v].unwrap_or_default())),
        );
        Self {
            graph: skeleton,
            paths,
        }
    }
}

/// Shrink a non-planar edge set to a Kuratowski subdivision
///
/// An edge is dropped whenever the remaining edges stay non-planar. The
/// result is minimal, so by Kuratowski's theorem it is a subdivision of
/// `K5` or `K3,3`.
///
/// # Errors
/// Fails if the initial edge set is planar
fn minimise(graph: &SparseGraph, edges: &[EdgeId]) -> Result<Vec<EdgeId>, PlanarityError> {
    let tester = Planarity::new(PlanarityConfig::new().with_embedding(false));
    let is_planar = |kept: &[EdgeId]| -> Result<bool, PlanarityError> {
        let sub = SparseGraph::from_edges(
            graph.node_count(),
            kept.iter().map(|&e| {
                let a = e.forward();
                (graph.start_node(a).index(), graph.end_node(a).index())
            }),
        );
        Ok(matches!(tester.run(&sub)?, Outcome::Planar(_)))
    };

    let mut kept = edges.to_vec();
    if is_planar(&kept)? {
        return Err(PlanarityError::Internal("edge set to minimise is planar"));
    }
    let mut i = 0;
    while i < kept.len() {
        let e = kept.remove(i);
        if is_planar(&kept)? {
            kept.insert(i, e);
            i += 1;
        }
    }
    debug!(from = edges.len(), to = kept.len(), "minimised non-planar edge set");
    Ok(kept)
}
