use crate::graph::{IncidenceGraph, NodeId, SparseGraph};
use crate::planar::{Outcome, Planarity};
use crate::witness::KuratowskiKind;
use anyhow::Result;
use petgraph::visit::{IntoEdgeReferences, IntoNodeIdentifiers, NodeIndexable};
use std::collections::HashMap;
use std::hash::Hash;

/// A planarity test that works on foreign graph types
///
/// This trait is generic over the graph type `G`, so a tester can name the
/// graph capabilities it needs:
/// - [`Planarity`] implements it for every petgraph graph that can list its
///   edges and map its nodes to indices
/// - Edge direction is ignored, planarity is a property of the underlying
///   undirected multigraph
pub trait PlanarityEngine<G> {
    /// The type used to identify nodes in the graph
    type NodeId: Copy + Eq + Hash;

    /// Test the graph and describe the result in terms of its node ids
    ///
    /// # Errors
    /// Returns an error if the test runs into an internal inconsistency
    fn check(&self, graph: G) -> Result<Verdict<Self::NodeId>>;
}

/// Clockwise order of neighbours around every node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarEmbedding<N: Eq + Hash> {
    pub rotation: HashMap<N, Vec<N>>,
}

/// Edges of a Kuratowski subdivision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KuratowskiEdges<N> {
    pub kind: KuratowskiKind,
    pub edges: Vec<(N, N)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<N: Eq + Hash> {
    /// The embedding is present if the configuration asks for one
    Planar(Option<PlanarEmbedding<N>>),
    /// The subdivision is present if the configuration asks for one
    NonPlanar(Option<KuratowskiEdges<N>>),
}

impl<N: Eq + Hash> Verdict<N> {
    pub fn is_planar(&self) -> bool {
        matches!(self, Verdict::Planar(_))
    }
}

impl<G> PlanarityEngine<G> for Planarity
where
    G: IntoEdgeReferences + IntoNodeIdentifiers + NodeIndexable,
    G::NodeId: Copy + Eq + Hash,
{
    type NodeId = G::NodeId;

    fn check(&self, graph: G) -> Result<Verdict<G::NodeId>> {
        let sparse = SparseGraph::from_petgraph(graph);
        let node = |v: NodeId| graph.from_index(v.index());

        let verdict = match self.run(&sparse)? {
            Outcome::Planar(embedding) => Verdict::Planar(embedding.map(|embedding| {
                let rotation = graph
                    .node_identifiers()
                    .map(|n| {
                        let v = NodeId(graph.to_index(n));
                        let neighbours = embedding
                            .rotation(v)
                            .map(|a| node(sparse.end_node(a)))
                            .collect();
                        (n, neighbours)
                    })
                    .collect();
                PlanarEmbedding { rotation }
            })),
            Outcome::NonPlanar(non_planar) => {
                Verdict::NonPlanar(non_planar.witness.map(|witness| KuratowskiEdges {
                    kind: witness.kind,
                    edges: witness
                        .edges()
                        .map(|e| {
                            let a = e.forward();
                            (node(sparse.start_node(a)), node(sparse.end_node(a)))
                        })
                        .collect(),
                }))
            }
        };
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlanarityConfig;
    use petgraph::graph::UnGraph;
    use petgraph::graphmap::UnGraphMap;
    use test_log::test;

    #[test]
    fn test_wheel_rotation() {
        let mut graph = UnGraphMap::<char, ()>::new();
        for (u, v) in [('h', 'a'), ('h', 'b'), ('h', 'c'), ('h', 'd')] {
            graph.add_edge(u, v, ());
        }
        for (u, v) in [('a', 'b'), ('b', 'c'), ('c', 'd'), ('d', 'a')] {
            graph.add_edge(u, v, ());
        }
        let Verdict::Planar(Some(embedding)) = Planarity::default().check(&graph).unwrap() else {
            panic!("a wheel is planar");
        };
        let hub = &embedding.rotation[&'h'];
        assert_eq!(hub.len(), 4);
        // Rim neighbours of the hub appear in cyclic order
        let position = |c: char| hub.iter().position(|&n| n == c).unwrap();
        let step = (position('b') + 4 - position('a')) % 4;
        assert!(step == 1 || step == 3);
        assert_eq!((position('c') + 4 - position('b')) % 4, step);
        assert_eq!((position('d') + 4 - position('c')) % 4, step);
    }

    #[test]
    fn test_petersen_graph() {
        let outer = (0..5).map(|i| (i, (i + 1) % 5));
        let spokes = (0..5).map(|i| (i, i + 5));
        let inner = (0..5).map(|i| (i + 5, (i + 2) % 5 + 5));
        let edges: Vec<(u32, u32)> = outer.chain(spokes).chain(inner).collect();
        let graph = UnGraph::<(), ()>::from_edges(&edges);

        let engine = Planarity::new(PlanarityConfig::new().with_minor(true));
        let Verdict::NonPlanar(Some(witness)) = engine.check(&graph).unwrap() else {
            panic!("the Petersen graph is not planar");
        };
        assert_eq!(witness.kind, KuratowskiKind::K33);
        for (u, v) in &witness.edges {
            assert!(graph.contains_edge(*u, *v));
        }
    }

    #[test]
    fn test_verdict_without_details() {
        let graph = UnGraph::<(), ()>::from_edges(&[(0, 1), (1, 2), (2, 0)]);
        let engine = Planarity::new(PlanarityConfig::new().with_embedding(false));
        let verdict = engine.check(&graph).unwrap();
        assert!(verdict.is_planar());
        assert_eq!(verdict, Verdict::Planar(None));
    }
}
