use petgraph::graph::UnGraph;
use planarity::{
    faces, is_planar, planarize_incidence_order, ArcId, IncidenceGraph, KuratowskiKind,
    KuratowskiSubgraph, NodeId, Outcome, Planarity, PlanarityConfig, PlanarityEngine,
    SparseGraph, Verdict,
};
use std::collections::HashSet;
use test_log::test;

fn complete(n: usize) -> SparseGraph {
    SparseGraph::from_edges(n, (0..n).flat_map(|u| (u + 1..n).map(move |v| (u, v))))
}

fn complete_bipartite(p: usize, q: usize) -> SparseGraph {
    SparseGraph::from_edges(p + q, (0..p).flat_map(|u| (p..p + q).map(move |v| (u, v))))
}

fn grid(width: usize, height: usize) -> SparseGraph {
    let index = |x: usize, y: usize| y * width + x;
    let mut edges = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                edges.push((index(x, y), index(x + 1, y)));
            }
            if y + 1 < height {
                edges.push((index(x, y), index(x, y + 1)));
            }
        }
    }
    SparseGraph::from_edges(width * height, edges)
}

fn with_minor() -> Planarity {
    Planarity::new(PlanarityConfig::new().with_minor(true))
}

/// Embed a planar graph and check the resulting rotation system
fn assert_planar_embedding(graph: &SparseGraph) -> SparseGraph {
    let Outcome::Planar(Some(embedding)) = Planarity::default().run(graph).unwrap() else {
        panic!("expected a planar graph");
    };
    let mut embedded = graph.clone();
    embedding.install(&mut embedded).unwrap();

    // Every arc sits in the rotation of its start node exactly once
    let mut seen = HashSet::new();
    for v in embedded.nodes() {
        for a in embedded.rotation(v) {
            assert_eq!(embedded.start_node(a), v);
            assert!(seen.insert(a), "arc {a:?} appears twice");
        }
    }
    assert_eq!(seen.len(), embedded.arc_count());

    let faces = faces(&embedded);
    assert!(faces.euler_characteristic_holds(&embedded));
    embedded
}

fn assert_witness(graph: &SparseGraph, kind: KuratowskiKind) -> KuratowskiSubgraph {
    let Outcome::NonPlanar(non_planar) = with_minor().run(graph).unwrap() else {
        panic!("expected a non-planar graph");
    };
    let witness = non_planar.witness.expect("a witness was requested");
    assert_eq!(witness.kind, kind);
    let block: HashSet<_> = non_planar.block.iter().copied().collect();
    assert!(witness.edges().all(|e| block.contains(&e)));
    // The witness classifies again from its own edges
    let again = KuratowskiSubgraph::classify(graph, witness.edges()).unwrap();
    assert_eq!(again.kind, kind);
    witness
}

#[test]
fn test_kuratowski_graphs() {
    assert_witness(&complete(5), KuratowskiKind::K5);
    assert_witness(&complete_bipartite(3, 3), KuratowskiKind::K33);
}

#[test]
fn test_dense_graphs_yield_a_witness() {
    for n in 6..9 {
        let witness = assert_witness_any(&complete(n));
        assert!(witness.edges().count() >= 9);
    }
    assert_witness_any(&complete_bipartite(3, 5));
    assert_witness_any(&complete_bipartite(4, 4));
}

fn assert_witness_any(graph: &SparseGraph) -> KuratowskiSubgraph {
    let Outcome::NonPlanar(non_planar) = with_minor().run(graph).unwrap() else {
        panic!("expected a non-planar graph");
    };
    let witness = non_planar.witness.unwrap();
    assert!(KuratowskiSubgraph::classify(graph, witness.edges()).is_some());
    witness
}

#[test]
fn test_small_graphs_are_planar() {
    // Every simple graph on four nodes is a subgraph of K4
    let pairs: Vec<(usize, usize)> = (0..4).flat_map(|u| (u + 1..4).map(move |v| (u, v))).collect();
    for mask in 0u32..(1 << pairs.len()) {
        let edges = pairs
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &p)| p);
        let graph = SparseGraph::from_edges(4, edges);
        assert!(is_planar(&graph).unwrap(), "mask {mask:#b}");
        assert_planar_embedding(&graph);
    }
}

#[test]
fn test_planar_families() {
    let cycle = SparseGraph::from_edges(6, (0..6).map(|i| (i, (i + 1) % 6)));
    assert_eq!(faces(&assert_planar_embedding(&cycle)).len(), 2);

    let star = SparseGraph::from_edges(6, (1..6).map(|i| (0, i)));
    assert_eq!(faces(&assert_planar_embedding(&star)).len(), 1);

    let grid = grid(4, 3);
    assert_eq!(faces(&assert_planar_embedding(&grid)).len(), 7);

    let octahedron = SparseGraph::from_edges(
        6,
        (0..6).flat_map(|u| (u + 1..6).map(move |v| (u, v))).filter(|&(u, v)| v != u + 3 || u >= 3),
    );
    assert_eq!(octahedron.edge_count(), 12);
    assert_eq!(faces(&assert_planar_embedding(&octahedron)).len(), 8);

    let k24 = complete_bipartite(2, 4);
    assert_eq!(faces(&assert_planar_embedding(&k24)).len(), 4);
}

#[test]
fn test_disconnected_graph() {
    // Triangle, an isolated node and a square
    let graph = SparseGraph::from_edges(
        8,
        [(0, 1), (1, 2), (2, 0), (4, 5), (5, 6), (6, 7), (7, 4)],
    );
    let embedded = assert_planar_embedding(&graph);
    assert_eq!(embedded.first(NodeId(3)), None);
    assert_eq!(faces(&embedded).len(), 4);
}

#[test]
fn test_non_planar_component_among_planar_ones() {
    let mut edges: Vec<_> = (0..3).flat_map(|u| (3..6).map(move |v| (u, v))).collect();
    edges.extend([(6, 7), (7, 8), (8, 6)]);
    let graph = SparseGraph::from_edges(9, edges);
    assert!(!is_planar(&graph).unwrap());
    let witness = assert_witness(&graph, KuratowskiKind::K33);
    assert!((6..9).all(|v| witness.node_colour[NodeId(v)].is_none()));
}

#[test]
fn test_loops_and_parallel_edges() {
    let graph = SparseGraph::from_edges(
        3,
        [(0, 1), (0, 1), (1, 0), (1, 2), (2, 2), (2, 2), (0, 0)],
    );
    let embedded = assert_planar_embedding(&graph);
    // n - m + f = 2 with n = 3, m = 7
    assert_eq!(faces(&embedded).len(), 6);

    // Parallel edges and loops do not make K5 planar or K4 non-planar
    let mut k5 = complete(5);
    k5.add_edge(NodeId(0), NodeId(1));
    k5.add_edge(NodeId(2), NodeId(2));
    assert!(!is_planar(&k5).unwrap());
    assert_witness(&k5, KuratowskiKind::K5);

    let mut k4 = complete(4);
    k4.add_edge(NodeId(3), NodeId(0));
    k4.add_edge(NodeId(1), NodeId(1));
    assert_planar_embedding(&k4);
}

#[test]
fn test_runs_are_deterministic() {
    let graph = grid(3, 3);
    let first = Planarity::default().run(&graph).unwrap();
    let second = Planarity::default().run(&graph).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_planarize_keeps_a_planar_order() {
    let mut graph = grid(3, 3);
    assert!(planarize_incidence_order(&mut graph).unwrap());
    assert!(faces(&graph).euler_characteristic_holds(&graph));
    // Already planar orders are accepted again
    assert!(planarize_incidence_order(&mut graph).unwrap());
    assert!(faces(&graph).euler_characteristic_holds(&graph));
}

#[test]
fn test_embedding_without_minor_skips_witness() {
    let outcome = Planarity::default().run(&complete_bipartite(3, 3)).unwrap();
    let Outcome::NonPlanar(non_planar) = outcome else {
        panic!("K3,3 is not planar");
    };
    assert!(non_planar.witness.is_none());
    assert_eq!(non_planar.block.len(), 9);
}

#[test]
fn test_petgraph_input() {
    let graph = UnGraph::<&str, ()>::from_edges(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]);
    let Verdict::Planar(Some(embedding)) = Planarity::default().check(&graph).unwrap() else {
        panic!("a square with a chord is planar");
    };
    let total: usize = embedding.rotation.values().map(Vec::len).sum();
    assert_eq!(total, 2 * graph.edge_count());

    let k5 = UnGraph::<(), ()>::from_edges(
        (0u32..5).flat_map(|u| (u + 1..5).map(move |v| (u, v))),
    );
    let Verdict::NonPlanar(Some(witness)) = with_minor().check(&k5).unwrap() else {
        panic!("K5 is not planar");
    };
    assert_eq!(witness.kind, KuratowskiKind::K5);
    assert_eq!(witness.edges.len(), 10);
}

#[test]
fn test_embedding_faces_follow_rotation() {
    let graph = complete(4);
    let Outcome::Planar(Some(embedding)) = Planarity::default().run(&graph).unwrap() else {
        panic!("K4 is planar");
    };
    for (a, &pred) in embedding.pred_arc().iter() {
        assert_eq!(embedding.right(pred.reverse()), a);
    }
    let mut embedded = graph.clone();
    embedding.install(&mut embedded).unwrap();
    for v in embedded.nodes() {
        let from_graph: Vec<ArcId> = embedded.rotation(v).collect();
        let from_embedding: Vec<ArcId> = embedding.rotation(v).collect();
        assert_eq!(from_graph.len(), from_embedding.len());
        for (i, &a) in from_graph.iter().enumerate() {
            assert_eq!(embedding.right(a), from_graph[(i + 1) % from_graph.len()]);
        }
    }
}

/// Square of a path: every node is joined to the next two
fn path_square(n: usize) -> SparseGraph {
    SparseGraph::from_edges(
        n,
        (0..n - 1)
            .map(|i| (i, i + 1))
            .chain((0..n - 2).map(|i| (i, i + 2))),
    )
}

#[test]
fn test_deep_segment_tree_is_embedded() {
    let graph = path_square(100_000);
    let embedded = assert_planar_embedding(&graph);
    assert_eq!(faces(&embedded).len(), graph.edge_count() - graph.node_count() + 2);
}
