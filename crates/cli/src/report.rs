//! What the `planar` binary prints

use std::fmt;

use anyhow::{Context, Result};
use planarity::{
    faces, mark_exterior_face, IncidenceGraph, KuratowskiSubgraph, NodeId, Outcome, SparseGraph,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub nodes: usize,
    pub edges: usize,
    pub planar: bool,
    /// Neighbours of every node in rotation order
    pub rotation: Option<Vec<Vec<usize>>>,
    /// Node sequence of every face, exterior face first
    pub faces: Option<Vec<Vec<usize>>>,
    /// Edges of the block that failed the test
    pub block: Option<Vec<(usize, usize)>>,
    pub witness: Option<Witness>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Witness {
    pub kind: String,
    pub branch_nodes: Vec<usize>,
    pub edges: Vec<(usize, usize)>,
}

fn endpoints(graph: &SparseGraph, e: planarity::EdgeId) -> (usize, usize) {
    let a = e.forward();
    (graph.start_node(a).index(), graph.end_node(a).index())
}

impl Witness {
    fn new(graph: &SparseGraph, witness: &KuratowskiSubgraph) -> Self {
        Self {
            kind: witness.kind.to_string(),
            branch_nodes: witness.branch_nodes().map(NodeId::index).collect(),
            edges: witness.edges().map(|e| endpoints(graph, e)).collect(),
        }
    }
}

impl Report {
    /// Summarise `outcome`, installing its embedding into `graph`
    pub fn new(graph: &mut SparseGraph, outcome: Outcome, with_faces: bool) -> Result<Self> {
        let mut report = Report {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            planar: outcome.is_planar(),
            rotation: None,
            faces: None,
            block: None,
            witness: None,
        };
        match outcome {
            Outcome::Planar(Some(embedding)) => {
                embedding
                    .install(graph)
                    .context("installing the planar embedding")?;
                if with_faces {
                    let traced = faces(graph);
                    if let Some(exterior) = traced.largest() {
                        mark_exterior_face(graph, traced.face(exterior)[0])
                            .context("marking the exterior face")?;
                    }
                    let traced = faces(graph);
                    let mut order: Vec<usize> = (0..traced.len()).collect();
                    if let Some(exterior) = traced.largest() {
                        order.swap(0, exterior);
                    }
                    report.faces = Some(
                        order
                            .into_iter()
                            .map(|f| {
                                traced
                                    .face(f)
                                    .iter()
                                    .map(|&a| graph.start_node(a).index())
                                    .collect()
                            })
                            .collect(),
                    );
                }
                report.rotation = Some(
                    graph
                        .nodes()
                        .map(|v| graph.rotation(v).map(|a| graph.end_node(a).index()).collect())
                        .collect(),
                );
            }
            Outcome::Planar(None) => {}
            Outcome::NonPlanar(non_planar) => {
                report.block = Some(
                    non_planar
                        .block
                        .iter()
                        .map(|&e| endpoints(graph, e))
                        .collect(),
                );
                report.witness = non_planar.witness.map(|w| Witness::new(graph, &w));
            }
        }
        Ok(report)
    }
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.planar { "planar" } else { "not planar" };
        writeln!(f, "{verdict} ({} nodes, {} edges)", self.nodes, self.edges)?;
        if let Some(rotation) = &self.rotation {
            writeln!(f, "rotation:")?;
            for (v, neighbours) in rotation.iter().enumerate() {
                writeln!(f, "  {v}: {}", join(neighbours))?;
            }
        }
        if let Some(faces) = &self.faces {
            writeln!(f, "faces:")?;
            for (i, face) in faces.iter().enumerate() {
                let tag = if i == 0 { " (exterior)" } else { "" };
                writeln!(f, "  {i}{tag}: {}", join(face))?;
            }
        }
        if let Some(block) = &self.block {
            writeln!(f, "non-planar block with {} edges", block.len())?;
        }
        if let Some(witness) = &self.witness {
            writeln!(f, "{} subdivision on {}", witness.kind, join(&witness.branch_nodes))?;
            for (u, v) in &witness.edges {
                writeln!(f, "  {u} {v}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planarity::{Planarity, PlanarityConfig};
    use test_log::test;

    fn report(edges: &[(usize, usize)], config: PlanarityConfig, with_faces: bool) -> Report {
        let n = edges.iter().map(|&(u, v)| u.max(v) + 1).max().unwrap_or(0);
        let mut graph = SparseGraph::from_edges(n, edges.iter().copied());
        let outcome = Planarity::new(config).run(&graph).unwrap();
        Report::new(&mut graph, outcome, with_faces).unwrap()
    }

    #[test]
    fn test_square_report() {
        let report = report(&[(0, 1), (1, 2), (2, 3), (3, 0)], PlanarityConfig::new(), true);
        assert!(report.planar);
        let rotation = report.rotation.unwrap();
        assert_eq!(rotation.len(), 4);
        assert!(rotation.iter().all(|r| r.len() == 2));
        let faces = report.faces.unwrap();
        assert_eq!(faces.len(), 2);
        assert!(faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn test_witness_report() {
        let k5: Vec<_> = (0..5).flat_map(|u| (u + 1..5).map(move |v| (u, v))).collect();
        let report = report(&k5, PlanarityConfig::new().with_minor(true), false);
        assert!(!report.planar);
        assert_eq!(report.block.as_ref().map(Vec::len), Some(10));
        let witness = report.witness.clone().unwrap();
        assert_eq!(witness.kind, "K5");
        assert_eq!(witness.branch_nodes, vec![0, 1, 2, 3, 4]);
        assert!(report.to_string().starts_with("not planar (5 nodes, 10 edges)"));
    }

    #[test]
    fn test_verdict_only() {
        let report = report(&[(0, 1)], PlanarityConfig::new().with_embedding(false), true);
        assert!(report.planar);
        assert_eq!(report.rotation, None);
        assert_eq!(report.faces, None);
        assert_eq!(report.to_string(), "planar (2 nodes, 1 edges)\n");
    }
}
