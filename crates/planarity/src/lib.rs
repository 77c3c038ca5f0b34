//! Planarity testing for undirected graphs
//!
//! This crate decides whether a graph can be drawn in the plane without
//! crossings, using the path addition algorithm of Hopcroft and Tarjan. A
//! planar graph gets a rotation system (a cyclic order of the incident arcs
//! at every node), a non-planar one can be certified by a subdivision of
//! `K5` or `K3,3`.
//!
//! Graphs are either [`SparseGraph`]s or any petgraph graph through the
//! [`PlanarityEngine`] trait.
//!
//! # Example
//!
//! ```
//! use planarity::{faces, Outcome, Planarity, PlanarityConfig, SparseGraph};
//! use planarity::{KuratowskiKind, PlanarityEngine, Verdict};
//! use petgraph::graph::UnGraph;
//!
//! // Embed a cube
//! let mut cube = SparseGraph::from_edges(8, [
//!     (0, 1), (1, 2), (2, 3), (3, 0),
//!     (4, 5), (5, 6), (6, 7), (7, 4),
//!     (0, 4), (1, 5), (2, 6), (3, 7),
//! ]);
//! let Outcome::Planar(Some(embedding)) = Planarity::default().run(&cube).unwrap() else {
//!     panic!("a cube is planar");
//! };
//! embedding.install(&mut cube).unwrap();
//! assert_eq!(faces(&cube).len(), 6);
//!
//! // Or use petgraph graphs and ask for a certificate
//! let k33 = UnGraph::<(), ()>::from_edges(&[
//!     (0, 3), (0, 4), (0, 5), (1, 3), (1, 4), (1, 5), (2, 3), (2, 4), (2, 5),
//! ]);
//! let engine = Planarity::new(PlanarityConfig::new().with_minor(true));
//! let Verdict::NonPlanar(Some(witness)) = engine.check(&k33).unwrap() else {
//!     panic!("K3,3 is not planar");
//! };
//! assert_eq!(witness.kind, KuratowskiKind::K33);
//! ```

mod attributes;
mod blocks;
mod engine;
mod error;
mod faces;
mod graph;
mod hopcroft_tarjan;
mod planar;
mod witness;

// Re-export core types and traits
pub use attributes::{ArcMap, EdgeMap, NodeMap};
pub use engine::{KuratowskiEdges, PlanarEmbedding, PlanarityEngine, Verdict};
pub use error::PlanarityError;
pub use faces::{faces, mark_exterior_face, Faces};
pub use graph::{ArcId, EdgeId, IncidenceGraph, IncidenceGraphMut, NodeId, Rotation, SparseGraph};
pub use planar::{
    is_planar, planarize_incidence_order, Embedding, NonPlanar, Outcome, Planarity,
    PlanarityConfig,
};
pub use witness::{KuratowskiKind, KuratowskiSubgraph};

// Re-export petgraph visitor traits used by the engine bounds
pub use petgraph::visit::{IntoEdgeReferences, IntoNodeIdentifiers, NodeIndexable};
