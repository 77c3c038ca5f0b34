use thiserror::Error;

use crate::graph::{ArcId, NodeId};

/// Errors reported by the planarity machinery
///
/// The first group rejects invalid input. The second group reports broken
/// invariants of the Hopcroft-Tarjan data structures; seeing one of them is a
/// bug, not a property of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanarityError {
    #[error("graph is not connected: DFS from node {root} reached {reached} of {nodes} nodes")]
    NotConnected {
        root: NodeId,
        reached: usize,
        nodes: usize,
    },

    #[error("graph is not 2-connected: node {0} is a cut node")]
    NotBiconnected(NodeId),

    #[error("arcs {0} and {1} do not share a start node")]
    MismatchingStartNodes(ArcId, ArcId),

    #[error("arc {0} does not start at node {1}")]
    ArcNotAtNode(ArcId, NodeId),

    #[error("edge of arc {0} was never classified by the DFS")]
    UnclassifiedArc(ArcId),

    #[error("segment starting with arc {0} has no low edge")]
    MissingLowEdge(ArcId),

    #[error("arc {0} was placed twice or not at all")]
    ArcPlacement(ArcId),

    #[error("internal inconsistency: {0}")]
    Internal(&'static str),
}
