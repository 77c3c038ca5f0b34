//! Hopcroft-Tarjan path addition on a single biconnected block
//!
//! The pipeline runs a palm tree DFS ([`dfs`]), sorts every incidence list by
//! low points ([`reorder`]), decomposes the palm tree into segments
//! ([`segments`]) and tests them bottom up ([`strong`]). A successful test is
//! turned into a rotation system ([`embed`]), a failed one optionally into a
//! Kuratowski subdivision ([`kuratowski`]).

pub(crate) mod dfs;
mod embed;
pub(crate) mod kuratowski;
pub(crate) mod reorder;
pub(crate) mod segments;
mod strong;

use tracing::debug;

use self::dfs::PalmTree;
use self::embed::Embedder;
use self::kuratowski::MinorColouring;
use self::segments::SegmentTree;
use self::strong::StrongPlanarity;
use crate::attributes::ArcMap;
use crate::graph::{ArcId, IncidenceGraphMut, NodeId};
use crate::PlanarityError;

/// Result of the core test on one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CoreOutcome {
    /// The incidence lists of the graph now form a planar rotation system,
    /// described again by the face predecessor of every arc
    Planar { pred_arc: ArcMap<ArcId> },
    /// `colouring` is present if extraction was requested, it is an error
    /// if the extraction failed
    NonPlanar {
        colouring: Option<Result<MinorColouring, PlanarityError>>,
    },
}

/// Test a biconnected graph and embed it if it is planar
///
/// The incidence lists of `graph` are reordered in any case.
///
/// # Errors
/// [`PlanarityError::NotConnected`] and [`PlanarityError::NotBiconnected`]
/// reject unsuitable input, other variants report internal inconsistencies.
pub(crate) fn embed_biconnected<G: IncidenceGraphMut>(
    graph: &mut G,
    extract_minor: bool,
) -> Result<CoreOutcome, PlanarityError> {
    let root = NodeId(0);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "First DFS"
    );
    let tree = PalmTree::explore(&*graph, root)?;
    tree.check_biconnected(&*graph)?;

    debug!("Reordering arcs");
    reorder::reorder(graph, &tree)?;

    debug!("Calculating the path tree");
    let start = graph
        .first(root)
        .ok_or(PlanarityError::Internal("root without incidences"))?;
    let mut segments = SegmentTree::build(&*graph, &tree, start)?;

    debug!(segments = segments.len(), "Testing strong planarity");
    let mut tester = StrongPlanarity::new(&*graph, &tree, &mut segments, extract_minor);
    if !tester.run()? {
        let colouring = tester.take_minor();
        debug!(extracted = colouring.is_some(), "graph is not planar");
        return Ok(CoreOutcome::NonPlanar { colouring });
    }

    debug!("Calculating planar representation");
    let pred_arc = Embedder::new(graph, &tree, &segments).run()?;
    Ok(CoreOutcome::Planar { pred_arc })
}
