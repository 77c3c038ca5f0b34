//! Planarity of arbitrary graphs
//!
//! Loops and parallel edges are set aside, the remaining simple graph is
//! split into blocks and every block is tested on its own. Rotations of
//! blocks sharing a cut node are spliced together, loops and parallel edges
//! are put back at the end.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, debug_span, warn};

use crate::attributes::{ArcMap, EdgeMap, NodeMap};
use crate::blocks::biconnected_blocks;
use crate::graph::{ArcId, EdgeId, IncidenceGraph, NodeId, SparseGraph};
use crate::hopcroft_tarjan::kuratowski::MinorColouring;
use crate::hopcroft_tarjan::{embed_biconnected, CoreOutcome};
use crate::witness::{subdivision, KuratowskiSubgraph};
use crate::PlanarityError;

/// What to compute besides the planar / non-planar verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarityConfig {
    /// Produce a Kuratowski subdivision for non-planar graphs
    pub extract_minor: bool,
    /// Produce a rotation system for planar graphs
    pub embed: bool,
}

impl Default for PlanarityConfig {
    fn default() -> Self {
        Self {
            extract_minor: false,
            embed: true,
        }
    }
}

impl PlanarityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_minor(mut self, extract_minor: bool) -> Self {
        self.extract_minor = extract_minor;
        self
    }

    pub fn with_embedding(mut self, embed: bool) -> Self {
        self.embed = embed;
        self
    }
}

/// A planar rotation system of a whole graph
///
/// Stored as face predecessors: `pred_arc[a]` is the reverse of the arc that
/// precedes `a` in the rotation at its start node. Equivalently, `pred_arc[a]`
/// precedes `a` when walking around a face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedding {
    pred_arc: ArcMap<ArcId>,
    right: ArcMap<ArcId>,
    first: NodeMap<Option<ArcId>>,
}

impl Embedding {
    fn new(graph: &SparseGraph, pred_arc: ArcMap<ArcId>) -> Self {
        let mut right = ArcMap::new(pred_arc.len(), ArcId(0));
        for (a, &pred) in pred_arc.iter() {
            right[pred.reverse()] = a;
        }
        let first = graph.nodes().map(|v| graph.first(v)).collect();
        Self {
            pred_arc,
            right,
            first,
        }
    }

    pub fn pred_arc(&self) -> &ArcMap<ArcId> {
        &self.pred_arc
    }

    /// Successor of `a` in the rotation at its start node
    pub fn right(&self, a: ArcId) -> ArcId {
        self.right[a]
    }

    /// Rotation at `v`, starting with its first incidence in the input graph
    pub fn rotation(&self, v: NodeId) -> impl Iterator<Item = ArcId> + '_ {
        let first = self.first[v];
        std::iter::successors(first, move |&a| {
            let next = self.right[a];
            (Some(next) != first).then_some(next)
        })
    }

    /// Replace the incidence lists of `graph` by this rotation system
    ///
    /// # Errors
    /// Fails if the embedding belongs to a different graph
    pub fn install(&self, graph: &mut SparseGraph) -> Result<(), PlanarityError> {
        if graph.arc_count() != self.pred_arc.len() {
            return Err(PlanarityError::Internal("embedding of a different graph"));
        }
        graph.reorder_incidences(&self.pred_arc)
    }
}

/// Evidence of non-planarity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonPlanar {
    /// Edges of the first block found to be non-planar
    pub block: Vec<EdgeId>,
    /// Subdivision inside `block`, present when requested
    pub witness: Option<KuratowskiSubgraph>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The embedding is present when requested
    Planar(Option<Embedding>),
    NonPlanar(NonPlanar),
}

impl Outcome {
    pub fn is_planar(&self) -> bool {
        matches!(self, Outcome::Planar(_))
    }
}

/// Face predecessors under construction, with the inverse map kept in sync
struct FaceLinks {
    pred: ArcMap<Option<ArcId>>,
    succ: ArcMap<Option<ArcId>>,
}

impl FaceLinks {
    fn new(arcs: usize) -> Self {
        Self {
            pred: ArcMap::new(arcs, None),
            succ: ArcMap::new(arcs, None),
        }
    }

    fn link(&mut self, before: ArcId, after: ArcId) {
        self.pred[after] = Some(before);
        self.succ[before] = Some(after);
    }

    fn pred(&self, a: ArcId) -> Result<ArcId, PlanarityError> {
        self.pred[a].ok_or(PlanarityError::ArcPlacement(a))
    }

    fn succ(&self, a: ArcId) -> Result<ArcId, PlanarityError> {
        self.succ[a].ok_or(PlanarityError::ArcPlacement(a))
    }

    /// Join the rotations containing `a` and `b` into one
    fn splice(&mut self, a: ArcId, b: ArcId) -> Result<(), PlanarityError> {
        let (pa, pb) = (self.pred(a)?, self.pred(b)?);
        self.link(pb, a);
        self.link(pa, b);
        Ok(())
    }
}

/// A block copied into a graph of its own
struct Block {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    graph: SparseGraph,
}

impl Block {
    fn extract(graph: &SparseGraph, edges: &[EdgeId], local: &mut NodeMap<Option<usize>>) -> Self {
        let mut nodes = Vec::new();
        let mut pairs = Vec::with_capacity(edges.len());
        for &e in edges {
            let a = e.forward();
            let mut index = |v: NodeId| {
                *local[v].get_or_insert_with(|| {
                    nodes.push(v);
                    nodes.len() - 1
                })
            };
            let u = index(graph.start_node(a));
            let w = index(graph.end_node(a));
            pairs.push((u, w));
        }
        for &v in &nodes {
            local[v] = None;
        }
        Self {
            graph: SparseGraph::from_edges(nodes.len(), pairs),
            nodes,
            edges: edges.to_vec(),
        }
    }

    fn global_arc(&self, a: ArcId) -> ArcId {
        let e = self.edges[a.edge().index()];
        if a.is_forward() {
            e.forward()
        } else {
            e.backward()
        }
    }
}

/// Block-wise Hopcroft-Tarjan planarity test
#[derive(Debug, Clone, Default)]
pub struct Planarity {
    config: PlanarityConfig,
}

impl Planarity {
    pub fn new(config: PlanarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanarityConfig {
        &self.config
    }

    /// Test `graph`, computing whatever the configuration asks for
    ///
    /// # Errors
    /// Only internal inconsistencies are reported as errors, a non-planar
    /// graph is an [`Outcome::NonPlanar`].
    pub fn run(&self, graph: &SparseGraph) -> Result<Outcome, PlanarityError> {
        let (ignored, representative) = simple_skeleton(graph);
        let blocks = biconnected_blocks(graph, &ignored);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            blocks = blocks.len(),
            "testing planarity"
        );

        let mut links = FaceLinks::new(graph.arc_count());
        let mut first_at: NodeMap<Option<ArcId>> = NodeMap::new(graph.node_count(), None);
        let mut local = NodeMap::new(graph.node_count(), None);

        for (index, edges) in blocks.iter().enumerate() {
            let mut block = Block::extract(graph, edges, &mut local);
            let (n, m) = (block.nodes.len(), block.edges.len());
            let _span = debug_span!("block", index, nodes = n, edges = m).entered();

            if n > 3 && m > 3 * n - 6 && !self.config.extract_minor {
                debug!("too many edges for a planar block");
                return Ok(Outcome::NonPlanar(NonPlanar {
                    block: block.edges,
                    witness: None,
                }));
            }

            let run_core = (self.config.embed && m > 1) || (m > 8 && n > 4 && m > n + 2);
            let pred_arc = if run_core {
                match embed_biconnected(&mut block.graph, self.config.extract_minor)? {
                    CoreOutcome::Planar { pred_arc } => pred_arc,
                    CoreOutcome::NonPlanar { colouring } => {
                        let witness = colouring
                            .map(|colouring| self.witness(graph, &block, colouring))
                            .transpose()?;
                        return Ok(Outcome::NonPlanar(NonPlanar {
                            block: block.edges,
                            witness,
                        }));
                    }
                }
            } else if m == 1 {
                ArcMap::from(vec![ArcId(1), ArcId(0)])
            } else {
                continue;
            };
            if !self.config.embed {
                continue;
            }

            for (a, &pred) in pred_arc.iter() {
                links.link(block.global_arc(pred), block.global_arc(a));
            }
            for v in block.graph.nodes() {
                let Some(a0) = block.graph.first(v) else {
                    continue;
                };
                let a0 = block.global_arc(a0);
                let node = block.nodes[v.index()];
                match first_at[node] {
                    Some(a) => links.splice(a, a0)?,
                    None => first_at[node] = Some(a0),
                }
            }
        }

        if !self.config.embed {
            return Ok(Outcome::Planar(None));
        }

        insert_loops(graph, &mut links)?;
        insert_parallels(graph, &representative, &mut links)?;

        let pred_arc = graph
            .arcs()
            .map(|a| links.pred(a))
            .collect::<Result<ArcMap<_>, _>>()?;
        Ok(Outcome::Planar(Some(Embedding::new(graph, pred_arc))))
    }

    /// Turn the colouring of the failing block into a verified witness
    fn witness(
        &self,
        graph: &SparseGraph,
        block: &Block,
        colouring: Result<MinorColouring, PlanarityError>,
    ) -> Result<KuratowskiSubgraph, PlanarityError> {
        match colouring {
            Ok(colouring) => {
                let edges = colouring.edges().map(|e| block.edges[e.index()]);
                if let Some(witness) = KuratowskiSubgraph::classify(graph, edges) {
                    debug!(kind = %witness.kind, "Kuratowski subgraph extracted");
                    return Ok(witness);
                }
                warn!("coloured edges are no Kuratowski subdivision, minimising the block");
            }
            Err(err) => warn!(%err, "Kuratowski extraction failed, minimising the block"),
        }
        subdivision(graph, &block.edges)
    }
}

/// Flag loops and all but the first of each class of parallel edges
fn simple_skeleton(graph: &SparseGraph) -> (EdgeMap<bool>, EdgeMap<Option<EdgeId>>) {
    let mut ignored = EdgeMap::new(graph.edge_count(), false);
    let mut representative = EdgeMap::new(graph.edge_count(), None);
    let mut seen: HashMap<(NodeId, NodeId), EdgeId> = HashMap::new();
    for e in graph.edges() {
        let (u, v) = (graph.start_node(e.forward()), graph.end_node(e.forward()));
        if u == v {
            ignored[e] = true;
            continue;
        }
        match seen.entry((u.min(v), u.max(v))) {
            Entry::Occupied(entry) => {
                ignored[e] = true;
                representative[e] = Some(*entry.get());
            }
            Entry::Vacant(entry) => {
                entry.insert(e);
            }
        }
    }
    (ignored, representative)
}

/// Put every loop as a pair of adjacent arcs in front of an embedded arc
fn insert_loops(graph: &SparseGraph, links: &mut FaceLinks) -> Result<(), PlanarityError> {
    let mut count = 0;
    for e in graph.edges().filter(|&e| graph.is_loop(e)) {
        let (a, r) = (e.forward(), e.backward());
        let v = graph.start_node(a);
        let embedded = graph
            .rotation(v)
            .find(|&b| b.edge() != e && links.pred[b].is_some());
        links.link(r, r);
        match embedded {
            Some(b) => {
                let pb = links.pred(b)?;
                links.link(pb, a);
                links.link(a, b);
            }
            None => links.link(a, a),
        }
        count += 1;
    }
    if count > 0 {
        debug!(count, "loops embedded");
    }
    Ok(())
}

/// Put every parallel edge next to its representative, forming a 2-gon
fn insert_parallels(
    graph: &SparseGraph,
    representative: &EdgeMap<Option<EdgeId>>,
    links: &mut FaceLinks,
) -> Result<(), PlanarityError> {
    let mut count = 0;
    for (e, &rep) in representative.iter() {
        let Some(rep) = rep else {
            continue;
        };
        let (a, r) = (e.forward(), e.backward());
        let a2 = if graph.start_node(rep.forward()) == graph.start_node(a) {
            rep.forward()
        } else {
            rep.backward()
        };
        let a3 = links.succ(a2)?;
        let pa2 = links.pred(a2)?;
        links.link(a, a3);
        links.link(a2, r);
        links.link(pa2, a);
        links.link(r, a2);
        count += 1;
    }
    if count > 0 {
        debug!(count, "parallel edges embedded");
    }
    Ok(())
}

/// Decide planarity without computing an embedding
///
/// # Errors
/// Reports internal inconsistencies only
pub fn is_planar(graph: &SparseGraph) -> Result<bool, PlanarityError> {
    let tester = Planarity::new(PlanarityConfig::new().with_embedding(false));
    Ok(tester.run(graph)?.is_planar())
}

/// Reorder the incidence lists of a planar graph into a planar rotation system
///
/// Returns `false` and leaves the graph untouched if it is not planar.
///
/// # Errors
/// Reports internal inconsistencies only
pub fn planarize_incidence_order(graph: &mut SparseGraph) -> Result<bool, PlanarityError> {
    match Planarity::default().run(graph)? {
        Outcome::Planar(Some(embedding)) => {
            embedding.install(graph)?;
            Ok(true)
        }
        Outcome::Planar(None) => Ok(true),
        Outcome::NonPlanar(_) => Ok(false),
    }
}
