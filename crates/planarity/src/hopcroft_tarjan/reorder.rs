use tracing::trace;

use super::dfs::{EdgeType, PalmTree};
use crate::attributes::{EdgeMap, NodeMap};
use crate::graph::{ArcId, IncidenceGraphMut};
use crate::PlanarityError;

/// Sort the incidence lists by the Hopcroft-Tarjan key
///
/// The key of a classified arc is `2 * low1`, plus one for tree arcs whose
/// `low2` lies strictly above their start node. The bucket sort is stable,
/// unclassified arcs end up behind the classified ones.
///
/// # Errors
/// Fails if the DFS left an edge unclassified
pub(crate) fn reorder<G: IncidenceGraphMut>(
    graph: &mut G,
    tree: &PalmTree,
) -> Result<(), PlanarityError> {
    let n = graph.node_count();
    let buckets = 2 * n;
    let mut head: Vec<Option<ArcId>> = vec![None; buckets];
    let mut tail: Vec<Option<ArcId>> = vec![None; buckets];
    let mut next: EdgeMap<Option<ArcId>> = EdgeMap::new(graph.edge_count(), None);

    for e in graph.edges() {
        let classified = [e.forward(), e.backward()]
            .into_iter()
            .find(|&a| tree.edge_type[a] != EdgeType::Free);
        let Some(a) = classified else {
            if graph.is_loop(e) {
                continue;
            }
            return Err(PlanarityError::UnclassifiedArc(e.forward()));
        };

        let mut key = 2 * tree.low1[e];
        if tree.edge_type[a] == EdgeType::Tree && tree.low2[e] < tree.start_preorder(graph, a) {
            key += 1;
        }
        let Some(slot) = tail.get_mut(key) else {
            return Err(PlanarityError::Internal("low point outside of preorder range"));
        };
        match slot.replace(a) {
            None => head[key] = Some(a),
            Some(previous) => next[previous.edge()] = Some(a),
        }
    }

    let mut last = NodeMap::new(n, None);
    for mut cursor in head {
        while let Some(a) = cursor {
            let v = graph.start_node(a);
            match last[v] {
                None => graph.set_first(v, a)?,
                Some(previous) => graph.set_right(previous, a)?,
            }
            last[v] = Some(a);
            cursor = next[a.edge()];
        }
    }
    trace!("incidence lists reordered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{IncidenceGraph, NodeId, SparseGraph};
    use test_log::test;

    fn rotation(graph: &SparseGraph, v: usize) -> Vec<usize> {
        graph.rotation(NodeId(v)).map(ArcId::index).collect()
    }

    #[test]
    fn test_k4_reorder() {
        let mut graph = SparseGraph::from_edges(
            4,
            [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)],
        );
        let tree = PalmTree::explore(&graph, NodeId(0)).unwrap();
        reorder(&mut graph, &tree).unwrap();

        // Classified arcs first, in key order; free arcs keep trailing
        assert_eq!(rotation(&graph, 0), vec![0, 2, 4]);
        assert_eq!(rotation(&graph, 1), vec![6, 8, 1]);
        assert_eq!(rotation(&graph, 2), vec![3, 10, 7]);
        assert_eq!(rotation(&graph, 3), vec![5, 9, 11]);
    }

    #[test]
    fn test_interlaced_chords_reorder() {
        let mut graph = SparseGraph::from_edges(
            6,
            [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (1, 3), (2, 4)],
        );
        let tree = PalmTree::explore(&graph, NodeId(0)).unwrap();
        reorder(&mut graph, &tree).unwrap();

        assert_eq!(rotation(&graph, 1), vec![2, 12, 1]);
        assert_eq!(rotation(&graph, 2), vec![4, 14, 3]);
        assert_eq!(rotation(&graph, 3), vec![6, 13, 5]);
        assert_eq!(rotation(&graph, 4), vec![8, 15, 7]);
        assert_eq!(rotation(&graph, 5), vec![10, 9]);
    }
}
