//! Decomposition into biconnected blocks

use tracing::trace;

use crate::attributes::{EdgeMap, NodeMap};
use crate::graph::{ArcId, EdgeId, IncidenceGraph, NodeId};

const UNVISITED: usize = usize::MAX;

struct Frame {
    node: NodeId,
    /// Tree arc leading into `node`
    parent: Option<ArcId>,
    first: ArcId,
    cursor: Option<ArcId>,
}

/// Edge sets of the blocks of `graph`, edges flagged in `ignored` are skipped
///
/// Every remaining edge belongs to exactly one block. A bridge forms a block
/// on its own, isolated nodes belong to no block.
pub(crate) fn biconnected_blocks<G: IncidenceGraph>(
    graph: &G,
    ignored: &EdgeMap<bool>,
) -> Vec<Vec<EdgeId>> {
    let mut number = NodeMap::new(graph.node_count(), UNVISITED);
    let mut low = NodeMap::new(graph.node_count(), UNVISITED);
    let mut counter = 0;
    let mut pending: Vec<EdgeId> = Vec::new();
    let mut blocks = Vec::new();

    for root in graph.nodes() {
        if number[root] != UNVISITED {
            continue;
        }
        number[root] = counter;
        low[root] = counter;
        counter += 1;
        let Some(first) = graph.first(root) else {
            continue;
        };

        let mut stack = vec![Frame {
            node: root,
            parent: None,
            first,
            cursor: Some(first),
        }];
        while let Some(top) = stack.last_mut() {
            let v = top.node;
            let Some(a) = top.cursor else {
                let parent = top.parent;
                stack.pop();
                let Some(p) = parent else {
                    continue;
                };
                let u = graph.start_node(p);
                low[u] = low[u].min(low[v]);
                if low[v] >= number[u] {
                    let mut block = Vec::new();
                    while let Some(e) = pending.pop() {
                        block.push(e);
                        if e == p.edge() {
                            break;
                        }
                    }
                    block.reverse();
                    trace!(cut = %u, edges = block.len(), "block");
                    blocks.push(block);
                }
                continue;
            };

            let next = graph.right(a);
            top.cursor = (next != top.first).then_some(next);
            let e = a.edge();
            if ignored[e] || top.parent.is_some_and(|p| p.edge() == e) {
                continue;
            }

            let w = graph.end_node(a);
            if number[w] == UNVISITED {
                number[w] = counter;
                low[w] = counter;
                counter += 1;
                pending.push(e);
                let first = graph.first(w).unwrap_or(a.reverse());
                stack.push(Frame {
                    node: w,
                    parent: Some(a),
                    first,
                    cursor: Some(first),
                });
            } else if number[w] < number[v] {
                pending.push(e);
                low[v] = low[v].min(number[w]);
            }
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SparseGraph;
    use test_log::test;

    fn blocks(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        let graph = SparseGraph::from_edges(n, edges.iter().copied());
        let ignored = EdgeMap::new(graph.edge_count(), false);
        let mut blocks: Vec<Vec<usize>> = biconnected_blocks(&graph, &ignored)
            .into_iter()
            .map(|block| {
                let mut block: Vec<_> = block.into_iter().map(EdgeId::index).collect();
                block.sort_unstable();
                block
            })
            .collect();
        blocks.sort();
        blocks
    }

    #[test]
    fn test_cycle_is_one_block() {
        assert_eq!(blocks(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_path_splits_into_bridges() {
        assert_eq!(blocks(3, &[(0, 1), (1, 2)]), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_bowtie() {
        assert_eq!(
            blocks(5, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)]),
            vec![vec![0, 1, 2], vec![3, 4, 5]]
        );
    }

    #[test]
    fn test_triangle_with_pendant_and_isolated_node() {
        assert_eq!(
            blocks(5, &[(0, 1), (1, 2), (2, 0), (1, 3)]),
            vec![vec![0, 1, 2], vec![3]]
        );
    }

    #[test]
    fn test_ignored_edges_are_skipped() {
        let graph = SparseGraph::from_edges(2, [(0, 1), (0, 1), (1, 1)]);
        let mut ignored = EdgeMap::new(graph.edge_count(), false);
        ignored[EdgeId(1)] = true;
        ignored[EdgeId(2)] = true;
        assert_eq!(biconnected_blocks(&graph, &ignored), vec![vec![EdgeId(0)]]);
    }
}
