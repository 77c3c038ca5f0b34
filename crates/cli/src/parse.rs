//! Plain text edge lists
//!
//! One edge per line as two node indices separated by whitespace. A line
//! `nodes <n>` fixes the node count, otherwise it is one more than the largest
//! index. Empty lines and everything after `#` are ignored. Node indices
//! and counts are limited to [`MAX_NODES`].

use anyhow::{bail, Context, Result};
use planarity::SparseGraph;

/// Largest accepted node count
pub const MAX_NODES: usize = 1 << 24;

fn node_index(field: &str, number: usize) -> Result<usize> {
    let index: usize = field
        .parse()
        .with_context(|| format!("line {number}: bad node `{field}`"))?;
    if index >= MAX_NODES {
        bail!("line {number}: node {index} is beyond the limit of {MAX_NODES} nodes");
    }
    Ok(index)
}

pub fn parse_edge_list(text: &str) -> Result<SparseGraph> {
    let mut nodes: Option<(usize, usize)> = None;
    let mut edges = Vec::new();
    // Line of the edge with the largest endpoint
    let mut widest: Option<(usize, usize)> = None;
    for (number, line) in text.lines().enumerate() {
        let number = number + 1;
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["nodes", n] => {
                if nodes.is_some() {
                    bail!("line {number}: node count given twice");
                }
                let n: usize = n.parse().with_context(|| format!("line {number}: bad node count"))?;
                if n > MAX_NODES {
                    bail!("line {number}: node count {n} is beyond the limit of {MAX_NODES}");
                }
                nodes = Some((n, number));
            }
            [u, v] => {
                let u = node_index(u, number)?;
                let v = node_index(v, number)?;
                if widest.map_or(true, |(top, _)| u.max(v) > top) {
                    widest = Some((u.max(v), number));
                }
                edges.push((u, v));
            }
            _ => bail!("line {number}: expected `<u> <v>` or `nodes <n>`, got `{line}`"),
        }
    }

    let n = match (nodes, widest) {
        (Some((n, header)), Some((top, line))) if top >= n => {
            bail!("line {line}: node {top} exceeds the node count {n} of line {header}")
        }
        (Some((n, _)), _) => n,
        (None, Some((top, _))) => top + 1,
        (None, None) => 0,
    };
    Ok(SparseGraph::from_edges(n, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planarity::{IncidenceGraph, NodeId};
    use test_log::test;

    #[test]
    fn test_parse_edges() {
        let graph = parse_edge_list("0 1\n1 2 # a comment\n\n# only a comment\n2 0\n").unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.end_node(planarity::EdgeId(1).forward()), NodeId(2));
    }

    #[test]
    fn test_node_count_header() {
        let graph = parse_edge_list("nodes 5\n0 1\n").unwrap();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 1);

        let empty = parse_edge_list("").unwrap();
        assert_eq!(empty.node_count(), 0);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse_edge_list("0 1 2\n").is_err());
        assert!(parse_edge_list("0 x\n").is_err());
        assert!(parse_edge_list("nodes 2\n0 2\n").is_err());
        assert!(parse_edge_list("nodes 2\nnodes 3\n").is_err());
        let err = parse_edge_list("0 1\n-1 2\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2"));
        let err = parse_edge_list("0 1\n3 0\nnodes 2\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2"));
    }

    #[test]
    fn test_rejects_huge_nodes() {
        let err = parse_edge_list("0 1\n0 18446744073709551615\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2"));
        let err = parse_edge_list("# big\nnodes 100000000000\n").unwrap_err();
        assert!(err.to_string().starts_with("line 2"));
        let err = parse_edge_list(&format!("nodes {}\n", MAX_NODES + 1)).unwrap_err();
        assert!(err.to_string().starts_with("line 1"));
        let err = parse_edge_list(&format!("0 {MAX_NODES}\n")).unwrap_err();
        assert!(err.to_string().starts_with("line 1"));
    }
}
