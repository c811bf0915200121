use crate::error::GraphError;
use crate::graph::DependencyGraph;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Computes a topological order of the graph's vertex positions.
///
/// Kahn's algorithm with ties broken by insertion order, so the same graph always yields
/// the same order. Vertices left with unresolved predecessors mean a cycle.
pub(super) fn topological_order(graph: &DependencyGraph) -> Result<Vec<usize>, GraphError> {
    let count = graph.len();
    let mut in_degree = vec![0usize; count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];

    for edge in graph.edges() {
        let producer = position(graph, &edge.producer)?;
        let consumer = position(graph, &edge.consumer)?;
        successors[producer].push(consumer);
        in_degree[consumer] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..count)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();
    let mut order = Vec::with_capacity(count);

    while let Some(Reverse(current)) = ready.pop() {
        order.push(current);
        for &next in &successors[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() < count {
        let nodes = (0..count)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| graph.nodes()[i].id.clone())
            .collect();
        return Err(GraphError::NotADag { nodes });
    }

    Ok(order)
}

fn position(graph: &DependencyGraph, id: &str) -> Result<usize, GraphError> {
    graph
        .position(id)
        .ok_or_else(|| GraphError::UnknownNode {
            missing_node_id: id.to_string(),
        })
}
