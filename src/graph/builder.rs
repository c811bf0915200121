use super::{DependencyGraph, validate_shape};
use crate::error::GraphError;
use crate::model::{IntoNodeGraph, NodeDescriptor, NodeRole};
use tracing::{debug, instrument};

/// Builds a validated dependency graph from an unordered collection of nodes.
///
/// The start node is inserted first and the end node last. Interior nodes are inserted
/// in rounds: each round inserts every remaining node whose inputs are already provided,
/// keeping the original order among them. When a round makes no progress, the first
/// stuck node's insert error is returned.
///
/// A needed key produced by more than one other node is rejected up front, whatever the
/// order of the collection.
#[instrument(level = "debug", skip(source))]
pub fn build_graph(source: impl IntoNodeGraph) -> Result<DependencyGraph, GraphError> {
    let node_graph = source.into_node_graph()?;
    let shape = validate_shape(&node_graph.nodes)?;
    check_unique_providers(&node_graph.nodes)?;

    let mut start = None;
    let mut end = None;
    let mut pending: Vec<NodeDescriptor> = Vec::with_capacity(node_graph.nodes.len());
    for node in node_graph.nodes {
        match node.role {
            NodeRole::Start => start = Some(node),
            NodeRole::End => end = Some(node),
            NodeRole::Interior => pending.push(node),
        }
    }
    let (Some(start), Some(end)) = (start, end) else {
        return Err(GraphError::InvalidGraphShape(format!(
            "route graph lost its start '{}' or end '{}' node",
            shape.start, shape.end
        )));
    };

    let mut graph = DependencyGraph::new();
    graph.insert(start)?;

    let mut round = 0;
    while !pending.is_empty() {
        round += 1;
        let before = pending.len();
        let mut stuck = Vec::with_capacity(before);
        for node in pending {
            if graph.can_satisfy(&node) {
                graph.insert(node)?;
            } else {
                stuck.push(node);
            }
        }
        debug!(round, inserted = before - stuck.len(), remaining = stuck.len());

        if stuck.len() == before {
            let first = &stuck[0];
            return Err(GraphError::MissingDependency {
                node_id: first.id.clone(),
                missing: graph.missing_keys(first),
            });
        }
        pending = stuck;
    }

    graph.insert(end)?;
    Ok(graph)
}

fn check_unique_providers(nodes: &[NodeDescriptor]) -> Result<(), GraphError> {
    for node in nodes.iter().filter(|node| node.role != NodeRole::Start) {
        for key in node.needed_keys() {
            let providers: Vec<String> = nodes
                .iter()
                .filter(|other| other.id != node.id && other.provides(&key))
                .map(|other| other.id.clone())
                .collect();
            if providers.len() > 1 {
                return Err(GraphError::AmbiguousDependency {
                    node_id: node.id.clone(),
                    param: key,
                    providers,
                });
            }
        }
    }
    Ok(())
}
