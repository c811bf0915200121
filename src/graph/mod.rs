use crate::error::GraphError;
use crate::model::{NodeDescriptor, NodeRole, ParamKey};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod builder;

pub use builder::build_graph;

/// A directed edge from the node producing a value to the node consuming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub producer: String,
    pub consumer: String,
    pub param: ParamKey,
}

/// The serialized form of a graph: vertices in insertion order plus their edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphParts {
    pub nodes: Vec<NodeDescriptor>,
    pub edges: Vec<Edge>,
}

/// A dependency graph connecting producers of typed values to their consumers.
///
/// Graphs are grown with [`DependencyGraph::insert`], which only ever adds edges into the
/// node being inserted. A graph is built and compiled within a single synthesis request;
/// it is never shared across requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphParts", into = "GraphParts")]
pub struct DependencyGraph {
    nodes: Vec<NodeDescriptor>,
    edges: Vec<Edge>,
    index: AHashMap<String, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a graph from stored vertices and edges.
    ///
    /// Edge endpoints must exist. Acyclicity and input coverage are not checked here;
    /// the compiler validates both before emitting code.
    pub fn from_parts(nodes: Vec<NodeDescriptor>, edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut index = AHashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }
        for edge in &edges {
            for endpoint in [&edge.producer, &edge.consumer] {
                if !index.contains_key(endpoint) {
                    return Err(GraphError::UnknownNode {
                        missing_node_id: endpoint.clone(),
                    });
                }
            }
        }
        Ok(Self {
            nodes,
            edges,
            index,
        })
    }

    /// Inserts a node, wiring each of its inputs to the unique existing node producing it.
    ///
    /// The first node inserted into an empty graph is accepted as the root. Providers are
    /// resolved before anything is mutated, so a failed insert leaves the graph unchanged.
    pub fn insert(&mut self, node: NodeDescriptor) -> Result<(), GraphError> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }

        if self.nodes.is_empty() {
            debug!(node = %node.id, role = %node.role, "inserting root node");
            self.push_node(node);
            return Ok(());
        }

        let needed = node.needed_keys();
        let providers = self.find_providers(&needed);

        let missing: Vec<ParamKey> = needed
            .iter()
            .filter(|key| !providers.contains_key(*key))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(GraphError::MissingDependency {
                node_id: node.id,
                missing,
            });
        }

        for key in &needed {
            let candidates = &providers[key];
            if candidates.len() > 1 {
                return Err(GraphError::AmbiguousDependency {
                    node_id: node.id,
                    param: key.clone(),
                    providers: candidates
                        .iter()
                        .map(|&i| self.nodes[i].id.clone())
                        .collect(),
                });
            }
        }

        debug!(
            node = %node.id,
            role = %node.role,
            inputs = needed.len(),
            "inserting node"
        );
        for key in needed {
            let producer = self.nodes[providers[&key][0]].id.clone();
            self.edges.push(Edge {
                producer,
                consumer: node.id.clone(),
                param: key,
            });
        }
        self.push_node(node);
        Ok(())
    }

    /// Returns true when every input of `node` already has at least one provider.
    pub fn can_satisfy(&self, node: &NodeDescriptor) -> bool {
        self.nodes.is_empty() || self.missing_keys(node).is_empty()
    }

    /// The inputs of `node` that no existing vertex produces.
    pub fn missing_keys(&self, node: &NodeDescriptor) -> Vec<ParamKey> {
        let needed = node.needed_keys();
        let providers = self.find_providers(&needed);
        needed
            .into_iter()
            .filter(|key| !providers.contains_key(key))
            .collect()
    }

    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges feeding into `node_id`.
    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.consumer == node_id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn into_parts(self) -> GraphParts {
        GraphParts {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    fn push_node(&mut self, node: NodeDescriptor) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Maps each needed key to the existing vertices producing it, in scan order.
    fn find_providers(&self, needed: &[ParamKey]) -> AHashMap<ParamKey, Vec<usize>> {
        let mut providers: AHashMap<ParamKey, Vec<usize>> = AHashMap::new();
        for (i, existing) in self.nodes.iter().enumerate() {
            for key in needed.iter().filter(|key| existing.provides(key)) {
                providers.entry(key.clone()).or_default().push(i);
            }
        }
        providers
    }
}

impl TryFrom<GraphParts> for DependencyGraph {
    type Error = GraphError;

    fn try_from(parts: GraphParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.nodes, parts.edges)
    }
}

impl From<DependencyGraph> for GraphParts {
    fn from(graph: DependencyGraph) -> Self {
        graph.into_parts()
    }
}

/// The ids of a route graph's single start and single end node.
pub(crate) struct RouteShape {
    pub start: String,
    pub end: String,
}

/// Checks that exactly one start and one end node exist, and that their parameter
/// lists match their roles.
pub(crate) fn validate_shape<'a>(
    nodes: impl IntoIterator<Item = &'a NodeDescriptor>,
) -> Result<RouteShape, GraphError> {
    let mut starts = Vec::new();
    let mut ends = Vec::new();
    for node in nodes {
        match node.role {
            NodeRole::Start => {
                if !node.input_params.is_empty() {
                    return Err(GraphError::InvalidGraphShape(format!(
                        "start node '{}' declares input parameters",
                        node.id
                    )));
                }
                starts.push(node.id.as_str());
            }
            NodeRole::End => {
                if !node.output_params.is_empty() {
                    return Err(GraphError::InvalidGraphShape(format!(
                        "end node '{}' declares output parameters",
                        node.id
                    )));
                }
                ends.push(node.id.as_str());
            }
            NodeRole::Interior => {}
        }
    }

    match (starts.as_slice(), ends.as_slice()) {
        ([start], [end]) => Ok(RouteShape {
            start: start.to_string(),
            end: end.to_string(),
        }),
        _ => Err(GraphError::InvalidGraphShape(format!(
            "expected exactly one start and one end node, found {} start ({}) and {} end ({})",
            starts.len(),
            starts.join(", "),
            ends.len(),
            ends.join(", ")
        ))),
    }
}
