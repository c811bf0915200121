use super::node::{NodeDescriptor, NodeGraph, NodeRole, PackageRef};
use super::param::Parameter;
use crate::error::GraphError;
use serde::Deserialize;

/// A trait for node formats that can be converted into a Kumitate `NodeGraph`.
///
/// This is the extension point for accepting node graphs from different generators.
/// Implement it on the structs your generator deserializes into and the rest of the
/// pipeline stays unchanged.
///
/// # Example
///
/// ```rust,no_run
/// use kumitate::prelude::*;
///
/// struct MyStep { name: String, is_entry: bool }
/// struct MyPlan { steps: Vec<MyStep> }
///
/// impl IntoNodeGraph for MyPlan {
///     fn into_node_graph(self) -> std::result::Result<NodeGraph, GraphError> {
///         let nodes = self
///             .steps
///             .into_iter()
///             .map(|s| {
///                 let role = if s.is_entry { NodeRole::Start } else { NodeRole::Interior };
///                 NodeDescriptor::new(s.name, role)
///             })
///             .collect();
///         Ok(NodeGraph::new(nodes))
///     }
/// }
/// ```
pub trait IntoNodeGraph {
    /// Consumes the object and converts it into a node graph ready for building.
    fn into_node_graph(self) -> Result<NodeGraph, GraphError>;
}

impl IntoNodeGraph for NodeGraph {
    fn into_node_graph(self) -> Result<NodeGraph, GraphError> {
        Ok(self)
    }
}

/// The node graph exactly as the node-graph oracle emits it.
///
/// Every field the oracle may omit is optional here; missing pieces are caught during
/// conversion so that a malformed graph surfaces as a shape error instead of a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleNodeGraph {
    pub nodes: Vec<OracleNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleNode {
    pub id: String,
    #[serde(default, alias = "role")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Option<Vec<Parameter>>,
    #[serde(default)]
    pub outputs: Option<Vec<Parameter>>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub required_packages: Option<Vec<PackageRef>>,
}

impl OracleNodeGraph {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl IntoNodeGraph for OracleNodeGraph {
    fn into_node_graph(self) -> Result<NodeGraph, GraphError> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|raw| {
                let role = match raw.node_type.as_deref().map(str::trim) {
                    Some("start") => NodeRole::Start,
                    Some("end") => NodeRole::End,
                    Some("action") | Some("interior") => NodeRole::Interior,
                    Some(other) => {
                        return Err(GraphError::InvalidGraphShape(format!(
                            "node '{}' has unsupported type '{}'",
                            raw.id, other
                        )));
                    }
                    None => {
                        return Err(GraphError::InvalidGraphShape(format!(
                            "node '{}' has no role",
                            raw.id
                        )));
                    }
                };
                Ok(NodeDescriptor {
                    id: raw.id,
                    role,
                    description: raw.description,
                    input_params: raw.inputs.unwrap_or_default(),
                    output_params: raw.outputs.unwrap_or_default(),
                    code_fragment: raw.code.unwrap_or_default(),
                    required_packages: raw.required_packages.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NodeGraph { nodes })
    }
}
