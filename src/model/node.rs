use super::param::{ParamKey, Parameter};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The position a node takes in a route-level graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Represents the incoming request; produces values, consumes none.
    Start,
    /// A unit of work between request and response.
    #[serde(alias = "action")]
    Interior,
    /// Represents the response; consumes values, produces none.
    End,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Start => write!(f, "start"),
            NodeRole::Interior => write!(f, "interior"),
            NodeRole::End => write!(f, "end"),
        }
    }
}

/// An external package a node's code fragment depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRef {
    pub package_name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub specifier: Option<String>,
}

impl PackageRef {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            version: None,
            specifier: None,
        }
    }

    pub fn pinned(
        package_name: impl Into<String>,
        version: impl Into<String>,
        specifier: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            version: Some(version.into()),
            specifier: Some(specifier.into()),
        }
    }

    /// Renders the reference as a single requirements line.
    pub fn requirement_line(&self) -> String {
        match (&self.version, &self.specifier) {
            (Some(version), Some(specifier)) => {
                format!("{}{}{}", self.package_name, specifier, version)
            }
            (Some(version), None) => format!("{}=={}", self.package_name, version),
            _ => self.package_name.clone(),
        }
    }
}

/// A unit of code with declared typed inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: String,
    pub role: NodeRole,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_params: Vec<Parameter>,
    #[serde(default)]
    pub output_params: Vec<Parameter>,
    #[serde(default)]
    pub code_fragment: String,
    #[serde(default)]
    pub required_packages: Vec<PackageRef>,
}

impl NodeDescriptor {
    pub fn new(id: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id: id.into(),
            role,
            description: String::new(),
            input_params: Vec::new(),
            output_params: Vec::new(),
            code_fragment: String::new(),
            required_packages: Vec::new(),
        }
    }

    pub fn start(id: impl Into<String>) -> Self {
        Self::new(id, NodeRole::Start)
    }

    pub fn interior(id: impl Into<String>) -> Self {
        Self::new(id, NodeRole::Interior)
    }

    pub fn end(id: impl Into<String>) -> Self {
        Self::new(id, NodeRole::End)
    }

    pub fn with_input(mut self, param: Parameter) -> Self {
        self.input_params.push(param);
        self
    }

    pub fn with_output(mut self, param: Parameter) -> Self {
        self.output_params.push(param);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code_fragment = code.into();
        self
    }

    pub fn with_package(mut self, package: PackageRef) -> Self {
        self.required_packages.push(package);
        self
    }

    /// The distinct keys this node needs, in declaration order.
    pub fn needed_keys(&self) -> Vec<ParamKey> {
        self.input_params.iter().map(Parameter::key).unique().collect()
    }

    pub fn provides(&self, key: &ParamKey) -> bool {
        self.output_params
            .iter()
            .any(|p| p.name == key.name && p.param_type == key.param_type)
    }
}

/// An unordered collection of node descriptors describing one route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGraph {
    pub nodes: Vec<NodeDescriptor>,
}

impl NodeGraph {
    pub fn new(nodes: Vec<NodeDescriptor>) -> Self {
        Self { nodes }
    }
}
