//! Prelude module for convenient imports
//!
//! Re-exports the types needed to build, compile and decompose routes.
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let json = std::fs::read_to_string("path/to/nodes.json")?;
//! let graph = build_graph(OracleNodeGraph::from_json(&json)?)?;
//! let data = compile(graph, &RouteSpec::new("Get User", "get_user"))?;
//! data.save("get_user.bin")?;
//! # Ok(())
//! # }
//! ```

// Graph construction and compilation
pub use crate::compiler::{Compiler, RequirementsManifest, compile};
pub use crate::graph::{DependencyGraph, Edge, build_graph};
pub use crate::normalizer::normalize;

// Model
pub use crate::model::{
    ContainerKind, FunctionData, FunctionDefinition, FunctionStub, IntoNodeGraph,
    NodeDescriptor, NodeGraph, NodeRole, OracleNodeGraph, PackageRef, ParamKey, ParamType,
    Parameter, PrimitiveType, RouteSpec,
};

// Decomposition and oracles
pub use crate::config::{BranchFailurePolicy, StyleOptions, SynthesisConfig};
pub use crate::decompose::{Decomposer, Decomposition, MaterializedFunction};
pub use crate::oracle::{FunctionOracle, FunctionRequest, NodeGraphOracle, ScriptedOracle};
pub use crate::pipeline::Synthesizer;

// Error types
pub use crate::error::{DecompositionError, GraphError, NormalizeError, SynthesisError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
