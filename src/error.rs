use crate::model::ParamKey;
use itertools::Itertools;
use thiserror::Error;

/// Errors raised while parsing a parameter type tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamTypeError {
    #[error("Unknown parameter type '{0}'")]
    Unknown(String),

    #[error("Container '{container}' must hold a primitive type, found '{element}'")]
    InvalidElement { container: String, element: String },

    #[error("Malformed parameter type '{0}'")]
    Malformed(String),
}

/// Errors that can occur while building or compiling a dependency graph.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("Node '{node_id}' has no provider for input parameter(s): {}", format_keys(.missing))]
    MissingDependency {
        node_id: String,
        missing: Vec<ParamKey>,
    },

    #[error(
        "Node '{node_id}' input '{param}' is provided by more than one node: {}",
        .providers.join(", ")
    )]
    AmbiguousDependency {
        node_id: String,
        param: ParamKey,
        providers: Vec<String>,
    },

    #[error("Node '{0}' is already part of the graph")]
    DuplicateNode(String),

    #[error("Edge references node '{missing_node_id}', which is not part of the graph")]
    UnknownNode { missing_node_id: String },

    #[error("Graph is not a directed acyclic graph; unresolved nodes: {}", .nodes.join(", "))]
    NotADag { nodes: Vec<String> },

    #[error("Invalid graph shape: {0}")]
    InvalidGraphShape(String),
}

/// Errors that can occur while normalizing an assembled source unit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Source cannot be parsed at line {line}: {reason}")]
    UnparsableSource { line: usize, reason: String },

    #[error("Python parser unavailable: {0}")]
    Parser(String),
}

/// Errors that can occur while decomposing a route into functions.
#[derive(Error, Debug, Clone)]
pub enum DecompositionError {
    #[error("Oracle returned invalid output for '{function}': {message}")]
    OracleOutputInvalid { function: String, message: String },

    #[error("Oracle failed while generating '{function}': {message}")]
    Oracle { function: String, message: String },

    #[error("Recursion depth {depth} exceeds the limit of {limit} while expanding '{function}'")]
    RecursionLimitExceeded {
        function: String,
        depth: usize,
        limit: usize,
    },
}

/// Errors raised while saving or loading a compiled artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Could not access artifact file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact serialization failed: {0}")]
    Encode(String),

    #[error("Artifact deserialization failed: {0}")]
    Decode(String),
}

/// Errors surfaced by a persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: u64 },

    #[error("Invalid page request (page {page}, page size {page_size}); both must be >= 1")]
    InvalidPage { page: usize, page_size: usize },
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}

/// Any failure of the synthesis pipeline.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Decomposition(#[from] DecompositionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

fn format_keys(keys: &[ParamKey]) -> String {
    keys.iter().join(", ")
}
