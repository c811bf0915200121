//! Interfaces to the external generation oracle.
//!
//! The oracle turns natural-language descriptions into structured function definitions
//! and node graphs. Kumitate treats it as a black box: every call may suspend, fail, or
//! return output that does not match the expected schema.

use crate::error::DecompositionError;
use crate::model::{FunctionDefinition, OracleNodeGraph, RouteSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod scripted;

pub use scripted::ScriptedOracle;

/// Everything the oracle is told when asked to materialize one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRequest {
    pub function_name: String,
    pub description: String,
    /// Templates of functions already materialized for this route, excluding the target.
    pub provided_functions: Vec<String>,
    pub route_context: String,
    /// Set when the target already exists as a stub and should be updated in place.
    #[serde(default)]
    pub function_id: Option<u64>,
}

/// Generates function definitions.
#[async_trait]
pub trait FunctionOracle: Send + Sync {
    /// Materializes the function described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`DecompositionError::OracleOutputInvalid`] when the structured output does
    /// not match the expected schema and [`DecompositionError::Oracle`] for any other
    /// failure.
    async fn generate(
        &self,
        request: &FunctionRequest,
    ) -> Result<FunctionDefinition, DecompositionError>;
}

/// Generates the node graph for one route.
#[async_trait]
pub trait NodeGraphOracle: Send + Sync {
    /// Returns the nodes of `route` in the oracle's wire format.
    ///
    /// Shape problems (missing roles, duplicate start or end nodes) are left for graph
    /// construction to report.
    async fn generate_graph(
        &self,
        application_context: &str,
        route: &RouteSpec,
    ) -> Result<OracleNodeGraph, DecompositionError>;
}
