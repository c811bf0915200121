use super::{FunctionOracle, FunctionRequest, NodeGraphOracle};
use crate::error::{ConfigError, DecompositionError};
use crate::model::{FunctionDefinition, OracleNodeGraph, RouteSpec};
use ahash::AHashMap;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Mutex;

/// On-disk form of a script: raw oracle responses keyed by function and route name.
#[derive(Debug, Default, Deserialize)]
struct Script {
    #[serde(default)]
    functions: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    graphs: BTreeMap<String, serde_json::Value>,
}

/// An oracle that replays recorded responses instead of calling a model.
///
/// Function responses are keyed by function name and graph responses by route name.
/// Responses are kept as raw JSON and parsed on every call, so a malformed recording
/// fails exactly like malformed live output would. Every function request is logged and
/// can be inspected with [`ScriptedOracle::requests`].
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    functions: AHashMap<String, String>,
    graphs: AHashMap<String, String>,
    requests: Mutex<Vec<FunctionRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_function(mut self, function_name: impl Into<String>, json: impl Into<String>) -> Self {
        self.functions.insert(function_name.into(), json.into());
        self
    }

    pub fn with_graph(mut self, route_name: impl Into<String>, json: impl Into<String>) -> Self {
        self.graphs.insert(route_name.into(), json.into());
        self
    }

    /// Loads a script of the form `{"functions": {name: response}, "graphs": {route: response}}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let script: Script = serde_json::from_str(json)?;
        let mut oracle = Self::new();
        for (name, response) in script.functions {
            oracle.functions.insert(name, response.to_string());
        }
        for (name, response) in script.graphs {
            oracle.graphs.insert(name, response.to_string());
        }
        Ok(oracle)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<FunctionRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl FunctionOracle for ScriptedOracle {
    async fn generate(
        &self,
        request: &FunctionRequest,
    ) -> Result<FunctionDefinition, DecompositionError> {
        match self.requests.lock() {
            Ok(mut log) => log.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }

        let response = self.functions.get(&request.function_name).ok_or_else(|| {
            DecompositionError::Oracle {
                function: request.function_name.clone(),
                message: "no scripted response".to_string(),
            }
        })?;
        FunctionDefinition::from_oracle_json(&request.function_name, response)
    }
}

#[async_trait]
impl NodeGraphOracle for ScriptedOracle {
    async fn generate_graph(
        &self,
        _application_context: &str,
        route: &RouteSpec,
    ) -> Result<OracleNodeGraph, DecompositionError> {
        let response = self
            .graphs
            .get(&route.name)
            .ok_or_else(|| DecompositionError::Oracle {
                function: route.function_name(),
                message: "no scripted node graph".to_string(),
            })?;
        OracleNodeGraph::from_json(response).map_err(|e| DecompositionError::OracleOutputInvalid {
            function: route.function_name(),
            message: e.to_string(),
        })
    }
}
