use crate::compiler::Compiler;
use crate::config::SynthesisConfig;
use crate::decompose::{Decomposer, Decomposition};
use crate::error::{StoreError, SynthesisError};
use crate::graph::build_graph;
use crate::model::{FunctionData, RouteSpec};
use crate::oracle::{FunctionOracle, NodeGraphOracle};
use crate::store::{FunctionRecord, Repository};
use tracing::{debug, info, instrument};

/// Runs whole routes through the oracles, the graph builder and the compiler.
pub struct Synthesizer<'o> {
    graph_oracle: &'o dyn NodeGraphOracle,
    function_oracle: &'o dyn FunctionOracle,
    config: SynthesisConfig,
}

impl<'o> Synthesizer<'o> {
    pub fn new(
        graph_oracle: &'o dyn NodeGraphOracle,
        function_oracle: &'o dyn FunctionOracle,
    ) -> Self {
        Self {
            graph_oracle,
            function_oracle,
            config: SynthesisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SynthesisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Asks the node-graph oracle for the route's nodes, builds the graph and compiles it.
    #[instrument(level = "info", skip(self, application_context, route), fields(route = %route.name))]
    pub async fn synthesize_route(
        &self,
        application_context: &str,
        route: &RouteSpec,
    ) -> Result<FunctionData, SynthesisError> {
        let nodes = self
            .graph_oracle
            .generate_graph(application_context, route)
            .await?;
        debug!(nodes = nodes.nodes.len(), "node graph received");

        let graph = build_graph(nodes)?;
        let data = Compiler::builder(graph, route.clone())
            .with_config(&self.config)
            .build()
            .compile()?;
        Ok(data)
    }

    /// Decomposes the route into generated functions.
    pub async fn decompose_route(
        &self,
        route: &RouteSpec,
        route_context: &str,
    ) -> Result<Decomposition, SynthesisError> {
        let decomposition = Decomposer::new(self.function_oracle)
            .with_config(&self.config)
            .develop_route(route, route_context)
            .await?;
        Ok(decomposition)
    }

    /// Stores every function of a decomposition.
    ///
    /// Functions that already carry an id are updated in place; the rest are created.
    /// Returns the stored records in registration order.
    pub async fn persist_decomposition(
        &self,
        decomposition: &Decomposition,
        repository: &dyn Repository<FunctionRecord>,
    ) -> Result<Vec<FunctionRecord>, SynthesisError> {
        let mut stored = Vec::with_capacity(decomposition.len());
        for function in &decomposition.functions {
            let record = FunctionRecord::from(function);
            let saved = match record.id {
                Some(id) => match repository.update(id, record.clone()).await {
                    Err(StoreError::NotFound { .. }) => repository.create(record).await?,
                    other => other?,
                },
                None => repository.create(record).await?,
            };
            stored.push(saved);
        }
        info!(functions = stored.len(), "decomposition persisted");
        Ok(stored)
    }
}
