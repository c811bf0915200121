//! Recursive decomposition of a route into generated functions.
//!
//! The route's top-level function is generated first. Every child function it declares is
//! pushed onto an explicit frontier and expanded depth-first, each with its own depth,
//! until no stubs remain or the depth ceiling is hit.

use crate::config::{BranchFailurePolicy, DEFAULT_RECURSION_DEPTH_LIMIT, SynthesisConfig};
use crate::error::DecompositionError;
use crate::model::{FunctionDefinition, FunctionStub, RouteSpec};
use crate::oracle::{FunctionOracle, FunctionRequest};
use tracing::{debug, info, instrument, warn};

mod registry;

pub use registry::{FunctionRegistry, MaterializedFunction};

/// The outcome of decomposing one route.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// The route's top-level function.
    pub root: FunctionDefinition,
    /// Every materialized function, root first, in registration order.
    pub functions: Vec<MaterializedFunction>,
    /// Stubs dropped under [`BranchFailurePolicy::PruneBranch`].
    pub pruned: Vec<FunctionStub>,
}

impl Decomposition {
    pub fn get(&self, function_name: &str) -> Option<&MaterializedFunction> {
        self.functions
            .iter()
            .find(|f| f.definition.function_name == function_name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// A stub waiting to be expanded.
struct Pending {
    stub: FunctionStub,
    depth: usize,
    parent: String,
}

/// Drives a [`FunctionOracle`] to materialize a route and its transitive children.
pub struct Decomposer<'o> {
    oracle: &'o dyn FunctionOracle,
    recursion_depth_limit: usize,
    branch_failure_policy: BranchFailurePolicy,
}

impl<'o> Decomposer<'o> {
    pub fn new(oracle: &'o dyn FunctionOracle) -> Self {
        Self {
            oracle,
            recursion_depth_limit: DEFAULT_RECURSION_DEPTH_LIMIT,
            branch_failure_policy: BranchFailurePolicy::default(),
        }
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.recursion_depth_limit = limit;
        self
    }

    pub fn with_policy(mut self, policy: BranchFailurePolicy) -> Self {
        self.branch_failure_policy = policy;
        self
    }

    pub fn with_config(self, config: &SynthesisConfig) -> Self {
        self.with_depth_limit(config.recursion_depth_limit)
            .with_policy(config.branch_failure_policy)
    }

    /// Generates the route's function and every child function it transitively declares.
    ///
    /// The top-level function is at depth 0. A stub whose name is already registered is
    /// linked to the existing definition instead of being generated again.
    ///
    /// # Errors
    ///
    /// Oracle failures always abort the decomposition. A stub deeper than the configured
    /// limit aborts it with [`DecompositionError::RecursionLimitExceeded`] unless the
    /// policy is [`BranchFailurePolicy::PruneBranch`].
    #[instrument(level = "info", skip(self, route, route_context), fields(route = %route.name))]
    pub async fn develop_route(
        &self,
        route: &RouteSpec,
        route_context: &str,
    ) -> Result<Decomposition, DecompositionError> {
        let mut registry = FunctionRegistry::new();
        let mut pruned = Vec::new();

        let root_stub = FunctionStub::new(route.function_name(), "");
        let root = self
            .materialize(&mut registry, &root_stub, 0, None, route, route_context)
            .await?;

        let mut frontier: Vec<Pending> = Vec::new();
        push_children(&mut frontier, &root, 1);

        while let Some(Pending {
            stub,
            depth,
            parent,
        }) = frontier.pop()
        {
            if registry.contains(&stub.function_name) {
                debug!(function = %stub.function_name, parent = %parent, "linking registered function");
                continue;
            }

            if depth > self.recursion_depth_limit {
                let error = DecompositionError::RecursionLimitExceeded {
                    function: stub.function_name.clone(),
                    depth,
                    limit: self.recursion_depth_limit,
                };
                match self.branch_failure_policy {
                    BranchFailurePolicy::AbortRoute => return Err(error),
                    BranchFailurePolicy::PruneBranch => {
                        warn!(error = %error, parent = %parent, "pruning branch");
                        pruned.push(stub);
                        continue;
                    }
                }
            }

            let definition = self
                .materialize(
                    &mut registry,
                    &stub,
                    depth,
                    Some(parent),
                    route,
                    route_context,
                )
                .await?;
            push_children(&mut frontier, &definition, depth + 1);
        }

        info!(
            functions = registry.len(),
            pruned = pruned.len(),
            "route decomposed"
        );
        Ok(Decomposition {
            root,
            functions: registry.into_functions(),
            pruned,
        })
    }

    async fn materialize(
        &self,
        registry: &mut FunctionRegistry,
        stub: &FunctionStub,
        depth: usize,
        parent: Option<String>,
        route: &RouteSpec,
        route_context: &str,
    ) -> Result<FunctionDefinition, DecompositionError> {
        if depth > 0 {
            debug!(function = %stub.function_name, depth, "expanding child function");
        }

        let description = if depth == 0 {
            route.description.clone()
        } else {
            format!("{}\n\nHigh-level Goal: {}", stub.template, route.description)
        };
        let request = FunctionRequest {
            function_name: stub.function_name.clone(),
            description,
            provided_functions: registry.provided_templates(&stub.function_name),
            route_context: route_context.to_string(),
            function_id: stub.id,
        };

        let mut definition = self.oracle.generate(&request).await?;
        definition.validate(&stub.function_name)?;
        if definition.function_name != stub.function_name {
            warn!(
                requested = %stub.function_name,
                returned = %definition.function_name,
                "oracle renamed function; keeping requested name"
            );
            definition.function_name = stub.function_name.clone();
        }
        if definition.id.is_none() {
            definition.id = stub.id;
        }
        if definition.template.is_empty() {
            definition.template = stub.template.clone();
        }

        registry.register(MaterializedFunction {
            definition: definition.clone(),
            depth,
            parent,
        });
        Ok(definition)
    }
}

/// Pushes `definition`'s children in reverse so they pop in declaration order.
fn push_children(frontier: &mut Vec<Pending>, definition: &FunctionDefinition, depth: usize) {
    for child in definition.child_functions.iter().rev() {
        frontier.push(Pending {
            stub: child.clone(),
            depth,
            parent: definition.function_name.clone(),
        });
    }
}
