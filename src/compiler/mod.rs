use crate::config::{StyleOptions, SynthesisConfig};
use crate::error::GraphError;
use crate::graph::{DependencyGraph, validate_shape};
use crate::model::{FunctionData, NodeRole, RouteSpec};
use crate::normalizer;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

mod emit;
mod manifest;
mod topology;

use emit::Emitter;
pub use manifest::{PackageConflict, RequirementsManifest};

/// The assembled, not yet normalized, output of a compile.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub function_name: String,
    pub source: String,
    pub manifest: RequirementsManifest,
    /// Node ids in the order they were emitted.
    pub order: Vec<String>,
}

/// Compiles a validated dependency graph into a single function.
///
/// The compiler owns the graph: a graph that failed to compile must not be reused.
pub struct Compiler {
    graph: DependencyGraph,
    route: RouteSpec,
    style: StyleOptions,
    normalize: bool,
}

pub struct CompilerBuilder {
    graph: DependencyGraph,
    route: RouteSpec,
    style: StyleOptions,
    normalize: bool,
}

impl CompilerBuilder {
    pub fn new(graph: DependencyGraph, route: RouteSpec) -> Self {
        Self {
            graph,
            route,
            style: StyleOptions::default(),
            normalize: true,
        }
    }

    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    /// Skips the normalizer; the raw assembled unit is returned as code.
    pub fn with_normalization(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    pub fn with_config(self, config: &SynthesisConfig) -> Self {
        self.with_style(config.style.clone())
            .with_normalization(config.normalize)
    }

    pub fn build(self) -> Compiler {
        Compiler {
            graph: self.graph,
            route: self.route,
            style: self.style,
            normalize: self.normalize,
        }
    }
}

impl Compiler {
    pub fn builder(graph: DependencyGraph, route: RouteSpec) -> CompilerBuilder {
        CompilerBuilder::new(graph, route)
    }

    /// Validates the graph, orders it and stitches every node into one source unit.
    pub fn assemble(&self) -> Result<Assembly, GraphError> {
        let order = topology::topological_order(&self.graph)?;
        validate_shape(self.graph.nodes())?;
        validate_inputs(&self.graph)?;

        let function_name = self.route.function_name();
        let mut emitter =
            Emitter::new(&self.graph, function_name.clone(), self.style.indent_width);
        let mut visited = Vec::with_capacity(order.len());
        for &position in &order {
            let node = &self.graph.nodes()[position];
            debug!(node = %node.id, role = %node.role, "emitting node");
            emitter.emit(node)?;
            visited.push(node.id.clone());
        }
        let source = emitter.finish()?;

        let manifest = RequirementsManifest::from_packages(
            order
                .iter()
                .flat_map(|&position| self.graph.nodes()[position].required_packages.iter()),
        );

        Ok(Assembly {
            function_name,
            source,
            manifest,
            order: visited,
        })
    }

    /// Compiles the graph into a [`FunctionData`] record.
    ///
    /// Normalization failures do not abort the compile: the assembled code is returned
    /// as-is and the failure is logged.
    #[instrument(level = "info", skip(self), fields(route = %self.route.name))]
    pub fn compile(self) -> Result<FunctionData, GraphError> {
        let assembly = self.assemble()?;

        for conflict in &assembly.manifest.conflicts {
            warn!(
                package = %conflict.kept.package_name,
                kept = %conflict.kept.requirement_line(),
                dropped = %conflict.dropped.requirement_line(),
                "conflicting package requirement dropped"
            );
        }

        let code = if self.normalize {
            match normalizer::normalize_with(&assembly.source, &self.style) {
                Ok(code) => code,
                Err(e) => {
                    warn!(error = %e, "returning unnormalized code");
                    assembly.source
                }
            }
        } else {
            assembly.source
        };

        info!(
            function = %assembly.function_name,
            nodes = assembly.order.len(),
            requirements = assembly.manifest.requirements.len(),
            "route compiled"
        );

        Ok(FunctionData {
            function_name: assembly.function_name,
            code,
            requirements_manifest: assembly.manifest.to_string(),
            endpoint_name: self.route.endpoint_name,
        })
    }
}

/// Compiles `graph` for `route` with default settings.
pub fn compile(graph: DependencyGraph, route: &RouteSpec) -> Result<FunctionData, GraphError> {
    Compiler::builder(graph, route.clone()).build().compile()
}

/// Checks that every declared input is fed by exactly one edge from a node producing it,
/// and that no edge feeds an undeclared input.
fn validate_inputs(graph: &DependencyGraph) -> Result<(), GraphError> {
    for node in graph.nodes() {
        let needed = node.needed_keys();

        for edge in graph.incoming(&node.id) {
            if !needed.contains(&edge.param) {
                return Err(GraphError::InvalidGraphShape(format!(
                    "edge from '{}' feeds undeclared input '{}' of '{}'",
                    edge.producer, edge.param, node.id
                )));
            }
            let provides = graph
                .node(&edge.producer)
                .is_some_and(|producer| producer.provides(&edge.param));
            if !provides {
                return Err(GraphError::InvalidGraphShape(format!(
                    "'{}' does not produce '{}' consumed by '{}'",
                    edge.producer, edge.param, node.id
                )));
            }
        }

        if node.role == NodeRole::Start {
            continue;
        }

        let mut missing = Vec::new();
        for key in needed {
            let candidates: Vec<String> = graph
                .nodes()
                .iter()
                .filter(|other| other.id != node.id && other.provides(&key))
                .map(|other| other.id.clone())
                .collect();
            if candidates.len() > 1 {
                return Err(GraphError::AmbiguousDependency {
                    node_id: node.id.clone(),
                    param: key,
                    providers: candidates,
                });
            }

            let providers: Vec<String> = graph
                .incoming(&node.id)
                .filter(|edge| edge.param == key)
                .map(|edge| edge.producer.clone())
                .unique()
                .collect();
            match providers.len() {
                0 => missing.push(key),
                1 => {}
                _ => {
                    return Err(GraphError::AmbiguousDependency {
                        node_id: node.id.clone(),
                        param: key,
                        providers,
                    });
                }
            }
        }
        if !missing.is_empty() {
            return Err(GraphError::MissingDependency {
                node_id: node.id.clone(),
                missing,
            });
        }
    }
    Ok(())
}
