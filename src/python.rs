use crate::compiler::Compiler;
use crate::graph::build_graph;
use crate::model::{FunctionData, OracleNodeGraph, RouteSpec};
use crate::normalizer;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

impl<'py> IntoPyObject<'py> for FunctionData {
    type Target = PyDict;
    type Output = Bound<'py, Self::Target>;
    type Error = PyErr;

    fn into_pyobject(self, py: Python<'py>) -> Result<Self::Output, Self::Error> {
        let dict = PyDict::new(py);
        dict.set_item("function_name", self.function_name)?;
        dict.set_item("code", self.code)?;
        dict.set_item("requirements_manifest", self.requirements_manifest)?;
        dict.set_item("endpoint_name", self.endpoint_name)?;
        Ok(dict)
    }
}

/// Compiles a node graph into a single function.
///
/// Args:
///     nodes_json (str): The node graph as emitted by the node-graph generator,
///         a JSON object with a "nodes" array.
///     route_name (str): Human-facing route name; determines the function name.
///     endpoint_name (str): Name of the endpoint handler the function backs.
///
/// Returns:
///     dict: "function_name", "code", "requirements_manifest" and "endpoint_name".
///
/// Raises:
///     ValueError: If the JSON is malformed or the graph cannot be built or compiled
///         (missing or ambiguous dependencies, cycles, bad start/end nodes).
#[pyfunction]
fn compile_graph(nodes_json: &str, route_name: &str, endpoint_name: &str) -> PyResult<FunctionData> {
    let nodes = OracleNodeGraph::from_json(nodes_json)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    let graph = build_graph(nodes).map_err(|e| PyValueError::new_err(e.to_string()))?;
    Compiler::builder(graph, RouteSpec::new(route_name, endpoint_name))
        .build()
        .compile()
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Normalizes a source unit: consolidates imports and applies the style pass.
///
/// Raises:
///     ValueError: If the source has unterminated strings or unbalanced brackets.
#[pyfunction]
fn normalize(source: &str) -> PyResult<String> {
    normalizer::normalize(source).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Code assembly engine.
///
/// Python bindings to the Kumitate Rust library: compile dependency-linked node graphs
/// into single functions and normalize generated source.
#[pymodule]
fn kumitate(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compile_graph, m)?)?;
    m.add_function(wrap_pyfunction!(normalize, m)?)?;
    Ok(())
}
