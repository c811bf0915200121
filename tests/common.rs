//! Common test utilities for building node graphs and oracles.
use async_trait::async_trait;
use kumitate::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Builds a parameter from a type tag.
#[allow(dead_code)]
pub fn param(name: &str, tag: &str) -> Parameter {
    Parameter::new(name, tag.parse().expect("valid type tag"))
}

/// The smallest useful route: `x: int` -> `double_it` -> `y: int`.
#[allow(dead_code)]
pub fn create_simple_nodes() -> NodeGraph {
    NodeGraph::new(vec![
        NodeDescriptor::start("request").with_output(param("x", "int")),
        NodeDescriptor::interior("double_it")
            .with_input(param("x", "int"))
            .with_output(param("y", "int"))
            .with_code("def double_it(x: int) -> int:\n    return x * 2"),
        NodeDescriptor::end("response").with_input(param("y", "int")),
    ])
}

/// A diamond-shaped route, listed out of order:
///
/// `user_id` feeds `fetch_user` and `fetch_orders`, both feed `summarize`.
#[allow(dead_code)]
pub fn create_diamond_nodes() -> NodeGraph {
    NodeGraph::new(vec![
        NodeDescriptor::end("response").with_input(param("summary", "str")),
        NodeDescriptor::interior("summarize")
            .with_input(param("user", "dict"))
            .with_input(param("orders", "list[int]"))
            .with_output(param("summary", "str"))
            .with_code("def summarize(user: dict, orders: list[int]) -> str:\n    return f\"{user['name']}: {len(orders)}\""),
        NodeDescriptor::interior("fetch_orders")
            .with_input(param("user_id", "int"))
            .with_output(param("orders", "list[int]"))
            .with_code("import requests\ndef fetch_orders(user_id: int) -> list[int]:\n    return requests.get(f\"/orders/{user_id}\").json()")
            .with_package(PackageRef::pinned("requests", "2.0", "==")),
        NodeDescriptor::interior("fetch_user")
            .with_input(param("user_id", "int"))
            .with_output(param("user", "dict"))
            .with_code("import requests\ndef fetch_user(user_id: int) -> dict:\n    return requests.get(f\"/users/{user_id}\").json()")
            .with_package(PackageRef::pinned("requests", "2.0", "==")),
        NodeDescriptor::start("request").with_output(param("user_id", "int")),
    ])
}

/// The wire form of [`create_simple_nodes`], as a node-graph oracle would emit it.
#[allow(dead_code)]
pub const SIMPLE_GRAPH_JSON: &str = r#"{
    "nodes": [
        {"id": "request", "node_type": "start", "outputs": [{"name": "x", "type": "int"}]},
        {
            "id": "double_it",
            "node_type": "action",
            "inputs": [{"name": "x", "type": "int"}],
            "outputs": [{"name": "y", "type": "int"}],
            "code": "def double_it(x: int) -> int:\n    return x * 2",
            "required_packages": [{"package_name": "requests", "version": "2.0", "specifier": "=="}]
        },
        {"id": "response", "node_type": "end", "inputs": [{"name": "y", "type": "int"}]}
    ]
}"#;

/// Oracle output for a function with the given children.
#[allow(dead_code)]
pub fn definition_json(name: &str, template: &str, children: &[(&str, &str)]) -> String {
    let children: Vec<serde_json::Value> = children
        .iter()
        .map(|(child, template)| serde_json::json!({ "function_name": child, "template": template }))
        .collect();
    serde_json::json!({
        "function_name": name,
        "template": template,
        "code": format!("{}\n    ...", template),
        "child_functions": children,
    })
    .to_string()
}

/// An oracle whose every function declares exactly one new child.
#[derive(Default)]
#[allow(dead_code)]
pub struct EndlessOracle {
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl EndlessOracle {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FunctionOracle for EndlessOracle {
    async fn generate(
        &self,
        request: &FunctionRequest,
    ) -> std::result::Result<FunctionDefinition, DecompositionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let child = format!("{}_x", request.function_name);
        Ok(
            FunctionDefinition::new(&request.function_name, format!("def {}():", request.function_name))
                .with_code(format!("def {}():\n    return {}()", request.function_name, child))
                .with_child(FunctionStub::new(&child, format!("def {}():", child))),
        )
    }
}
