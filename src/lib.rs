//! # Kumitate - Code Assembly Engine
//!
//! **Kumitate** stitches small, independently generated code fragments into one callable
//! function. Each fragment is a node with typed inputs and outputs; Kumitate wires nodes
//! together by matching parameter names and types, checks the result is a proper DAG, and
//! emits a single normalized source unit together with its package requirements.
//!
//! ## Core Workflow
//!
//! 1.  **Describe the nodes**: Load node descriptors from your generator, or implement the
//!     `IntoNodeGraph` trait on your own structs to translate them into a `NodeGraph`.
//! 2.  **Build**: `build_graph` inserts every node after its providers, resolving each input
//!     to exactly one upstream output.
//! 3.  **Compile**: `Compiler::builder` orders the graph, emits the function, collects the
//!     requirements manifest and normalizes the code into a `FunctionData` record.
//!
//! Routes can also be decomposed top-down: a `Decomposer` asks a `FunctionOracle` for the
//! route's function and recursively for every child function it declares, up to a
//! configured depth.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kumitate::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let nodes = NodeGraph::new(vec![
//!         NodeDescriptor::start("request")
//!             .with_output(Parameter::new("x", ParamType::from(PrimitiveType::Int))),
//!         NodeDescriptor::interior("double")
//!             .with_input(Parameter::new("x", PrimitiveType::Int.into()))
//!             .with_output(Parameter::new("y", PrimitiveType::Int.into()))
//!             .with_code("def double(x: int) -> int:\n    return x * 2"),
//!         NodeDescriptor::end("response")
//!             .with_input(Parameter::new("y", PrimitiveType::Int.into())),
//!     ]);
//!
//!     let graph = build_graph(nodes)?;
//!     let route = RouteSpec::new("Double Number", "double_number");
//!     let data = Compiler::builder(graph, route).build().compile()?;
//!
//!     println!("{}", data.code);
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod decompose;
pub mod error;
pub mod graph;
pub mod model;
pub mod normalizer;
pub mod oracle;
pub mod pipeline;
pub mod prelude;
pub mod store;

#[cfg(feature = "python-bindings")]
mod python;
