use crate::model::FunctionDefinition;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A function generated during a decomposition, with its place in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedFunction {
    pub definition: FunctionDefinition,
    pub depth: usize,
    /// Name of the function that first declared this one; `None` for the route function.
    pub parent: Option<String>,
}

/// Functions materialized so far for one route.
///
/// A registry lives for exactly one call to
/// [`Decomposer::develop_route`](super::Decomposer::develop_route); routes never share one.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: Vec<MaterializedFunction>,
    index: AHashMap<String, usize>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, function_name: &str) -> bool {
        self.index.contains_key(function_name)
    }

    pub fn get(&self, function_name: &str) -> Option<&MaterializedFunction> {
        self.index.get(function_name).map(|&i| &self.functions[i])
    }

    /// Registers a function. Returns `false` and leaves the registry untouched when a
    /// function with the same name is already present.
    pub fn register(&mut self, function: MaterializedFunction) -> bool {
        let name = function.definition.function_name.clone();
        if self.index.contains_key(&name) {
            return false;
        }
        self.index.insert(name, self.functions.len());
        self.functions.push(function);
        true
    }

    /// Templates of every registered function except `target`, in registration order.
    pub fn provided_templates(&self, target: &str) -> Vec<String> {
        self.functions
            .iter()
            .filter(|f| f.definition.function_name != target)
            .map(|f| f.definition.template.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn into_functions(self) -> Vec<MaterializedFunction> {
        self.functions
    }
}
