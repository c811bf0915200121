use crate::error::GraphError;
use crate::graph::DependencyGraph;
use crate::model::{NodeDescriptor, NodeRole, ParamKey, Parameter};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// Walks nodes in topological order and produces the pieces of the assembled unit.
///
/// Declared parameter names may collide across nodes, so every produced value gets a
/// variable name unique within the function. The remap table records that name per
/// `(producer id, parameter name)`; consumers resolve their inputs through their
/// incoming edges.
pub(super) struct Emitter<'g> {
    graph: &'g DependencyGraph,
    function_name: String,
    indent: String,
    used_names: AHashSet<String>,
    remap: AHashMap<(String, String), String>,
    preamble: Vec<String>,
    header: Option<String>,
    calls: Vec<String>,
    footer: Option<String>,
}

impl<'g> Emitter<'g> {
    pub(super) fn new(
        graph: &'g DependencyGraph,
        function_name: String,
        indent_width: usize,
    ) -> Self {
        // Variables must not shadow the synthesized function or any node's callable.
        let mut used_names: AHashSet<String> = graph
            .nodes()
            .iter()
            .filter(|n| n.role == NodeRole::Interior)
            .map(|n| n.id.clone())
            .collect();
        used_names.insert(function_name.clone());

        Self {
            graph,
            function_name,
            indent: " ".repeat(indent_width),
            used_names,
            remap: AHashMap::new(),
            preamble: Vec::new(),
            header: None,
            calls: Vec::new(),
            footer: None,
        }
    }

    pub(super) fn emit(&mut self, node: &NodeDescriptor) -> Result<(), GraphError> {
        match node.role {
            NodeRole::Start => self.emit_start(node),
            NodeRole::Interior => self.emit_interior(node),
            NodeRole::End => self.emit_end(node),
        }
    }

    /// Concatenates preamble fragments, then the call sequence, into one source unit.
    pub(super) fn finish(self) -> Result<String, GraphError> {
        let header = self.header.ok_or_else(|| {
            GraphError::InvalidGraphShape("no start node was emitted".to_string())
        })?;
        let footer = self.footer.ok_or_else(|| {
            GraphError::InvalidGraphShape("no end node was emitted".to_string())
        })?;

        let mut source = String::new();
        for fragment in &self.preamble {
            source.push_str(fragment);
            source.push_str("\n\n");
        }
        source.push_str(&header);
        source.push('\n');
        for call in &self.calls {
            source.push_str(call);
            source.push('\n');
        }
        source.push_str(&footer);
        source.push('\n');
        Ok(source)
    }

    fn emit_start(&mut self, node: &NodeDescriptor) -> Result<(), GraphError> {
        let formals = node
            .output_params
            .iter()
            .map(|param| {
                let var = self.bind_output(&node.id, param);
                format!("{}: {}", var, param.param_type)
            })
            .join(", ");
        self.header = Some(format!("def {}({}):", self.function_name, formals));
        Ok(())
    }

    fn emit_interior(&mut self, node: &NodeDescriptor) -> Result<(), GraphError> {
        let fragment = node.code_fragment.trim_end();
        if !fragment.trim().is_empty() {
            self.preamble.push(fragment.to_string());
        }

        let args = node
            .needed_keys()
            .iter()
            .map(|key| -> Result<String, GraphError> {
                Ok(format!("{}={}", key.name, self.resolve(node, key)?))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        let call = format!("{}({})", node.id, args);

        let outputs: Vec<String> = node
            .output_params
            .iter()
            .map(|param| self.bind_output(&node.id, param))
            .collect();
        let line = if outputs.is_empty() {
            format!("{}{}", self.indent, call)
        } else {
            format!("{}{} = {}", self.indent, outputs.join(", "), call)
        };
        self.calls.push(line);
        Ok(())
    }

    fn emit_end(&mut self, node: &NodeDescriptor) -> Result<(), GraphError> {
        let fields = node
            .needed_keys()
            .iter()
            .map(|key| -> Result<String, GraphError> {
                Ok(format!("\"{}\": {}", key.name, self.resolve(node, key)?))
            })
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");
        self.footer = Some(format!("{}return {{{}}}", self.indent, fields));
        Ok(())
    }

    /// Assigns a function-unique variable name to a produced value.
    fn bind_output(&mut self, node_id: &str, param: &Parameter) -> String {
        let mut candidate = param.name.clone();
        let mut suffix = 0;
        while self.used_names.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", param.name, suffix);
        }
        self.used_names.insert(candidate.clone());
        self.remap
            .insert((node_id.to_string(), param.name.clone()), candidate.clone());
        candidate
    }

    /// Looks up the variable holding the value that feeds `key` into `node`.
    fn resolve(&self, node: &NodeDescriptor, key: &ParamKey) -> Result<String, GraphError> {
        let producer = self
            .graph
            .incoming(&node.id)
            .find(|edge| &edge.param == key)
            .map(|edge| edge.producer.clone())
            .ok_or_else(|| GraphError::MissingDependency {
                node_id: node.id.clone(),
                missing: vec![key.clone()],
            })?;
        self.remap
            .get(&(producer.clone(), key.name.clone()))
            .cloned()
            .ok_or_else(|| {
                GraphError::InvalidGraphShape(format!(
                    "'{}' consumes '{}' from '{}' before it was emitted",
                    node.id, key, producer
                ))
            })
    }
}
