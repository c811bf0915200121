use crate::error::NormalizeError;
use tree_sitter::{Node, Parser, Tree, TreeCursor};

/// What a top-level statement is, as far as layout is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementKind {
    Decorator,
    Definition,
    Comment,
    Import,
    Other,
}

impl StatementKind {
    pub(super) fn of(node: Node) -> Self {
        match node.kind() {
            "decorator" => StatementKind::Decorator,
            "function_definition" | "class_definition" | "decorated_definition" => {
                StatementKind::Definition
            }
            "comment" => StatementKind::Comment,
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                StatementKind::Import
            }
            _ => StatementKind::Other,
        }
    }
}

/// Layout facts about one physical line of source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct LineState {
    /// The line begins inside a string literal opened on an earlier line.
    pub in_string: bool,
    /// The line ends inside a string literal.
    pub ends_in_string: bool,
    /// Set when a top-level statement begins on this line.
    pub starts: Option<StatementKind>,
}

/// Parses `source` as Python.
///
/// The first error or missing node in the tree is reported with its 1-based line.
pub(super) fn parse(source: &str) -> Result<Tree, NormalizeError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| NormalizeError::Parser(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| NormalizeError::Parser("parse did not complete".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let (line, reason) = match first_error(root) {
            Some(node) if node.is_missing() => (
                node.start_position().row + 1,
                format!("missing '{}'", node.kind()),
            ),
            Some(node) => (node.start_position().row + 1, "invalid syntax".to_string()),
            None => (1, "invalid syntax".to_string()),
        };
        return Err(NormalizeError::UnparsableSource { line, reason });
    }
    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// Computes a [`LineState`] for each of the `line_count` lines of the parsed source.
pub(super) fn line_states(tree: &Tree, line_count: usize) -> Vec<LineState> {
    let mut states = vec![LineState::default(); line_count];
    let mut cursor = tree.walk();
    mark_strings(&mut cursor, &mut states);

    let root = tree.root_node();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() == "decorated_definition" {
            let mut inner = statement.walk();
            for part in statement.named_children(&mut inner) {
                mark_start(&mut states, part);
            }
        } else {
            mark_start(&mut states, statement);
        }
    }
    states
}

fn mark_start(states: &mut [LineState], node: Node) {
    if let Some(state) = states.get_mut(node.start_position().row) {
        if state.starts.is_none() && !state.in_string {
            state.starts = Some(StatementKind::of(node));
        }
    }
}

fn mark_strings(cursor: &mut TreeCursor, states: &mut [LineState]) {
    let node = cursor.node();
    if node.kind() == "string" {
        let (first, last) = (node.start_position().row, node.end_position().row);
        for row in first..last {
            if let Some(state) = states.get_mut(row) {
                state.ends_in_string = true;
            }
            if let Some(state) = states.get_mut(row + 1) {
                state.in_string = true;
            }
        }
        return;
    }

    if cursor.goto_first_child() {
        loop {
            mark_strings(cursor, states);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// The source text covered by `node`.
pub(super) fn text<'s>(node: Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}
