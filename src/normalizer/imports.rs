use super::syntax::{self, StatementKind};
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};
use tree_sitter::{Node, Tree};

#[derive(Debug, Default)]
struct FromImport {
    names: BTreeSet<String>,
    comments: BTreeSet<String>,
}

/// The top-level imports of a unit, consolidated.
///
/// `import x` and `from m import *` statements are kept whole; every other
/// `from m import ...` is merged per module. Comments found on an import travel with it.
#[derive(Debug, Default)]
pub(super) struct ImportSet {
    statements: BTreeMap<String, BTreeSet<String>>,
    from: BTreeMap<String, FromImport>,
}

impl ImportSet {
    pub(super) fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.from.is_empty()
    }

    fn add(&mut self, node: Node, source: &str, comments: BTreeSet<String>) {
        let mut cursor = node.walk();
        if node.kind() == "import_statement" {
            for name in node.children_by_field_name("name", &mut cursor) {
                let statement = format!("import {}", collapse(syntax::text(name, source)));
                self.statements
                    .entry(statement)
                    .or_default()
                    .extend(comments.iter().cloned());
            }
            return;
        }

        let module = match node.kind() {
            "future_import_statement" => "__future__".to_string(),
            _ => node
                .child_by_field_name("module_name")
                .map(|module| collapse(syntax::text(module, source)))
                .unwrap_or_default(),
        };

        let wildcard = node
            .children(&mut cursor)
            .any(|child| child.kind() == "wildcard_import");
        if wildcard {
            self.statements
                .entry(format!("from {} import *", module))
                .or_default()
                .extend(comments);
            return;
        }

        let entry = self.from.entry(module).or_default();
        for name in node.children_by_field_name("name", &mut cursor) {
            entry.names.insert(collapse(syntax::text(name, source)));
        }
        entry.comments.extend(comments);
    }

    /// Renders one statement per module, sorted, with `__future__` imports first.
    ///
    /// `from` statements longer than `line_length` are wrapped in parenthesized form.
    pub(super) fn render(&self, line_length: usize, indent_width: usize) -> Vec<String> {
        let indent = " ".repeat(indent_width);
        let mut entries: Vec<(String, String)> = self
            .statements
            .iter()
            .map(|(statement, comments)| (statement.clone(), with_comments(statement, comments)))
            .collect();

        for (module, import) in &self.from {
            let flat = format!("from {} import {}", module, import.names.iter().join(", "));
            let rendered = if flat.len() > line_length {
                format!(
                    "{}\n{}\n)",
                    with_comments(&format!("from {} import (", module), &import.comments),
                    import
                        .names
                        .iter()
                        .map(|n| format!("{}{},", indent, n))
                        .join("\n")
                )
            } else {
                with_comments(&flat, &import.comments)
            };
            entries.push((flat, rendered));
        }

        entries.sort_by(|(a, _), (b, _)| {
            (!is_future(a))
                .cmp(&!is_future(b))
                .then_with(|| a.cmp(b))
        });
        entries.into_iter().map(|(_, rendered)| rendered).collect()
    }
}

fn is_future(statement: &str) -> bool {
    statement.starts_with("from __future__ ")
}

fn collapse(text: &str) -> String {
    text.split_whitespace().join(" ")
}

fn with_comments(code: &str, comments: &BTreeSet<String>) -> String {
    if comments.is_empty() {
        code.to_string()
    } else {
        format!("{}  {}", code, comments.iter().join(" "))
    }
}

fn is_docstring(node: Node) -> bool {
    let mut cursor = node.walk();
    let mut children = node.named_children(&mut cursor);
    node.kind() == "expression_statement"
        && children.next().is_some_and(|child| child.kind() == "string")
        && children.next().is_none()
}

/// Top-level imports pulled out of a unit, and the lines they occupied.
pub(super) struct Extraction {
    pub imports: ImportSet,
    /// Lines before this one hold the leading docstring and comment block.
    pub header_end: usize,
    /// Lines taken by extracted imports and their trailing comments.
    pub consumed: Vec<bool>,
}

/// Pulls every top-level import statement out of the parsed unit.
///
/// Imports sharing a line with another statement, and indented imports, stay where they
/// are.
pub(super) fn extract(tree: &Tree, source: &str, line_count: usize) -> Extraction {
    let root = tree.root_node();
    let mut cursor = root.walk();
    let statements: Vec<Node> = root.named_children(&mut cursor).collect();

    let mut header_end = 0;
    let mut seen_docstring = false;
    for statement in &statements {
        let docstring = !seen_docstring && is_docstring(*statement);
        if statement.kind() != "comment" && !docstring {
            break;
        }
        seen_docstring |= docstring;
        header_end = statement.end_position().row + 1;
    }

    let mut imports = ImportSet::default();
    let mut consumed = vec![false; line_count];
    for (i, statement) in statements.iter().enumerate() {
        if StatementKind::of(*statement) != StatementKind::Import
            || statement.start_position().column != 0
        {
            continue;
        }
        let last_row = statement.end_position().row;
        let trailing = statements
            .get(i + 1)
            .filter(|next| next.start_position().row == last_row);
        if trailing.is_some_and(|next| next.kind() != "comment") {
            continue;
        }

        let mut comments = comments_within(*statement, source);
        if let Some(comment) = trailing {
            comments.insert(syntax::text(*comment, source).trim().to_string());
        }
        imports.add(*statement, source, comments);

        for row in statement.start_position().row..=last_row {
            if let Some(line) = consumed.get_mut(row) {
                *line = true;
            }
        }
    }

    Extraction {
        imports,
        header_end,
        consumed,
    }
}

fn comments_within(node: Node, source: &str) -> BTreeSet<String> {
    let mut comments = BTreeSet::new();
    let mut cursor = node.walk();
    let mut pending: Vec<Node> = node.children(&mut cursor).collect();
    while let Some(child) = pending.pop() {
        if child.kind() == "comment" {
            comments.insert(syntax::text(child, source).trim().to_string());
        } else {
            let mut inner = child.walk();
            pending.extend(child.children(&mut inner));
        }
    }
    comments
}
