//! Canonical formatting for assembled source units.
//!
//! The normalizer hoists and consolidates top-level imports, then applies a small,
//! deterministic style pass. It never changes what the unit does, and running it on its
//! own output returns that output unchanged.

use crate::config::StyleOptions;
use crate::error::NormalizeError;
use tracing::{debug, instrument};

mod imports;
mod style;
mod syntax;

/// Normalizes `source` with the default [`StyleOptions`].
pub fn normalize(source: &str) -> Result<String, NormalizeError> {
    normalize_with(source, &StyleOptions::default())
}

/// Normalizes `source`.
///
/// A leading docstring and comment block stay on top, followed by the consolidated
/// imports and then the rest of the unit.
///
/// # Errors
///
/// Returns [`NormalizeError::UnparsableSource`] when the unit is not valid Python.
#[instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn normalize_with(source: &str, style: &StyleOptions) -> Result<String, NormalizeError> {
    let tree = syntax::parse(source)?;
    let lines: Vec<&str> = source.split('\n').collect();
    let states = syntax::line_states(&tree, lines.len());
    let extraction = imports::extract(&tree, source, lines.len());
    let rows = lines.iter().copied().zip(states.iter().copied());

    if extraction.imports.is_empty() {
        let all: Vec<_> = rows.collect();
        return Ok(style::format_body(&all, style));
    }

    let (header, rest): (Vec<_>, Vec<_>) = rows
        .enumerate()
        .filter(|(row, _)| !extraction.consumed[*row])
        .partition(|(row, _)| *row < extraction.header_end);
    let header: Vec<_> = header.into_iter().map(|(_, line)| line).collect();
    let body: Vec<_> = rest.into_iter().map(|(_, line)| line).collect();

    let import_lines = extraction
        .imports
        .render(style.line_length, style.indent_width);
    debug!(imports = import_lines.len(), "imports consolidated");

    let mut out = style::format_body(&header, style);
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&import_lines.join("\n"));
    out.push('\n');

    let body = style::format_body(&body, style);
    if !body.is_empty() {
        out.push_str(if style::opens_definition(&body) { "\n\n" } else { "\n" });
        out.push_str(&body);
    }
    Ok(out)
}
