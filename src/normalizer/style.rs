use super::syntax::{LineState, StatementKind};
use crate::config::StyleOptions;

/// A top-level statement with everything nested under it.
struct Chunk {
    kind: StatementKind,
    lines: Vec<String>,
    blank_before: usize,
}

fn is_definition(line: &str) -> bool {
    line.starts_with("def ") || line.starts_with("async def ") || line.starts_with("class ")
}

/// Whether a body opens with a definition group, leading comments included.
pub(super) fn opens_definition(body: &str) -> bool {
    for line in body.lines() {
        if line.is_empty() {
            return false;
        }
        if !line.starts_with('#') {
            return line.starts_with('@') || is_definition(line);
        }
    }
    false
}

fn clean_line(raw: &str, state: LineState, indent: &str) -> String {
    let mut text = if state.in_string {
        raw.to_string()
    } else {
        let body = raw.trim_start_matches([' ', '\t']);
        let leading = &raw[..raw.len() - body.len()];
        format!("{}{}", leading.replace('\t', indent), body)
    };
    if !state.ends_in_string {
        text.truncate(text.trim_end().len());
    }
    text
}

fn into_chunks(lines: &[(&str, LineState)], indent: &str) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut pending_blank = 0;

    for &(raw, state) in lines {
        let text = clean_line(raw, state, indent);
        if !state.in_string && text.is_empty() {
            pending_blank += 1;
            continue;
        }

        match chunks.last_mut() {
            Some(chunk) if state.starts.is_none() => {
                if pending_blank > 0 {
                    chunk.lines.push(String::new());
                }
                chunk.lines.push(text);
            }
            _ => chunks.push(Chunk {
                kind: state.starts.unwrap_or(StatementKind::Other),
                lines: vec![text],
                blank_before: pending_blank,
            }),
        }
        pending_blank = 0;
    }

    chunks
}

/// A chunk opens a definition group when it is a decorator or definition, or a comment
/// run glued to one.
fn opens_group(chunks: &[Chunk], mut i: usize) -> bool {
    loop {
        match chunks[i].kind {
            StatementKind::Decorator | StatementKind::Definition => return true,
            StatementKind::Import | StatementKind::Other => return false,
            StatementKind::Comment => {
                if i + 1 >= chunks.len() || chunks[i + 1].blank_before != 0 {
                    return false;
                }
                i += 1;
            }
        }
    }
}

fn separation(chunks: &[Chunk], i: usize) -> usize {
    if i == 0 {
        return 0;
    }
    let previous = chunks[i - 1].kind;
    let original = chunks[i].blank_before;

    if previous == StatementKind::Decorator {
        0
    } else if previous == StatementKind::Comment && original == 0 && opens_group(chunks, i) {
        0
    } else if opens_group(chunks, i) || previous == StatementKind::Definition {
        2
    } else {
        original.min(2)
    }
}

/// Lays out a run of lines.
///
/// Leading tabs become spaces, trailing whitespace outside strings is dropped, top-level
/// definitions are separated by exactly two blank lines and no run of blank lines is
/// longer than two. Lines inside string literals are never touched.
pub(super) fn format_body(lines: &[(&str, LineState)], style: &StyleOptions) -> String {
    let indent = " ".repeat(style.indent_width);
    let chunks = into_chunks(lines, &indent);

    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        for _ in 0..separation(&chunks, i) {
            out.push('\n');
        }
        for line in &chunk.lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
