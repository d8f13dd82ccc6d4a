//! Single-edit path for hosts that take an old/new text pair instead of a
//! patch document.

use crate::fingerprint::LineRef;
use crate::patch::replaced_lines;
use crate::patch::request::{EditRequest, EditTarget};
use crate::resolve::{ResolveError, TableStore};
use crate::source::ContentProvider;
use serde::Serialize;

/// A before/after text pair for a string-replacement edit tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReplacement {
    pub old_text: String,
    pub new_text: String,
    /// First line (1-based) `old_text` covers
    #[serde(skip)]
    pub first_line: usize,
    /// Last line `old_text` covers
    #[serde(skip)]
    pub last_line: usize,
}

/// Resolve one edit into the text it replaces and the text replacing it.
///
/// Uses the same staleness handling and content normalization as chunk
/// generation.
pub fn resolve_single<P: ContentProvider + ?Sized>(
    store: &mut TableStore,
    provider: &P,
    edit: &EditRequest,
) -> Result<TextReplacement, ResolveError> {
    edit.target.validate()?;
    let path = edit.path.as_path();

    match &edit.target {
        EditTarget::InsertAfter(anchor) => {
            store.resolve(provider, path, anchor)?;
            let anchor_text = store.require_reference(path, anchor)?;
            let mut new_text = anchor_text.clone();
            for line in edit.content_lines() {
                new_text.push('\n');
                new_text.push_str(line);
            }
            Ok(TextReplacement {
                old_text: anchor_text,
                new_text,
                first_line: anchor.line,
                last_line: anchor.line,
            })
        }
        EditTarget::ReplaceLine(start) => replacement(store, provider, edit, start, None),
        EditTarget::ReplaceRange { start, end } => {
            replacement(store, provider, edit, start, Some(end))
        }
    }
}

fn replacement<P: ContentProvider + ?Sized>(
    store: &mut TableStore,
    provider: &P,
    edit: &EditRequest,
    start: &LineRef,
    end: Option<&LineRef>,
) -> Result<TextReplacement, ResolveError> {
    let old_text = replaced_lines(store, provider, &edit.path, start, end)?.join("\n");
    let first_line = start.line;
    let last_line = end.map_or(start.line, |end| end.line.max(start.line));

    let new_lines = edit.content_lines();
    if !new_lines.is_empty() {
        return Ok(TextReplacement {
            old_text,
            new_text: new_lines.join("\n"),
            first_line,
            last_line,
        });
    }

    // A pure deletion takes a neighbouring line along so the removed lines'
    // terminator goes with them.
    let table = store.get(&edit.path);
    if let Some(next) = table.and_then(|table| table.line(last_line + 1)) {
        return Ok(TextReplacement {
            old_text: format!("{old_text}\n{next}"),
            new_text: next.to_string(),
            first_line,
            last_line: last_line + 1,
        });
    }
    if first_line > 1 {
        if let Some(prev) = table.and_then(|table| table.line(first_line - 1)) {
            return Ok(TextReplacement {
                old_text: format!("{prev}\n{old_text}"),
                new_text: prev.to_string(),
                first_line: first_line - 1,
                last_line,
            });
        }
    }
    Ok(TextReplacement {
        old_text,
        new_text: String::new(),
        first_line,
        last_line,
    })
}
