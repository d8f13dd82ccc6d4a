//! Rendering a single hash-reference edit as a patch chunk.
//!
//! Every chunk opens with exactly one line of preceding context (`@@ <line>`)
//! so the patch applier can anchor it, followed by `-`, ` ` and `+` lines.

use crate::fingerprint::LineRef;
use crate::patch::replaced_lines;
use crate::patch::request::{EditRequest, EditTarget};
use crate::resolve::{ResolveError, TableStore};
use crate::source::ContentProvider;
use std::fmt;
use std::path::Path;

/// One line of a chunk body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchLine {
    Context(String),
    Delete(String),
    Add(String),
}

impl fmt::Display for PatchLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchLine::Context(text) => write!(f, " {text}"),
            PatchLine::Delete(text) => write!(f, "-{text}"),
            PatchLine::Add(text) => write!(f, "+{text}"),
        }
    }
}

/// A contiguous edit region: a context header and its body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Content of the line immediately before the edited region
    pub context: String,
    pub lines: Vec<PatchLine>,
    /// Line number of the edit's primary reference
    pub line: usize,
}

impl Chunk {
    pub fn deletions(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            PatchLine::Delete(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn additions(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            PatchLine::Add(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@@ {}", self.context)?;
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Resolve `edit` against the table for its path and render it as a chunk.
///
/// Missing references are recovered through one rescan via `provider`.
pub fn generate_chunk<P: ContentProvider + ?Sized>(
    store: &mut TableStore,
    provider: &P,
    edit: &EditRequest,
) -> Result<Chunk, ResolveError> {
    edit.target.validate()?;
    let path = edit.path.as_path();

    let mut lines = Vec::new();
    let (context, line) = match &edit.target {
        EditTarget::InsertAfter(anchor) => {
            store.resolve(provider, path, anchor)?;
            let anchor_text = store.require_reference(path, anchor)?;
            let context = store.preceding_line(provider, path, anchor)?;
            lines.push(PatchLine::Context(anchor_text));
            (context, anchor.line)
        }
        EditTarget::ReplaceLine(start) => replace(store, provider, path, start, None, &mut lines)?,
        EditTarget::ReplaceRange { start, end } => {
            replace(store, provider, path, start, Some(end), &mut lines)?
        }
    };

    lines.extend(
        edit.content_lines()
            .into_iter()
            .map(|text| PatchLine::Add(text.to_string())),
    );

    Ok(Chunk {
        context,
        lines,
        line,
    })
}

fn replace<P: ContentProvider + ?Sized>(
    store: &mut TableStore,
    provider: &P,
    path: &Path,
    start: &LineRef,
    end: Option<&LineRef>,
    lines: &mut Vec<PatchLine>,
) -> Result<(String, usize), ResolveError> {
    let deleted = replaced_lines(store, provider, path, start, end)?;
    let context = store.preceding_line(provider, path, start)?;
    lines.extend(deleted.into_iter().map(PatchLine::Delete));
    Ok((context, start.line))
}
