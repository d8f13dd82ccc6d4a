//! Batch resolution: many hash-reference edits, possibly across files, into
//! one composite patch document.
//!
//! Edits are grouped by file in first-seen order. Within a file they are
//! sorted by the line number of their primary reference, because the patch
//! applier walks chunks top-to-bottom against the original line numbers.
//! Files that cannot be read are skipped; stale or inverted references abort
//! the whole batch.

use crate::patch::chunk::generate_chunk;
use crate::patch::document::{FileSection, PatchDocument};
use crate::patch::request::EditRequest;
use crate::resolve::{ResolveError, TableStore};
use crate::source::ContentProvider;
use crate::workspace::Workspace;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Result of resolving a batch.
#[derive(Debug)]
#[must_use = "the patch document must be handed to the patch applier"]
pub struct BatchOutcome {
    pub document: PatchDocument,
    /// Files that received a section, in document order
    pub touched: Vec<PathBuf>,
    /// Files skipped because they could not be read
    pub skipped: Vec<ResolveError>,
}

/// Resolve `edits` into a composite patch document.
///
/// Every edit path must already be absolute (see [`Workspace::resolve`]).
pub fn resolve_batch<P: ContentProvider + ?Sized>(
    store: &mut TableStore,
    provider: &P,
    workspace: &Workspace,
    edits: &[EditRequest],
) -> Result<BatchOutcome, ResolveError> {
    for edit in edits {
        edit.target.validate()?;
    }

    let mut outcome = BatchOutcome {
        document: PatchDocument::default(),
        touched: Vec::new(),
        skipped: Vec::new(),
    };

    for (path, mut file_edits) in group_by_file(edits) {
        if let Err(err) = store.ensure(provider, &path) {
            warn!(path = %path.display(), error = %err, "skipping edits for unreadable file");
            outcome.skipped.push(err);
            continue;
        }

        file_edits.sort_by_key(|edit| edit.target.primary().line);

        let mut chunks = Vec::with_capacity(file_edits.len());
        let mut unreadable = None;
        for edit in file_edits {
            match generate_chunk(store, provider, edit) {
                Ok(chunk) => chunks.push(chunk),
                Err(err @ ResolveError::Unreadable { .. }) => {
                    unreadable = Some(err);
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        if let Some(err) = unreadable {
            warn!(path = %path.display(), error = %err, "file became unreadable mid-batch");
            outcome.skipped.push(err);
            continue;
        }

        debug!(path = %path.display(), chunks = chunks.len(), "resolved file section");
        outcome.document.sections.push(FileSection {
            path: workspace.relative(&path),
            chunks,
        });
        outcome.touched.push(path);
    }

    Ok(outcome)
}

/// Group edits by path, keeping first-seen file order and submission order.
fn group_by_file(edits: &[EditRequest]) -> Vec<(PathBuf, Vec<&EditRequest>)> {
    let mut groups: Vec<(PathBuf, Vec<&EditRequest>)> = Vec::new();
    for edit in edits {
        match groups.iter_mut().find(|(path, _)| *path == edit.path) {
            Some((_, group)) => group.push(edit),
            None => groups.push((edit.path.clone(), vec![edit])),
        }
    }
    groups
}
