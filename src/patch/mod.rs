pub mod batch;
pub mod chunk;
pub mod compat;
pub mod document;
pub mod request;

pub use batch::{resolve_batch, BatchOutcome};
pub use chunk::{generate_chunk, Chunk, PatchLine};
pub use compat::{resolve_single, TextReplacement};
pub use document::{FileSection, PatchDocument};
pub use request::{EditRequest, EditTarget};

use crate::fingerprint::LineRef;
use crate::resolve::{ResolveError, TableStore};
use crate::source::ContentProvider;
use std::path::Path;

/// Resolve both ends of a replacement and collect the original lines
/// `start..=end` it covers.
///
/// Endpoints read as the content their own references recorded; only the
/// lines strictly between them are looked up by number.
fn replaced_lines<P: ContentProvider + ?Sized>(
    store: &mut TableStore,
    provider: &P,
    path: &Path,
    start: &LineRef,
    end: Option<&LineRef>,
) -> Result<Vec<String>, ResolveError> {
    store.resolve(provider, path, start)?;
    if let Some(end) = end {
        store.resolve(provider, path, end)?;
    }
    // Resolving the end may have rescanned and dropped the start.
    let first = store.require_reference(path, start)?;

    let end = match end {
        Some(end) if end.line > start.line => end,
        _ => return Ok(vec![first]),
    };
    let mut lines = Vec::with_capacity(end.line - start.line + 1);
    lines.push(first);
    for number in start.line + 1..end.line {
        lines.push(store.require_line(path, number)?);
    }
    lines.push(store.require_reference(path, end)?);
    Ok(lines)
}
