//! One-retry staleness recovery for line references.
//!
//! A reference missing from the current table triggers exactly one rescan.
//! If the fresh table has it, the old view was merely incomplete. If not, the
//! table is destroyed and the caller must re-read the file.

use crate::fingerprint::LineRef;
use crate::resolve::table::{read_table, FingerprintTable, TableStore};
use crate::resolve::ResolveError;
use crate::source::ContentProvider;
use std::path::Path;
use tracing::{debug, warn};

impl TableStore {
    /// Resolve `reference` against the table for `path`, rescanning once if needed.
    pub fn resolve<P: ContentProvider + ?Sized>(
        &mut self,
        provider: &P,
        path: &Path,
        reference: &LineRef,
    ) -> Result<&FingerprintTable, ResolveError> {
        let hit = self
            .tables
            .get(path)
            .is_some_and(|table| table.contains(reference));

        if !hit {
            let fresh = read_table(provider, path)?;
            if !fresh.contains(reference) {
                self.destroy(path);
                warn!(path = %path.display(), reference = %reference, "stale line reference");
                return Err(stale(path, reference));
            }
            debug!(path = %path.display(), reference = %reference, "recovered reference by rescan");
            self.tables.insert(path.to_path_buf(), fresh);
        }

        self.tables.get(path).ok_or_else(|| stale(path, reference))
    }

    /// Content recorded for exactly `reference`, without rescanning.
    ///
    /// A reference that was resolved earlier can drop out when a later
    /// resolution replaces the table; that is a stale reference and the
    /// table is destroyed.
    pub fn require_reference(
        &mut self,
        path: &Path,
        reference: &LineRef,
    ) -> Result<String, ResolveError> {
        let content = self
            .tables
            .get(path)
            .and_then(|table| table.get(reference))
            .map(str::to_string);

        content.ok_or_else(|| {
            self.destroy(path);
            warn!(path = %path.display(), reference = %reference, "reference lost by rescan");
            stale(path, reference)
        })
    }

    /// Content of the line just before `reference`, `""` when it is the first line.
    ///
    /// A predecessor that was never recorded (a partial read started at
    /// `reference`) is filled by one rescan, which must still hold
    /// `reference` itself.
    pub fn preceding_line<P: ContentProvider + ?Sized>(
        &mut self,
        provider: &P,
        path: &Path,
        reference: &LineRef,
    ) -> Result<String, ResolveError> {
        let Some(prev) = reference.line.checked_sub(1).filter(|prev| *prev >= 1) else {
            return Ok(String::new());
        };
        if let Some(content) = self.tables.get(path).and_then(|table| table.line(prev)) {
            return Ok(content.to_string());
        }

        let fresh = read_table(provider, path)?;
        if !fresh.contains(reference) {
            self.destroy(path);
            warn!(path = %path.display(), reference = %reference, "stale line reference");
            return Err(stale(path, reference));
        }
        let content = fresh.line(prev).unwrap_or_default().to_string();
        debug!(path = %path.display(), line = prev, "filled context line by rescan");
        self.merge(path, fresh.into_entries());
        Ok(content)
    }

    /// Content of `line` in the table for `path`, destroying the table if it has none.
    ///
    /// Used for lines between two resolved endpoints, which a partial read
    /// may never have recorded.
    pub fn require_line(&mut self, path: &Path, line: usize) -> Result<String, ResolveError> {
        let content = self
            .tables
            .get(path)
            .and_then(|table| table.line(line))
            .map(str::to_string);

        match content {
            Some(content) => Ok(content),
            None => {
                self.destroy(path);
                warn!(path = %path.display(), line, "line missing inside resolved range");
                Err(ResolveError::StaleReference {
                    path: path.to_path_buf(),
                    reference: line.to_string(),
                })
            }
        }
    }
}

fn stale(path: &Path, reference: &LineRef) -> ResolveError {
    ResolveError::StaleReference {
        path: path.to_path_buf(),
        reference: reference.to_string(),
    }
}
