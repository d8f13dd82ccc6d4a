//! Per-file fingerprint tables and the store that owns them.

use crate::fingerprint::{Fingerprint, LineRef};
use crate::resolve::ResolveError;
use crate::source::ContentProvider;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Mapping from [`LineRef`] to the line content it was computed from.
///
/// Entries merged from partial reads may outlive the file version they came
/// from; the table makes no claim about the file's current on-disk state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintTable {
    entries: HashMap<LineRef, String>,
    /// Most recently recorded fingerprint per line number
    latest: BTreeMap<usize, Fingerprint>,
}

impl FingerprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table covering every line of `text` (1-indexed).
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::new();
        for (idx, line) in text.lines().enumerate() {
            table.insert(LineRef::for_line(idx + 1, line), line);
        }
        table
    }

    pub fn insert(&mut self, reference: LineRef, content: impl Into<String>) {
        self.latest.insert(reference.line, reference.fingerprint);
        self.entries.insert(reference, content.into());
    }

    /// Overlay `entries` onto this table without removing anything.
    pub fn overlay(&mut self, entries: impl IntoIterator<Item = (LineRef, String)>) {
        for (reference, content) in entries {
            self.insert(reference, content);
        }
    }

    pub fn contains(&self, reference: &LineRef) -> bool {
        self.entries.contains_key(reference)
    }

    pub fn get(&self, reference: &LineRef) -> Option<&str> {
        self.entries.get(reference).map(String::as_str)
    }

    /// Content recorded for a line number, whatever its fingerprint.
    pub fn line(&self, line: usize) -> Option<&str> {
        let fingerprint = self.latest.get(&line)?;
        self.get(&LineRef::new(line, *fingerprint))
    }

    pub fn into_entries(self) -> impl Iterator<Item = (LineRef, String)> {
        self.entries.into_iter()
    }

    pub fn references(&self) -> impl Iterator<Item = &LineRef> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns the fingerprint table of every file the engine has seen.
#[derive(Debug, Default)]
pub struct TableStore {
    pub(super) tables: HashMap<PathBuf, FingerprintTable>,
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&FingerprintTable> {
        self.tables.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tables.contains_key(path)
    }

    /// Read `path` in full and replace its table.
    pub fn scan<P: ContentProvider + ?Sized>(
        &mut self,
        provider: &P,
        path: &Path,
    ) -> Result<&FingerprintTable, ResolveError> {
        let table = read_table(provider, path)?;
        debug!(path = %path.display(), lines = table.len(), "scanned fingerprint table");
        self.tables.insert(path.to_path_buf(), table);
        self.tables
            .get(path)
            .ok_or_else(|| unreadable_after_insert(path))
    }

    /// Overlay freshly seen entries onto the table for `path`, creating it if absent.
    pub fn merge(&mut self, path: &Path, entries: impl IntoIterator<Item = (LineRef, String)>) {
        let table = self.tables.entry(path.to_path_buf()).or_default();
        let before = table.len();
        table.overlay(entries);
        debug!(path = %path.display(), before, after = table.len(), "merged fingerprint entries");
    }

    /// Table for `path`, scanning it first if none exists yet.
    pub fn ensure<P: ContentProvider + ?Sized>(
        &mut self,
        provider: &P,
        path: &Path,
    ) -> Result<&FingerprintTable, ResolveError> {
        if !self.tables.contains_key(path) {
            return self.scan(provider, path);
        }
        self.tables
            .get(path)
            .ok_or_else(|| unreadable_after_insert(path))
    }

    /// Drop the table for `path`. Returns whether one existed.
    pub fn destroy(&mut self, path: &Path) -> bool {
        let existed = self.tables.remove(path).is_some();
        if existed {
            debug!(path = %path.display(), "destroyed fingerprint table");
        }
        existed
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

pub(super) fn read_table<P: ContentProvider + ?Sized>(
    provider: &P,
    path: &Path,
) -> Result<FingerprintTable, ResolveError> {
    let text = provider
        .read(path)
        .map_err(|source| ResolveError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(FingerprintTable::from_text(&text))
}

fn unreadable_after_insert(path: &Path) -> ResolveError {
    ResolveError::Unreadable {
        path: path.to_path_buf(),
        source: std::io::Error::other("fingerprint table vanished after insert"),
    }
}
