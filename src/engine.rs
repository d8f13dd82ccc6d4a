//! The hash-reference engine and its read/edit lifecycle.
//!
//! Tables are (re)built on reads and lazily on the first edit to a file.
//! Every path an edit touches is held in a pending set until the host reports
//! the edit finished, at which point those tables are destroyed so the next
//! edit scans the file afresh. Stale references destroy their table on the
//! spot.

use crate::config::HashrefConfig;
use crate::hooks::args::{EditArgs, EditShape, NativeEdit};
use crate::hooks::{instructions, listing, ReadOutput};
use crate::patch::{self, BatchOutcome, EditRequest, TextReplacement};
use crate::resolve::{ResolveError, TableStore};
use crate::source::{ContentProvider, FsProvider};
use crate::workspace::Workspace;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owns the fingerprint tables and the pending-invalidation set.
///
/// The engine assumes one invocation at a time; share it behind a lock if
/// the host runs reads and edits in parallel.
#[derive(Debug)]
pub struct Engine<P = FsProvider> {
    provider: P,
    workspace: Workspace,
    config: HashrefConfig,
    store: TableStore,
    pending: BTreeSet<PathBuf>,
}

impl Engine<FsProvider> {
    /// Engine reading from the local filesystem.
    pub fn new(config: HashrefConfig) -> Self {
        Self::with_provider(config, FsProvider)
    }
}

impl<P: ContentProvider> Engine<P> {
    pub fn with_provider(config: HashrefConfig, provider: P) -> Self {
        let workspace = Workspace::new(config.workspace_root.as_deref().unwrap_or(Path::new(".")));
        Self {
            provider,
            workspace,
            config,
            store: TableStore::new(),
            pending: BTreeSet::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn config(&self) -> &HashrefConfig {
        &self.config
    }

    pub fn pending(&self) -> impl Iterator<Item = &Path> {
        self.pending.iter().map(PathBuf::as_path)
    }

    /// Read hook: annotate the listing and record what it showed.
    ///
    /// A full read rebuilds the table from the file itself; a partial read
    /// merges only the lines it displayed.
    pub fn on_read(&mut self, read: &ReadOutput) -> String {
        if listing::is_directory_listing(&read.output) {
            return read.output.clone();
        }

        let path = self.workspace.resolve(&read.path);
        let annotated = listing::annotate(&read.output);

        if read.partial {
            self.store.merge(&path, annotated.entries);
        } else if let Err(err) = self.store.scan(&self.provider, &path) {
            warn!(path = %path.display(), error = %err, "rescan after read failed; using listing");
            self.store.destroy(&path);
            self.store.merge(&path, annotated.entries);
        }

        if self.config.annotate_reads {
            annotated.text
        } else {
            read.output.clone()
        }
    }

    /// Pre-edit hook: translate hash-reference arguments into native ones.
    pub fn before_edit(&mut self, args: &EditArgs) -> Result<NativeEdit, ResolveError> {
        match args.shape(&self.workspace)? {
            EditShape::Batch(edits) => {
                let outcome = self.resolve_batch(&edits)?;
                if outcome.document.is_empty() {
                    return Err(outcome.skipped.into_iter().next().unwrap_or_else(|| {
                        ResolveError::MalformedEdit {
                            message: "edits array produced no changes".to_string(),
                        }
                    }));
                }
                Ok(NativeEdit::Patch {
                    patch_text: outcome.document.render(),
                })
            }
            EditShape::Single(edit) => {
                let replacement = self.resolve_single(&edit)?;
                Ok(NativeEdit::Replace {
                    file_path: edit.path.to_string_lossy().into_owned(),
                    old_string: replacement.old_text,
                    new_string: replacement.new_text,
                })
            }
            EditShape::Legacy { path } => {
                if self.config.require_references && self.store.contains(&path) {
                    return Err(ResolveError::MandatoryReferenceUsage { path });
                }
                Ok(NativeEdit::PassThrough)
            }
            EditShape::Unrelated => Ok(NativeEdit::PassThrough),
        }
    }

    /// Post-edit hook: destroy the table of every path the edit touched.
    pub fn after_edit(&mut self) -> Vec<PathBuf> {
        let drained: Vec<PathBuf> = std::mem::take(&mut self.pending).into_iter().collect();
        for path in &drained {
            self.store.destroy(path);
        }
        debug!(paths = drained.len(), "invalidated tables after edit");
        drained
    }

    /// Append the usage guidance to the caller's system prompt.
    pub fn inject_instructions(&self, system: &mut Vec<String>) {
        let text = self
            .config
            .instructions
            .as_deref()
            .unwrap_or(instructions::GUIDANCE);
        instructions::inject(system, text);
    }

    /// Resolve a batch and mark every file it touched for invalidation.
    pub fn resolve_batch(&mut self, edits: &[EditRequest]) -> Result<BatchOutcome, ResolveError> {
        let outcome = patch::resolve_batch(&mut self.store, &self.provider, &self.workspace, edits)?;
        self.pending.extend(outcome.touched.iter().cloned());
        Ok(outcome)
    }

    /// Resolve one edit into a text pair and mark its file for invalidation.
    pub fn resolve_single(&mut self, edit: &EditRequest) -> Result<TextReplacement, ResolveError> {
        edit.target.validate()?;
        self.store.ensure(&self.provider, &edit.path)?;
        let replacement = patch::resolve_single(&mut self.store, &self.provider, edit)?;
        self.pending.insert(edit.path.clone());
        Ok(replacement)
    }

    /// Forget every table, e.g. when the host starts a new session.
    pub fn reset(&mut self) {
        self.store.clear();
        self.pending.clear();
    }
}
