//! Applying resolved text replacements to files on disk.
//!
//! A resolved edit is pinned to a byte span covering whole lines and carries
//! a verification of the text expected there, so a file that changed between
//! resolution and application is rejected instead of corrupted.

use crate::patch::TextReplacement;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Byte-span replacement with verification of the replaced text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply() is called"]
pub struct Edit {
    pub file: PathBuf,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    pub new_text: String,
    pub expected_before: EditVerification,
}

/// What the span must contain for the edit to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the expected text, used for large spans
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Exact text up to 1KB, hash beyond.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("{}: lines {first}..={last} no longer hold the referenced text", file.display())]
    BeforeTextMismatch {
        file: PathBuf,
        first: usize,
        last: usize,
        expected: String,
        found: String,
    },

    #[error("{}: line {line} is past the end of the file ({lines} lines)", file.display())]
    LineOutOfRange {
        file: PathBuf,
        line: usize,
        lines: usize,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in file of length {file_len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        file_len: usize,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 validation error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The span already holds the new text
    AlreadyApplied { file: PathBuf },
}

impl Edit {
    /// Pin `replacement` to the lines it covers in `content`.
    ///
    /// The lines must still read as `replacement.old_text`; line endings are
    /// compared without their `\r`.
    pub fn for_replacement(
        file: impl Into<PathBuf>,
        content: &str,
        replacement: &TextReplacement,
    ) -> Result<Self, EditError> {
        let file = file.into();
        let (first, last) = (replacement.first_line, replacement.last_line);
        let spans = line_spans(content);
        let span_of = |line: usize| {
            line.checked_sub(1)
                .and_then(|idx| spans.get(idx))
                .copied()
                .ok_or_else(|| EditError::LineOutOfRange {
                    file: file.clone(),
                    line,
                    lines: spans.len(),
                })
        };
        let (byte_start, _) = span_of(first)?;
        let (_, byte_end) = span_of(last)?;

        let found = &content[byte_start..byte_end];
        if found.replace("\r\n", "\n") != replacement.old_text {
            return Err(EditError::BeforeTextMismatch {
                file,
                first,
                last,
                expected: replacement.old_text.clone(),
                found: found.to_string(),
            });
        }

        Ok(Self {
            file,
            byte_start,
            byte_end,
            new_text: replacement.new_text.clone(),
            expected_before: EditVerification::from_text(found),
        })
    }

    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end
            || self.byte_end > content.len()
            || !content.is_char_boundary(self.byte_start)
            || !content.is_char_boundary(self.byte_end)
        {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                file_len: content.len(),
            });
        }

        let current = &content[self.byte_start..self.byte_end];
        if current != self.new_text && !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                first: line_of(content, self.byte_start),
                last: line_of(content, self.byte_end),
                expected: format!("{:?}", self.expected_before),
                found: current.to_string(),
            });
        }
        Ok(current)
    }

    /// The full file text after this edit, without writing it.
    pub fn preview(&self, content: &str) -> Result<String, EditError> {
        self.validate(content)?;
        let mut out = String::with_capacity(content.len() + self.new_text.len());
        out.push_str(&content[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&content[self.byte_end..]);
        Ok(out)
    }

    /// Apply this edit atomically (tempfile + fsync + rename).
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let bytes = fs::read(&self.file)?;
        let original = std::str::from_utf8(&bytes)?;

        if self.validate(original)? == self.new_text {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }

        let updated = self.preview(original)?;
        atomic_write(&self.file, updated.as_bytes())?;

        // Bump mtime so watchers and build tools notice the change.
        filetime::set_file_mtime(&self.file, filetime::FileTime::now())?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_changed: self.new_text.len(),
        })
    }
}

/// Byte spans of each line, excluding its terminator.
fn line_spans(content: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in content.split_inclusive('\n') {
        let body = line
            .strip_suffix('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .unwrap_or(line);
        spans.push((start, start + body.len()));
        start += line.len();
    }
    spans
}

fn line_of(content: &str, byte: usize) -> usize {
    content[..byte.min(content.len())].matches('\n').count() + 1
}

fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
