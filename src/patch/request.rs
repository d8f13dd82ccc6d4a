use crate::fingerprint::LineRef;
use crate::resolve::ResolveError;
use std::path::PathBuf;

/// Where an edit lands in its target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Replace a single line
    ReplaceLine(LineRef),
    /// Replace `start..=end`
    ReplaceRange { start: LineRef, end: LineRef },
    /// Insert new lines after `anchor`
    InsertAfter(LineRef),
}

impl EditTarget {
    /// Reference used to order edits within a file.
    pub fn primary(&self) -> &LineRef {
        match self {
            EditTarget::ReplaceLine(reference) => reference,
            EditTarget::ReplaceRange { start, .. } => start,
            EditTarget::InsertAfter(anchor) => anchor,
        }
    }

    /// Reject ranges whose end precedes their start.
    ///
    /// Only looks at the line numbers carried by the references, so it can
    /// run before any table is touched.
    pub fn validate(&self) -> Result<(), ResolveError> {
        if let EditTarget::ReplaceRange { start, end } = self {
            if end.line < start.line {
                return Err(ResolveError::InvalidRange {
                    start: start.line,
                    end: end.line,
                });
            }
        }
        Ok(())
    }
}

/// One hash-reference edit against one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// Absolute path of the target file
    pub path: PathBuf,
    pub target: EditTarget,
    /// Replacement or inserted text, possibly spanning several lines
    pub content: String,
}

impl EditRequest {
    pub fn new(path: impl Into<PathBuf>, target: EditTarget, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target,
            content: content.into(),
        }
    }

    pub fn replace_line(path: impl Into<PathBuf>, reference: LineRef, content: impl Into<String>) -> Self {
        Self::new(path, EditTarget::ReplaceLine(reference), content)
    }

    pub fn replace_range(
        path: impl Into<PathBuf>,
        start: LineRef,
        end: LineRef,
        content: impl Into<String>,
    ) -> Self {
        Self::new(path, EditTarget::ReplaceRange { start, end }, content)
    }

    pub fn insert_after(path: impl Into<PathBuf>, anchor: LineRef, content: impl Into<String>) -> Self {
        Self::new(path, EditTarget::InsertAfter(anchor), content)
    }

    /// Lines of the new content.
    ///
    /// One trailing line terminator does not open an extra blank line, and
    /// empty content yields no lines at all.
    pub fn content_lines(&self) -> Vec<&str> {
        if self.content.is_empty() {
            return Vec::new();
        }
        let body = self
            .content
            .strip_suffix("\r\n")
            .or_else(|| self.content.strip_suffix('\n'))
            .unwrap_or(&self.content);
        body.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(line: usize) -> LineRef {
        LineRef::for_line(line, "x")
    }

    #[test]
    fn test_primary_reference() {
        assert_eq!(EditTarget::ReplaceLine(r(3)).primary().line, 3);
        assert_eq!(EditTarget::ReplaceRange { start: r(2), end: r(5) }.primary().line, 2);
        assert_eq!(EditTarget::InsertAfter(r(7)).primary().line, 7);
    }

    #[test]
    fn test_validate_inverted_range() {
        let target = EditTarget::ReplaceRange { start: r(5), end: r(2) };
        assert!(matches!(
            target.validate(),
            Err(ResolveError::InvalidRange { start: 5, end: 2 })
        ));
        assert!(EditTarget::ReplaceRange { start: r(2), end: r(2) }.validate().is_ok());
    }

    #[test]
    fn test_content_lines() {
        let edit = |content: &str| EditRequest::replace_line("/f", r(1), content);
        assert_eq!(edit("a\nb").content_lines(), vec!["a", "b"]);
        assert_eq!(edit("a\nb\n").content_lines(), vec!["a", "b"]);
        assert_eq!(edit("a\r\nb\r\n").content_lines(), vec!["a", "b"]);
        assert_eq!(edit("a\n\n").content_lines(), vec!["a", ""]);
        assert!(edit("").content_lines().is_empty());
        assert_eq!(edit("\n").content_lines(), vec![""]);
        assert_eq!(edit("\n\n").content_lines(), vec!["", ""]);
    }
}
