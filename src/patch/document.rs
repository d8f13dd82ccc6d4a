use crate::patch::chunk::Chunk;
use std::fmt;

pub const BEGIN_PATCH: &str = "*** Begin Patch";
pub const END_PATCH: &str = "*** End Patch";
pub const UPDATE_FILE: &str = "*** Update File: ";

/// All chunks for one file, in the order they must be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSection {
    /// Path as written after `*** Update File: `
    pub path: String,
    pub chunks: Vec<Chunk>,
}

impl fmt::Display for FileSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{UPDATE_FILE}{}", self.path)?;
        for chunk in &self.chunks {
            write!(f, "{chunk}")?;
        }
        Ok(())
    }
}

/// A composite patch document covering any number of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchDocument {
    pub sections: Vec<FileSection>,
}

impl PatchDocument {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.sections.iter().map(|s| s.chunks.len()).sum()
    }

    /// Render the document; there is no newline after the end marker.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PatchDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BEGIN_PATCH}")?;
        for section in &self.sections {
            write!(f, "{section}")?;
        }
        write!(f, "{END_PATCH}")
    }
}
