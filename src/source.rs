//! File content providers.
//!
//! Scans and staleness rescans go through a [`ContentProvider`] so the
//! engine never touches the filesystem directly.

use std::fs;
use std::io;
use std::path::Path;

/// Reads the full text of a file.
pub trait ContentProvider {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProvider;

impl ContentProvider for FsProvider {
    fn read(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

impl<P: ContentProvider + ?Sized> ContentProvider for &P {
    fn read(&self, path: &Path) -> io::Result<String> {
        (**self).read(path)
    }
}
