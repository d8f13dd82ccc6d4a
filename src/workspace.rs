use std::path::{Component, Path, PathBuf};

/// Root against which edit paths are resolved and patch paths are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Absolute, lexically normalized workspace root
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`.
    ///
    /// Relative roots are taken relative to the current directory. The root
    /// is not canonicalized: edits may name files that do not exist yet, and
    /// those must still resolve to a stable key.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(root))
                .unwrap_or_else(|_| root.to_path_buf())
        };
        Self {
            root: normalize(&absolute),
        }
    }

    /// Absolute path for `path`, used as the fingerprint table key.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.root.join(path))
        }
    }

    /// Path as written in a patch document: relative to the root when inside
    /// it, absolute otherwise. Always uses `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(inside) => inside
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.resolve(path).starts_with(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
