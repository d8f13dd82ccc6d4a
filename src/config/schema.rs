use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Engine configuration, usually loaded from `hashref.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct HashrefConfig {
    /// Root for resolving relative edit paths (defaults to the current directory)
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
    /// Reject oldString/newString edits on files that have line references
    #[serde(default = "default_true")]
    pub require_references: bool,
    /// Rewrite read listings with `<line>:<fp>|` markers
    #[serde(default = "default_true")]
    pub annotate_reads: bool,
    /// Replacement for the built-in usage guidance
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for HashrefConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            require_references: true,
            annotate_reads: true,
            instructions: None,
        }
    }
}

impl HashrefConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if let Some(root) = &self.workspace_root {
            if root.as_os_str().is_empty() {
                issues.push(ValidationIssue::EmptyField {
                    field: "workspace_root",
                });
            }
        }
        if let Some(text) = &self.instructions {
            if text.trim().is_empty() {
                issues.push(ValidationIssue::EmptyField {
                    field: "instructions",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyField { field: &'static str },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyField { field } => {
                write!(f, "config field '{field}' must not be empty when set")
            }
        }
    }
}
