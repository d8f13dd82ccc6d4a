//! Host boundary: the shapes the engine exchanges with the tool host around
//! each file read and file edit.

pub mod args;
pub mod instructions;
pub mod listing;

pub use args::{EditArgs, EditShape, EditSpec, NativeEdit};
pub use listing::{annotate, is_directory_listing, AnnotatedListing};

use serde::Deserialize;

/// A completed file read, as rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOutput {
    pub path: String,
    pub output: String,
    /// The read was bounded by an offset or limit
    #[serde(default)]
    pub partial: bool,
}

impl ReadOutput {
    pub fn full(path: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            output: output.into(),
            partial: false,
        }
    }

    pub fn partial(path: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            output: output.into(),
            partial: true,
        }
    }
}
