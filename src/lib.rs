//! Hashref Patcher: line references for agent file edits
//!
//! An editing agent addresses lines as `<line>:<fp>`, where `fp` is a short
//! fingerprint of the line's content, instead of quoting the text it wants to
//! change. This crate computes those references, keeps a per-file table of
//! them across the read/edit lifecycle, recovers from or rejects stale
//! references, and turns edits into patch documents or text replacements for
//! the host's own edit mechanism.
//!
//! # Architecture
//!
//! - [`fingerprint`]: the 12-bit line checksum and the reference grammar
//! - [`resolve`]: fingerprint tables and one-retry staleness resolution
//! - [`patch`]: chunk generation, batch ordering, the composite document
//! - [`engine`]: lifecycle control and the host hooks built on it
//!
//! # Example
//!
//! ```no_run
//! use hashref_patcher::{Engine, EditArgs, HashrefConfig, ReadOutput};
//!
//! let mut engine = Engine::new(HashrefConfig::default());
//! let listing = engine.on_read(&ReadOutput::full("src/main.rs", "1: fn main() {\n2: }"));
//! println!("{listing}");
//!
//! let args: EditArgs = serde_json::from_str(
//!     r#"{"filePath":"src/main.rs","afterHash":"1:8aa","content":"    println!(\"hi\");"}"#,
//! )?;
//! match engine.before_edit(&args) {
//!     Ok(native) => println!("{native:?}"),
//!     Err(e) => eprintln!("edit rejected: {e}"),
//! }
//! engine.after_edit();
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod config;
pub mod edit;
pub mod engine;
pub mod fingerprint;
pub mod hooks;
pub mod patch;
pub mod resolve;
pub mod source;
pub mod workspace;

// Re-exports
pub use config::{discover, load_from_path, load_from_str, ConfigError, HashrefConfig};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use engine::Engine;
pub use fingerprint::{line_fingerprint, Fingerprint, LineRef};
pub use hooks::{EditArgs, EditShape, EditSpec, NativeEdit, ReadOutput};
pub use patch::{
    generate_chunk, resolve_batch, resolve_single, BatchOutcome, Chunk, EditRequest, EditTarget,
    FileSection, PatchDocument, PatchLine, TextReplacement,
};
pub use resolve::{FingerprintTable, ResolveError, TableStore};
pub use source::{ContentProvider, FsProvider};
pub use workspace::Workspace;
