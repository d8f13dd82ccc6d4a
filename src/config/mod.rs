pub mod loader;
pub mod schema;

pub use loader::{discover, load_from_path, load_from_str, ConfigError, Origin, CONFIG_FILE};
pub use schema::{HashrefConfig, ValidationError, ValidationIssue};
