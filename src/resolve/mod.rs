pub mod errors;
pub mod staleness;
pub mod table;

pub use errors::ResolveError;
pub use table::{FingerprintTable, TableStore};
