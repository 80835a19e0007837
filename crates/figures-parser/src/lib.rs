pub mod errors;
pub mod loader;
pub mod schema;

pub use errors::LoadError;
pub use loader::{is_missing, load_table, parse_table, read_table};
pub use schema::{MISSING_TOKENS, SOURCE_COLUMNS};
