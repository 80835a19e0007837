pub mod error;
pub mod columns;
pub mod record;
pub mod clean;
pub mod transform;
pub mod pipeline;
pub mod sql;
pub mod config;
pub mod db;
pub mod warehouse;
pub mod sync;
pub mod export;
pub mod stats;
pub mod report;

pub use error::{PipelineError, Result};
