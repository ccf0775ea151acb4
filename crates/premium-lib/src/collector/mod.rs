//! Input collection
//!
//! Produces feature records from an operator (interactive form), a file, or
//! a machine caller (JSON request body). The interactive and file variants
//! enforce the schema; the API variant deliberately does not.

mod api;
mod file;
mod form;
mod terminal;

pub use api::ApiRecord;
pub use file::JsonFileCollector;
pub use form::FormSession;
pub use terminal::TerminalForm;

use crate::error::SchemaError;
use crate::schema::FeatureRecord;
use thiserror::Error;

/// Errors raised while gathering input
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("I/O error while reading input: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is not a JSON object: {0}")]
    Parse(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Anything that can produce a complete, validated feature record
pub trait InputCollector {
    /// Gather one record. `Ok(None)` means the operator left without submitting.
    fn collect(&mut self) -> Result<Option<FeatureRecord>, CollectError>;
}
