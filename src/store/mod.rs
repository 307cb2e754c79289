mod memory;

pub use memory::MemoryStore;

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// TableStore
///
/// The narrow contract the engine consumes from its physical backing
/// medium: named collections of ordered rows, each row holding cell
/// values addressed by 1-based (row, column) position.
///
/// Deleting a row is compacting: every subsequent row shifts up by one.
/// The engine owns the resulting index renumbering; implementations only
/// promise the shift itself.
///
/// Failures are fatal to the current engine operation; there is no retry
/// policy and no partial-failure recovery.
///

pub trait TableStore {
    /// Create a named collection. A no-op if it already exists.
    fn create_table(&mut self, name: &str) -> Result<(), StoreError>;

    /// Whether a named collection exists.
    fn has_table(&self, name: &str) -> bool;

    /// Read one cell. `None` for a cell that was never written.
    fn read_cell(&self, table: &str, row: u32, col: u32) -> Result<Option<String>, StoreError>;

    /// Write one cell, growing the collection as needed.
    fn write_cell(&mut self, table: &str, row: u32, col: u32, value: &str)
    -> Result<(), StoreError>;

    /// Number of rows currently in the collection.
    fn row_count(&self, table: &str) -> Result<u32, StoreError>;

    /// Physically remove one row; all subsequent rows shift up by one.
    fn delete_row(&mut self, table: &str, row: u32) -> Result<(), StoreError>;
}

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("no such table: {name}")]
    NoTable { name: String },

    #[error("row {row} out of range for table {name}")]
    RowOutOfRange { name: String, row: u32 },

    #[error("cell position must be 1-based")]
    ZeroPosition,

    #[error("backing store failure: {0}")]
    Backend(String),
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Store, err.to_string())
    }
}
