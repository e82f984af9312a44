//! Common types used throughout the crate.
//!
//! 1. **Error Handling:** A single error enum covering I/O, SQLite, JSON and validation failures.
//! 2. **Sizes:** A byte-size newtype that reads and writes the `"64KiB"` strings the simulator uses.

/// Error types.
pub mod error;

/// Memory size parsing and formatting.
pub mod size;

pub use error::{Error, IoContext, Result};
pub use size::MemorySize;
