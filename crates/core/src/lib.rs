//! Tooling around an out-of-order RISC-V cycle-accurate simulator.
//!
//! The simulator itself lives elsewhere; this crate owns what sits around it:
//! 1. **Config:** Cache, crossbar, prefetcher and issue-queue scheduler parameter records,
//!    with the presets the simulator ships and the construction-time topology checks.
//! 2. **ISA:** Disassembly of raw RV64GC encodings found in RTL commit traces.
//! 3. **Trace:** Reading and writing the per-instruction commit trace database, and the
//!    basic-block and pipeline-view reports built from it.
//! 4. **Checkpoint:** Partition lists, run bookkeeping and cycle merging for checkpoints
//!    simulated in parallel across cores.

/// Shared error type and memory size parsing.
pub mod common;
/// Simulator parameter records, presets and topology elaboration.
pub mod config;
/// Checkpoint partition tooling.
pub mod checkpoint;
/// RISC-V instruction encodings and disassembler.
pub mod isa;
/// Commit trace database access and reports.
pub mod trace;

/// Crate-wide error type.
pub use crate::common::{Error, Result};
/// Root configuration document; use `SystemConfig::default()` or load from JSON.
pub use crate::config::SystemConfig;
