//! Checkpoint partition file sets.
//!
//! A long benchmark is cut into checkpoints, and the checkpoints are spread over the
//! physical cores of a host as partitions of `batch_size` intervals each. Runs may stop
//! early, so the jobs here track what each run completed and produce the list of work
//! still pending:
//!
//! 1. [`gen_gcpt_list`] writes the list of partitions with work left.
//! 2. [`line_count`] records what a finished run produced per partition.
//! 3. [`merge_cycles`] joins the outputs of all runs into one file per benchmark.

pub mod gcpt_list;
pub mod manifest;
pub mod merge;
pub mod run_info;

pub use gcpt_list::{GcptList, PartitionEntry, gen_gcpt_list};
pub use manifest::{Benchmark, Manifest};
pub use merge::{MergeSummary, merge_cycles};
pub use run_info::line_count;
