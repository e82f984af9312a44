//! Commit-trace databases.
//!
//! The simulator (or an RTL testbench) writes one row per committed instruction into the
//! `LifeTimeCommitTrace` table: the tick at which the instruction passed each pipeline
//! stage, its assembly and its PC. This module reads such a table back, turns ticks into
//! clock cycles, optionally into per-stage gaps, and renders two reports:
//!
//! - [`bbl`]: the most frequent basic blocks, with mean stage clocks per instruction.
//! - [`perfcct`]: one pipeline line per instruction.
//!
//! [`recorder`] is the writing side, used to produce traces.

pub mod bbl;
pub mod db;
pub mod gap;
pub mod perfcct;
pub mod recorder;
pub mod stage;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use indicatif::ProgressBar;
use tracing::info;

pub use db::{Platform, TraceQuery, read_trace};
pub use gap::GapMode;
pub use recorder::{CommitTraceRecorder, Disasm};
pub use stage::Stage;

use crate::common::{Error, Result};

/// Name of the trace table.
pub const TABLE: &str = "LifeTimeCommitTrace";

/// Identity of a static instruction: PC and assembly text.
pub type InstKey = (u64, String);

/// One committed instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    /// Instruction address.
    pub pc: u64,
    /// Assembly text.
    pub asm: String,
    /// Per-stage clock values, or gaps after [`gap::apply`].
    pub clocks: Vec<f64>,
}

impl TraceEntry {
    /// PC as rendered in reports.
    pub fn pc_hex(&self) -> String {
        format!("{:#x}", self.pc)
    }

    /// Key for per-instruction aggregation.
    pub fn key(&self) -> InstKey {
        (self.pc, self.asm.clone())
    }
}

/// Report to produce from a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Basic-block frequency report.
    #[default]
    Bbl,
    /// Pipeline view.
    Perfcct,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bbl => "bbl",
            Self::Perfcct => "perfcct",
        })
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bbl" => Ok(Self::Bbl),
            "perfcct" => Ok(Self::Perfcct),
            other => Err(Error::Unknown {
                what: "trace tool",
                value: other.to_string(),
            }),
        }
    }
}

/// A trace after clock conversion and gap processing.
#[derive(Debug, Clone)]
pub struct TraceAnalysis {
    /// Gap mode applied to `entries`.
    pub mode: GapMode,
    /// Entries in commit order.
    pub entries: Vec<TraceEntry>,
    /// Mean clock vector of every distinct instruction, in first-seen order.
    pub averages: IndexMap<InstKey, Vec<f64>>,
}

impl TraceAnalysis {
    /// Builds the analysis of already-read entries.
    pub fn new(entries: Vec<TraceEntry>, mode: GapMode) -> Self {
        let entries = gap::apply(entries, mode);
        let averages = gap::mean_clocks(&entries);
        Self {
            mode,
            entries,
            averages,
        }
    }
}

/// Reads `path` with `query` and applies `mode`.
pub fn analyze(
    path: &Path,
    query: &TraceQuery,
    mode: GapMode,
    progress: Option<&ProgressBar>,
) -> Result<TraceAnalysis> {
    let entries = read_trace(path, query, progress)?;
    let analysis = TraceAnalysis::new(entries, mode);
    info!(
        "analyzed {} instructions, {} distinct ({mode})",
        analysis.entries.len(),
        analysis.averages.len()
    );
    Ok(analysis)
}
