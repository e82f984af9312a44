//! Stage-clock differencing and per-instruction means.

use std::fmt;

use indexmap::IndexMap;

use super::{InstKey, TraceEntry};
use crate::common::{Error, Result};

/// How clock vectors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapMode {
    /// Absolute stage clocks.
    #[default]
    Normal,
    /// Per stage, this instruction's clock minus the previous instruction's.
    InterGap,
    /// Per instruction, each stage's clock minus the preceding stage's.
    InnerGap,
}

impl GapMode {
    /// Mode selected by the two command-line switches; both at once is rejected.
    pub fn from_flags(inter_gap: bool, inner_gap: bool) -> Result<Self> {
        match (inter_gap, inner_gap) {
            (true, true) => Err(Error::Trace(
                "cannot set both inter-gap and inner-gap".to_string(),
            )),
            (true, false) => Ok(Self::InterGap),
            (false, true) => Ok(Self::InnerGap),
            (false, false) => Ok(Self::Normal),
        }
    }

    /// Whether clocks are differences.
    pub const fn is_gap(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Label used in report headers.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::InterGap => "inter-gap",
            Self::InnerGap => "inner-gap",
        }
    }
}

impl fmt::Display for GapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rewrites clock vectors for `mode`.
///
/// Inter-gap has no predecessor for the first entry, so that entry is dropped.
pub fn apply(entries: Vec<TraceEntry>, mode: GapMode) -> Vec<TraceEntry> {
    match mode {
        GapMode::Normal => entries,
        GapMode::InterGap => {
            let previous: Vec<Vec<f64>> = entries.iter().map(|e| e.clocks.clone()).collect();
            entries
                .into_iter()
                .skip(1)
                .zip(previous)
                .map(|(mut entry, prev)| {
                    entry.clocks = entry
                        .clocks
                        .iter()
                        .zip(&prev)
                        .map(|(cur, before)| cur - before)
                        .collect();
                    entry
                })
                .collect()
        }
        GapMode::InnerGap => entries
            .into_iter()
            .map(|mut entry| {
                entry.clocks = entry.clocks.windows(2).map(|w| w[1] - w[0]).collect();
                entry
            })
            .collect(),
    }
}

/// Mean clock vector of each distinct `(pc, asm)`, in first-seen order.
pub fn mean_clocks(entries: &[TraceEntry]) -> IndexMap<InstKey, Vec<f64>> {
    let mut sums: IndexMap<InstKey, (Vec<f64>, u32)> = IndexMap::new();
    for entry in entries {
        let (sum, count) = sums
            .entry(entry.key())
            .or_insert_with(|| (vec![0.0; entry.clocks.len()], 0));
        for (acc, clock) in sum.iter_mut().zip(&entry.clocks) {
            *acc += clock;
        }
        *count += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| {
            let n = f64::from(count);
            (key, sum.into_iter().map(|s| s / n).collect())
        })
        .collect()
}
