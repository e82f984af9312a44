//! Partition lists for distributed simulation.
//!
//! Each line of a list names one checkpoint partition, the checkpoint file, the interval
//! unit and how many more instructions that partition still has to simulate:
//!
//! ```text
//! part1 /nemu/parallel_result/checkpoint/mcf/0/_0_.zstd 20 2000
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use super::Manifest;
use super::run_info::sum_runs;
use crate::common::{Error, IoContext, Result};

/// One line of a partition list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionEntry {
    /// 1-based partition number after renumbering.
    pub part: usize,
    /// Checkpoint file.
    pub checkpoint: PathBuf,
    /// Interval unit.
    pub interval_unit: u64,
    /// Remaining work, `(batch - done) * interval_unit`.
    pub remaining: u64,
}

impl fmt::Display for PartitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "part{} {} {} {}",
            self.part,
            self.checkpoint.display(),
            self.interval_unit,
            self.remaining
        )
    }
}

/// Result of [`gen_gcpt_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcptList {
    /// Partitions with work left.
    pub entries: Vec<PartitionEntry>,
    /// Partitions found in total.
    pub partitions: usize,
    /// Where the list was written.
    pub output: PathBuf,
}

/// A numbered checkpoint directory and its checkpoint file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// Number the directory is named after.
    pub number: u64,
    /// Checkpoint file inside it.
    pub file: PathBuf,
}

/// First `*.zstd` file directly inside `dir`, by name.
fn zstd_in(dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| p.extension().is_some_and(|ext| ext == "zstd"))
        .collect();
    files.sort();
    files.into_iter().next()
}

/// Finds every directory under `search_dir` whose name starts with a digit and that
/// holds a checkpoint, sorted by number.
///
/// Directories whose names are not plain numbers are skipped with a warning.
pub fn find_checkpoints(search_dir: &Path) -> Result<Vec<Checkpoint>> {
    if !search_dir.is_dir() {
        return Err(Error::Checkpoint(format!(
            "{} is not a directory",
            search_dir.display()
        )));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(search_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let Some(file) = zstd_in(entry.path()) else {
            continue;
        };
        match name.parse::<u64>() {
            Ok(number) => found.push(Checkpoint { number, file }),
            Err(_) => warn!("skipping {}: not a partition number", entry.path().display()),
        }
    }
    found.sort_by_key(|c| c.number);
    Ok(found)
}

/// Writes the partition list of `bench` and returns it.
///
/// Partitions are renumbered `part1..partN` in checkpoint order. Completed counts from
/// earlier runs are subtracted; partitions with a full batch done are left out.
pub fn gen_gcpt_list(manifest: &Manifest, bench: &str) -> Result<GcptList> {
    let batch = manifest.batch_size(bench)?;
    let checkpoints = find_checkpoints(&manifest.checkpoint_dir(bench))?;

    let run_dir = manifest.run_info_dir().join(bench);
    let done = sum_runs(&run_dir)?.unwrap_or_else(|| vec![0; checkpoints.len()]);
    if done.len() < checkpoints.len() {
        return Err(Error::Checkpoint(format!(
            "{}: {} run counts for {} partitions",
            run_dir.display(),
            done.len(),
            checkpoints.len()
        )));
    }

    let entries: Vec<PartitionEntry> = checkpoints
        .iter()
        .zip(&done)
        .enumerate()
        .filter(|(_, (_, done))| **done < batch)
        .map(|(idx, (checkpoint, done))| PartitionEntry {
            part: idx + 1,
            checkpoint: checkpoint.file.clone(),
            interval_unit: manifest.interval_unit,
            remaining: (batch - done) * manifest.interval_unit,
        })
        .collect();

    let output = manifest.gcpt_list_path(bench);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    let text: String = entries.iter().map(|e| format!("{e}\n")).collect();
    fs::write(&output, text).with_path(&output)?;

    info!(
        "{bench}: {} of {} partitions pending, batch {batch} -> {}",
        entries.len(),
        checkpoints.len(),
        output.display()
    );
    Ok(GcptList {
        entries,
        partitions: checkpoints.len(),
        output,
    })
}
