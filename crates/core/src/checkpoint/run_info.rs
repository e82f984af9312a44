//! Completed-interval bookkeeping per run.
//!
//! After each run, the number of intervals every partition finished is stored as one
//! count per line in `run_info/<bench>/run<id>.txt`. Later partition lists subtract the
//! sum over all runs from each partition's batch.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::Manifest;
use crate::common::{Error, IoContext, Result};

/// Name of the per-partition cycle output.
pub const INTERVAL_CYCLE_FILE: &str = "interval_cycle.txt";

/// Lines in `path`, counted as newline characters.
pub fn count_lines(path: &Path) -> Result<u64> {
    let bytes = fs::read(path).with_path(path)?;
    Ok(bytes.iter().filter(|b| **b == b'\n').count() as u64)
}

/// Reads one count per non-empty line.
pub fn read_counts(path: &Path) -> Result<Vec<u64>> {
    let text = fs::read_to_string(path).with_path(path)?;
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<u64>().map_err(|_| {
                Error::Checkpoint(format!("{}: invalid count {line:?}", path.display()))
            })
        })
        .collect()
}

/// Element-wise sum of every `run*.txt` under `dir`, in file-name order.
///
/// Returns `None` when `dir` does not exist. All files must have the same length.
pub fn sum_runs(dir: &Path) -> Result<Option<Vec<u64>>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_path(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().is_some_and(|ext| ext == "txt")
                && path
                    .file_name()
                    .and_then(std::ffi::OsStr::to_str)
                    .is_some_and(|n| n.starts_with("run"))
        })
        .collect();
    files.sort();

    let mut sum: Option<Vec<u64>> = None;
    for file in &files {
        let counts = read_counts(file)?;
        match sum.as_mut() {
            None => sum = Some(counts),
            Some(acc) if acc.len() == counts.len() => {
                for (a, c) in acc.iter_mut().zip(counts) {
                    *a += c;
                }
            }
            Some(acc) => {
                return Err(Error::Checkpoint(format!(
                    "{} has {} counts, earlier runs have {}",
                    file.display(),
                    counts.len(),
                    acc.len()
                )));
            }
        }
    }
    Ok(Some(sum.unwrap_or_default()))
}

/// Records how many intervals each partition of `run<run_id>` produced.
///
/// Reads `<cycles_dir>/<bench>/run<id>/part<i>/interval_cycle.txt` for every core and
/// writes the counts to `<run_info_dir>/<bench>/run<id>.txt`. Returns the counts.
pub fn line_count(
    manifest: &Manifest,
    bench: &str,
    run_id: u32,
    cycles_dir: &Path,
    run_info_dir: &Path,
) -> Result<Vec<u64>> {
    let run_dir = cycles_dir.join(bench).join(format!("run{run_id}"));
    let counts = (1..=manifest.core_num)
        .map(|part| count_lines(&run_dir.join(format!("part{part}")).join(INTERVAL_CYCLE_FILE)))
        .collect::<Result<Vec<_>>>()?;

    let out_dir = run_info_dir.join(bench);
    fs::create_dir_all(&out_dir).with_path(&out_dir)?;
    let out = out_dir.join(format!("run{run_id}.txt"));
    let text: String = counts.iter().map(|c| format!("{c}\n")).collect();
    fs::write(&out, text).with_path(&out)?;

    info!(
        "{bench} run{run_id}: {} intervals over {} parts -> {}",
        counts.iter().sum::<u64>(),
        counts.len(),
        out.display()
    );
    Ok(counts)
}
