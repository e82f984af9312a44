//! Merging per-run cycle outputs into one file per benchmark.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::Manifest;
use super::run_info::INTERVAL_CYCLE_FILE;
use crate::common::{IoContext, Result};

/// Name of the merged output inside the benchmark directory.
pub const MERGED_FILE: &str = "cycle.txt";

/// Outcome of [`merge_cycles`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// Runs found.
    pub runs: usize,
    /// Lines kept per partition, partition 1 first.
    pub per_part: Vec<u64>,
    /// Lines written.
    pub total: u64,
    /// Merged file.
    pub output: PathBuf,
}

fn count_subdirs(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        if entry.path().is_dir() {
            count += 1;
        }
    }
    Ok(count)
}

/// Concatenates the cycle outputs of every run of `bench`, partition by partition.
///
/// For each partition, runs are read in order until `batch_size` lines have been taken;
/// later lines of that partition are dropped. Missing partition directories are skipped
/// with a warning.
pub fn merge_cycles(manifest: &Manifest, bench: &str, cycles_dir: &Path) -> Result<MergeSummary> {
    let bench_dir = cycles_dir.join(bench);
    let runs = count_subdirs(&bench_dir)?;
    info!("{bench} run times: {runs}");

    let batch = manifest.batch_size(bench)?;
    let output = bench_dir.join(MERGED_FILE);
    let file = File::create(&output).with_path(&output)?;
    let mut out = BufWriter::new(file);

    let mut per_part = Vec::with_capacity(manifest.core_num as usize);
    for part in 1..=manifest.core_num {
        let mut taken = 0;
        for run in 1..=runs {
            if taken >= batch {
                break;
            }
            let part_dir = bench_dir.join(format!("run{run}")).join(format!("part{part}"));
            if !part_dir.exists() {
                warn!("directory {} does not exist", part_dir.display());
                continue;
            }
            let input = part_dir.join(INTERVAL_CYCLE_FILE);
            let reader = BufReader::new(File::open(&input).with_path(&input)?);
            for line in reader.lines() {
                if taken >= batch {
                    break;
                }
                let line = line.with_path(&input)?;
                writeln!(out, "{line}").with_path(&output)?;
                taken += 1;
            }
        }
        info!("part {part}: {taken} lines");
        per_part.push(taken);
    }
    out.flush().with_path(&output)?;

    let total = per_part.iter().sum();
    info!("{bench}: {total} lines -> {}", output.display());
    Ok(MergeSummary {
        runs,
        per_part,
        total,
        output,
    })
}
