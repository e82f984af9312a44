//! Benchmark manifest shared by the partition jobs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::common::{Error, IoContext, Result};

mod defaults {
    pub const CORE_NUM: u32 = 24;
    pub const INTERVAL_UNIT: u64 = 20;
}

/// One benchmark and its number of checkpoint intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Benchmark name, also its directory name.
    pub name: String,
    /// Intervals to simulate.
    pub interval_count: u64,
}

/// Locations and sizing of a partitioned run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Checkpoint generator tree.
    pub nemu_home: PathBuf,
    /// Simulator tree.
    pub gem5_home: PathBuf,
    /// Physical cores, one partition each.
    #[serde(default = "Manifest::default_core_num")]
    pub core_num: u32,
    /// Interval length unit; partition offsets and counts are multiples of it.
    #[serde(default = "Manifest::default_interval_unit")]
    pub interval_unit: u64,
    /// Benchmarks.
    #[serde(default)]
    pub benchmarks: Vec<Benchmark>,
}

impl Manifest {
    fn default_core_num() -> u32 {
        defaults::CORE_NUM
    }

    fn default_interval_unit() -> u64 {
        defaults::INTERVAL_UNIT
    }

    /// Manifest with default sizing and no benchmarks.
    pub fn new(nemu_home: impl Into<PathBuf>, gem5_home: impl Into<PathBuf>) -> Self {
        Self {
            nemu_home: nemu_home.into(),
            gem5_home: gem5_home.into(),
            core_num: defaults::CORE_NUM,
            interval_unit: defaults::INTERVAL_UNIT,
            benchmarks: Vec::new(),
        }
    }

    /// Reads a JSON manifest.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_path(path)?;
        let manifest: Self = serde_json::from_str(&text)?;
        if manifest.core_num == 0 {
            return Err(Error::Checkpoint(format!(
                "{}: core_num must be positive",
                path.display()
            )));
        }
        Ok(manifest)
    }

    /// Looks up a benchmark.
    pub fn benchmark(&self, name: &str) -> Result<&Benchmark> {
        self.benchmarks
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| Error::Unknown {
                what: "benchmark",
                value: name.to_string(),
            })
    }

    /// Intervals each core simulates: `ceil(interval_count / core_num)`.
    pub fn batch_size(&self, name: &str) -> Result<u64> {
        let bench = self.benchmark(name)?;
        Ok(bench.interval_count.div_ceil(u64::from(self.core_num.max(1))))
    }

    /// Directory holding the checkpoints of `bench`.
    pub fn checkpoint_dir(&self, bench: &str) -> PathBuf {
        self.nemu_home
            .join("parallel_result")
            .join("checkpoint")
            .join(bench)
    }

    /// Per-run cycle outputs.
    pub fn cycles_dir(&self) -> PathBuf {
        self.gem5_home.join("output").join("cycles")
    }

    /// Per-run completed interval counts.
    pub fn run_info_dir(&self) -> PathBuf {
        self.zebra_dir().join("run_info")
    }

    /// Partition list written for `bench`.
    pub fn gcpt_list_path(&self, bench: &str) -> PathBuf {
        self.zebra_dir().join("gcpt_list").join(format!("{bench}.txt"))
    }

    fn zebra_dir(&self) -> PathBuf {
        self.gem5_home.join("util").join("zebra")
    }
}
