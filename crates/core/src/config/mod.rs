//! Configuration documents for the external simulator.
//!
//! A [`SystemConfig`] collects every parameter record this crate produces:
//! 1. **Caches:** per-level geometry and latencies ([`cache`]).
//! 2. **Buses:** the coherent crossbars between levels ([`xbar`]).
//! 3. **Scheduler:** issue queues, read-port claims and wakeup network ([`scheduler`]).
//! 4. **Prefetch:** per-level prefetcher selection ([`prefetch`]).
//!
//! Documents are JSON. Every field has a default, so a partial document only needs the
//! values it overrides.

pub mod cache;
pub mod elaborate;
pub mod fu;
pub mod prefetch;
pub mod scheduler;
pub mod xbar;

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use cache::{CacheHierarchy, CacheParams, Clusivity, Indexing};
pub use elaborate::SchedulerLayout;
pub use fu::{FuncUnit, OpClass};
pub use prefetch::{PrefetchLevel, PrefetchOptions, PrefetcherKind, PrefetcherParams};
pub use scheduler::{SchedulerConfig, SchedulerPreset};
pub use xbar::{BusHierarchy, XBarParams};

use crate::common::{IoContext, Result};

/// Guest instruction set the simulated system targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetIsa {
    /// RISC-V.
    #[default]
    Riscv,
    /// x86.
    X86,
    /// Arm.
    Arm,
}

impl fmt::Display for TargetIsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Riscv => "riscv",
            Self::X86 => "x86",
            Self::Arm => "arm",
        })
    }
}

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Cache hierarchy.
    pub caches: CacheHierarchy,
    /// Crossbars between cache levels.
    pub buses: BusHierarchy,
    /// Issue-queue scheduler.
    pub scheduler: SchedulerConfig,
    /// Prefetcher selection and tuning.
    pub prefetch: PrefetchOptions,
    /// Target instruction set.
    pub target_isa: TargetIsa,
}

/// Prefetchers built while validating a [`SystemConfig`], one per level that has one.
pub type BuiltPrefetchers = Vec<(PrefetchLevel, PrefetcherParams)>;

impl SystemConfig {
    /// Default document for `target`, with the scheduler built from `preset`.
    pub fn new(target_isa: TargetIsa, preset: SchedulerPreset) -> Self {
        Self {
            caches: CacheHierarchy::for_target(target_isa),
            scheduler: preset.build(),
            target_isa,
            ..Self::default()
        }
    }

    /// Reads a JSON document from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_path(path)?;
        let config = Self::from_json(&text)?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Renders the document as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replaces the scheduler with a preset.
    #[must_use]
    pub fn with_scheduler(mut self, preset: SchedulerPreset) -> Self {
        self.scheduler = preset.build();
        self
    }

    /// Checks every record the simulator would reject and returns the elaborated
    /// scheduler.
    pub fn validate(&self) -> Result<SchedulerLayout> {
        self.caches.validate()?;
        let layout = SchedulerLayout::elaborate(&self.scheduler)?;
        let _ = self.prefetchers()?;
        Ok(layout)
    }

    /// Builds the prefetcher of every cache level that has one.
    ///
    /// L3 is shared and has no core, so its prefetcher has no TLB. An L3 prefetcher
    /// on a two-level hierarchy is ignored.
    pub fn prefetchers(&self) -> Result<BuiltPrefetchers> {
        let mut levels = vec![(PrefetchLevel::L1d, true), (PrefetchLevel::L2, true)];
        if self.caches.l3.is_some() {
            levels.push((PrefetchLevel::L3, false));
        }
        let mut built = Vec::new();
        for (level, has_cpu) in levels {
            if let Some(pf) = prefetch::create_prefetcher(level, &self.prefetch, has_cpu)? {
                built.push((level, pf));
            }
        }
        Ok(built)
    }
}
