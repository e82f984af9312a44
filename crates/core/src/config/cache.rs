//! Cache parameter records.
//!
//! Each record is a flat parameter table handed to the simulator's cache model at
//! construction. The constructors reproduce the hierarchy the simulator ships with;
//! a record read from JSON fills missing fields from the generic L1 base.

use serde::{Deserialize, Serialize};

use super::TargetIsa;
use crate::common::{Error, MemorySize, Result};

/// Baseline values shared by the presets.
mod defaults {
    use crate::common::MemorySize;

    /// Cache line size in bytes.
    pub const LINE_SIZE: u64 = 64;

    /// Page size used when computing VIPT alias bits.
    pub const PAGE_SIZE: u64 = 4096;

    /// Targets recorded per MSHR for private caches.
    pub const TGTS_PER_MSHR: u32 = 20;

    /// Targets recorded per MSHR for the I/O and page-table walker caches.
    pub const TGTS_PER_MSHR_SMALL: u32 = 12;

    /// L1 instruction and data cache capacity.
    pub const L1_SIZE: MemorySize = MemorySize::kib(64);

    /// L2 capacity.
    pub const L2_SIZE: MemorySize = MemorySize::mib(1);

    /// L3 capacity.
    pub const L3_SIZE: MemorySize = MemorySize::mib(16);

    /// I/O and page-table walker cache capacity.
    pub const SMALL_SIZE: MemorySize = MemorySize::kib(1);

    /// Associativity of caches that do not set one (the simulator's own default).
    pub const ASSOC: u32 = 16;
}

/// Inclusion relationship with the next level up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clusivity {
    /// Lines filled from below are kept (the usual case).
    #[default]
    MostlyIncl,
    /// Lines are handed to the level above and dropped here.
    MostlyExcl,
}

/// Set-indexing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indexing {
    /// Physically indexed, physically tagged.
    #[default]
    SetAssociative,
    /// Virtually indexed, physically tagged; index bits above the page offset alias.
    Vipt,
}

/// Parameters of one cache instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheParams {
    /// Capacity.
    pub size: MemorySize,
    /// Associativity.
    pub assoc: u32,
    /// Line size in bytes.
    pub line_size: u64,
    /// Tag lookup latency in cycles.
    pub tag_latency: u32,
    /// Data array latency in cycles.
    pub data_latency: u32,
    /// Latency to service an MSHR once the response arrives.
    pub response_latency: u32,
    /// Miss status holding registers.
    pub mshrs: u32,
    /// Targets tracked per MSHR.
    pub tgts_per_mshr: u32,
    /// Position in the hierarchy, if the model needs it.
    pub cache_level: Option<u8>,
    /// Cache never holds dirty data.
    pub is_read_only: bool,
    /// Write back clean lines on eviction.
    pub writeback_clean: bool,
    /// Tag and data are accessed one after the other instead of in parallel.
    pub sequential_access: bool,
    /// Inclusion policy.
    pub clusivity: Clusivity,
    /// Treat every access as a hit.
    pub force_hit: bool,
    /// MSHRs held back for demand misses.
    pub demand_mshr_reserve: Option<u32>,
    /// Way prediction.
    pub enable_wayprediction: bool,
    /// Set-indexing scheme.
    pub indexing: Indexing,
}

impl Default for CacheParams {
    /// The generic L1 base every private cache starts from.
    fn default() -> Self {
        Self::l1_base()
    }
}

impl CacheParams {
    /// Generic first-level cache.
    pub fn l1_base() -> Self {
        Self {
            size: defaults::L1_SIZE,
            assoc: 2,
            line_size: defaults::LINE_SIZE,
            tag_latency: 2,
            data_latency: 2,
            response_latency: 2,
            mshrs: 4,
            tgts_per_mshr: defaults::TGTS_PER_MSHR,
            cache_level: Some(1),
            is_read_only: false,
            writeback_clean: false,
            sequential_access: false,
            clusivity: Clusivity::MostlyIncl,
            force_hit: false,
            demand_mshr_reserve: None,
            enable_wayprediction: false,
            indexing: Indexing::SetAssociative,
        }
    }

    /// L1 instruction cache.
    pub fn l1_icache() -> Self {
        Self {
            mshrs: 2,
            is_read_only: true,
            writeback_clean: false,
            tag_latency: 1,
            data_latency: 1,
            sequential_access: false,
            response_latency: 0,
            enable_wayprediction: false,
            ..Self::l1_base()
        }
    }

    /// L1 data cache. Latencies are aligned to the RTL; `response_latency` is the
    /// MSHR service delay on a response, not a true response latency.
    pub fn l1_dcache() -> Self {
        Self {
            mshrs: 16,
            writeback_clean: false,
            tag_latency: 1,
            data_latency: 1,
            sequential_access: false,
            response_latency: 0,
            force_hit: false,
            demand_mshr_reserve: Some(6),
            enable_wayprediction: false,
            ..Self::l1_base()
        }
    }

    /// Unified L2. Always writes back clean lines since L3 is mostly exclusive.
    pub fn l2() -> Self {
        Self {
            size: defaults::L2_SIZE,
            assoc: defaults::ASSOC,
            line_size: defaults::LINE_SIZE,
            tag_latency: 1,
            data_latency: 2,
            response_latency: 0,
            mshrs: 64,
            tgts_per_mshr: defaults::TGTS_PER_MSHR,
            cache_level: Some(2),
            is_read_only: false,
            writeback_clean: true,
            sequential_access: true,
            clusivity: Clusivity::MostlyIncl,
            force_hit: false,
            demand_mshr_reserve: None,
            enable_wayprediction: false,
            indexing: Indexing::SetAssociative,
        }
    }

    /// Unified L3.
    pub fn l3() -> Self {
        Self {
            size: defaults::L3_SIZE,
            tag_latency: 2,
            data_latency: 5,
            cache_level: Some(3),
            writeback_clean: false,
            clusivity: Clusivity::MostlyExcl,
            ..Self::l2()
        }
    }

    /// Cache in front of I/O devices.
    pub fn io() -> Self {
        Self {
            size: defaults::SMALL_SIZE,
            assoc: 8,
            tag_latency: 50,
            data_latency: 50,
            response_latency: 50,
            mshrs: 20,
            tgts_per_mshr: defaults::TGTS_PER_MSHR_SMALL,
            cache_level: None,
            ..Self::l1_base()
        }
    }

    /// Page-table walker cache. RISC-V and x86 walkers write the table (A/D bits),
    /// so the cache is only read-only for other targets.
    pub fn page_table_walker(target: TargetIsa) -> Self {
        let is_read_only = !matches!(target, TargetIsa::Riscv | TargetIsa::X86);
        Self {
            size: defaults::SMALL_SIZE,
            assoc: 2,
            tag_latency: 2,
            data_latency: 2,
            response_latency: 2,
            mshrs: 10,
            tgts_per_mshr: defaults::TGTS_PER_MSHR_SMALL,
            cache_level: None,
            writeback_clean: true,
            is_read_only,
            ..Self::l1_base()
        }
    }

    /// Number of sets.
    pub fn num_sets(&self) -> u64 {
        match self.line_size.checked_mul(u64::from(self.assoc)) {
            Some(way_bytes) if way_bytes != 0 => self.size.as_bytes() / way_bytes,
            _ => 0,
        }
    }

    /// Index bits above the page offset for a VIPT cache; zero for physically indexed ones.
    pub fn alias_bits(&self) -> u32 {
        if self.indexing != Indexing::Vipt {
            return 0;
        }
        let index_top = self.num_sets().trailing_zeros() + self.line_size.trailing_zeros();
        index_top.saturating_sub(defaults::PAGE_SIZE.trailing_zeros())
    }

    /// Checks that the geometry is realisable.
    pub fn validate(&self, name: &str) -> Result<()> {
        let fail = |reason: String| Error::InvalidCache {
            name: name.to_string(),
            reason,
        };
        if self.assoc == 0 {
            return Err(fail("associativity must be non-zero".into()));
        }
        if self.mshrs == 0 {
            return Err(fail("at least one MSHR is required".into()));
        }
        if !self.line_size.is_power_of_two() {
            return Err(fail(format!(
                "line size {} is not a power of two",
                self.line_size
            )));
        }
        let Some(way_bytes) = self.line_size.checked_mul(u64::from(self.assoc)) else {
            return Err(fail(format!(
                "{} ways x {}B lines overflows",
                self.assoc, self.line_size
            )));
        };
        if self.size.as_bytes() == 0 || self.size.as_bytes() % way_bytes != 0 {
            return Err(fail(format!(
                "size {} is not a multiple of {} ways x {}B lines",
                self.size, self.assoc, self.line_size
            )));
        }
        if !self.num_sets().is_power_of_two() {
            return Err(fail(format!(
                "{} sets is not a power of two",
                self.num_sets()
            )));
        }
        if let Some(reserve) = self.demand_mshr_reserve {
            if reserve >= self.mshrs {
                return Err(fail(format!(
                    "demand MSHR reserve {reserve} leaves no MSHR out of {}",
                    self.mshrs
                )));
            }
        }
        Ok(())
    }
}

/// The full cache hierarchy of one core plus the shared levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHierarchy {
    /// L1 instruction cache.
    #[serde(default = "CacheParams::l1_icache")]
    pub l1i: CacheParams,
    /// L1 data cache.
    #[serde(default = "CacheParams::l1_dcache")]
    pub l1d: CacheParams,
    /// Unified L2.
    #[serde(default = "CacheParams::l2")]
    pub l2: CacheParams,
    /// Unified L3; `None` for a two-level hierarchy.
    #[serde(default = "CacheHierarchy::default_l3")]
    pub l3: Option<CacheParams>,
    /// I/O cache.
    #[serde(default = "CacheParams::io")]
    pub io: CacheParams,
    /// Page-table walker cache.
    #[serde(default = "CacheHierarchy::default_ptw")]
    pub ptw: CacheParams,
}

impl CacheHierarchy {
    /// Returns the default L3 (present).
    #[allow(clippy::unnecessary_wraps)]
    fn default_l3() -> Option<CacheParams> {
        Some(CacheParams::l3())
    }

    /// Returns the RISC-V page-table walker cache.
    fn default_ptw() -> CacheParams {
        CacheParams::page_table_walker(TargetIsa::Riscv)
    }

    /// Builds the hierarchy for `target`.
    pub fn for_target(target: TargetIsa) -> Self {
        Self {
            ptw: CacheParams::page_table_walker(target),
            ..Self::default()
        }
    }

    /// Iterates over `(name, params)` for every present cache.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CacheParams)> {
        [
            ("l1i", Some(&self.l1i)),
            ("l1d", Some(&self.l1d)),
            ("l2", Some(&self.l2)),
            ("l3", self.l3.as_ref()),
            ("io", Some(&self.io)),
            ("ptw", Some(&self.ptw)),
        ]
        .into_iter()
        .filter_map(|(name, params)| params.map(|p| (name, p)))
    }

    /// Validates every cache.
    pub fn validate(&self) -> Result<()> {
        self.iter().try_for_each(|(name, params)| params.validate(name))
    }
}

impl Default for CacheHierarchy {
    fn default() -> Self {
        Self {
            l1i: CacheParams::l1_icache(),
            l1d: CacheParams::l1_dcache(),
            l2: CacheParams::l2(),
            l3: Self::default_l3(),
            io: CacheParams::io(),
            ptw: Self::default_ptw(),
        }
    }
}
