//! Coherent crossbar parameter records.
//!
//! Most of the transfer time is already covered by the cache latencies, so the buses add
//! at most a pipeline stage or two except on the path to memory.

use serde::{Deserialize, Serialize};

/// Snoop filter attached to a crossbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnoopFilter {
    /// Lookup latency in cycles; zero when it overlaps with the frontend latency.
    pub lookup_latency: u32,
}

/// Parameters of one coherent crossbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XBarParams {
    /// Datapath width in bytes.
    pub width: u32,
    /// Extra request latency at the frontend.
    pub frontend_latency: u32,
    /// Request and snoop forwarding latency.
    pub forward_latency: u32,
    /// Response latency.
    pub response_latency: u32,
    /// Snoop response latency.
    pub snoop_response_latency: u32,
    /// Snoop filter, if any.
    pub snoop_filter: Option<SnoopFilter>,
    /// Connects the L1 instruction and data caches to the first unified level.
    pub point_of_unification: bool,
    /// No coherent caches below this crossbar.
    pub point_of_coherency: bool,
}

impl Default for XBarParams {
    fn default() -> Self {
        Self::l1_to_l2()
    }
}

impl XBarParams {
    /// L1 to L2 crossbar, half a cache line wide.
    pub const fn l1_to_l2() -> Self {
        Self {
            width: 64,
            frontend_latency: 0,
            forward_latency: 3,
            response_latency: 3,
            snoop_response_latency: 1,
            snoop_filter: Some(SnoopFilter { lookup_latency: 0 }),
            point_of_unification: true,
            point_of_coherency: false,
        }
    }

    /// L2 to L3 crossbar.
    pub const fn l2_to_l3() -> Self {
        Self {
            forward_latency: 5,
            response_latency: 5,
            ..Self::l1_to_l2()
        }
    }

    /// L3 to memory crossbar. It is both the point of coherency and, for systems
    /// without caches, the point of unification.
    pub const fn l3_to_mem() -> Self {
        Self {
            width: 64,
            frontend_latency: 0,
            forward_latency: 30,
            response_latency: 30,
            snoop_response_latency: 4,
            snoop_filter: Some(SnoopFilter { lookup_latency: 1 }),
            point_of_unification: true,
            point_of_coherency: true,
        }
    }
}

/// The crossbars between cache levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusHierarchy {
    /// L1 to L2.
    #[serde(default = "XBarParams::l1_to_l2")]
    pub l1_to_l2: XBarParams,
    /// L2 to L3.
    #[serde(default = "XBarParams::l2_to_l3")]
    pub l2_to_l3: XBarParams,
    /// L3 to memory.
    #[serde(default = "XBarParams::l3_to_mem")]
    pub l3_to_mem: XBarParams,
}

impl Default for BusHierarchy {
    fn default() -> Self {
        Self {
            l1_to_l2: XBarParams::l1_to_l2(),
            l2_to_l3: XBarParams::l2_to_l3(),
            l3_to_mem: XBarParams::l3_to_mem(),
        }
    }
}
