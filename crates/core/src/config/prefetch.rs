//! Hardware prefetcher construction per cache level.
//!
//! The run options pick a prefetcher kind for each level; [`create_prefetcher`] turns
//! that choice into the parameter set the simulator instantiates, applying the tuning
//! used for the composite L1D prefetcher, the RTL-alignment mode and the cross-level
//! prefetch hints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{Error, Result};

/// Prefetcher kinds the simulator provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefetcherKind {
    /// Composite L1D prefetcher (stream, stride, SMS/PHT, BOP, Berti, SPP, temporal).
    #[serde(rename = "XSCompositePrefetcher")]
    XsComposite,
    /// Composite L2 prefetcher with worker sub-prefetchers (BOP, CMC, CDP).
    #[serde(rename = "L2CompositeWithWorkerPrefetcher")]
    L2CompositeWithWorker,
    /// Content-directed prefetcher.
    #[serde(rename = "CDP")]
    Cdp,
    /// Stream prefetcher.
    #[serde(rename = "XSStreamPrefetcher")]
    XsStream,
    /// Best-offset prefetcher.
    #[serde(rename = "BOPPrefetcher")]
    Bop,
    /// Classic stride prefetcher.
    #[serde(rename = "StridePrefetcher")]
    Stride,
    /// Tagged next-line prefetcher.
    #[serde(rename = "TaggedPrefetcher")]
    Tagged,
}

impl PrefetcherKind {
    /// Every kind.
    pub const ALL: [Self; 7] = [
        Self::XsComposite,
        Self::L2CompositeWithWorker,
        Self::Cdp,
        Self::XsStream,
        Self::Bop,
        Self::Stride,
        Self::Tagged,
    ];

    /// Class name used by the simulator.
    pub const fn name(self) -> &'static str {
        match self {
            Self::XsComposite => "XSCompositePrefetcher",
            Self::L2CompositeWithWorker => "L2CompositeWithWorkerPrefetcher",
            Self::Cdp => "CDP",
            Self::XsStream => "XSStreamPrefetcher",
            Self::Bop => "BOPPrefetcher",
            Self::Stride => "StridePrefetcher",
            Self::Tagged => "TaggedPrefetcher",
        }
    }
}

impl fmt::Display for PrefetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrefetcherKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::Unknown {
                what: "prefetcher",
                value: s.to_string(),
            })
    }
}

/// Cache level a prefetcher is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefetchLevel {
    /// L1 data cache.
    L1d,
    /// L2.
    L2,
    /// L3.
    L3,
}

impl fmt::Display for PrefetchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::L1d => "l1d",
            Self::L2 => "l2",
            Self::L3 => "l3",
        })
    }
}

/// Run options that drive prefetcher construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefetchOptions {
    /// Prefetcher at the L1 data cache.
    pub l1d_hwp_type: Option<PrefetcherKind>,
    /// Prefetcher at L2.
    pub l2_hwp_type: Option<PrefetcherKind>,
    /// Prefetcher at L3.
    pub l3_hwp_type: Option<PrefetcherKind>,
    /// Enable the signature path prefetcher inside the composite L1D prefetcher.
    pub l1d_enable_spp: bool,
    /// Enable the complex stride prefetcher inside the composite L1D prefetcher.
    pub l1d_enable_cplx: bool,
    /// Cache level PHT prefetches fill into.
    pub pht_pf_level: u32,
    /// Stride threshold below which a stride counts as short.
    pub short_stride_thres: u32,
    /// Align prefetchers with the RTL implementation.
    pub kmh_align: bool,
    /// Every access hits; stream run-ahead is pointless.
    pub ideal_cache: bool,
    /// L1 forwards prefetch hints to L2.
    pub l1_to_l2_pf_hint: bool,
    /// L2 forwards prefetch hints to L3.
    pub l2_to_l3_pf_hint: bool,
}

impl Default for PrefetchOptions {
    fn default() -> Self {
        Self {
            l1d_hwp_type: Some(PrefetcherKind::XsComposite),
            l2_hwp_type: Some(PrefetcherKind::L2CompositeWithWorker),
            l3_hwp_type: None,
            l1d_enable_spp: false,
            l1d_enable_cplx: false,
            pht_pf_level: 1,
            short_stride_thres: 512,
            kmh_align: false,
            ideal_cache: false,
            l1_to_l2_pf_hint: false,
            l2_to_l3_pf_hint: false,
        }
    }
}

impl PrefetchOptions {
    /// Prefetcher selected for `level`.
    pub const fn kind_for(&self, level: PrefetchLevel) -> Option<PrefetcherKind> {
        match level {
            PrefetchLevel::L1d => self.l1d_hwp_type,
            PrefetchLevel::L2 => self.l2_hwp_type,
            PrefetchLevel::L3 => self.l3_hwp_type,
        }
    }
}

/// Best-offset sub-prefetcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BopParams {
    /// Delay queue for issued offsets.
    pub delay_queue_enable: bool,
    /// Score under which an offset is abandoned.
    pub bad_score: u32,
}

/// Berti sub-prefetcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BertiParams {
    /// Learn deltas on byte addresses rather than line addresses.
    pub use_byte_addr: bool,
    /// Issue on low-confidence deltas too.
    pub aggressive_pf: bool,
    /// Forward triggers to the PHT.
    pub trigger_pht: bool,
}

/// Composite L1D prefetcher switches and tuning.
///
/// `None` on a sub-prefetcher switch keeps the simulator default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsCompositeParams {
    /// Signature path prefetcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_spp: Option<bool>,
    /// Complex stride prefetcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_cplx: Option<bool>,
    /// Fill level for PHT prefetches.
    pub pht_pf_level: u32,
    /// Short stride threshold.
    pub short_stride_thres: u32,
    /// Temporal prefetcher.
    pub enable_temporal: bool,
    /// Fuzzy stride matching.
    pub fuzzy_stride_matching: bool,
    /// Stream prefetcher runs ahead of demand.
    pub stream_pf_ahead: bool,
    /// Best-offset prefetcher.
    pub enable_bop: bool,
    /// Large-offset BOP instance.
    pub bop_large: BopParams,
    /// Small-offset BOP instance.
    pub bop_small: BopParams,
    /// Region size in bytes for region-based sub-prefetchers.
    pub region_size: u32,
    /// Berti tuning.
    pub berti: BertiParams,
    /// Berti prefetcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_berti: Option<bool>,
    /// Simple stride prefetcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sstride: Option<bool>,
    /// Active-page prefetcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_activepage: Option<bool>,
    /// Stream prefetcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_xsstream: Option<bool>,
}

/// Composite L2 prefetcher worker switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2CompositeParams {
    /// Correlated miss chain prefetcher.
    pub enable_cmc: bool,
    /// Best-offset prefetcher.
    pub enable_bop: bool,
    /// Content-directed prefetcher.
    pub enable_cdp: bool,
}

/// Parameters of one constructed prefetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetcherParams {
    /// Prefetcher class.
    pub kind: PrefetcherKind,
    /// Translate through the core's data TLB.
    pub register_tlb: bool,
    /// Prefetch queue entries; `None` keeps the simulator default.
    pub queue_size: Option<u32>,
    /// Requests allowed to wait on translation; `None` keeps the simulator default.
    pub max_prefetch_requests_with_pending_translation: Option<u32>,
    /// Composite L1D tuning, for [`PrefetcherKind::XsComposite`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xs_composite: Option<XsCompositeParams>,
    /// Composite L2 tuning, for [`PrefetcherKind::L2CompositeWithWorker`] under RTL alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l2_composite: Option<L2CompositeParams>,
}

impl PrefetcherParams {
    const fn plain(kind: PrefetcherKind, register_tlb: bool) -> Self {
        Self {
            kind,
            register_tlb,
            queue_size: None,
            max_prefetch_requests_with_pending_translation: None,
            xs_composite: None,
            l2_composite: None,
        }
    }
}

/// Builds the prefetcher for `level`, or `None` when the level has none.
///
/// `has_cpu` is false for caches without a core (the prefetcher then has no TLB).
pub fn create_prefetcher(
    level: PrefetchLevel,
    options: &PrefetchOptions,
    has_cpu: bool,
) -> Result<Option<PrefetcherParams>> {
    let Some(kind) = options.kind_for(level) else {
        return Ok(None);
    };
    info!("create_prefetcher at {level}: {kind}");

    let mut pf = PrefetcherParams::plain(kind, has_cpu);

    if kind == PrefetcherKind::XsComposite {
        let mut xs = XsCompositeParams {
            enable_spp: options.l1d_enable_spp.then_some(true),
            enable_cplx: options.l1d_enable_cplx.then_some(true),
            pht_pf_level: options.pht_pf_level,
            short_stride_thres: options.short_stride_thres,
            enable_temporal: !options.kmh_align,
            fuzzy_stride_matching: false,
            stream_pf_ahead: !options.ideal_cache,
            enable_bop: !options.kmh_align,
            bop_large: BopParams {
                delay_queue_enable: true,
                bad_score: 10,
            },
            bop_small: BopParams {
                delay_queue_enable: true,
                bad_score: 5,
            },
            region_size: 64 * 16,
            berti: BertiParams {
                use_byte_addr: true,
                aggressive_pf: false,
                trigger_pht: true,
            },
            enable_berti: None,
            enable_sstride: None,
            enable_activepage: None,
            enable_xsstream: None,
        };
        if options.kmh_align {
            xs.enable_berti = Some(false);
            xs.enable_sstride = Some(true);
            xs.enable_activepage = Some(false);
            xs.enable_xsstream = Some(true);
        }
        pf.xs_composite = Some(xs);
        pf.queue_size = Some(128);
        pf.max_prefetch_requests_with_pending_translation = Some(128);
    }

    match level {
        PrefetchLevel::L2 => {
            if options.kmh_align {
                if kind != PrefetcherKind::L2CompositeWithWorker {
                    return Err(Error::Prefetcher {
                        level: level.to_string(),
                        reason: format!(
                            "RTL alignment needs {}, got {kind}",
                            PrefetcherKind::L2CompositeWithWorker
                        ),
                    });
                }
                pf.l2_composite = Some(L2CompositeParams {
                    enable_cmc: true,
                    enable_bop: true,
                    enable_cdp: false,
                });
            }
            if options.l1_to_l2_pf_hint {
                pf.queue_size = Some(64);
                pf.max_prefetch_requests_with_pending_translation = Some(128);
            }
        }
        PrefetchLevel::L3 => {
            if options.l2_to_l3_pf_hint {
                pf.queue_size = Some(64);
                pf.max_prefetch_requests_with_pending_translation = Some(128);
            }
        }
        PrefetchLevel::L1d => {}
    }

    Ok(Some(pf))
}
