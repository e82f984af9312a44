//! Issue-queue scheduler topologies.
//!
//! A scheduler is a list of issue queues. Each queue has out ports; each port drives a
//! set of functional units and claims register-file read ports. Queues exchange
//! speculative wakeups either all-to-all (`xbar_wakeup`) or along an explicit network.
//!
//! Read ports are packed into one byte, shared with the simulator:
//!
//! ```text
//!  7   6 5         2 1      0
//! +-----+-----------+--------+
//! | type|  port id  |priority|
//! +-----+-----------+--------+
//! ```
//!
//! A smaller priority value wins arbitration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::fu::FuncUnit;
use crate::common::{Error, Result};

/// Largest type-port id the simulator accepts.
pub const MAX_TOTAL_RF_PORTS: u8 = (1 << 6) - 1;

const PRIORITY_BITS: u8 = 2;
const PORT_ID_BITS: u8 = 4;
const TYPE_SHIFT: u8 = PRIORITY_BITS + PORT_ID_BITS;

/// Register file a read port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfType {
    /// Integer register file.
    Int,
    /// Floating-point register file.
    Fp,
}

impl RfType {
    const fn id(self) -> u8 {
        match self {
            Self::Int => 0,
            Self::Fp => 1,
        }
    }
}

/// A packed register-file read port claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RfReadPort(u8);

impl RfReadPort {
    /// Claims integer read port `id` with priority `priority`.
    pub fn int(id: u8, priority: u8) -> Result<Self> {
        Self::new(RfType::Int, id, priority)
    }

    /// Claims FP read port `id` with priority `priority`.
    pub fn fp(id: u8, priority: u8) -> Result<Self> {
        Self::new(RfType::Fp, id, priority)
    }

    /// Packs a claim, rejecting ids of 16 or more and priorities of 4 or more.
    pub fn new(rf: RfType, id: u8, priority: u8) -> Result<Self> {
        if id >= 1 << PORT_ID_BITS {
            return Err(Error::PortEncoding(format!("port id {id} is not below 16")));
        }
        if priority >= 1 << PRIORITY_BITS {
            return Err(Error::PortEncoding(format!(
                "priority {priority} is not below 4"
            )));
        }
        Ok(Self::pack(rf, id, priority))
    }

    const fn pack(rf: RfType, id: u8, priority: u8) -> Self {
        Self((rf.id() << TYPE_SHIFT) | (id << PRIORITY_BITS) | priority)
    }

    /// Wraps a raw byte as read from a configuration document.
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Raw byte.
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Register file type field; values other than 0 and 1 are invalid.
    pub const fn type_id(self) -> u8 {
        self.0 >> TYPE_SHIFT
    }

    /// Port id within the register file.
    pub const fn port_id(self) -> u8 {
        (self.0 >> PRIORITY_BITS) & ((1 << PORT_ID_BITS) - 1)
    }

    /// Arbitration priority.
    pub const fn priority(self) -> u8 {
        self.0 & ((1 << PRIORITY_BITS) - 1)
    }

    /// Decoded register file, if the type field is known.
    pub const fn rf_type(self) -> Option<RfType> {
        match self.type_id() {
            0 => Some(RfType::Int),
            1 => Some(RfType::Fp),
            _ => None,
        }
    }

    /// Index of the physical read port across both register files.
    pub const fn type_port_id(self) -> u8 {
        (self.type_id() << PORT_ID_BITS) | self.port_id()
    }
}

impl fmt::Display for RfReadPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rf = match self.rf_type() {
            Some(RfType::Int) => "int",
            Some(RfType::Fp) => "fp",
            None => "rf?",
        };
        write!(f, "{rf}{}/p{}", self.port_id(), self.priority())
    }
}

/// One out port of an issue queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePort {
    /// Functional units fed by this port.
    pub fu: Vec<FuncUnit>,
    /// Register-file read ports claimed when issuing; empty disables arbitration.
    #[serde(default)]
    pub rp: Vec<RfReadPort>,
}

impl IssuePort {
    fn new(fu: &[FuncUnit]) -> Self {
        Self {
            fu: fu.to_vec(),
            rp: Vec::new(),
        }
    }

    fn with_rp(fu: &[FuncUnit], rp: &[RfReadPort]) -> Self {
        Self {
            fu: fu.to_vec(),
            rp: rp.to_vec(),
        }
    }
}

/// An issue queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueQue {
    /// Queue name, unique within a scheduler.
    pub name: String,
    /// Instructions accepted per cycle.
    pub inports: u32,
    /// Entries.
    pub size: u32,
    /// Out ports.
    pub oports: Vec<IssuePort>,
    /// Cycles from selection to execution.
    #[serde(default = "IssueQue::default_schedule_to_exec_delay")]
    pub schedule_to_exec_delay: u32,
}

impl IssueQue {
    fn default_schedule_to_exec_delay() -> u32 {
        2
    }

    fn new(name: &str, inports: u32, size: u32, oports: Vec<IssuePort>) -> Self {
        Self {
            name: name.to_string(),
            inports,
            size,
            oports,
            schedule_to_exec_delay: Self::default_schedule_to_exec_delay(),
        }
    }

    fn delayed(mut self, delay: u32) -> Self {
        self.schedule_to_exec_delay = delay;
        self
    }
}

/// Speculative wakeup edges from one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecWakeupChannel {
    /// Producing queue.
    pub src_iq: String,
    /// Queues woken by it.
    pub dst_iq: Vec<String>,
}

impl SpecWakeupChannel {
    fn new(src: &str, dst: &[&str]) -> Self {
        Self {
            src_iq: src.to_string(),
            dst_iq: dst.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Scheduler topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Issue queues in dispatch order.
    pub iqs: Vec<IssueQue>,
    /// Every queue wakes every queue; the explicit network is ignored.
    #[serde(default)]
    pub xbar_wakeup: bool,
    /// Explicit speculative wakeup network.
    #[serde(default)]
    pub spec_wakeup_network: Vec<SpecWakeupChannel>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::kunminghu()
    }
}

const fn int_rd(id: u8, priority: u8) -> RfReadPort {
    RfReadPort::pack(RfType::Int, id, priority)
}

const fn fp_rd(id: u8, priority: u8) -> RfReadPort {
    RfReadPort::pack(RfType::Fp, id, priority)
}

impl SchedulerConfig {
    /// Small-core scheduler: shared ALU/BRU ports and a combined load/store pipe.
    pub fn ecore() -> Self {
        use FuncUnit::{
            FpAlu, FpMac, FpMisc, FpSlow, IntAlu, IntBru, IntDiv, IntMisc, IntMult, RdWrPort,
            ReadPort, SimdUnit,
        };
        Self {
            iqs: vec![
                IssueQue::new(
                    "intIQ0",
                    2,
                    2 * 12,
                    vec![
                        IssuePort::new(&[IntAlu, IntBru]),
                        IssuePort::new(&[IntAlu, IntBru]),
                    ],
                ),
                IssueQue::new(
                    "intIQ1",
                    2,
                    2 * 12,
                    vec![
                        IssuePort::new(&[IntAlu, IntBru]),
                        IssuePort::new(&[IntAlu, IntBru]),
                    ],
                ),
                IssueQue::new(
                    "intIQ2",
                    2,
                    2 * 12,
                    vec![IssuePort::new(&[IntMult, IntDiv, IntMisc])],
                ),
                IssueQue::new("memIQ0", 2, 2 * 16, vec![IssuePort::new(&[ReadPort])]),
                IssueQue::new("memIQ1", 2, 2 * 16, vec![IssuePort::new(&[RdWrPort])]),
                IssueQue::new(
                    "fpIQ0",
                    2,
                    18,
                    vec![
                        IssuePort::new(&[FpAlu, FpMac]),
                        IssuePort::new(&[FpAlu, FpMac]),
                    ],
                )
                .delayed(3),
                IssueQue::new("fpIQ1", 2, 18, vec![IssuePort::new(&[FpMisc, FpSlow])]).delayed(3),
                IssueQue::new(
                    "vecIQ0",
                    2,
                    16,
                    vec![IssuePort::new(&[SimdUnit]), IssuePort::new(&[SimdUnit])],
                )
                .delayed(3),
            ],
            xbar_wakeup: true,
            spec_wakeup_network: Vec::new(),
        }
    }

    /// Small-core scheduler with two load pipes and a separate FP divide queue.
    pub fn ecore_2read() -> Self {
        use FuncUnit::{FpSlow, FpMisc, ReadPort, WritePort};
        let mut sched = Self::ecore();
        sched.iqs[3].oports = vec![IssuePort::new(&[ReadPort]), IssuePort::new(&[ReadPort])];
        sched.iqs[4].oports = vec![IssuePort::new(&[WritePort])];
        sched.iqs[6].oports = vec![IssuePort::new(&[FpMisc])];
        sched.iqs.insert(
            7,
            IssueQue::new("fpIQ4", 2, 18, vec![IssuePort::new(&[FpSlow])]).delayed(3),
        );
        sched
    }

    /// High-performance core scheduler with register-file read port arbitration and
    /// an explicit speculative wakeup network.
    pub fn kunminghu() -> Self {
        use FuncUnit::{
            FpAlu, FpMac, FpMisc, FpSlow, IntAlu, IntBru, IntDiv, IntMisc, IntMult, ReadPort,
            SimdUnit, WritePort,
        };
        let int_iq = |name: &str, p0: IssuePort, p1: IssuePort| {
            IssueQue::new(name, 2, 2 * 12, vec![p0, p1])
        };
        let load = |name: &str, port: u8| {
            IssueQue::new(
                name,
                1,
                16,
                vec![IssuePort::with_rp(&[ReadPort], &[int_rd(port, 0)])],
            )
        };
        let store = |name: &str, rp: [RfReadPort; 3]| {
            IssueQue::new(name, 1, 16, vec![IssuePort::with_rp(&[WritePort], &rp)])
        };
        let fp_mac = |name: &str, base: u8| {
            IssueQue::new(
                name,
                2,
                18,
                vec![IssuePort::with_rp(
                    &[FpAlu, FpMac],
                    &[fp_rd(base, 0), fp_rd(base + 1, 0), fp_rd(base + 2, 0)],
                )],
            )
            .delayed(3)
        };

        let iqs = vec![
            int_iq(
                "intIQ0",
                IssuePort::with_rp(&[IntAlu, IntMult], &[int_rd(0, 0), int_rd(1, 0)]),
                IssuePort::with_rp(&[IntBru], &[int_rd(6, 1), int_rd(7, 1)]),
            ),
            int_iq(
                "intIQ1",
                IssuePort::with_rp(&[IntAlu, IntMult], &[int_rd(2, 0), int_rd(3, 0)]),
                IssuePort::with_rp(&[IntBru], &[int_rd(4, 1), int_rd(5, 1)]),
            ),
            int_iq(
                "intIQ2",
                IssuePort::with_rp(&[IntAlu], &[int_rd(4, 0), int_rd(5, 0)]),
                IssuePort::with_rp(&[IntBru, IntMisc], &[int_rd(2, 1), int_rd(3, 1)]),
            ),
            int_iq(
                "intIQ3",
                IssuePort::with_rp(&[IntAlu], &[int_rd(6, 0), int_rd(7, 0)]),
                IssuePort::with_rp(&[IntDiv], &[int_rd(0, 1), int_rd(1, 1)]),
            ),
            load("load0", 8),
            load("load1", 9),
            load("load2", 10),
            store("store0", [int_rd(7, 2), int_rd(5, 2), fp_rd(12, 0)]),
            store("store1", [int_rd(6, 2), int_rd(3, 2), fp_rd(13, 0)]),
            IssueQue::new(
                "fpIQ0",
                2,
                18,
                vec![IssuePort::with_rp(
                    &[FpAlu, FpMisc, FpMac],
                    &[fp_rd(0, 0), fp_rd(1, 0), fp_rd(2, 0)],
                )],
            )
            .delayed(3),
            fp_mac("fpIQ1", 3),
            fp_mac("fpIQ2", 6),
            fp_mac("fpIQ3", 9),
            IssueQue::new(
                "fpIQ4",
                2,
                18,
                vec![
                    IssuePort::with_rp(&[FpSlow], &[fp_rd(2, 1), fp_rd(5, 1)]),
                    IssuePort::with_rp(&[FpSlow], &[fp_rd(8, 1), fp_rd(11, 1)]),
                ],
            )
            .delayed(3),
            IssueQue::new(
                "vecIQ0",
                5,
                16 + 16 + 10,
                (0..5).map(|_| IssuePort::new(&[SimdUnit])).collect(),
            )
            .delayed(3),
        ];

        let int_bank = [
            "intIQ0", "intIQ1", "intIQ2", "intIQ3", "load0", "load1", "load2", "store0", "store1",
        ];
        let fp_bank = ["fpIQ0", "fpIQ1", "fpIQ2", "fpIQ3", "fpIQ4", "store0", "store1"];
        let spec_wakeup_network = ["intIQ0", "intIQ1", "intIQ2", "intIQ3"]
            .iter()
            .map(|src| SpecWakeupChannel::new(src, &int_bank))
            .chain(
                ["fpIQ0", "fpIQ1", "fpIQ2", "fpIQ3"]
                    .iter()
                    .map(|src| SpecWakeupChannel::new(src, &fp_bank)),
            )
            .chain(
                ["load0", "load1", "load2"]
                    .iter()
                    .map(|src| SpecWakeupChannel::new(src, &int_bank)),
            )
            .collect();

        Self {
            iqs,
            xbar_wakeup: false,
            spec_wakeup_network,
        }
    }

    /// Drops every read port claim so issue never waits on register-file arbitration.
    pub fn disable_all_reg_arb(&mut self) {
        info!("disable regfile arbitration");
        for port in self.iqs.iter_mut().flat_map(|iq| iq.oports.iter_mut()) {
            port.rp.clear();
        }
    }

    /// Looks up a queue by name.
    pub fn iq(&self, name: &str) -> Option<&IssueQue> {
        self.iqs.iter().find(|iq| iq.name == name)
    }
}

/// Named scheduler presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulerPreset {
    /// [`SchedulerConfig::ecore`].
    Ecore,
    /// [`SchedulerConfig::ecore_2read`].
    #[serde(rename = "ecore-2read")]
    Ecore2Read,
    /// [`SchedulerConfig::kunminghu`].
    #[default]
    Kunminghu,
}

impl SchedulerPreset {
    /// Every preset.
    pub const ALL: [Self; 3] = [Self::Ecore, Self::Ecore2Read, Self::Kunminghu];

    /// Builds the topology.
    pub fn build(self) -> SchedulerConfig {
        match self {
            Self::Ecore => SchedulerConfig::ecore(),
            Self::Ecore2Read => SchedulerConfig::ecore_2read(),
            Self::Kunminghu => SchedulerConfig::kunminghu(),
        }
    }

    /// Preset name as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ecore => "ecore",
            Self::Ecore2Read => "ecore-2read",
            Self::Kunminghu => "kunminghu",
        }
    }
}

impl fmt::Display for SchedulerPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulerPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Unknown {
                what: "scheduler preset",
                value: s.to_string(),
            })
    }
}
