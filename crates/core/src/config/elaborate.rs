//! Construction-time elaboration of a scheduler topology.
//!
//! The simulator derives dispatch tables, per-port register-file claims and the wakeup
//! matrix when it builds the scheduler, and aborts on an inconsistent topology. Running
//! the same derivation here rejects a bad configuration before a simulation is launched
//! and gives a readable summary of what the simulator will build.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use super::fu::{OpClass, OpDesc};
use super::scheduler::{IssueQue, RfType, SchedulerConfig};
use crate::common::{Error, Result};

/// Out ports a single issue queue may have.
pub const MAX_OUT_PORTS: usize = 8;

/// Number of distinct type-port ids (two type bits, four port bits).
pub const MAX_TYPE_PORT_IDS: usize = 1 << (2 + 4);

/// A read port claim after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortClaim {
    /// `(type << 4) | port`.
    pub type_port_id: u8,
    /// Arbitration priority, smaller wins.
    pub priority: u8,
}

/// Elaborated view of one issue queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IqLayout {
    /// Queue name.
    pub name: String,
    /// Position in the scheduler.
    pub id: usize,
    /// All out ports carry the same units and share one ready queue.
    pub shared_selector: bool,
    /// Integer read port claims, per out port.
    pub int_claims: Vec<Vec<PortClaim>>,
    /// FP read port claims, per out port.
    pub fp_claims: Vec<Vec<PortClaim>>,
    /// Op classes this queue accepts.
    pub op_classes: BTreeSet<OpClass>,
    /// Cycles from select to execute.
    pub issue_stages: u32,
}

/// Elaborated scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerLayout {
    /// Per-queue layouts in configuration order.
    pub iqs: Vec<IqLayout>,
    /// Queues each op class may be dispatched to.
    pub dispatch: BTreeMap<OpClass, Vec<usize>>,
    /// Execution latency and pipelining per op class.
    pub op_timing: BTreeMap<OpClass, OpDesc>,
    /// Queues woken by each queue.
    pub wake_matrix: Vec<Vec<usize>>,
    /// Number of out ports claiming each type-port id.
    pub rf_port_usage: BTreeMap<u8, u32>,
    /// One past the largest claimed type-port id.
    pub rf_type_port_count: usize,
    /// Total out ports over all queues.
    pub combined_fus: usize,
    /// Non-fatal findings (uncovered op classes, unknown wakeup targets).
    pub warnings: Vec<String>,
}

impl SchedulerLayout {
    /// Elaborates `config`, failing on the inconsistencies the simulator would abort on.
    pub fn elaborate(config: &SchedulerConfig) -> Result<Self> {
        let mut names: HashMap<&str, usize> = HashMap::new();
        for (id, iq) in config.iqs.iter().enumerate() {
            if names.insert(iq.name.as_str(), id).is_some() {
                return Err(Error::Topology(format!("duplicate IQ name {}", iq.name)));
            }
        }

        let iqs = config
            .iqs
            .iter()
            .enumerate()
            .map(|(id, iq)| elaborate_iq(id, iq))
            .collect::<Result<Vec<_>>>()?;

        let mut dispatch: BTreeMap<OpClass, Vec<usize>> = BTreeMap::new();
        let mut op_timing = BTreeMap::new();
        for (iq, layout) in config.iqs.iter().zip(&iqs) {
            for desc in iq.oports.iter().flat_map(|p| &p.fu).flat_map(|fu| fu.ops()) {
                let _ = op_timing.insert(desc.op, *desc);
            }
            for op in &layout.op_classes {
                dispatch.entry(*op).or_default().push(layout.id);
            }
        }

        let mut rf_port_usage: BTreeMap<u8, u32> = BTreeMap::new();
        for claim in iqs
            .iter()
            .flat_map(|iq| iq.int_claims.iter().chain(&iq.fp_claims))
            .flatten()
        {
            *rf_port_usage.entry(claim.type_port_id).or_default() += 1;
        }
        let rf_type_port_count = rf_port_usage
            .keys()
            .next_back()
            .map_or(0, |max| usize::from(*max) + 1);
        if rf_type_port_count > MAX_TYPE_PORT_IDS {
            return Err(Error::Topology(format!(
                "{rf_type_port_count} register-file read ports exceed {MAX_TYPE_PORT_IDS}"
            )));
        }

        let mut warnings = Vec::new();
        for op in OpClass::ALL {
            if !dispatch.contains_key(&op) {
                warn!("no issue queue accepts op class {op}");
                warnings.push(format!("no config for op class {op}"));
            }
        }

        let wake_matrix = build_wake_matrix(config, &names, &mut warnings);
        let combined_fus = config.iqs.iter().map(|iq| iq.oports.len()).sum();

        Ok(Self {
            iqs,
            dispatch,
            op_timing,
            wake_matrix,
            rf_port_usage,
            rf_type_port_count,
            combined_fus,
            warnings,
        })
    }

    /// Queue index by name.
    pub fn iq_id(&self, name: &str) -> Option<usize> {
        self.iqs.iter().position(|iq| iq.name == name)
    }

    /// Names of the queues woken by `name`.
    pub fn wakes(&self, name: &str) -> Vec<&str> {
        self.iq_id(name)
            .map(|id| {
                self.wake_matrix[id]
                    .iter()
                    .map(|dst| self.iqs[*dst].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn elaborate_iq(id: usize, iq: &IssueQue) -> Result<IqLayout> {
    let fail = |reason: String| Error::Topology(format!("{}: {reason}", iq.name));

    if iq.oports.len() > MAX_OUT_PORTS {
        return Err(fail(format!(
            "{} out ports, at most {MAX_OUT_PORTS} are supported",
            iq.oports.len()
        )));
    }

    let mut int_claims = Vec::with_capacity(iq.oports.len());
    let mut fp_claims = Vec::with_capacity(iq.oports.len());
    let mut port_ops: Vec<BTreeSet<OpClass>> = Vec::with_capacity(iq.oports.len());
    for (pi, port) in iq.oports.iter().enumerate() {
        let mut int = Vec::new();
        let mut fp = Vec::new();
        for rp in &port.rp {
            let claim = PortClaim {
                type_port_id: rp.type_port_id(),
                priority: rp.priority(),
            };
            match rp.rf_type() {
                Some(RfType::Int) => int.push(claim),
                Some(RfType::Fp) => fp.push(claim),
                None => {
                    return Err(fail(format!(
                        "unknown RF type {} on port {pi}",
                        rp.type_id()
                    )));
                }
            }
        }
        int_claims.push(int);
        fp_claims.push(fp);

        let mut ops = BTreeSet::new();
        for desc in port.fu.iter().flat_map(|fu| fu.ops()) {
            if !ops.insert(desc.op) {
                return Err(fail(format!(
                    "op class {} appears twice on port {pi}",
                    desc.op
                )));
            }
        }
        port_ops.push(ops);
    }

    let shared_selector = port_ops.windows(2).all(|w| w[0] == w[1]);
    if shared_selector && port_ops.len() > 1 {
        debug!("{}: one selector shared by identical ports", iq.name);
    }
    if !shared_selector {
        for (i, a) in port_ops.iter().enumerate() {
            for (j, b) in port_ops.iter().enumerate().skip(i + 1) {
                if let Some(op) = a.intersection(b).next() {
                    return Err(fail(format!(
                        "op class {op} is split across ports {i} and {j}"
                    )));
                }
            }
        }
    }

    let op_classes: BTreeSet<OpClass> = port_ops.into_iter().flatten().collect();
    if op_classes.is_empty() {
        return Err(fail("no functional unit configured".into()));
    }

    Ok(IqLayout {
        name: iq.name.clone(),
        id,
        shared_selector,
        int_claims,
        fp_claims,
        op_classes,
        issue_stages: iq.schedule_to_exec_delay,
    })
}

fn build_wake_matrix(
    config: &SchedulerConfig,
    names: &HashMap<&str, usize>,
    warnings: &mut Vec<String>,
) -> Vec<Vec<usize>> {
    let n = config.iqs.len();
    if config.xbar_wakeup {
        return (0..n).map(|_| (0..n).collect()).collect();
    }

    let mut matrix = vec![Vec::new(); n];
    let mut lookup = |name: &str| {
        let found = names.get(name).copied();
        if found.is_none() {
            warn!("can't find IQ by name: {name}");
            warnings.push(format!("wakeup network names unknown IQ {name}"));
        }
        found
    };
    for channel in &config.spec_wakeup_network {
        let Some(src) = lookup(channel.src_iq.as_str()) else {
            continue;
        };
        for dst_name in &channel.dst_iq {
            if let Some(dst) = lookup(dst_name.as_str()) {
                debug!("build wakeup channel: {} -> {dst_name}", channel.src_iq);
                matrix[src].push(dst);
            }
        }
    }
    matrix
}
