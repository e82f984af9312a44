//! # Scheduler Tests
//!
//! Read port packing, the scheduler presets and their elaboration.

use cyclekit_core::Error;
use cyclekit_core::config::elaborate::SchedulerLayout;
use cyclekit_core::config::fu::{FuncUnit, OpClass};
use cyclekit_core::config::scheduler::{
    IssuePort, IssueQue, MAX_TOTAL_RF_PORTS, RfReadPort, RfType, SchedulerConfig,
    SchedulerPreset, SpecWakeupChannel,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn test_read_port_packing() {
    let port = RfReadPort::int(3, 1).unwrap();
    assert_eq!(port.raw(), 0b00_0011_01);
    assert_eq!(port.rf_type(), Some(RfType::Int));
    assert_eq!(port.port_id(), 3);
    assert_eq!(port.priority(), 1);
    assert_eq!(port.type_port_id(), 3);
    assert_eq!(port.to_string(), "int3/p1");

    let fp = RfReadPort::fp(12, 0).unwrap();
    assert_eq!(fp.raw(), 0b01_1100_00);
    assert_eq!(fp.type_port_id(), 0b1_1100);
    assert_eq!(fp.to_string(), "fp12/p0");
}

#[rstest]
#[case(16, 0)]
#[case(0, 4)]
#[case(255, 255)]
fn test_read_port_range(#[case] id: u8, #[case] priority: u8) {
    let err = RfReadPort::new(RfType::Int, id, priority).unwrap_err();
    assert!(matches!(err, Error::PortEncoding(_)), "{err}");
}

#[test]
fn test_read_port_unknown_type() {
    let port = RfReadPort::from_raw(0b10_0000_00);
    assert_eq!(port.type_id(), 2);
    assert_eq!(port.rf_type(), None);
}

proptest! {
    #[test]
    fn read_port_fields_unpack(id in 0u8..16, priority in 0u8..4, fp in any::<bool>()) {
        let rf = if fp { RfType::Fp } else { RfType::Int };
        let port = RfReadPort::new(rf, id, priority).unwrap();
        prop_assert_eq!(port.rf_type(), Some(rf));
        prop_assert_eq!(port.port_id(), id);
        prop_assert_eq!(port.priority(), priority);
        prop_assert!(port.type_port_id() <= MAX_TOTAL_RF_PORTS);
    }
}

#[rstest]
#[case("ecore", SchedulerPreset::Ecore)]
#[case("ECore", SchedulerPreset::Ecore)]
#[case("ecore-2read", SchedulerPreset::Ecore2Read)]
#[case("kunminghu", SchedulerPreset::Kunminghu)]
fn test_preset_names(#[case] text: &str, #[case] preset: SchedulerPreset) {
    assert_eq!(text.parse::<SchedulerPreset>().unwrap(), preset);
}

#[test]
fn test_preset_unknown() {
    let err = "bigcore".parse::<SchedulerPreset>().unwrap_err();
    assert!(matches!(err, Error::Unknown { what: "scheduler preset", .. }));
}

#[test]
fn test_preset_json_names() {
    let json = serde_json::to_string(&SchedulerPreset::Ecore2Read).unwrap();
    assert_eq!(json, "\"ecore-2read\"");
    assert_eq!(SchedulerPreset::default(), SchedulerPreset::Kunminghu);
}

#[test]
fn test_ecore_shape() {
    let sched = SchedulerConfig::ecore();
    let names: Vec<&str> = sched.iqs.iter().map(|iq| iq.name.as_str()).collect();
    assert_eq!(
        names,
        ["intIQ0", "intIQ1", "intIQ2", "memIQ0", "memIQ1", "fpIQ0", "fpIQ1", "vecIQ0"]
    );
    assert!(sched.xbar_wakeup);
    assert_eq!(sched.iq("fpIQ0").unwrap().schedule_to_exec_delay, 3);
    assert_eq!(sched.iq("intIQ0").unwrap().schedule_to_exec_delay, 2);
}

#[test]
fn test_ecore_2read_adds_fp_divide_queue() {
    let sched = SchedulerConfig::ecore_2read();
    assert_eq!(sched.iqs.len(), 9);
    assert_eq!(sched.iqs[7].name, "fpIQ4");
    assert_eq!(sched.iqs[8].name, "vecIQ0");
    assert_eq!(sched.iq("memIQ0").unwrap().oports.len(), 2);
    assert_eq!(
        sched.iq("memIQ1").unwrap().oports[0].fu,
        vec![FuncUnit::WritePort]
    );
}

#[test]
fn test_disable_all_reg_arb() {
    let mut sched = SchedulerConfig::kunminghu();
    assert!(sched.iqs.iter().flat_map(|iq| &iq.oports).any(|p| !p.rp.is_empty()));
    sched.disable_all_reg_arb();
    assert!(sched.iqs.iter().flat_map(|iq| &iq.oports).all(|p| p.rp.is_empty()));
}

#[rstest]
fn test_every_preset_elaborates_cleanly(
    #[values(SchedulerPreset::Ecore, SchedulerPreset::Ecore2Read, SchedulerPreset::Kunminghu)]
    preset: SchedulerPreset,
) {
    let layout = SchedulerLayout::elaborate(&preset.build()).unwrap();
    assert!(layout.warnings.is_empty(), "{:?}", layout.warnings);
    assert_eq!(layout.dispatch.len(), OpClass::ALL.len());
}

#[test]
fn test_kunminghu_layout() {
    let layout = SchedulerLayout::elaborate(&SchedulerConfig::kunminghu()).unwrap();
    assert_eq!(layout.iqs.len(), 15);
    assert_eq!(layout.combined_fus, 24);
    assert_eq!(layout.dispatch[&OpClass::IntAlu], vec![0, 1, 2, 3]);
    assert_eq!(layout.dispatch[&OpClass::Branch], vec![0, 1, 2]);
    assert_eq!(layout.dispatch[&OpClass::MemRead], vec![4, 5, 6]);
    assert_eq!(layout.dispatch[&OpClass::FloatDiv], vec![13]);
    assert_eq!(layout.op_timing[&OpClass::IntDiv].latency, 20);
    assert!(!layout.op_timing[&OpClass::IntDiv].pipelined);

    // Highest claim is fp port 13 on the stores.
    assert_eq!(layout.rf_type_port_count, 30);
    // int7 is read by intIQ0, intIQ3 and store0.
    assert_eq!(layout.rf_port_usage[&7], 3);

    let intiq0 = &layout.iqs[0];
    assert!(!intiq0.shared_selector);
    assert_eq!(intiq0.int_claims[1].len(), 2);
    assert_eq!(intiq0.int_claims[1][0].priority, 1);
    assert!(intiq0.fp_claims.iter().all(Vec::is_empty));

    let fpiq4 = &layout.iqs[layout.iq_id("fpIQ4").unwrap()];
    assert!(fpiq4.shared_selector);
    assert_eq!(fpiq4.issue_stages, 3);
}

#[test]
fn test_kunminghu_wakeup_network() {
    let layout = SchedulerLayout::elaborate(&SchedulerConfig::kunminghu()).unwrap();
    assert_eq!(
        layout.wakes("load0"),
        [
            "intIQ0", "intIQ1", "intIQ2", "intIQ3", "load0", "load1", "load2", "store0", "store1"
        ]
    );
    assert!(layout.wakes("fpIQ0").contains(&"store1"));
    assert!(layout.wakes("fpIQ4").is_empty());
    assert!(layout.wakes("missing").is_empty());
}

#[test]
fn test_xbar_wakeup_is_all_to_all() {
    let layout = SchedulerLayout::elaborate(&SchedulerConfig::ecore()).unwrap();
    assert!(layout.wake_matrix.iter().all(|row| row.len() == 8));
    assert_eq!(layout.combined_fus, 12);
    assert_eq!(layout.rf_type_port_count, 0);
    assert!(layout.iqs.iter().all(|iq| iq.shared_selector));
}

fn queue(name: &str, oports: Vec<IssuePort>) -> IssueQue {
    IssueQue {
        name: name.to_string(),
        inports: 2,
        size: 24,
        oports,
        schedule_to_exec_delay: 2,
    }
}

fn port(fu: &[FuncUnit]) -> IssuePort {
    IssuePort {
        fu: fu.to_vec(),
        rp: Vec::new(),
    }
}

fn topology_error(config: &SchedulerConfig) -> String {
    match SchedulerLayout::elaborate(config) {
        Err(Error::Topology(reason)) => reason,
        other => panic!("expected a topology error, got {other:?}"),
    }
}

#[test]
fn test_rejects_too_many_out_ports() {
    let mut config = SchedulerConfig::ecore();
    config.iqs[0] = queue("intIQ0", (0..9).map(|_| port(&[FuncUnit::IntAlu])).collect());
    assert!(topology_error(&config).contains("9 out ports"));
}

#[test]
fn test_rejects_duplicate_names() {
    let mut config = SchedulerConfig::ecore();
    config.iqs[1].name = "intIQ0".to_string();
    assert!(topology_error(&config).contains("duplicate"));
}

#[test]
fn test_rejects_op_split_across_ports() {
    let mut config = SchedulerConfig::ecore();
    config.iqs[2] = queue(
        "intIQ2",
        vec![
            port(&[FuncUnit::IntMult]),
            port(&[FuncUnit::IntMult, FuncUnit::IntDiv, FuncUnit::IntMisc]),
        ],
    );
    assert!(topology_error(&config).contains("split"));
}

#[test]
fn test_rejects_duplicate_op_on_port() {
    let mut config = SchedulerConfig::ecore();
    config.iqs[3] = queue("memIQ0", vec![port(&[FuncUnit::ReadPort, FuncUnit::RdWrPort])]);
    assert!(topology_error(&config).contains("twice"));
}

#[test]
fn test_rejects_queue_without_units() {
    let mut config = SchedulerConfig::ecore();
    config.iqs.push(queue("emptyIQ", vec![port(&[])]));
    assert!(topology_error(&config).contains("no functional unit"));
}

#[test]
fn test_rejects_unknown_rf_type() {
    let mut config = SchedulerConfig::ecore();
    config.iqs[0].oports[0].rp = vec![RfReadPort::from_raw(0b10_0000_00)];
    assert!(topology_error(&config).contains("unknown RF type"));
}

#[test]
fn test_warns_on_uncovered_ops() {
    let mut config = SchedulerConfig::ecore();
    let _ = config.iqs.pop();
    let layout = SchedulerLayout::elaborate(&config).unwrap();
    assert_eq!(layout.warnings.len(), 13);
    assert!(layout.warnings.iter().all(|w| w.contains("Simd")));
    assert!(!layout.dispatch.contains_key(&OpClass::SimdAdd));
}

#[test]
fn test_warns_on_unknown_wakeup_target() {
    let mut config = SchedulerConfig::kunminghu();
    config.spec_wakeup_network.push(SpecWakeupChannel {
        src_iq: "intIQ0".to_string(),
        dst_iq: vec!["bogusIQ".to_string()],
    });
    let layout = SchedulerLayout::elaborate(&config).unwrap();
    assert_eq!(layout.warnings.len(), 1);
    assert!(layout.warnings[0].contains("bogusIQ"));
    assert_eq!(layout.wakes("intIQ0").len(), 9);
}
