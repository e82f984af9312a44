//! # Gap Mode Tests

use cyclekit_core::Error;
use cyclekit_core::trace::gap::{apply, mean_clocks};
use cyclekit_core::trace::{GapMode, TraceAnalysis};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::traces::{entry, entry_at};

#[rstest]
#[case(false, false, GapMode::Normal)]
#[case(true, false, GapMode::InterGap)]
#[case(false, true, GapMode::InnerGap)]
fn test_from_flags(#[case] inter: bool, #[case] inner: bool, #[case] mode: GapMode) {
    assert_eq!(GapMode::from_flags(inter, inner).unwrap(), mode);
}

#[test]
fn test_both_flags_rejected() {
    assert!(matches!(GapMode::from_flags(true, true), Err(Error::Trace(_))));
}

#[test]
fn test_labels() {
    assert_eq!(GapMode::Normal.to_string(), "normal");
    assert_eq!(GapMode::InterGap.to_string(), "inter-gap");
    assert_eq!(GapMode::InnerGap.to_string(), "inner-gap");
    assert!(!GapMode::Normal.is_gap());
    assert!(GapMode::InnerGap.is_gap());
}

#[test]
fn test_normal_keeps_entries() {
    let entries = vec![entry_at(0x10, "nop", 0), entry_at(0x14, "nop", 3)];
    assert_eq!(apply(entries.clone(), GapMode::Normal), entries);
}

#[test]
fn test_inter_gap_drops_first_entry() {
    let entries = vec![
        entry(0x10, "a", &[0.0, 2.0, 4.0]),
        entry(0x14, "b", &[1.0, 5.0, 4.0]),
        entry(0x18, "c", &[3.0, 5.0, 9.0]),
    ];
    let gaps = apply(entries, GapMode::InterGap);
    assert_eq!(gaps.len(), 2);
    assert_eq!(gaps[0].pc, 0x14);
    assert_eq!(gaps[0].clocks, [1.0, 3.0, 0.0]);
    assert_eq!(gaps[1].asm, "c");
    assert_eq!(gaps[1].clocks, [2.0, 0.0, 5.0]);
}

#[test]
fn test_inner_gap_differences_stages() {
    let gaps = apply(vec![entry(0x10, "a", &[2.0, 3.0, 7.0, 7.0])], GapMode::InnerGap);
    assert_eq!(gaps[0].clocks, [1.0, 4.0, 0.0]);
}

#[test]
fn test_gap_of_empty_trace() {
    assert!(apply(Vec::new(), GapMode::InterGap).is_empty());
    assert!(apply(vec![entry_at(0, "nop", 0)], GapMode::InterGap).is_empty());
}

#[test]
fn test_means_per_instruction() {
    let entries = vec![
        entry(0x10, "add", &[1.0, 2.0]),
        entry(0x20, "beq", &[4.0, 4.0]),
        entry(0x10, "add", &[3.0, 6.0]),
    ];
    let means = mean_clocks(&entries);
    let keys: Vec<(u64, &str)> = means.keys().map(|(pc, asm)| (*pc, asm.as_str())).collect();
    assert_eq!(keys, [(0x10, "add"), (0x20, "beq")]);
    assert_eq!(means[&(0x10, "add".to_string())], [2.0, 4.0]);
}

#[test]
fn test_same_pc_different_asm_are_distinct() {
    let entries = vec![entry(0x10, "add", &[1.0]), entry(0x10, "sub", &[3.0])];
    assert_eq!(mean_clocks(&entries).len(), 2);
}

#[test]
fn test_analysis_averages_follow_mode() {
    let analysis = TraceAnalysis::new(
        vec![entry_at(0x10, "nop", 0), entry_at(0x10, "nop", 4)],
        GapMode::InnerGap,
    );
    assert_eq!(analysis.averages[&(0x10, "nop".to_string())], vec![1.0; 10]);
}
