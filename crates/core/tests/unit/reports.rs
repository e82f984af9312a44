//! # Report Tests
//!
//! Basic-block frequency and pipeline-view output.

use cyclekit_core::trace::bbl::{self, BlockCount, basic_blocks, is_branch, most_common};
use cyclekit_core::trace::perfcct::{self, PerfCctOptions, format_line, parse_pc};
use cyclekit_core::trace::{GapMode, TraceAnalysis};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::traces::{entry, entry_at};

#[rstest]
#[case("beq a0, a1, 8", true)]
#[case("bgeu a0, a1, -4", true)]
#[case("jal ra, 16", true)]
#[case("jalr zero, 0(ra)", true)]
#[case("j 0x80000000", true)]
#[case("ret", true)]
#[case("c.jr ra", true)]
#[case("c.beqz a0, 8", true)]
#[case("c_bnez a0, 8", true)]
#[case("addi a0, zero, 1", false)]
#[case("c.addi a0, 1", false)]
#[case("sd ra, 8(sp)", false)]
#[case("csrrw zero, 0x300, a0", false)]
#[case("", false)]
fn test_is_branch(#[case] asm: &str, #[case] branch: bool) {
    assert_eq!(is_branch(asm), branch);
}

fn loop_trace() -> Vec<cyclekit_core::trace::TraceEntry> {
    vec![
        entry_at(0x1000, "addi a0, a0, 1", 0),
        entry_at(0x1004, "bne a0, a1, -4", 1),
        entry_at(0x1000, "addi a0, a0, 1", 2),
        entry_at(0x1004, "bne a0, a1, -4", 3),
        entry_at(0x1008, "ret", 4),
        entry_at(0x2000, "nop", 5),
    ]
}

#[test]
fn test_basic_blocks() {
    let blocks = basic_blocks(&loop_trace());
    let shape: Vec<(usize, usize)> = blocks.iter().map(|b| (b.insts.len(), b.count)).collect();
    assert_eq!(shape, [(2, 2), (1, 1), (1, 1)]);
    assert_eq!(blocks[0].insts[1], (0x1004, "bne a0, a1, -4".to_string()));
    // The trailing block has no branch but still counts.
    assert_eq!(blocks[2].insts[0].1, "nop");
}

#[test]
fn test_most_common_is_stable() {
    let block = |pc: u64, count: usize| BlockCount {
        insts: vec![(pc, "j 0".to_string())],
        count,
    };
    let top = most_common(vec![block(1, 1), block(2, 3), block(3, 1), block(4, 2)], 3);
    let pcs: Vec<u64> = top.iter().map(|b| b.insts[0].0).collect();
    assert_eq!(pcs, [2, 4, 1]);
}

fn render_bbl(analysis: &TraceAnalysis) -> String {
    let mut out = Vec::new();
    bbl::write_report(&mut out, analysis).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_bbl_report_normal() {
    let analysis = TraceAnalysis::new(loop_trace(), GapMode::Normal);
    let report = render_bbl(&analysis);
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[0], "Top 10 most common basic blocks (mode:normal):");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "Count: 2");
    assert_eq!(lines[3], "Instructions:");
    assert_eq!(lines[4], format!("  {:18} : {:30} ", "PC", "Instruction"));
    assert_eq!(lines[5], format!("  {:18} : {:30} ", "0x1000", "addi a0, a0, 1"));
    assert_eq!(lines[6], format!("  {:18} : {:30} ", "0x1004", "bne a0, a1, -4"));
    assert_eq!(report.matches("Count: ").count(), 3);
}

#[test]
fn test_bbl_report_gap_columns() {
    let analysis = TraceAnalysis::new(loop_trace(), GapMode::InnerGap);
    let report = render_bbl(&analysis);
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[0], "Top 10 most common basic blocks (mode:inner-gap):");
    assert!(lines[4].ends_with("    fetch:   decode:   rename: dispatch:    issue:      arb:     read:  execute:   bypass:writeback:   commit"));
    let means = vec!["     1.00"; 10].join(":");
    assert_eq!(
        lines[5],
        format!("  {:18} : {:30} : {means}", "0x1000", "addi a0, a0, 1")
    );
}

#[test]
fn test_bbl_report_limits_blocks() {
    let entries: Vec<_> = (0..25u64).map(|i| entry_at(0x100 * i, "ret", i)).collect();
    let report = render_bbl(&TraceAnalysis::new(entries, GapMode::Normal));
    assert_eq!(report.matches("Count: 1").count(), bbl::TOP_BLOCKS);
}

#[test]
fn test_bbl_report_empty_trace() {
    let report = render_bbl(&TraceAnalysis::new(Vec::new(), GapMode::Normal));
    assert_eq!(report, "Top 10 most common basic blocks (mode:normal):\n");
}

#[rstest]
#[case("0x80000000", 0x8000_0000)]
#[case("80000000", 0x8000_0000)]
#[case("0XFFFF", 0xffff)]
fn test_parse_pc(#[case] text: &str, #[case] pc: u64) {
    assert_eq!(parse_pc(text).unwrap(), pc);
}

#[test]
fn test_parse_pc_rejects_garbage() {
    assert!(parse_pc("0xzz").is_err());
    assert!(parse_pc("").is_err());
}

#[test]
fn test_format_line() {
    let e = entry_at(0x8000_0000, "addi a0, zero, 10", 0);
    let stages = "f 0 : d 1 : r 2 : D 3 : i 4 : a 5 : g 6 : e 7 : b 8 : w 9 : c 10 : ";
    let prefix = format!("{:18} : {:30} : ", "0x80000000", "addi a0, zero, 10");
    assert_eq!(format_line(&e, false), format!("{prefix}{stages}"));
    assert_eq!(format_line(&e, true), format!("{prefix}{stages}<<==== "));
}

#[test]
fn test_format_line_truncates_fractions() {
    let e = entry(0x10, "nop", &[2.75]);
    assert!(format_line(&e, false).ends_with(": f 2 : "));
}

fn render_perfcct(options: &PerfCctOptions) -> Vec<String> {
    let entries = vec![
        entry_at(0x100, "addi a0, a0, 1", 0),
        entry_at(0x104, "bne a0, a1, -4", 1),
        entry_at(0x100, "addi a0, a0, 1", 2),
        entry_at(0x104, "bne a0, a1, -4", 3),
        entry_at(0x200, "ret", 4),
    ];
    let mut out = Vec::new();
    perfcct::write_report(&mut out, &entries, options).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| {
            l.split_whitespace()
                .take(3)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[test]
fn test_perfcct_defaults_print_everything() {
    let lines = render_perfcct(&PerfCctOptions::default());
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[4], "0x200 : ret");
}

#[test]
fn test_perfcct_range_and_separator() {
    let options = PerfCctOptions {
        start_pc: 0x100,
        end_pc: 0x104,
        ..PerfCctOptions::default()
    };
    let lines = render_perfcct(&options);
    assert_eq!(
        lines,
        [
            "0x100 : addi",
            "0x104 : bne",
            "",
            "0x100 : addi",
            "0x104 : bne",
            ""
        ]
    );
}

#[test]
fn test_perfcct_only_attention() {
    let options = PerfCctOptions {
        start_pc: 0x100,
        end_pc: 0x100,
        attention_pcs: vec![0x200],
        only_attention: true,
    };
    let mut out = Vec::new();
    let entries = vec![entry_at(0x100, "nop", 0), entry_at(0x200, "ret", 1)];
    perfcct::write_report(&mut out, &entries, &options).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("0x200 "));
    assert!(text.ends_with("<<==== \n"));
}

#[test]
fn test_perfcct_marks_attention_within_range() {
    let options = PerfCctOptions {
        attention_pcs: vec![0x104],
        ..PerfCctOptions::default()
    };
    let mut out = Vec::new();
    let entries = vec![entry_at(0x100, "nop", 0), entry_at(0x104, "nop", 1)];
    perfcct::write_report(&mut out, &entries, &options).unwrap();
    let text = String::from_utf8(out).unwrap();
    let marked: Vec<bool> = text.lines().map(|l| l.contains("<<====")).collect();
    assert_eq!(marked, [false, true]);
}
