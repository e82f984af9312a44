//! # Cache Parameter Tests

use cyclekit_core::Error;
use cyclekit_core::common::MemorySize;
use cyclekit_core::config::cache::{CacheHierarchy, CacheParams, Clusivity, Indexing};
use cyclekit_core::config::TargetIsa;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_l1_dcache_preset() {
    let l1d = CacheParams::l1_dcache();
    assert_eq!(l1d.size, MemorySize::kib(64));
    assert_eq!(l1d.assoc, 2);
    assert_eq!(l1d.mshrs, 16);
    assert_eq!(l1d.tag_latency, 1);
    assert_eq!(l1d.data_latency, 1);
    assert_eq!(l1d.response_latency, 0);
    assert_eq!(l1d.demand_mshr_reserve, Some(6));
    assert!(!l1d.is_read_only);
}

#[test]
fn test_l1_icache_is_read_only() {
    let l1i = CacheParams::l1_icache();
    assert_eq!(l1i.mshrs, 2);
    assert!(l1i.is_read_only);
    assert_eq!(l1i.demand_mshr_reserve, None);
}

#[test]
fn test_l2_and_l3_presets() {
    let l2 = CacheParams::l2();
    assert_eq!(l2.size, MemorySize::mib(1));
    assert_eq!(l2.assoc, 16);
    assert_eq!(l2.mshrs, 64);
    assert!(l2.writeback_clean);
    assert!(l2.sequential_access);
    assert_eq!(l2.cache_level, Some(2));

    let l3 = CacheParams::l3();
    assert_eq!(l3.size, MemorySize::mib(16));
    assert_eq!(l3.clusivity, Clusivity::MostlyExcl);
    assert_eq!((l3.tag_latency, l3.data_latency), (2, 5));
    assert_eq!(l3.cache_level, Some(3));
    assert!(!l3.writeback_clean);
    assert_eq!(l3.mshrs, l2.mshrs);
}

#[test]
fn test_io_cache_preset() {
    let io = CacheParams::io();
    assert_eq!(io.size, MemorySize::kib(1));
    assert_eq!(io.assoc, 8);
    assert_eq!(
        (io.tag_latency, io.data_latency, io.response_latency),
        (50, 50, 50)
    );
    assert_eq!(io.mshrs, 20);
    assert_eq!(io.tgts_per_mshr, 12);
    assert_eq!(io.cache_level, None);
}

#[rstest]
#[case(TargetIsa::Riscv, false)]
#[case(TargetIsa::X86, false)]
#[case(TargetIsa::Arm, true)]
fn test_walker_cache_read_only_by_target(#[case] target: TargetIsa, #[case] read_only: bool) {
    let ptw = CacheParams::page_table_walker(target);
    assert_eq!(ptw.is_read_only, read_only);
    assert_eq!(ptw.mshrs, 10);
    assert!(ptw.writeback_clean);
}

#[test]
fn test_hierarchy_for_target_only_changes_walker() {
    let riscv = CacheHierarchy::for_target(TargetIsa::Riscv);
    let arm = CacheHierarchy::for_target(TargetIsa::Arm);
    assert_eq!(riscv, CacheHierarchy::default());
    assert_eq!(riscv.l1d, arm.l1d);
    assert_ne!(riscv.ptw, arm.ptw);
}

#[test]
fn test_default_hierarchy_is_valid() {
    let hierarchy = CacheHierarchy::default();
    hierarchy.validate().unwrap();
    let names: Vec<&str> = hierarchy.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["l1i", "l1d", "l2", "l3", "io", "ptw"]);
}

#[test]
fn test_two_level_hierarchy_skips_l3() {
    let hierarchy = CacheHierarchy {
        l3: None,
        ..CacheHierarchy::default()
    };
    assert!(hierarchy.iter().all(|(name, _)| name != "l3"));
    hierarchy.validate().unwrap();
}

#[test]
fn test_num_sets() {
    assert_eq!(CacheParams::l1_dcache().num_sets(), 512);
    assert_eq!(CacheParams::l3().num_sets(), 16384);
    assert_eq!(CacheParams::io().num_sets(), 2);
}

#[test]
fn test_alias_bits_only_for_vipt() {
    let mut l1d = CacheParams::l1_dcache();
    assert_eq!(l1d.alias_bits(), 0);
    l1d.indexing = Indexing::Vipt;
    // 512 sets x 64B lines spans 32KiB, three bits above a 4KiB page.
    assert_eq!(l1d.alias_bits(), 3);
}

fn invalid(params: CacheParams) -> String {
    match params.validate("l1d") {
        Err(Error::InvalidCache { name, reason }) => {
            assert_eq!(name, "l1d");
            reason
        }
        other => panic!("expected InvalidCache, got {other:?}"),
    }
}

#[test]
fn test_validate_rejects_zero_assoc() {
    let reason = invalid(CacheParams {
        assoc: 0,
        ..CacheParams::l1_dcache()
    });
    assert!(reason.contains("associativity"));
}

#[test]
fn test_validate_rejects_ragged_geometry() {
    let reason = invalid(CacheParams {
        assoc: 3,
        ..CacheParams::l1_dcache()
    });
    assert!(reason.contains("not a multiple"));
}

#[test]
fn test_validate_rejects_non_power_of_two_sets() {
    let reason = invalid(CacheParams {
        size: MemorySize::kib(48),
        ..CacheParams::l1_dcache()
    });
    assert!(reason.contains("sets"));
}

#[test]
fn test_validate_rejects_line_size() {
    let reason = invalid(CacheParams {
        line_size: 48,
        ..CacheParams::l1_dcache()
    });
    assert!(reason.contains("line size"));
}

#[test]
fn test_validate_rejects_overflowing_way_size() {
    let huge = CacheParams {
        line_size: 1 << 63,
        assoc: 2,
        ..CacheParams::l2()
    };
    assert_eq!(huge.num_sets(), 0);
    let reason = invalid(huge);
    assert!(reason.contains("overflows"), "{reason}");
}

#[test]
fn test_validate_rejects_reserve_covering_all_mshrs() {
    let reason = invalid(CacheParams {
        demand_mshr_reserve: Some(16),
        ..CacheParams::l1_dcache()
    });
    assert!(reason.contains("reserve"));
}
