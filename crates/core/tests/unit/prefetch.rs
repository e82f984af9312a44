//! # Prefetcher Construction Tests

use cyclekit_core::Error;
use cyclekit_core::config::prefetch::{
    L2CompositeParams, PrefetchLevel, PrefetchOptions, PrefetcherKind, PrefetcherParams,
    create_prefetcher,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn build(level: PrefetchLevel, options: &PrefetchOptions) -> PrefetcherParams {
    create_prefetcher(level, options, true).unwrap().unwrap()
}

#[test]
fn test_default_l1d_composite() {
    let pf = build(PrefetchLevel::L1d, &PrefetchOptions::default());
    assert_eq!(pf.kind, PrefetcherKind::XsComposite);
    assert!(pf.register_tlb);
    assert_eq!(pf.queue_size, Some(128));
    assert_eq!(pf.max_prefetch_requests_with_pending_translation, Some(128));

    let xs = pf.xs_composite.unwrap();
    assert!(xs.enable_temporal);
    assert!(xs.enable_bop);
    assert!(xs.stream_pf_ahead);
    // Sub-prefetcher switches stay at the simulator default.
    assert_eq!(xs.enable_spp, None);
    assert_eq!(xs.enable_cplx, None);
    assert_eq!(xs.enable_berti, None);
    assert_eq!(xs.enable_activepage, None);
    assert_eq!(xs.enable_sstride, None);
    assert_eq!(xs.enable_xsstream, None);
    assert!(!xs.fuzzy_stride_matching);
    assert_eq!(xs.region_size, 1024);
    assert_eq!(xs.bop_large.bad_score, 10);
    assert_eq!(xs.bop_small.bad_score, 5);
    assert_eq!(xs.pht_pf_level, 1);
    assert_eq!(xs.short_stride_thres, 512);
    assert!(xs.berti.use_byte_addr);
    assert!(xs.berti.trigger_pht);
}

#[test]
fn test_l1d_rtl_alignment() {
    let options = PrefetchOptions {
        kmh_align: true,
        ..PrefetchOptions::default()
    };
    let xs = build(PrefetchLevel::L1d, &options).xs_composite.unwrap();
    assert!(!xs.enable_temporal);
    assert!(!xs.enable_bop);
    assert_eq!(xs.enable_berti, Some(false));
    assert_eq!(xs.enable_sstride, Some(true));
    assert_eq!(xs.enable_activepage, Some(false));
    assert_eq!(xs.enable_xsstream, Some(true));
}

#[test]
fn test_ideal_cache_disables_stream_run_ahead() {
    let options = PrefetchOptions {
        ideal_cache: true,
        l1d_enable_spp: true,
        ..PrefetchOptions::default()
    };
    let xs = build(PrefetchLevel::L1d, &options).xs_composite.unwrap();
    assert!(!xs.stream_pf_ahead);
    assert_eq!(xs.enable_spp, Some(true));
    assert_eq!(xs.enable_cplx, None);
}

#[test]
fn test_l2_default_has_no_overrides() {
    let pf = build(PrefetchLevel::L2, &PrefetchOptions::default());
    assert_eq!(pf.kind, PrefetcherKind::L2CompositeWithWorker);
    assert_eq!(pf.queue_size, None);
    assert_eq!(pf.xs_composite, None);
    assert_eq!(pf.l2_composite, None);
}

#[test]
fn test_l2_rtl_alignment_enables_workers() {
    let options = PrefetchOptions {
        kmh_align: true,
        ..PrefetchOptions::default()
    };
    let pf = build(PrefetchLevel::L2, &options);
    assert_eq!(
        pf.l2_composite,
        Some(L2CompositeParams {
            enable_cmc: true,
            enable_bop: true,
            enable_cdp: false,
        })
    );
}

#[test]
fn test_l2_rtl_alignment_rejects_other_kinds() {
    let options = PrefetchOptions {
        kmh_align: true,
        l2_hwp_type: Some(PrefetcherKind::Bop),
        ..PrefetchOptions::default()
    };
    let err = create_prefetcher(PrefetchLevel::L2, &options, true).unwrap_err();
    match err {
        Error::Prefetcher { level, reason } => {
            assert_eq!(level, "l2");
            assert!(reason.contains("BOPPrefetcher"), "{reason}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[rstest]
#[case(PrefetchLevel::L2, true, Some(64))]
#[case(PrefetchLevel::L2, false, None)]
#[case(PrefetchLevel::L3, true, Some(64))]
#[case(PrefetchLevel::L3, false, None)]
fn test_hint_queue_sizes(
    #[case] level: PrefetchLevel,
    #[case] hint: bool,
    #[case] queue: Option<u32>,
) {
    let options = PrefetchOptions {
        l2_hwp_type: Some(PrefetcherKind::Stride),
        l3_hwp_type: Some(PrefetcherKind::Stride),
        l1_to_l2_pf_hint: hint && level == PrefetchLevel::L2,
        l2_to_l3_pf_hint: hint && level == PrefetchLevel::L3,
        ..PrefetchOptions::default()
    };
    let pf = build(level, &options);
    assert_eq!(pf.queue_size, queue);
    assert_eq!(
        pf.max_prefetch_requests_with_pending_translation,
        queue.map(|_| 128)
    );
}

#[test]
fn test_level_without_prefetcher() {
    let options = PrefetchOptions::default();
    assert_eq!(
        create_prefetcher(PrefetchLevel::L3, &options, false).unwrap(),
        None
    );
}

#[test]
fn test_coreless_cache_has_no_tlb() {
    let options = PrefetchOptions {
        l3_hwp_type: Some(PrefetcherKind::Bop),
        ..PrefetchOptions::default()
    };
    let pf = create_prefetcher(PrefetchLevel::L3, &options, false)
        .unwrap()
        .unwrap();
    assert!(!pf.register_tlb);
}

#[test]
fn test_kind_names() {
    for kind in PrefetcherKind::ALL {
        assert_eq!(kind.name().parse::<PrefetcherKind>().unwrap(), kind);
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.name()));
    }
    assert!("NoSuchPrefetcher".parse::<PrefetcherKind>().is_err());
}

#[test]
fn test_options_from_partial_json() {
    let options: PrefetchOptions =
        serde_json::from_str(r#"{"l3_hwp_type": "CDP", "kmh_align": true}"#).unwrap();
    assert_eq!(options.l3_hwp_type, Some(PrefetcherKind::Cdp));
    assert!(options.kmh_align);
    assert_eq!(options.l1d_hwp_type, Some(PrefetcherKind::XsComposite));
    assert_eq!(options.short_stride_thres, 512);
}
