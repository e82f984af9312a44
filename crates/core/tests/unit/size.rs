//! # Memory Size Tests

use cyclekit_core::Error;
use cyclekit_core::common::MemorySize;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("1kB", 1024)]
#[case("64KiB", 64 * 1024)]
#[case("64KB", 64 * 1024)]
#[case("1MB", 1 << 20)]
#[case("16MiB", 16 << 20)]
#[case("2GB", 2 << 30)]
#[case("4096", 4096)]
#[case("4096B", 4096)]
#[case(" 8kB ", 8 * 1024)]
fn test_parse(#[case] text: &str, #[case] bytes: u64) {
    let size: MemorySize = text.parse().unwrap();
    assert_eq!(size.as_bytes(), bytes);
}

#[rstest]
#[case("")]
#[case("kB")]
#[case("12XB")]
#[case("1.5MB")]
#[case("-4kB")]
fn test_parse_rejects(#[case] text: &str) {
    let err = text.parse::<MemorySize>().unwrap_err();
    assert!(matches!(err, Error::InvalidSize(_)), "{err}");
}

#[rstest]
#[case(MemorySize::kib(64), "64kB")]
#[case(MemorySize::mib(1), "1MB")]
#[case(MemorySize::mib(16), "16MB")]
#[case(MemorySize::bytes(1 << 30), "1GB")]
#[case(MemorySize::bytes(100), "100B")]
#[case(MemorySize::bytes(1536), "1536B")]
#[case(MemorySize::bytes(0), "0B")]
fn test_display(#[case] size: MemorySize, #[case] text: &str) {
    assert_eq!(size.to_string(), text);
}

#[test]
fn test_json_accepts_number_and_string() {
    let from_number: MemorySize = serde_json::from_str("4096").unwrap();
    let from_string: MemorySize = serde_json::from_str("\"4kB\"").unwrap();
    assert_eq!(from_number, from_string);
    assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"4kB\"");
}

#[test]
fn test_json_rejects_bad_unit() {
    assert!(serde_json::from_str::<MemorySize>("\"4 parsecs\"").is_err());
}

proptest! {
    #[test]
    fn display_parses_back(n in 0u64..(1 << 40)) {
        let size = MemorySize::bytes(n);
        let parsed: MemorySize = size.to_string().parse().unwrap();
        prop_assert_eq!(parsed, size);
    }
}
