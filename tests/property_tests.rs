//! Property-based tests for the output parsers
//!
//! Native tool output is untrusted text; the parsers must never panic and
//! must keep their documented shape guarantees on arbitrary input.
//!
//! Run: cargo test --test property_tests

use managesw_lib::core::validation::validate_package_name;
use managesw_lib::package_managers::parse::{
    Separator, parse_blocks, parse_key_values, parse_package_lines, parse_xml_elements,
    truncate_lines,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any text parses without panicking, and every record has a name
    #[test]
    fn prop_package_lines_never_panic(text in "\\PC*") {
        for record in parse_package_lines(&text, 1024) {
            prop_assert!(!record.name.is_empty());
        }
    }

    /// Well-formed lines survive parsing exactly
    #[test]
    fn prop_package_lines_keep_fields(
        name in "[a-z][a-z0-9+._-]{0,30}",
        version in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}",
        size in 0u64..1_000_000_000,
    ) {
        let line = format!("{name},{version},{size}\n");
        let records = parse_package_lines(&line, 1);
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(&records[0].name, &name);
        prop_assert_eq!(&records[0].version, &version);
        prop_assert_eq!(records[0].installed_size_bytes, size);
    }

    #[test]
    fn prop_key_values_never_panic(text in "\\PC*", trailer in proptest::option::of("[A-Za-z]{1,12}")) {
        let _ = parse_key_values(&text, trailer.as_deref());
    }

    #[test]
    fn prop_blocks_never_panic(text in "(\\PC{0,40}\n){0,20}") {
        let _ = parse_blocks(&text, Separator::BlankLine);
        let _ = parse_blocks(&text, Separator::Rule("====="));
    }

    /// Garbage is a parse error, not a panic
    #[test]
    fn prop_xml_never_panics(text in "\\PC*") {
        let _ = parse_xml_elements("zypper", &text, "repo-list", "repo");
    }

    /// Truncation keeps `min(limit, len)` lines for positive limits, everything otherwise
    #[test]
    fn prop_truncate_lines(len in 0usize..50, limit in -5i64..60) {
        let lines: Vec<String> = (0..len).map(|i| format!("line {i}")).collect();
        let kept = truncate_lines(lines.clone(), limit);
        let expected = if limit > 0 { len.min(limit as usize) } else { len };
        prop_assert_eq!(kept.len(), expected);
        prop_assert_eq!(&kept[..], &lines[..expected]);
    }

    /// Names that could be read as options are always rejected
    #[test]
    fn prop_option_like_names_rejected(rest in "[a-z=/-]{0,20}") {
        let name = format!("-{rest}");
        prop_assert!(validate_package_name(&name).is_err());
    }
}
