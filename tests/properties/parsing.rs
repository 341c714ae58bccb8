//! Property tests for parsers fed by external output.

use proptest::prelude::*;

use fleek_iterative_deploy::domain::entities::parse_porcelain_z;
use fleek_iterative_deploy::domain::value_objects::{ref_base_name, CommitMarkers};
use fleek_iterative_deploy::infrastructure::shell::quote;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Status parsing never panics on arbitrary input.
    #[test]
    fn property_porcelain_parse_never_panics(s in "(?s).{0,256}") {
        let _ = parse_porcelain_z(&s);
    }

    /// PROPERTY: Untracked entries parse back to their paths.
    #[test]
    fn property_untracked_paths_round_trip(
        paths in proptest::collection::vec("[A-Za-z0-9 ._/-]{1,40}", 0..8)
    ) {
        let output: String = paths.iter().map(|p| format!("?? {p}\0")).collect();

        let records = parse_porcelain_z(&output).unwrap();

        let parsed: Vec<_> = records.into_iter().map(|r| r.path).collect();
        prop_assert_eq!(parsed, paths);
    }

    /// PROPERTY: Marker matching ignores case.
    #[test]
    fn property_markers_match_any_case(
        prefix in "[a-z ]{0,20}",
        upper in any::<bool>(),
    ) {
        let markers = CommitMarkers::no_build_defaults();
        let marker = if upper { "NOBUILD!" } else { "nobuild!" };
        let message = format!("{prefix}{marker}");
        prop_assert_eq!(markers.find_in(&message), Some("nobuild!"));
    }

    /// PROPERTY: Branch names survive ref shortening.
    #[test]
    fn property_ref_base_name_strips_heads(name in "[A-Za-z0-9_-][A-Za-z0-9_/-]{0,30}") {
        prop_assert_eq!(ref_base_name(&format!("refs/heads/{name}")), name);
    }

    /// PROPERTY: Quoting never panics and always yields a non-empty word.
    #[test]
    fn property_quote_is_never_empty(s in "(?s).{0,64}") {
        prop_assert!(!quote(&s).is_empty());
    }
}
