//! Property-based tests for parameter validation and encoding.

use proptest::prelude::*;

use marketbot_eia::{build_params, validate_params, Frequency, QuerySpec, MAX_LIMIT};

fn frequency() -> impl Strategy<Value = Frequency> {
    prop::sample::select(Frequency::ALL.to_vec())
}

proptest! {
    #[test]
    fn build_params_is_deterministic(
        freq in frequency(),
        series in prop::collection::vec("[A-Z0-9]{3,8}", 0..6),
        start in prop::option::of("20[0-9]{2}-[01][0-9]"),
        limit in 0u32..20_000,
    ) {
        let mut spec = QuerySpec::new("petroleum/pri/spt")
            .with_frequency(freq)
            .with_facet("series", series.clone())
            .with_limit(limit);
        if let Some(start) = start {
            spec = spec.with_start(start);
        }

        let first = build_params("key", &spec);
        let second = build_params("key", &spec.clone());
        prop_assert_eq!(&first, &second);

        let facet_values: Vec<&String> = first
            .iter()
            .filter(|(k, _)| k == "facets[series][]")
            .map(|(_, v)| v)
            .collect();
        prop_assert_eq!(facet_values, series.iter().collect::<Vec<_>>());

        let encoded_limit: u32 = first
            .iter()
            .find(|(k, _)| k == "limit")
            .map(|(_, v)| v.parse().unwrap())
            .unwrap();
        prop_assert_eq!(encoded_limit, limit.min(MAX_LIMIT));
    }

    #[test]
    fn validate_never_rejects_limit(freq in frequency(), limit in any::<u32>()) {
        let validated = validate_params("steo", freq.as_str(), limit).unwrap();
        prop_assert!(validated.limit <= MAX_LIMIT);
        prop_assert_eq!(validated.frequency, freq);
    }

    #[test]
    fn validate_rejects_unknown_frequency(freq in "[a-z]{1,10}") {
        let known = Frequency::ALL.iter().any(|f| f.as_str() == freq);
        prop_assert_eq!(validate_params("steo", &freq, 100).is_ok(), known);
    }
}
