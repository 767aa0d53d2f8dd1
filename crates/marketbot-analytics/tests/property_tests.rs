//! Property-based tests for statistics and simulation invariants.
//!
//! - Percentiles are monotone in the requested level
//! - Summary statistics stay within the sample bounds
//! - Seeded simulation is reproducible
//! - Zero volatility with zero drift leaves every path at the start price

use marketbot_analytics::prelude::*;
use marketbot_analytics::statistics::sorted;
use proptest::prelude::*;

/// Interpolation across adjacent ranks may round by an ulp.
fn le(a: f64, b: f64) -> bool {
    a <= b + 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn sample() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6..1.0e6_f64, 1..200)
}

proptest! {
    #[test]
    fn percentiles_are_monotone(values in sample(), a in 0.0..100.0_f64, b in 0.0..100.0_f64) {
        let data = sorted(&values);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(le(percentile(&data, lo), percentile(&data, hi)));
    }

    #[test]
    fn statistics_within_bounds(values in sample()) {
        let stats = compute_statistics(&values).unwrap();
        let tol = 1e-6 * stats.max.abs().max(stats.min.abs()).max(1.0);

        prop_assert_eq!(stats.sample_size, values.len());
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.mean >= stats.min - tol && stats.mean <= stats.max + tol);
        prop_assert!(stats.std_dev >= 0.0);
        prop_assert_eq!(stats.range, stats.max - stats.min);
    }

    #[test]
    fn band_matches_thresholds(cv in -50.0..50.0_f64) {
        let expected = if cv > 10.0 {
            VolatilityBand::High
        } else if cv > 5.0 {
            VolatilityBand::Moderate
        } else {
            VolatilityBand::Low
        };
        prop_assert_eq!(VolatilityBand::classify(cv), expected);
    }

    #[test]
    fn parse_round_trips_formatted_numbers(values in prop::collection::vec(-1.0e4..1.0e4_f64, 1..20)) {
        let joined = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
        prop_assert_eq!(parse_values(&joined).unwrap(), values);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn seeded_simulation_reproducible(
        price in 1.0..500.0_f64,
        vol in 0.0..1.0_f64,
        days in 1u32..60,
        paths in 1u32..200,
        seed in any::<u64>(),
    ) {
        let request = SimulationRequest::new(price, vol)
            .with_days(days)
            .with_path_count(paths);

        let a = simulate_seeded(&request, seed).unwrap();
        let b = simulate_seeded(&request, seed).unwrap();
        prop_assert_eq!(&a.terminal_prices, &b.terminal_prices);
        prop_assert_eq!(a.terminal_prices.len(), paths as usize);

        let d = a.distribution;
        prop_assert!(le(d.p2_5, d.p16));
        prop_assert!(le(d.p16, d.median));
        prop_assert!(le(d.median, d.p84));
        prop_assert!(le(d.p84, d.p97_5));
    }

    #[test]
    fn flat_paths_without_volatility(price in 0.01..1.0e4_f64, days in 1u32..100, seed in any::<u64>()) {
        let request = SimulationRequest::new(price, 0.0)
            .with_days(days)
            .with_path_count(20);

        let result = simulate_seeded(&request, seed).unwrap();
        prop_assert!(result.terminal_prices.iter().all(|&p| p == price));

        let parallel = simulate_par(&request, seed).unwrap();
        prop_assert!(parallel.terminal_prices.iter().all(|&p| p == price));
    }
}
