use analytics::{
    AnalyticsError, PowerInput, TTestKind, estimate_power, two_proportion_z_test,
    two_sample_t_test,
};
use proptest::prelude::*;

fn design(baseline_rate: f64, mde: f64, n: u64, alpha: f64) -> PowerInput {
    PowerInput {
        baseline_rate,
        minimum_detectable_effect: mde,
        sample_size_per_arm: n,
        alpha,
    }
}

proptest! {
    #[test]
    fn power_is_a_probability(
        p0 in 0.01f64..0.99,
        mde in 0.0001f64..0.5,
        n in 1u64..200_000,
        alpha in 0.001f64..0.2,
    ) {
        let estimate = estimate_power(&design(p0, mde, n, alpha)).unwrap();
        prop_assert!((0.0..=1.0).contains(&estimate.power));
    }

    #[test]
    fn power_grows_with_sample_size(
        p0 in 0.05f64..0.95,
        mde in 0.001f64..0.05,
        n in 10u64..50_000,
        extra in 1u64..50_000,
    ) {
        let small = estimate_power(&design(p0, mde, n, 0.05)).unwrap().power;
        let large = estimate_power(&design(p0, mde, n + extra, 0.05)).unwrap().power;
        prop_assert!(large >= small - 1e-12, "n={} -> {}, n={} -> {}", n, small, n + extra, large);
    }

    #[test]
    fn power_grows_with_effect(
        p0 in 0.05f64..0.95,
        mde in 0.001f64..0.05,
        bump in 0.0001f64..0.05,
        n in 10u64..50_000,
    ) {
        let small = estimate_power(&design(p0, mde, n, 0.05)).unwrap().power;
        let large = estimate_power(&design(p0, mde + bump, n, 0.05)).unwrap().power;
        prop_assert!(large >= small - 1e-12);
    }

    #[test]
    fn swapping_proportion_groups_negates_z(
        (n_a, x_a) in (2u64..100_000).prop_flat_map(|n| (Just(n), 1..n)),
        (n_b, x_b) in (2u64..100_000).prop_flat_map(|n| (Just(n), 1..n)),
    ) {
        let forward = two_proportion_z_test(x_a, n_a, x_b, n_b, 0.95).unwrap();
        let backward = two_proportion_z_test(x_b, n_b, x_a, n_a, 0.95).unwrap();
        prop_assert!((forward.statistic + backward.statistic).abs() < 1e-9);
        prop_assert!((forward.p_value - backward.p_value).abs() < 1e-12);
        prop_assert!((0.0..=1.0).contains(&forward.p_value));
    }

    #[test]
    fn identical_rates_have_unit_p_value(
        x in 1u64..1_000,
        scale in 2u64..20,
        k in 1u64..50,
    ) {
        // Group B is group A scaled by k, so both rates are x / n exactly.
        let n = x * scale;
        let r = two_proportion_z_test(x, n, x * k, n * k, 0.95).unwrap();
        prop_assert!(r.statistic.abs() < 1e-9);
        prop_assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn swapping_mean_groups_negates_t(
        a in prop::collection::vec(-100.0f64..100.0, 2..60),
        b in prop::collection::vec(-100.0f64..100.0, 2..60),
    ) {
        match two_sample_t_test(&a, &b, TTestKind::Student, 0.95) {
            Ok(forward) => {
                let backward = two_sample_t_test(&b, &a, TTestKind::Student, 0.95).unwrap();
                prop_assert!((forward.statistic + backward.statistic).abs() < 1e-6);
                prop_assert!((forward.p_value - backward.p_value).abs() < 1e-9);
                prop_assert!(forward.p_value.is_finite());
            }
            Err(err) => prop_assert!(matches!(err, AnalyticsError::DegenerateVariance(_))),
        }
    }

    #[test]
    fn constant_samples_never_yield_nan(value in -50.0f64..50.0, len_a in 2usize..30, len_b in 2usize..30) {
        let a = vec![value; len_a];
        let b = vec![value; len_b];
        let result = two_sample_t_test(&a, &b, TTestKind::Welch, 0.95);
        prop_assert!(matches!(result, Err(AnalyticsError::DegenerateVariance(_))));
    }
}
