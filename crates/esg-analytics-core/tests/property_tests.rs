use esg_analytics_core::aggregation::period::{aggregate_by_period, Granularity};
use esg_analytics_core::config::AnalyticsConfig;
use esg_analytics_core::correlation::pearson::correlation;
use esg_analytics_core::forecast::ensemble::ensemble_forecast;
use esg_analytics_core::intensity::ratios::{intensity, target_progress};
use esg_analytics_core::seasonal::decomposition::seasonal_decomposition;
use esg_analytics_core::trend::smoothing::{exponential_moving_average, moving_average};
use esg_analytics_core::{Observation, SeriesPoint};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

// ===========================================================================
// Fixtures
// ===========================================================================

fn sample_observations(rng: &mut StdRng) -> Vec<Observation> {
    let dimensions = ["scope1", "scope2", "scope3"];
    (0..120)
        .map(|i| {
            let month = rng.gen_range(1..=12);
            let year = 2021 + (i % 3);
            let value = if i % 17 == 0 {
                None
            } else {
                Some(rng.gen_range(0.0..10_000.0))
            };
            Observation {
                year,
                month: Some(month),
                value,
                dimension: Some(dimensions[i as usize % 3].to_string()),
            }
        })
        .collect()
}

fn sample_series(values: &[f64]) -> Vec<SeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| SeriesPoint::new(2020 + (i / 12) as i32, Some(i as u32 % 12 + 1), v))
        .collect()
}

fn random_values(rng: &mut StdRng, n: usize, low: f64, high: f64) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(low..high)).collect()
}

// ===========================================================================
// Aggregation
// ===========================================================================

#[test]
fn test_aggregation_is_order_independent() {
    let mut rng = StdRng::seed_from_u64(7);
    let observations = sample_observations(&mut rng);

    for granularity in [Granularity::Monthly, Granularity::Quarterly, Granularity::Yearly] {
        for group_by_dimension in [false, true] {
            let expected = aggregate_by_period(&observations, granularity, group_by_dimension).unwrap();
            for _ in 0..5 {
                let mut shuffled = observations.clone();
                shuffled.shuffle(&mut rng);
                let actual = aggregate_by_period(&shuffled, granularity, group_by_dimension).unwrap();
                assert_eq!(actual, expected);
            }
        }
    }
}

// ===========================================================================
// Zero guards
// ===========================================================================

#[test]
fn test_zero_denominator_guards() {
    let mut rng = StdRng::seed_from_u64(11);
    for x in random_values(&mut rng, 50, -1e6, 1e6) {
        assert_eq!(intensity(x, 0.0), 0.0);
        assert_eq!(target_progress(x, x * 0.5, x), 0.0);
    }
}

// ===========================================================================
// Smoothing
// ===========================================================================

#[test]
fn test_moving_average_keeps_values_before_first_window() {
    let mut rng = StdRng::seed_from_u64(3);
    let series = sample_series(&random_values(&mut rng, 30, 0.0, 500.0));
    for window in 1..=6 {
        let smoothed = moving_average(&series, window);
        for i in 0..window - 1 {
            assert_eq!(smoothed[i].moving_average, Some(series[i].value));
        }
    }
}

#[test]
fn test_ema_with_unit_alpha_is_the_raw_series() {
    let mut rng = StdRng::seed_from_u64(5);
    let series = sample_series(&random_values(&mut rng, 30, 0.0, 500.0));
    let smoothed = exponential_moving_average(&series, 1.0);
    for (point, original) in smoothed.iter().zip(&series) {
        assert_eq!(point.exponential_moving_average, Some(original.value));
    }
}

// ===========================================================================
// Forecast
// ===========================================================================

#[test]
fn test_forecast_is_never_negative() {
    let config = AnalyticsConfig::default();
    let mut rng = StdRng::seed_from_u64(13);

    let steep_decline: Vec<f64> = (0..24).map(|i| 1000.0 - i as f64 * 45.0).collect();
    let mut inputs = vec![steep_decline];
    for _ in 0..10 {
        inputs.push(random_values(&mut rng, 30, -200.0, 800.0));
    }

    for values in inputs {
        let output = ensemble_forecast(&sample_series(&values), 24, &config);
        assert!(output.forecast.iter().all(|p| p.value >= 0.0));
        for method in &output.individual {
            assert!(method.values.iter().all(|v| *v >= 0.0));
        }
    }
}

// ===========================================================================
// Correlation
// ===========================================================================

#[test]
fn test_correlation_symmetry_and_self_correlation() {
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..10 {
        let a = random_values(&mut rng, 40, 0.0, 100.0);
        let b = random_values(&mut rng, 40, 0.0, 100.0);
        let ab = correlation(&a, &b).unwrap();
        let ba = correlation(&b, &a).unwrap();
        assert!((ab.correlation - ba.correlation).abs() < 1e-12);
        assert!((correlation(&a, &a).unwrap().correlation - 1.0).abs() < 1e-9);
    }
}

// ===========================================================================
// Seasonal decomposition
// ===========================================================================

#[test]
fn test_seasonal_indices_average_to_one() {
    let config = AnalyticsConfig::default();
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..10 {
        let values = random_values(&mut rng, 48, 50.0, 150.0);
        let decomposition = seasonal_decomposition(&sample_series(&values), &config);
        assert_eq!(decomposition.seasonal_indices.len(), 12);
        let indices: Vec<f64> = decomposition.seasonal_indices.iter().map(|m| m.index).collect();
        let average = indices.iter().sum::<f64>() / indices.len() as f64;
        assert!((average - 1.0).abs() < 1e-6, "average index {average}");
    }
}
