use serde::{Deserialize, Serialize};

use crate::stats::{ratio, summarize};
use crate::types::Percent;

/// Multiples of the industry average that bound the second and third
/// quartiles.
const SECOND_QUARTILE_FACTOR: f64 = 1.1;
const THIRD_QUARTILE_FACTOR: f64 = 1.25;

// ---------------------------------------------------------------------------
// Types: Benchmark position
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Excellent,
    Good,
    Average,
    BelowAverage,
    /// Worse (higher) than every benchmark
    BelowBenchmark,
    NoBenchmark,
}

/// Where a value sits in an ascending (lower is better) benchmark list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// 1-based rank; `total_benchmarks + 1` when worse than all, `0`
    /// without benchmarks
    pub position: usize,
    pub percentile: Percent,
    pub status: BenchmarkStatus,
    pub total_benchmarks: usize,
}

// ---------------------------------------------------------------------------
// Types: Industry position
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryBenchmark {
    #[serde(default)]
    pub best_practice: Option<f64>,
    #[serde(default)]
    pub industry_average: Option<f64>,
    #[serde(default)]
    pub regulatory_limit: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quartile {
    TopQuartile,
    SecondQuartile,
    ThirdQuartile,
    BottomQuartile,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndustryStatus {
    BestPractice,
    AboveAverage,
    Average,
    BelowAverage,
    NonCompliant,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryPosition {
    pub position: Quartile,
    pub status: IndustryStatus,
    /// % above (+) or below (-) each reference, when the reference is set
    pub vs_best_practice: Option<Percent>,
    pub vs_industry_average: Option<Percent>,
    pub vs_regulatory_limit: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerStatistics {
    pub peer_count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Share of peers strictly below the value
    pub share_below_pct: Percent,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rank `value` against benchmarks where lower is better.
///
/// The insertion point is the first benchmark `>= value` in ascending
/// order; the percentile is that index over the list length, rounded to the
/// nearest whole percent (1 of 3 reports 33, 2 of 3 reports 67).
pub fn benchmark_position(value: f64, benchmarks: &[f64]) -> BenchmarkResult {
    let mut sorted: Vec<f64> = benchmarks.iter().copied().filter(|b| b.is_finite()).collect();
    if sorted.is_empty() {
        return BenchmarkResult {
            position: 0,
            percentile: 0.0,
            status: BenchmarkStatus::NoBenchmark,
            total_benchmarks: 0,
        };
    }
    sorted.sort_by(f64::total_cmp);
    let total = sorted.len();

    match sorted.iter().position(|b| value <= *b) {
        None => BenchmarkResult {
            position: total + 1,
            percentile: 100.0,
            status: BenchmarkStatus::BelowBenchmark,
            total_benchmarks: total,
        },
        Some(index) => {
            let percentile = (index as f64 / total as f64 * 100.0).round();
            let status = if percentile <= 25.0 {
                BenchmarkStatus::Excellent
            } else if percentile <= 50.0 {
                BenchmarkStatus::Good
            } else if percentile <= 75.0 {
                BenchmarkStatus::Average
            } else {
                BenchmarkStatus::BelowAverage
            };
            BenchmarkResult {
                position: index + 1,
                percentile,
                status,
                total_benchmarks: total,
            }
        }
    }
}

/// Place `value` (lower is better) against industry reference points.
///
/// Non-positive references are treated as not set. A regulatory breach
/// overrides any other placement.
pub fn industry_position(value: f64, benchmark: &IndustryBenchmark) -> IndustryPosition {
    let best = benchmark.best_practice.filter(|b| *b > 0.0);
    let average = benchmark.industry_average.filter(|a| *a > 0.0);
    let limit = benchmark.regulatory_limit.filter(|l| *l > 0.0);

    let (mut position, mut status) = match (best, average) {
        (Some(b), _) if value <= b => (Quartile::TopQuartile, IndustryStatus::BestPractice),
        (_, Some(a)) if value <= a * SECOND_QUARTILE_FACTOR => {
            (Quartile::SecondQuartile, IndustryStatus::AboveAverage)
        }
        (_, Some(a)) if value <= a * THIRD_QUARTILE_FACTOR => {
            (Quartile::ThirdQuartile, IndustryStatus::Average)
        }
        (_, Some(_)) => (Quartile::BottomQuartile, IndustryStatus::BelowAverage),
        _ => (Quartile::Unknown, IndustryStatus::Unknown),
    };

    if limit.is_some_and(|l| value > l) {
        position = Quartile::BottomQuartile;
        status = IndustryStatus::NonCompliant;
    }

    let delta = |reference: Option<f64>| reference.map(|r| ratio(value - r, r) * 100.0);

    IndustryPosition {
        position,
        status,
        vs_best_practice: delta(best),
        vs_industry_average: delta(average),
        vs_regulatory_limit: delta(limit),
    }
}

/// Summary of a peer group relative to `value`. Non-finite peers are
/// ignored.
pub fn peer_statistics(value: f64, peers: &[f64]) -> PeerStatistics {
    let stats = summarize(peers);
    let below = peers
        .iter()
        .filter(|p| p.is_finite() && **p < value)
        .count();
    PeerStatistics {
        peer_count: stats.count,
        mean: stats.mean,
        median: stats.median,
        min: stats.min,
        max: stats.max,
        share_below_pct: ratio(below as f64, stats.count as f64) * 100.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_position_reference_case() {
        let r = benchmark_position(95.0, &[80.0, 90.0, 100.0, 110.0]);
        assert_eq!(r.percentile, 50.0);
        assert_eq!(r.status, BenchmarkStatus::Good);
        assert_eq!(r.position, 3);
        assert_eq!(r.total_benchmarks, 4);
    }

    #[test]
    fn test_benchmark_position_unsorted_input() {
        let r = benchmark_position(95.0, &[110.0, 80.0, 100.0, 90.0]);
        assert_eq!(r.percentile, 50.0);
    }

    #[test]
    fn test_benchmark_position_best_and_worst() {
        let r = benchmark_position(10.0, &[80.0, 90.0]);
        assert_eq!(r.percentile, 0.0);
        assert_eq!(r.status, BenchmarkStatus::Excellent);
        assert_eq!(r.position, 1);

        let r = benchmark_position(200.0, &[80.0, 90.0]);
        assert_eq!(r.percentile, 100.0);
        assert_eq!(r.status, BenchmarkStatus::BelowBenchmark);
        assert_eq!(r.position, 3);
    }

    #[test]
    fn test_benchmark_position_rounding() {
        // index 2 of 3 is 66.67
        let r = benchmark_position(3.0, &[1.0, 2.0, 3.0]);
        assert_eq!(r.percentile, 67.0);
        assert_eq!(r.status, BenchmarkStatus::Average);

        // index 1 of 3 is 33.33
        let r = benchmark_position(2.0, &[1.0, 2.0, 3.0]);
        assert_eq!(r.percentile, 33.0);
        assert_eq!(r.status, BenchmarkStatus::Good);
    }

    #[test]
    fn test_no_benchmarks() {
        let r = benchmark_position(3.0, &[]);
        assert_eq!(r.status, BenchmarkStatus::NoBenchmark);
        assert_eq!(r.position, 0);
    }

    fn sample_industry() -> IndustryBenchmark {
        IndustryBenchmark {
            best_practice: Some(700.0),
            industry_average: Some(850.0),
            regulatory_limit: Some(1000.0),
        }
    }

    #[test]
    fn test_industry_position_quartiles() {
        let b = sample_industry();
        assert_eq!(industry_position(650.0, &b).status, IndustryStatus::BestPractice);
        assert_eq!(industry_position(900.0, &b).position, Quartile::SecondQuartile);
        assert_eq!(industry_position(1000.0, &b).position, Quartile::ThirdQuartile);
        let breach = industry_position(1100.0, &b);
        assert_eq!(breach.status, IndustryStatus::NonCompliant);
        assert_eq!(breach.position, Quartile::BottomQuartile);
    }

    #[test]
    fn test_industry_position_deltas() {
        let p = industry_position(935.0, &sample_industry());
        assert!((p.vs_industry_average.unwrap() - 10.0).abs() < 1e-9);
        assert!((p.vs_regulatory_limit.unwrap() + 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_industry_position_without_references() {
        let p = industry_position(5.0, &IndustryBenchmark::default());
        assert_eq!(p.status, IndustryStatus::Unknown);
        assert_eq!(p.vs_best_practice, None);
    }

    #[test]
    fn test_peer_statistics() {
        let s = peer_statistics(85.0, &[80.0, 90.0, f64::NAN, 100.0, 70.0]);
        assert_eq!(s.peer_count, 4);
        assert_eq!(s.median, 85.0);
        assert_eq!(s.share_below_pct, 50.0);
    }
}
