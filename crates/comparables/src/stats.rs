//! Descriptive statistics over a peer price sample, per spec §4.6.

/// The full set of descriptive statistics computed from a price sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// 10th percentile.
    pub p10: f64,
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
}

/// Computes [`Stats`] over `prices`. Callers must ensure `prices` is
/// non-empty; an empty slice yields all-zero statistics.
pub fn compute(prices: &[f64]) -> Stats {
    if prices.is_empty() {
        return Stats {
            mean: 0.0,
            std_dev: 0.0,
            p10: 0.0,
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
            p90: 0.0,
        };
    }

    let mut sorted = prices.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = if sorted.len() > 1 {
        sorted.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        0.0
    };

    Stats {
        mean,
        std_dev: variance.sqrt(),
        p10: percentile(&sorted, 10.0),
        p25: percentile(&sorted, 25.0),
        p50: percentile(&sorted, 50.0),
        p75: percentile(&sorted, 75.0),
        p90: percentile(&sorted, 90.0),
    }
}

/// Linear-interpolation percentile (the common "R type 7" method), matching
/// the behavior of `numpy.percentile`'s default.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = rank - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Coefficient of variation (`std_dev / mean`), `0.0` for a degenerate
/// (zero-mean) sample.
pub fn coefficient_of_variation(stats: &Stats) -> f64 {
    if stats.mean == 0.0 {
        0.0
    } else {
        stats.std_dev / stats.mean
    }
}

/// `min(1, sample_size / full_confidence_sample) × max(0.5, 1 − CV)`, per
/// spec §4.6.
pub fn confidence(sample_size: usize, full_confidence_sample: usize, stats: &Stats) -> f64 {
    let size_term = (sample_size as f64 / full_confidence_sample as f64).min(1.0);
    let dispersion_term = (1.0 - coefficient_of_variation(stats)).max(0.5);
    size_term * dispersion_term
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_sample_is_middle_value() {
        let stats = compute(&[10.0, 20.0, 30.0]);
        assert_eq!(stats.p50, 20.0);
    }

    #[test]
    fn mean_and_std_dev_of_known_sample() {
        let stats = compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean - 5.0).abs() < 1e-9);
        assert!((stats.std_dev - 2.138).abs() < 0.01);
    }

    #[test]
    fn single_sample_has_zero_dispersion() {
        let stats = compute(&[100.0]);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.p50, 100.0);
    }

    #[test]
    fn confidence_saturates_at_full_sample() {
        let stats = compute(&[100.0; 30]);
        let c = confidence(30, 30, &stats);
        assert!((c - 1.0).abs() < 1e-9);
    }

    #[test]
    fn confidence_scales_down_with_small_sample() {
        let stats = compute(&[100.0, 100.0, 100.0]);
        let c = confidence(3, 30, &stats);
        assert!(c < 0.2);
    }
}
