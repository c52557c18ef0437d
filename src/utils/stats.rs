//! Small numeric helpers shared by the extractors and the aggregator.
//!
//! Every helper returns `0.0` when there is nothing to average so that
//! downstream tables stay fully populated.

/// Arithmetic mean, `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), `0.0` below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Mean gap between consecutive timestamps, converted from seconds to ms.
///
/// Differences are taken first and then averaged. Timestamps are expected
/// to be monotonic, as produced by a capture in frame order.
pub fn mean_interval_ms(timestamps: &[f64]) -> f64 {
    if timestamps.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) * 1000.0)
        .collect();
    mean(&diffs)
}

/// Mean of the values that are present, `None` if none are.
pub fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(mean(&present))
    }
}

/// Jain's fairness index `(Σx)² / (n · Σx²)`.
///
/// Returns `0.0` for an empty list or a list summing to zero, which marks
/// "no usable data" rather than a perfectly fair allocation.
pub fn jain_fairness(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    if values.is_empty() || sum == 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    (sum * sum) / (values.len() as f64 * sum_sq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!(approx(mean(&[1.0, 2.0, 6.0]), 3.0));
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[4.2]), 0.0);
        // Values 2, 4, 4, 4, 5, 5, 7, 9 have sample variance 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx(sample_std(&values), (32.0_f64 / 7.0).sqrt()));
    }

    #[test]
    fn test_mean_interval_needs_two_timestamps() {
        assert_eq!(mean_interval_ms(&[]), 0.0);
        assert_eq!(mean_interval_ms(&[0.5]), 0.0);
    }

    #[test]
    fn test_mean_interval_diff_then_mean() {
        // diffs 0.1 s and 0.15 s
        assert!(approx(mean_interval_ms(&[0.0, 0.1, 0.25]), 125.0));
    }

    #[test]
    fn test_mean_present_skips_missing() {
        assert_eq!(mean_present([None, None]), None);
        assert_eq!(mean_present([Some(1.0), None, Some(3.0)]), Some(2.0));
    }

    #[test]
    fn test_jain_fairness_bounds() {
        assert_eq!(jain_fairness(&[]), 0.0);
        assert_eq!(jain_fairness(&[0.0, 0.0]), 0.0);
        assert!(approx(jain_fairness(&[5.0, 5.0, 5.0]), 1.0));

        let skewed = [10.0, 1.0, 1.0, 1.0];
        let index = jain_fairness(&skewed);
        assert!(index >= 1.0 / skewed.len() as f64);
        assert!(index < 1.0);

        // One flow takes everything: lower bound 1/n
        assert!(approx(jain_fairness(&[8.0, 0.0, 0.0, 0.0]), 0.25));
    }
}
