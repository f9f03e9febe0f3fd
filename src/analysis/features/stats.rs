// Stats module - Shared numeric helpers
//
// Every ratio computed by the extractor goes through `safe_ratio`, so the
// policy for a zero denominator is stated once, at the call site, as the
// `default` argument.

/// Divide `numerator` by `denominator`, returning `default` when the
/// denominator is zero or the quotient is not finite
#[inline]
pub fn safe_ratio(numerator: f32, denominator: f32, default: f32) -> f32 {
    if denominator == 0.0 {
        return default;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        default
    }
}

/// Arithmetic mean (0.0 for an empty slice)
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    (sum / values.len() as f64) as f32
}

/// Population variance (0.0 for an empty slice)
pub fn variance(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values) as f64;
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum();
    (sum_sq / values.len() as f64) as f32
}

/// Population standard deviation
pub fn std_dev(values: &[f32]) -> f32 {
    variance(values).sqrt()
}

/// Standard deviation divided by mean, 0.0 when the mean is zero
pub fn coefficient_of_variation(values: &[f32]) -> f32 {
    safe_ratio(std_dev(values), mean(values), 0.0)
}

/// Peak-to-peak distance (0.0 for an empty slice)
pub fn range(values: &[f32]) -> f32 {
    let mut iter = values.iter().copied();
    let Some(first) = iter.next() else {
        return 0.0;
    };
    let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    max - min
}

/// Median of a window, computed on a scratch copy
pub fn median(window: &mut [f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let mid = window.len() / 2;
    let (_, value, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *value
}

/// Decibel conversion of a power-like quantity with a floor
#[inline]
pub fn power_to_db(value: f32, floor: f32) -> f32 {
    10.0 * value.max(floor).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_ratio_uses_default_on_zero_denominator() {
        assert_eq!(safe_ratio(1.0, 0.0, 0.0), 0.0);
        assert_eq!(safe_ratio(5.0, 0.0, 100.0), 100.0);
        assert_eq!(safe_ratio(6.0, 3.0, 0.0), 2.0);
    }

    #[test]
    fn moments_of_known_series() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-6);
        assert!((variance(&values) - 4.0).abs() < 1e-6);
        assert!((std_dev(&values) - 2.0).abs() < 1e-6);
        assert!((coefficient_of_variation(&values) - 0.4).abs() < 1e-6);
        assert_eq!(range(&values), 7.0);
    }

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(range(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn median_of_odd_window() {
        let mut window = [5.0, 1.0, 3.0, 9.0, 7.0];
        assert_eq!(median(&mut window), 5.0);
    }
}
