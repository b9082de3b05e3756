// Descriptive statistics and time-series transforms shared by the passes.
//
// Conventions follow the usual dataframe defaults: standard deviation is the
// sample (n - 1) estimator, and undefined results are `None` rather than NaN
// so callers have to decide what a degenerate group means for them.
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Arithmetic mean; 0 for an empty slice.
pub fn average(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / v.len() as f64
}

/// Sample standard deviation. Needs at least two values.
pub fn sample_std(v: &[f64]) -> Option<f64> {
    if v.len() < 2 {
        return None;
    }
    let m = average(v);
    let ss: f64 = v.iter().map(|x| (x - m).powi(2)).sum();
    Some((ss / (v.len() - 1) as f64).sqrt())
}

pub fn min_max(v: &[f64]) -> Option<(f64, f64)> {
    let mut it = v.iter().copied();
    let first = it.next()?;
    Some(it.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
}

/// Pearson correlation of two paired series.
///
/// `None` when fewer than two pairs exist or either series is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mx = average(x);
    let my = average(y);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if flat(sxx, n, mx) || flat(syy, n, my) {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// A sum of squared deviations that is only rounding noise around `mean`.
///
/// Means like 0.1 are not exact in binary, so a constant series can leave a
/// residue of a few ulps; anything under `eps * n * scale^2` counts as zero.
fn flat(sum_sq: f64, n: usize, mean: f64) -> bool {
    sum_sq <= f64::EPSILON * n as f64 * mean.abs().max(1.0).powi(2)
}

/// Two-tailed p-value for a Pearson `r` over `n` pairs (Student-t, n - 2 df).
pub fn pearson_p_value(r: f64, n: usize) -> Option<f64> {
    if n < 3 || !r.is_finite() {
        return None;
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Linear position of `value` inside `[min, max]` as a fraction.
///
/// A zero-width range has no spread to rank against and yields 0.
pub fn min_max_fraction(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return 0.0;
    }
    (value - min) / range
}

/// Trailing rolling mean. A position gets a value once at least
/// `min_periods` of the last `window` inputs are available.
pub fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            (slice.len() >= min_periods).then(|| average(slice))
        })
        .collect()
}

/// Shift a series forward by `periods`, leaving the head empty.
pub fn lag<T: Copy>(values: &[Option<T>], periods: usize) -> Vec<Option<T>> {
    (0..values.len())
        .map(|i| i.checked_sub(periods).and_then(|j| values[j]))
        .collect()
}

pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_uses_n_minus_one() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s = sample_std(&v).unwrap();
        assert!((s - 2.138_089_935_299_395).abs() < 1e-12);
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn pearson_of_linear_series_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        let neg: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson(&x, &neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_constant_series_is_undefined() {
        assert!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]).is_none());
        assert!(pearson(&[1.0], &[2.0]).is_none());
    }

    #[test]
    fn pearson_inexact_constants_are_undefined() {
        let ramp: Vec<f64> = (0..40).map(|i| i as f64).collect();
        for c in [0.1, 0.3, 1.1] {
            assert_eq!(pearson(&vec![c; 40], &ramp), None, "constant {c}");
            assert_eq!(pearson(&ramp, &vec![c; 40]), None, "constant {c}");
        }
        // smoothing a constant leaves ulp-level wobble, still undefined
        let wobbly: Vec<f64> = rolling_mean(&[0.1; 40], 6, 3).into_iter().flatten().collect();
        assert_eq!(pearson(&wobbly, &ramp[..wobbly.len()]), None);
        // small but real spread is kept
        let small: Vec<f64> = (0..40).map(|i| 0.1 + i as f64 * 1e-4).collect();
        assert!((pearson(&small, &ramp).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn p_value_matches_reference() {
        // r = 0.5 over 10 pairs: t = 1.633, two-tailed p = 0.1411
        let p = pearson_p_value(0.5, 10).unwrap();
        assert!((p - 0.141_1).abs() < 1e-3, "got {p}");
        assert_eq!(pearson_p_value(1.0, 10), Some(0.0));
        assert!((pearson_p_value(0.0, 10).unwrap() - 1.0).abs() < 1e-12);
        assert!(pearson_p_value(0.3, 2).is_none());
    }

    #[test]
    fn rolling_mean_respects_min_periods() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let r = rolling_mean(&v, 6, 3);
        assert_eq!(r[0], None);
        assert_eq!(r[1], None);
        assert_eq!(r[2], Some(2.0));
        assert_eq!(r[5], Some(3.5));
        // window slides: mean of 2..=7
        assert_eq!(r[6], Some(4.5));
    }

    #[test]
    fn lag_shifts_forward() {
        let v = [Some(1.0), None, Some(3.0), Some(4.0)];
        assert_eq!(lag(&v, 2), vec![None, None, Some(1.0), None]);
        assert_eq!(lag(&v, 10), vec![None; 4]);
    }

    #[test]
    fn fraction_guards_zero_range() {
        assert_eq!(min_max_fraction(5.0, 5.0, 5.0), 0.0);
        assert_eq!(min_max_fraction(7.5, 5.0, 10.0), 0.5);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.0004, 3), -0.0);
        assert_eq!(min_max(&[3.0, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(min_max(&[]), None);
    }
}
