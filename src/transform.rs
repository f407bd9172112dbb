// =============================================================================
// Numeric Transforms — min-max normalization and EMA
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha = 2 / (span + 1)
//   EMA_0 = value_0
//   EMA_t = value_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The series is seeded with the first raw value (no adjust correction), so the
// output has the same length and alignment as the input and needs no warm-up.
// =============================================================================

use crate::error::{EmaError, Result};

/// Rescale `values` linearly so the minimum maps to 0.0 and the maximum to 1.0.
///
/// The mapping is a strictly monotonic affine function of the input, so the
/// ordering of values is preserved exactly.
///
/// # Errors
/// - `InvalidInput` when `values` is empty (no min/max exists).
/// - `InvalidInput` when all values are equal — a constant series has no
///   scale, and no fallback (e.g. all-zeros) is substituted.
pub fn normalize_min_max(values: &[f64]) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(EmaError::InvalidInput(
            "cannot normalize an empty series".into(),
        ));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }

    if min == max {
        return Err(EmaError::InvalidInput(
            "cannot normalize a series with constant values".into(),
        ));
    }

    let range = max - min;
    Ok(values.iter().map(|&v| (v - min) / range).collect())
}

/// Compute the EMA of `values` for the given `span`.
///
/// When `normalize` is true the series is min-max normalized first and the
/// smoothing runs over the rescaled values (inheriting the normalizer's
/// failure on constant input).
///
/// Pure and deterministic: identical inputs produce bit-identical output.
///
/// # Errors
/// - `InvalidInput` when `span` is zero.
/// - Any error from [`normalize_min_max`] when `normalize` is set.
pub fn compute_ema(values: &[f64], span: usize, normalize: bool) -> Result<Vec<f64>> {
    if span == 0 {
        return Err(EmaError::InvalidInput(
            "span must be greater than 0".into(),
        ));
    }

    let source;
    let values = if normalize {
        source = normalize_min_max(values)?;
        &source[..]
    } else {
        values
    };

    let Some(&first) = values.first() else {
        return Ok(Vec::new());
    };

    let alpha = 2.0 / (span as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    result.push(first);

    let mut prev = first;
    for &v in &values[1..] {
        let ema = v * alpha + prev * (1.0 - alpha);
        result.push(ema);
        prev = ema;
    }

    Ok(result)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    // ---- normalize_min_max -----------------------------------------------

    #[test]
    fn normalize_maps_to_unit_interval() {
        let out = normalize_min_max(&[2.0, 4.0, 6.0, 10.0]).unwrap();
        assert_eq!(out.len(), 4);
        assert!((out[0] - 0.0).abs() < EPS);
        assert!((out[3] - 1.0).abs() < EPS);
        // Affine: (4-2)/8 = 0.25, (6-2)/8 = 0.5
        assert!((out[1] - 0.25).abs() < EPS);
        assert!((out[2] - 0.5).abs() < EPS);
    }

    #[test]
    fn normalize_preserves_ordering() {
        let input = vec![3.0, -1.0, 7.0, 0.5, 7.0, -1.0];
        let out = normalize_min_max(&input).unwrap();
        for i in 0..input.len() {
            for j in 0..input.len() {
                assert_eq!(
                    input[i] < input[j],
                    out[i] < out[j],
                    "ordering broken at ({i}, {j})"
                );
            }
        }
    }

    #[test]
    fn normalize_negative_range() {
        let out = normalize_min_max(&[-10.0, -5.0, 0.0]).unwrap();
        assert!((out[0] - 0.0).abs() < EPS);
        assert!((out[1] - 0.5).abs() < EPS);
        assert!((out[2] - 1.0).abs() < EPS);
    }

    #[test]
    fn normalize_constant_series_fails() {
        let err = normalize_min_max(&[5.0, 5.0, 5.0]).unwrap_err();
        assert!(matches!(err, EmaError::InvalidInput(_)));
    }

    #[test]
    fn normalize_empty_fails() {
        let err = normalize_min_max(&[]).unwrap_err();
        assert!(matches!(err, EmaError::InvalidInput(_)));
    }

    // ---- compute_ema -----------------------------------------------------

    #[test]
    fn ema_known_values() {
        // span 4 => alpha = 2/5 = 0.4, seeded with the first raw value.
        let out = compute_ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 4, false).unwrap();
        let expected = [1.0, 1.4, 2.04, 2.824, 3.6944];
        assert_eq!(out.len(), expected.len());
        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a - b).abs() < EPS, "got {a}, expected {b}");
        }
    }

    #[test]
    fn ema_length_and_seed() {
        let input: Vec<f64> = (1..=50).map(|i| (i as f64).sin() * 10.0 + 100.0).collect();
        let out = compute_ema(&input, 10, false).unwrap();
        assert_eq!(out.len(), input.len());
        assert_eq!(out[0], input[0]);
    }

    #[test]
    fn ema_seed_after_normalization() {
        let input = vec![10.0, 20.0, 30.0];
        let normalized = normalize_min_max(&input).unwrap();
        let out = compute_ema(&input, 5, true).unwrap();
        assert_eq!(out[0], normalized[0]);
        assert_eq!(out.len(), input.len());
    }

    #[test]
    fn ema_span_zero_fails() {
        let err = compute_ema(&[1.0, 2.0, 3.0], 0, false).unwrap_err();
        assert!(matches!(err, EmaError::InvalidInput(_)));
    }

    #[test]
    fn ema_span_one_is_identity() {
        // alpha = 2/2 = 1: each output equals the current input.
        let input = vec![4.0, 8.0, 1.0, 9.0];
        let out = compute_ema(&input, 1, false).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn ema_empty_without_normalization() {
        let out = compute_ema(&[], 5, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn ema_normalize_constant_series_fails() {
        let err = compute_ema(&[7.0, 7.0, 7.0], 3, true).unwrap_err();
        assert!(matches!(err, EmaError::InvalidInput(_)));
    }

    #[test]
    fn ema_is_deterministic() {
        let input: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).cos() * 42.0).collect();
        let a = compute_ema(&input, 10, true).unwrap();
        let b = compute_ema(&input, 10, true).unwrap();
        // Bit-identical, not merely close.
        assert_eq!(a, b);
    }
}
