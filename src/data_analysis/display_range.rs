// src/data_analysis/display_range.rs

use ndarray::ArrayView2;

use crate::constants::{
    DEGENERATE_RELATIVE_TOLERANCE, DEGENERATE_WIDENING_FRACTION, DEGENERATE_ZERO_WIDENING,
    RADARGRAM_PERCENTILES,
};
use crate::error::{PlotError, Result};

/// Value pair mapped to the two ends of a color scale (or an x-axis for profiles).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub low: f64,
    pub high: f64,
}

impl DisplayRange {
    pub fn new(low: f64, high: f64) -> Self {
        DisplayRange { low, high }
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    /// Position of `value` inside the range, clamped to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span().abs().max(1e-12);
        ((value - self.low) / span).clamp(0.0, 1.0)
    }
}

/// Linear-interpolated percentile of a sorted, finite slice (0 <= p <= 100).
fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Two percentiles over the finite values of `values`.
///
/// Returns `None` when no finite value is present. NaN and infinities are skipped.
pub fn finite_percentiles<I>(values: I, p_low: f64, p_high: f64) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| a.total_cmp(b));
    Some((
        percentile_of_sorted(&finite, p_low),
        percentile_of_sorted(&finite, p_high),
    ))
}

/// Expands the 10th/90th percentile spread of an amplitude slice into a color range.
///
/// A negative low percentile is doubled, a non-negative one halved; the high
/// percentile is always doubled. The result always satisfies `low <= high`.
pub fn estimate_display_range(slice: ArrayView2<'_, f64>) -> Result<DisplayRange> {
    let (p_low, p_high) = RADARGRAM_PERCENTILES;
    let (lo, hi) = finite_percentiles(slice.iter().copied(), p_low, p_high).ok_or_else(|| {
        PlotError::InvalidRecord("no finite amplitude values in the selected traces".to_string())
    })?;
    Ok(expand_percentiles(lo, hi))
}

/// The asymmetric expansion applied to a percentile pair.
pub fn expand_percentiles(lo: f64, hi: f64) -> DisplayRange {
    let low = if lo < 0.0 { lo * 2.0 } else { lo / 2.0 };
    DisplayRange::new(low, hi * 2.0)
}

/// Pushes apart a range whose ends coincide so a color scale stays defined.
///
/// Each end moves outward by 1% of its own magnitude; a range collapsed on zero
/// is widened by a fixed unit instead. Non-degenerate ranges come back unchanged.
pub fn widen_degenerate(range: DisplayRange) -> DisplayRange {
    let scale = range.low.abs().max(range.high.abs());
    let degenerate = if scale == 0.0 {
        true
    } else {
        (range.high - range.low).abs() / scale < DEGENERATE_RELATIVE_TOLERANCE
    };
    if !degenerate {
        return range;
    }
    if scale == 0.0 {
        return DisplayRange::new(-DEGENERATE_ZERO_WIDENING, DEGENERATE_ZERO_WIDENING);
    }
    DisplayRange::new(
        range.low - DEGENERATE_WIDENING_FRACTION * range.low.abs(),
        range.high + DEGENERATE_WIDENING_FRACTION * range.high.abs(),
    )
}

/// X-range for amplitude profiles: centred on zero when the spread straddles it.
///
/// A collapsed range is returned as is; the chart pads it when building axes.
pub fn profile_range(lo: f64, hi: f64) -> DisplayRange {
    if lo < 0.0 && hi > 0.0 {
        DisplayRange::new(lo, -lo)
    } else {
        DisplayRange::new(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_percentiles_interpolate_linearly() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let (lo, hi) = finite_percentiles(values, 10.0, 90.0).unwrap();
        assert!((lo - 1.4).abs() < 1e-12);
        assert!((hi - 4.6).abs() < 1e-12);
    }

    #[test]
    fn test_percentiles_skip_nan() {
        let values = vec![f64::NAN, 2.0, f64::NAN, 2.0];
        assert_eq!(finite_percentiles(values, 1.0, 99.0), Some((2.0, 2.0)));
        assert_eq!(finite_percentiles(vec![f64::NAN], 1.0, 99.0), None);
    }

    #[test]
    fn test_negative_low_is_doubled() {
        // Sorted: p10 sits on index 1 (-3), p90 on index 9 (7).
        let data = Array2::from_shape_vec(
            (1, 11),
            vec![7.0, -5.0, 1.0, -3.0, 9.0, -2.0, 4.0, -1.0, 0.0, 3.0, 2.0],
        )
        .unwrap();
        let range = estimate_display_range(data.view()).unwrap();
        assert!((range.low - -6.0).abs() < 1e-12);
        assert!((range.high - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_positive_low_is_halved() {
        let range = expand_percentiles(4.0, 10.0);
        assert_eq!(range.as_tuple(), (2.0, 20.0));
    }

    #[test]
    fn test_low_never_exceeds_high() {
        let slices = [
            array![[-5.0, -4.0], [-3.0, -2.0]],
            array![[0.0, 0.0], [0.0, 0.0]],
            array![[-1.0, 10.0], [f64::NAN, 3.0]],
            array![[100.0, 200.0], [300.0, 400.0]],
        ];
        for slice in slices.iter() {
            let range = estimate_display_range(slice.view()).unwrap();
            assert!(range.low <= range.high, "{:?}", range);
            assert!(range.low.is_finite() && range.high.is_finite());
        }
    }

    #[test]
    fn test_all_nan_slice_is_an_error() {
        let slice = array![[f64::NAN, f64::NAN]];
        assert!(estimate_display_range(slice.view()).is_err());
    }

    #[test]
    fn test_widen_degenerate_constant_range() {
        let widened = widen_degenerate(DisplayRange::new(-20.0, -20.0));
        assert!(widened.span() > 0.0);
        assert!((widened.low - -20.2).abs() < 1e-12);
        assert!((widened.high - -19.8).abs() < 1e-12);

        let widened = widen_degenerate(DisplayRange::new(0.0, 0.0));
        assert_eq!(widened.as_tuple(), (-1.0, 1.0));
    }

    #[test]
    fn test_widen_leaves_normal_range_alone() {
        let range = DisplayRange::new(-30.0, -10.0);
        assert_eq!(widen_degenerate(range), range);
    }

    #[test]
    fn test_profile_range_centres_on_zero() {
        assert_eq!(profile_range(-4.0, 9.0).as_tuple(), (-4.0, 4.0));
        assert_eq!(profile_range(1.0, 9.0).as_tuple(), (1.0, 9.0));
        assert_eq!(profile_range(2.5, 2.5).as_tuple(), (2.5, 2.5));
    }
}

// src/data_analysis/display_range.rs
