use log::*;

/// Extent of a sample set, the domain for linear normalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn observe(self, v: f64) -> Self {
        Self {
            min: if self.min.is_finite() { self.min.min(v) } else { v },
            max: if self.max.is_finite() { self.max.max(v) } else { v },
        }
    }
}

/// Min/max over the numeric samples, ignoring absent and NaN entries.
///
/// Returns `None` when no sample yields a finite range: an empty input, all
/// entries absent or NaN, or an infinity dominating one of the bounds.
pub fn compute_range<I>(samples: I) -> Option<Range>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let range = samples
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold(Range::empty(), Range::observe);
    if range.min.is_finite() && range.max.is_finite() {
        Some(range)
    } else {
        None
    }
}

/// Linear position of `value` inside `range`, 0 for a zero-width range.
///
/// Values outside the range map outside [0,1]; callers that cannot rule
/// those out clamp beforehand or rely on [`color_for`]'s clamping.
pub fn normalize(value: f64, range: Range) -> f64 {
    if range.max == range.min {
        0.0
    } else {
        (value - range.min) / (range.max - range.min)
    }
}

/// Yellow-to-red gradient: `t=0` is yellow (255,255,0), `t=1` is red
/// (255,0,0), with only the green channel varying as `round(255*(1-t))`.
/// `t` is clamped to [0,1]; NaN is treated as 0 and yields yellow.
pub fn color_for(t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.min(1.0).max(0.0) };
    [255, (255.0 * (1.0 - t)).round() as u8, 0]
}

/// Places `value` inside `range` and returns its gradient color.
pub fn scale_to_color(value: f64, range: Range) -> [u8; 3] {
    let t = normalize(value, range);
    if !(0.0..=1.0).contains(&t) {
        warn!(
            "Value {} outside range {} to {}, clamping color",
            value, range.min, range.max
        );
    }
    color_for(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn range_of_empty_input_is_none() {
        assert_eq!(compute_range(std::iter::empty()), None);
    }

    #[test]
    fn range_ignores_absent_and_nan() {
        assert_eq!(compute_range(vec![Some(f64::NAN), None, None]), None);
        assert_eq!(
            compute_range(vec![Some(1.0), Some(f64::NAN), None, Some(5.0), Some(3.0)]),
            Some(Range { min: 1.0, max: 5.0 })
        );
    }

    #[test]
    fn range_rejects_infinities() {
        assert_eq!(compute_range(vec![Some(1.0), Some(f64::INFINITY)]), None);
        assert_eq!(compute_range(vec![Some(f64::NEG_INFINITY), Some(1.0)]), None);
    }

    #[test]
    fn normalize_degenerate_range_is_zero() {
        let r = Range { min: 2.0, max: 2.0 };
        assert_eq!(normalize(-7.0, r), 0.0);
        assert_eq!(normalize(2.0, r), 0.0);
        assert_eq!(normalize(1e9, r), 0.0);
    }

    #[test]
    fn gradient_endpoints_and_midpoint() {
        assert_eq!(color_for(0.0), [255, 255, 0]);
        assert_eq!(color_for(1.0), [255, 0, 0]);
        // 255 * 0.5 = 127.5 rounds up.
        assert_eq!(color_for(0.5), [255, 128, 0]);
    }

    #[test]
    fn gradient_clamps_and_absorbs_nan() {
        assert_eq!(color_for(-3.0), [255, 255, 0]);
        assert_eq!(color_for(42.0), [255, 0, 0]);
        assert_eq!(color_for(f64::NAN), [255, 255, 0]);
    }

    #[test]
    fn scale_maps_min_to_yellow_and_max_to_red() {
        let r = Range {
            min: -29.4,
            max: 23.02,
        };
        assert_eq!(scale_to_color(-29.4, r), [255, 255, 0]);
        assert_eq!(scale_to_color(23.02, r), [255, 0, 0]);
    }

    proptest! {
        #[test]
        fn green_channel_is_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(color_for(lo)[1] >= color_for(hi)[1]);
        }

        #[test]
        fn color_is_total(t in proptest::num::f64::ANY) {
            let [r, _, b] = color_for(t);
            prop_assert_eq!(r, 255);
            prop_assert_eq!(b, 0);
        }
    }
}
