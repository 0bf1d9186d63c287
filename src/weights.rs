use serde::{Deserialize, Serialize};

/// Minimum separation kept between the two cut points.
pub const MIN_GAP: f64 = 0.02;

/// Identifies one of the two cut points on the unit line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CutPoint {
    First,
    Second,
}

/// A three-way weight triple. Non-negative, sums to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub w1: f64,
    pub w2: f64,
    pub w3: f64,
}

impl Weights {
    pub fn equal_thirds() -> Self {
        WeightSplitter::new().weights()
    }
}

/// Two cut points `first <= second` partitioning [0,1] into three segments.
///
/// The segment lengths are the weights, so they sum to the interval length
/// by construction; [`weights`](WeightSplitter::weights) renormalizes only
/// to absorb floating-point drift. Requested positions are never rejected,
/// they are projected to the nearest value keeping
/// `0 <= first <= second <= 1` and `second - first >= gap`.
#[derive(Clone, Copy, Debug)]
pub struct WeightSplitter {
    first: f64,
    second: f64,
    gap: f64,
}

impl Default for WeightSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightSplitter {
    /// Equal thirds: cut points at 1/3 and 2/3, gap of [`MIN_GAP`].
    pub fn new() -> Self {
        Self {
            first: 1.0 / 3.0,
            second: 2.0 / 3.0,
            gap: MIN_GAP,
        }
    }

    pub fn cut_points(&self) -> (f64, f64) {
        (self.first, self.second)
    }

    /// Moves a cut point. The position is clamped to [0,1], then clamped
    /// against the sibling so the ordering and the minimum gap hold.
    pub fn set_cut_point(&mut self, which: CutPoint, position: f64) {
        let clamped = position.min(1.0).max(0.0);
        match which {
            CutPoint::First => self.first = (self.second - self.gap).min(clamped),
            CutPoint::Second => self.second = (self.first + self.gap).max(clamped),
        }
    }

    /// The cut point closest to `position`; ties go to [`CutPoint::First`].
    pub fn nearest_cut_point(&self, position: f64) -> CutPoint {
        if (position - self.first).abs() <= (position - self.second).abs() {
            CutPoint::First
        } else {
            CutPoint::Second
        }
    }

    /// The three segment lengths, renormalized so they sum to exactly 1.
    pub fn weights(&self) -> Weights {
        let w1 = self.first;
        let w2 = self.second - self.first;
        let w3 = 1.0 - self.second;
        let sum = w1 + w2 + w3;
        Weights {
            w1: w1 / sum,
            w2: w2 / sum,
            w3: w3 / sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn default_is_equal_thirds() {
        let w = WeightSplitter::new().weights();
        assert!((w.w1 - 1.0 / 3.0).abs() < 1e-12);
        assert!((w.w2 - 1.0 / 3.0).abs() < 1e-12);
        assert!((w.w3 - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn overshoot_clamps_to_sibling_minus_gap() {
        let mut s = WeightSplitter::new();
        s.set_cut_point(CutPoint::First, 0.9);
        let (first, second) = s.cut_points();
        assert_eq!(first, second - MIN_GAP);

        let mut s = WeightSplitter::new();
        s.set_cut_point(CutPoint::Second, 0.0);
        let (first, second) = s.cut_points();
        assert_eq!(second, first + MIN_GAP);
    }

    #[test]
    fn out_of_range_positions_are_clamped() {
        let mut s = WeightSplitter::new();
        s.set_cut_point(CutPoint::First, -5.0);
        assert_eq!(s.cut_points().0, 0.0);
        s.set_cut_point(CutPoint::Second, 17.0);
        assert_eq!(s.cut_points().1, 1.0);
    }

    #[test]
    fn nearest_tie_resolves_to_first() {
        let s = WeightSplitter::new();
        // 0.5 is equidistant from 1/3 and 2/3.
        assert_eq!(s.nearest_cut_point(0.5), CutPoint::First);
        assert_eq!(s.nearest_cut_point(0.0), CutPoint::First);
        assert_eq!(s.nearest_cut_point(1.0), CutPoint::Second);
    }

    proptest! {
        #[test]
        fn invariants_hold_under_arbitrary_edits(
            moves in proptest::collection::vec((proptest::bool::ANY, -10.0f64..10.0), 0..64)
        ) {
            let mut s = WeightSplitter::new();
            for (first, pos) in moves {
                let which = if first { CutPoint::First } else { CutPoint::Second };
                s.set_cut_point(which, pos);

                let (a, b) = s.cut_points();
                prop_assert!((0.0..=1.0).contains(&a));
                prop_assert!((0.0..=1.0).contains(&b));
                prop_assert!(b - a >= MIN_GAP - 1e-12);

                let w = s.weights();
                prop_assert!(w.w1 >= 0.0 && w.w2 >= 0.0 && w.w3 >= 0.0);
                prop_assert!((w.w1 + w.w2 + w.w3 - 1.0).abs() < 1e-9);
            }
        }
    }
}
