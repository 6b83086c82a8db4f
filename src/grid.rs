//!
//! # Grid and Interval Primitives
//!
//! Snapping of floating-point coordinates onto the manufacturing grid,
//! one-dimensional [Interval]s, and the overlap test shared by the
//! clearance finder and every fill algorithm.
//!

use approx::relative_eq;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{FillError, Result};
use crate::geom::{Dir, Rect};

/// Number of decimal places kept when pre-rounding a grid ratio.
const GRID_RATIO_DP: u32 = 2;

/// # Manufacturing Grid
///
/// All emitted geometry is snapped to integer multiples of `pitch`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pitch: f64,
}

impl Grid {
    pub fn new(pitch: f64) -> Self {
        assert!(
            pitch.is_finite() && pitch > 0.,
            "grid pitch must be positive, got {pitch}"
        );
        Self { pitch }
    }

    #[inline]
    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Snap `v` to the nearest grid multiple.
    ///
    /// The ratio `v / pitch` is first rounded to two decimals and only then
    /// to an integer, so binary noise such as `56.99999999` lands on `57`.
    /// Both stages round half to even. Non-finite values pass through unchanged.
    pub fn round_to_grid(&self, v: f64) -> f64 {
        self.snap(v, RoundingStrategy::MidpointNearestEven)
    }

    /// The smallest grid multiple not less than `v`, after the same two-decimal pre-rounding.
    pub fn ceil_to_grid(&self, v: f64) -> f64 {
        self.snap(v, RoundingStrategy::ToPositiveInfinity)
    }

    /// The largest grid multiple not greater than `v`, after the same two-decimal pre-rounding.
    pub fn floor_to_grid(&self, v: f64) -> f64 {
        self.snap(v, RoundingStrategy::ToNegativeInfinity)
    }

    fn snap(&self, v: f64, strategy: RoundingStrategy) -> f64 {
        if !v.is_finite() {
            return v;
        }
        let ratio = v / self.pitch;
        let ticks = Decimal::from_f64(ratio)
            .map(|d| {
                d.round_dp_with_strategy(GRID_RATIO_DP, RoundingStrategy::MidpointNearestEven)
                    .round_dp_with_strategy(0, strategy)
            })
            .and_then(|d| d.to_f64())
            .unwrap_or_else(|| ratio.round());
        ticks * self.pitch
    }

    /// Whether `v` is a grid multiple, within floating tolerance.
    pub fn is_on_grid(&self, v: f64) -> bool {
        let ratio = v / self.pitch;
        relative_eq!(ratio, ratio.round(), epsilon = 1e-6)
    }

    /// The grid-rounded `(min, max)` projection of `shape` onto axis `dir`.
    pub fn axis_extent(&self, shape: &Rect, dir: Dir) -> Interval {
        let span = shape.span(dir);
        Interval::new(self.round_to_grid(span.start), self.round_to_grid(span.end))
    }

    /// Snap both ends of `interval`.
    pub fn round_interval(&self, interval: Interval) -> Interval {
        Interval::new(
            self.round_to_grid(interval.start),
            self.round_to_grid(interval.end),
        )
    }

    /// Snap every edge of `rect`.
    pub fn round_rect(&self, rect: &Rect) -> Rect {
        Rect::from_spans(
            rect.layer.clone(),
            rect.purpose.clone(),
            self.axis_extent(rect, Dir::Horiz),
            self.axis_extent(rect, Dir::Vert),
        )
    }
}

/// # One-Dimensional Interval
///
/// A closed span `[start, end]` on a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// Create a new [Interval], sorting its endpoints.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Intervals of zero or negative length are dropped wherever they appear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Closed containment of `v`.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.start <= v && v <= self.end
    }

    /// The common part of two intervals, if it has positive length.
    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let out = Interval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        };
        (!out.is_empty()).then_some(out)
    }

    /// Check the interval is finite and ordered, without reordering it.
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(FillError::NonFinite("interval"));
        }
        if self.start > self.end {
            return Err(FillError::InvalidInterval {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

impl From<(f64, f64)> for Interval {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// Closed one-dimensional overlap test.
///
/// Each range is sorted, then the two are ordered by span;
/// they overlap iff an endpoint of the smaller lies within the larger.
/// Touching and nested ranges overlap; disjoint ranges never do.
pub fn ranges_overlap(a: Interval, b: Interval) -> bool {
    let a = Interval::new(a.start, a.end);
    let b = Interval::new(b.start, b.end);
    let (small, large) = if a.length() <= b.length() {
        (a, b)
    } else {
        (b, a)
    };
    large.contains(small.start) || large.contains(small.end)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::geom::Point;

    #[test]
    fn test_round_to_grid() {
        let grid = Grid::new(0.005);
        assert_relative_eq!(grid.round_to_grid(0.1234), 0.125, epsilon = 1e-12);
        assert_relative_eq!(grid.round_to_grid(0.28499999999), 0.285, epsilon = 1e-12);
        assert_relative_eq!(grid.round_to_grid(-0.0124), -0.01, epsilon = 1e-12);
        assert_eq!(grid.round_to_grid(0.), 0.);
    }

    #[test]
    fn test_round_half_even() {
        let grid = Grid::new(0.005);
        let ticks = |v: f64| {
            Decimal::from_f64(grid.round_to_grid(v) / grid.pitch())
                .unwrap()
                .round_dp(6)
        };
        assert_eq!(ticks(0.0125), dec!(2));
        assert_eq!(ticks(0.0175), dec!(4));
        assert_eq!(ticks(-0.0125), dec!(-2));
    }

    #[test]
    fn test_round_to_grid_idempotent() {
        let grid = Grid::new(0.005);
        for i in -2000..2000 {
            let x = i as f64 * 0.000731 + 0.0001;
            let once = grid.round_to_grid(x);
            assert_eq!(grid.round_to_grid(once), once, "x = {x}");
            assert!(grid.is_on_grid(once), "x = {x}");
        }
    }

    #[test]
    fn test_ceil_floor_to_grid() {
        let grid = Grid::new(0.005);
        assert_relative_eq!(grid.ceil_to_grid(0.2862), 0.29, epsilon = 1e-12);
        assert_relative_eq!(grid.floor_to_grid(0.2862), 0.285, epsilon = 1e-12);
        // Values already on the grid stay put, binary noise notwithstanding.
        assert_relative_eq!(grid.ceil_to_grid(57. * 0.005), 0.285, epsilon = 1e-12);
    }

    #[test]
    fn test_round_non_finite() {
        let grid = Grid::new(1.);
        assert!(grid.round_to_grid(f64::NAN).is_nan());
        assert_eq!(grid.round_to_grid(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_ranges_overlap() {
        let iv = |a, b| Interval::new(a, b);
        // Containment and partial overlap
        assert!(ranges_overlap(iv(0., 10.), iv(3., 5.)));
        assert!(ranges_overlap(iv(3., 5.), iv(0., 10.)));
        assert!(ranges_overlap(iv(0., 4.), iv(3., 9.)));
        // Touching
        assert!(ranges_overlap(iv(0., 3.), iv(3., 5.)));
        // Reversed endpoints are sorted first
        assert!(ranges_overlap(iv(5., 3.), iv(4., 4.5)));
        // Disjoint, including equal-size disjoint ranges
        assert!(!ranges_overlap(iv(0., 1.), iv(2., 3.)));
        assert!(!ranges_overlap(iv(0., 2.), iv(5., 7.)));
    }

    #[test]
    fn test_ranges_overlap_unsorted_fields() {
        let a = Interval { start: 5., end: 3. };
        assert!(ranges_overlap(a, Interval::new(4., 4.5)));
    }

    #[test]
    fn test_axis_extent() {
        let grid = Grid::new(0.005);
        let r = Rect::new("m1", Point::new(0.1001, 0.2), 0.3, 0.1);
        let ext = grid.axis_extent(&r, Dir::Horiz);
        assert_relative_eq!(ext.start, 0.1, epsilon = 1e-12);
        assert_relative_eq!(ext.end, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_interval_validate() {
        assert!(Interval { start: 1., end: 0. }.validate().is_err());
        assert!(Interval { start: 0., end: f64::NAN }.validate().is_err());
        assert!(Interval::new(1., 0.).validate().is_ok());
    }

    #[test]
    fn test_interval_intersection() {
        let a = Interval::new(0., 5.);
        assert_eq!(
            a.intersection(&Interval::new(3., 8.)),
            Some(Interval::new(3., 5.))
        );
        assert_eq!(a.intersection(&Interval::new(5., 8.)), None);
    }
}
