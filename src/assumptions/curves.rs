//! Breakpoint interpolation for multi-year survey parameters
//!
//! Attrition and demographic growth are published as cumulative fractions at
//! 5, 10, 15 and 20 years. External return rates are published at 1, 5, 10
//! and 15 years after qualifying. Both are turned into continuous functions
//! of the number of years since the reference point.

use serde::{Deserialize, Serialize};

/// Piecewise-linear curve through (0, 0), (5, v5), (10, v10), (15, v15), (20, v20).
/// Held at `v20` beyond 20 years.
pub fn interpolate_breakpoints4(t: f64, v5: f64, v10: f64, v15: f64, v20: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t <= 5.0 {
        v5 * t / 5.0
    } else if t <= 10.0 {
        v5 + (v10 - v5) * (t - 5.0) / 5.0
    } else if t <= 15.0 {
        v10 + (v15 - v10) * (t - 10.0) / 5.0
    } else if t <= 20.0 {
        v15 + (v20 - v15) * (t - 15.0) / 5.0
    } else {
        v20
    }
}

/// Return-rate curve through (1, r1), (5, r5), (10, r10), (15, r15).
///
/// The first year is flat at `r1` (there is no ramp up from the origin), and
/// beyond 15 years the last segment's slope is extrapolated without a clamp.
pub fn interpolate_breakpoints_return(t: f64, r1: f64, r5: f64, r10: f64, r15: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t <= 1.0 {
        r1
    } else if t <= 5.0 {
        r1 + (r5 - r1) * (t - 1.0) / 4.0
    } else if t <= 10.0 {
        r5 + (r10 - r5) * (t - 5.0) / 5.0
    } else if t <= 15.0 {
        r10 + (r15 - r10) * (t - 10.0) / 5.0
    } else {
        r15 + (r15 - r10) * (t - 15.0) / 5.0
    }
}

/// Cumulative fraction leaving the workforce after 5/10/15/20 years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttritionCurve {
    pub at_5: f64,
    pub at_10: f64,
    pub at_15: f64,
    pub at_20: f64,
}

impl AttritionCurve {
    pub fn new(at_5: f64, at_10: f64, at_15: f64, at_20: f64) -> Self {
        Self { at_5, at_10, at_15, at_20 }
    }

    pub fn fraction_at(&self, t: f64) -> f64 {
        interpolate_breakpoints4(t, self.at_5, self.at_10, self.at_15, self.at_20)
    }

    /// Every breakpoint multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            at_5: self.at_5 * factor,
            at_10: self.at_10 * factor,
            at_15: self.at_15 * factor,
            at_20: self.at_20 * factor,
        }
    }

    pub fn breakpoints(&self) -> [f64; 4] {
        [self.at_5, self.at_10, self.at_15, self.at_20]
    }
}

/// Share of qualified practitioners still working in the profession
/// 1/5/10/15 years after qualifying
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnCurve {
    pub at_1: f64,
    pub at_5: f64,
    pub at_10: f64,
    pub at_15: f64,
}

impl ReturnCurve {
    pub fn new(at_1: f64, at_5: f64, at_10: f64, at_15: f64) -> Self {
        Self { at_1, at_5, at_10, at_15 }
    }

    pub fn rate_at(&self, t: f64) -> f64 {
        interpolate_breakpoints_return(t, self.at_1, self.at_5, self.at_10, self.at_15)
    }

    /// Sum of the return rate over `count` graduating sub-cohorts, the most
    /// experienced of which has been qualified for `latest` years.
    pub fn sum_over(&self, latest: u32, count: u32) -> f64 {
        let count = count.min(latest);
        ((latest - count + 1)..=latest)
            .map(|k| self.rate_at(f64::from(k)))
            .sum()
    }

    /// Mean return rate over the same window as [`ReturnCurve::sum_over`].
    /// Zero when the window is empty.
    pub fn average_over(&self, latest: u32, count: u32) -> f64 {
        let count = count.min(latest);
        if count == 0 {
            return 0.0;
        }
        self.sum_over(latest, count) / f64::from(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const WOMEN: AttritionCurve = AttritionCurve {
        at_5: 0.116,
        at_10: 0.232,
        at_15: 0.371,
        at_20: 0.51,
    };

    #[test]
    fn test_breakpoints4_exact_at_breakpoints() {
        assert_eq!(WOMEN.fraction_at(0.0), 0.0);
        assert_abs_diff_eq!(WOMEN.fraction_at(5.0), 0.116, epsilon = 1e-12);
        assert_abs_diff_eq!(WOMEN.fraction_at(10.0), 0.232, epsilon = 1e-12);
        assert_abs_diff_eq!(WOMEN.fraction_at(15.0), 0.371, epsilon = 1e-12);
        assert_abs_diff_eq!(WOMEN.fraction_at(20.0), 0.51, epsilon = 1e-12);
    }

    #[test]
    fn test_breakpoints4_interior_and_beyond_horizon() {
        // Halfway up the first segment
        assert_abs_diff_eq!(WOMEN.fraction_at(2.5), 0.058, epsilon = 1e-12);
        // 12 years: 0.232 + 0.139 * 2/5
        assert_abs_diff_eq!(WOMEN.fraction_at(12.0), 0.2876, epsilon = 1e-12);
        assert_eq!(WOMEN.fraction_at(25.0), 0.51);
        assert_eq!(WOMEN.fraction_at(60.0), 0.51);
        assert_eq!(WOMEN.fraction_at(-3.0), 0.0);
    }

    #[test]
    fn test_breakpoints4_non_decreasing() {
        let mut previous = 0.0;
        for step in 0..=200 {
            let value = WOMEN.fraction_at(step as f64 * 0.1);
            assert!(value >= previous, "decreased at t={}", step as f64 * 0.1);
            previous = value;
        }
    }

    #[test]
    fn test_return_curve_breakpoints() {
        let curve = ReturnCurve::new(0.989, 0.943, 0.889, 0.851);

        assert_eq!(curve.rate_at(0.0), 0.0);
        assert_eq!(curve.rate_at(0.5), 0.989);
        assert_abs_diff_eq!(curve.rate_at(1.0), 0.989, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.rate_at(5.0), 0.943, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.rate_at(10.0), 0.889, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.rate_at(15.0), 0.851, epsilon = 1e-12);
        // 3 years: 0.989 - 0.046 * 2/4
        assert_abs_diff_eq!(curve.rate_at(3.0), 0.966, epsilon = 1e-12);
    }

    #[test]
    fn test_return_curve_extrapolates_beyond_fifteen() {
        let curve = ReturnCurve::new(0.989, 0.943, 0.889, 0.851);

        // Slope of the 10-15 segment is -0.0076 per year
        assert_abs_diff_eq!(curve.rate_at(20.0), 0.813, epsilon = 1e-12);
        assert!(curve.rate_at(20.0) < curve.rate_at(15.0));
    }

    #[test]
    fn test_sum_over_matches_explicit_sub_cohorts() {
        let curve = ReturnCurve::new(0.989, 0.943, 0.889, 0.851);

        let explicit: f64 = [3.0, 4.0, 5.0, 6.0].iter().map(|&k| curve.rate_at(k)).sum();
        assert_abs_diff_eq!(curve.sum_over(6, 4), explicit, epsilon = 1e-12);
        assert_abs_diff_eq!(curve.average_over(6, 4), explicit / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_window() {
        let curve = ReturnCurve::new(0.989, 0.943, 0.889, 0.851);

        assert_eq!(curve.sum_over(0, 0), 0.0);
        assert_eq!(curve.average_over(5, 0), 0.0);
        // A window wider than the elapsed time only covers the elapsed years
        assert_abs_diff_eq!(curve.sum_over(2, 5), curve.sum_over(2, 2), epsilon = 1e-12);
    }

    #[test]
    fn test_scaled_attrition() {
        let doubled = WOMEN.scaled(2.0);
        assert_abs_diff_eq!(doubled.fraction_at(10.0), 0.464, epsilon = 1e-12);
        assert_eq!(WOMEN.scaled(1.0), WOMEN);
    }
}
