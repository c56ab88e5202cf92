//! Annualized rates and pre/post deltas.

use crate::aggregate::WindowTotals;

/// Per-year rates for one window, or the difference between two windows.
///
/// Zero or negative `years` are not guarded against: dividing by them
/// yields `inf`, `-inf`, `NaN`, or a negative rate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnnualizedRates {
    /// Crashes per year.
    pub crash_rate: f64,
    /// Fatal crashes per year.
    pub fatal_crash_rate: f64,
    /// Injuries per year.
    pub injury_rate: f64,
    /// Deaths per year.
    pub death_rate: f64,
    /// Estimated comprehensive cost per year.
    pub cost: f64,
}

impl AnnualizedRates {
    /// Divides every total by `years`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn annualize(totals: &WindowTotals, years: f64) -> Self {
        Self {
            crash_rate: totals.crash_count as f64 / years,
            fatal_crash_rate: totals.fatal_crash_count as f64 / years,
            injury_rate: totals.injury_count as f64 / years,
            death_rate: totals.death_count as f64 / years,
            cost: totals.est_comp_cost / years,
        }
    }

    /// `post - pre` for every metric.
    #[must_use]
    pub fn delta(pre: &Self, post: &Self) -> Self {
        Self {
            crash_rate: post.crash_rate - pre.crash_rate,
            fatal_crash_rate: post.fatal_crash_rate - pre.fatal_crash_rate,
            injury_rate: post.injury_rate - pre.injury_rate,
            death_rate: post.death_rate - pre.death_rate,
            cost: post.cost - pre.cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> WindowTotals {
        WindowTotals {
            crash_count: 10,
            fatal_crash_count: 1,
            injury_count: 4,
            death_count: 2,
            est_comp_cost: 50_000.0,
        }
    }

    #[test]
    fn annualize_divides_by_years() {
        let rates = AnnualizedRates::annualize(&totals(), 2.5);
        assert!((rates.crash_rate - 4.0).abs() < f64::EPSILON);
        assert!((rates.fatal_crash_rate - 0.4).abs() < f64::EPSILON);
        assert!((rates.injury_rate - 1.6).abs() < f64::EPSILON);
        assert!((rates.death_rate - 0.8).abs() < f64::EPSILON);
        assert!((rates.cost - 20_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_totals_give_zero_rates() {
        let rates = AnnualizedRates::annualize(&WindowTotals::default(), 3.0);
        assert_eq!(rates, AnnualizedRates::default());
    }

    #[test]
    fn zero_years_are_not_guarded() {
        let rates = AnnualizedRates::annualize(&totals(), 0.0);
        assert!(rates.crash_rate.is_infinite());

        let empty = AnnualizedRates::annualize(&WindowTotals::default(), 0.0);
        assert!(empty.crash_rate.is_nan());

        let negative = AnnualizedRates::annualize(&totals(), -2.0);
        assert!((negative.crash_rate + 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn delta_is_post_minus_pre() {
        let pre = AnnualizedRates::annualize(&totals(), 5.0);
        let post = AnnualizedRates::annualize(&WindowTotals::default(), 2.0);
        let delta = AnnualizedRates::delta(&pre, &post);
        assert!((delta.crash_rate + 2.0).abs() < f64::EPSILON);
        assert!((delta.cost + 10_000.0).abs() < f64::EPSILON);
    }
}
