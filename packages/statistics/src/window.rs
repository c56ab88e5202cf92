//! Dataset time bounds and pre/post classification of matches.

use chrono::{DateTime, TimeDelta, Utc};
use crash_impact_models::{Crash, CrashComponentMatch, ProjectComponent};

/// Days per year used when converting elapsed days to years.
pub const DAYS_PER_YEAR: f64 = 365.25;

const SECONDS_PER_DAY: i64 = 86_400;

/// Earliest and latest crash dates across the whole crash dataset.
///
/// These bound every component's pre and post windows, so they are taken
/// over all crashes with a location, not just the matched ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetWindow {
    /// Earliest crash date.
    pub earliest: DateTime<Utc>,
    /// Latest crash date.
    pub latest: DateTime<Utc>,
}

impl DatasetWindow {
    /// Computes the window from a set of crashes, or `None` if there are
    /// no crashes at all.
    #[must_use]
    pub fn from_crashes(crashes: &[Crash]) -> Option<Self> {
        let earliest = crashes.iter().map(|c| c.date).min()?;
        let latest = crashes.iter().map(|c| c.date).max()?;

        Some(Self { earliest, latest })
    }

    /// Years of crash data before `completion`.
    ///
    /// Negative when the component was completed before the first crash.
    #[must_use]
    pub fn years_before(&self, completion: DateTime<Utc>) -> f64 {
        days_to_years(whole_days(completion - self.earliest))
    }

    /// Years of crash data after `completion`.
    ///
    /// Negative when the component was completed after the last crash.
    #[must_use]
    pub fn years_after(&self, completion: DateTime<Utc>) -> f64 {
        days_to_years(whole_days(self.latest - completion))
    }
}

/// Whole days in `delta`, rounded toward negative infinity.
///
/// A completion a few hours before the first crash is `-1` days, not `0`.
#[must_use]
pub const fn whole_days(delta: TimeDelta) -> i64 {
    delta.num_seconds().div_euclid(SECONDS_PER_DAY)
}

#[allow(clippy::cast_precision_loss)]
fn days_to_years(days: i64) -> f64 {
    days as f64 / DAYS_PER_YEAR
}

/// Builds the match record for a crash that fell inside a component's
/// buffer.
///
/// A crash on the completion date itself is neither pre nor post.
#[must_use]
pub fn classify_match(crash: &Crash, component: &ProjectComponent) -> CrashComponentMatch {
    let completion = component.completion_date;

    CrashComponentMatch {
        crash_project_component_id: CrashComponentMatch::composite_key(
            crash.id,
            component.project_id,
            component.component_id,
        ),
        crash_id: crash.id,
        project_id: component.project_id,
        moped_component_id: component.component_id,
        crash_date: crash.date,
        substantial_completion_date: completion,
        crash_fatal_binary: crash.fatal_binary(),
        crash_pre_completion: crash.date < completion,
        crash_post_completion: crash.date > completion,
        crash_project_date_diff: whole_days(completion - crash.date),
        tot_injry_cnt: crash.injury_count,
        death_cnt: crash.death_count,
        est_comp_cost: crash.estimated_cost,
        road_constr_zone_fl: crash.construction_zone.clone(),
    }
}
