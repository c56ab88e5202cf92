//! Per-component totals for the pre and post completion windows.

use std::collections::BTreeMap;

use crash_impact_models::CrashComponentMatch;

/// Sums over the matches on one side of a component's completion date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowTotals {
    /// Matched crashes.
    pub crash_count: u64,
    /// Matched crashes flagged fatal.
    pub fatal_crash_count: u64,
    /// Injuries across matched crashes.
    pub injury_count: i64,
    /// Deaths across matched crashes.
    pub death_count: i64,
    /// Estimated comprehensive cost across matched crashes.
    pub est_comp_cost: f64,
}

impl WindowTotals {
    fn add(&mut self, m: &CrashComponentMatch) {
        self.crash_count += 1;
        self.fatal_crash_count += u64::from(m.crash_fatal_binary);
        self.injury_count += m.tot_injry_cnt;
        self.death_count += m.death_cnt;
        self.est_comp_cost += m.est_comp_cost;
    }
}

/// Pre and post totals for one component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentWindows {
    /// Totals for crashes strictly before completion.
    pub pre: WindowTotals,
    /// Totals for crashes strictly after completion.
    pub post: WindowTotals,
}

/// Groups matches by `moped_component_id` and sums each window.
///
/// A component appears in the result if it has at least one pre or one
/// post match; the window it has no matches in is all zeros. Components
/// whose only matches fall on the completion date itself are left out.
#[must_use]
pub fn aggregate_matches(matches: &[CrashComponentMatch]) -> BTreeMap<i64, ComponentWindows> {
    let mut windows: BTreeMap<i64, ComponentWindows> = BTreeMap::new();

    for m in matches {
        if m.crash_pre_completion {
            windows.entry(m.moped_component_id).or_default().pre.add(m);
        } else if m.crash_post_completion {
            windows.entry(m.moped_component_id).or_default().post.add(m);
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;

    fn matched(component: i64, pre: bool, post: bool, fatal: u32) -> CrashComponentMatch {
        let when = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        CrashComponentMatch {
            crash_project_component_id: format!("1-1-{component}"),
            crash_id: 1,
            project_id: 1,
            moped_component_id: component,
            crash_date: when,
            substantial_completion_date: when,
            crash_fatal_binary: fatal,
            crash_pre_completion: pre,
            crash_post_completion: post,
            crash_project_date_diff: 0,
            tot_injry_cnt: 3,
            death_cnt: i64::from(fatal),
            est_comp_cost: 250.5,
            road_constr_zone_fl: None,
        }
    }

    #[test]
    fn sums_each_window_separately() {
        let matches = vec![
            matched(5, true, false, 1),
            matched(5, true, false, 0),
            matched(5, false, true, 0),
        ];
        let windows = aggregate_matches(&matches);
        let w = windows[&5];

        assert_eq!(w.pre.crash_count, 2);
        assert_eq!(w.pre.fatal_crash_count, 1);
        assert_eq!(w.pre.injury_count, 6);
        assert_eq!(w.pre.death_count, 1);
        assert!((w.pre.est_comp_cost - 501.0).abs() < f64::EPSILON);
        assert_eq!(w.post.crash_count, 1);
        assert_eq!(w.post.fatal_crash_count, 0);
    }

    #[test]
    fn missing_window_is_zero_filled() {
        let windows = aggregate_matches(&[matched(9, true, false, 0)]);
        assert_eq!(windows[&9].post, WindowTotals::default());
    }

    #[test]
    fn completion_day_only_components_are_absent() {
        let windows = aggregate_matches(&[matched(3, false, false, 1)]);
        assert!(windows.is_empty());
    }

    #[test]
    fn results_are_ordered_by_component() {
        let windows = aggregate_matches(&[
            matched(30, true, false, 0),
            matched(4, false, true, 0),
            matched(12, true, false, 0),
        ]);
        assert_eq!(windows.keys().copied().collect::<Vec<_>>(), vec![4, 12, 30]);
    }
}
