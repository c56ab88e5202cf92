//! Human-readable labels for statistics columns.
//!
//! Used as table headers by the dashboard. Columns without an entry fall
//! back to their raw name.

/// `(column, label)` pairs.
pub const COLUMN_LABELS: &[(&str, &str)] = &[
    ("moped_component_id", "Component ID"),
    ("project_id", "Project ID"),
    ("project_name", "Project"),
    ("project_lead", "Lead"),
    ("component_name", "Name"),
    ("component_name_full", "Full Name"),
    ("component_subtype", "Subtype"),
    ("component_work_types", "Work Types"),
    ("type_name", "Type"),
    ("substantial_completion_date", "Completion Date"),
    ("completion_year", "Completion Year"),
    ("pre_crash_count", "Pre Crash Count"),
    ("post_crash_count", "Post Crash Count"),
    ("pre_annualized_crash_rate", "Pre Annualized Crash Rate"),
    ("post_annualized_crash_rate", "Post Annualized Crash Rate"),
    ("delta_crash_rate", "Delta Crash Rate"),
    ("pre_annualized_fatal_crash_rate", "Pre Annualized Fatal Crash Rate"),
    ("post_annualized_fatal_crash_rate", "Post Annualized Fatal Crash Rate"),
    ("delta_fatal_crash_rate", "Delta Fatal Crash Rate"),
    ("pre_annualized_injury_rate", "Pre Annualized Injury Rate"),
    ("post_annualized_injury_rate", "Post Annualized Injury Rate"),
    ("delta_injury_rate", "Delta Injury Rate"),
    ("pre_annualized_death_rate", "Pre Annualized Death Rate"),
    ("post_annualized_death_rate", "Post Annualized Death Rate"),
    ("delta_death_rate", "Delta Death Rate"),
    ("pre_annualized_cost", "Pre Annualized Cost"),
    ("post_annualized_cost", "Post Annualized Cost"),
    ("delta_comp_cost", "Delta Completion Cost"),
    ("component_had_fatal_crash", "Had Fatal Crash"),
];

/// Returns the display label for a column, or the column name itself when
/// no label is defined.
#[must_use]
pub fn column_label(column: &str) -> &str {
    COLUMN_LABELS
        .iter()
        .find(|(key, _)| *key == column)
        .map_or(column, |(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_column_has_label() {
        assert_eq!(column_label("delta_comp_cost"), "Delta Completion Cost");
        assert_eq!(column_label("component_had_fatal_crash"), "Had Fatal Crash");
    }

    #[test]
    fn unknown_column_falls_back_to_name() {
        assert_eq!(column_label("line_geometry"), "line_geometry");
    }

    #[test]
    fn column_keys_are_unique() {
        let mut keys: Vec<&str> = COLUMN_LABELS.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        assert_eq!(before, keys.len());
    }
}
