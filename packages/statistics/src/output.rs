//! CSV materialization of the statistics table and the raw matches.
//!
//! Missing values and `NaN` are written as `NA`. Geometries are written
//! as WKT. Reading accepts the same format back, so a written file
//! round-trips into identical rows.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use crash_impact_models::CrashComponentMatch;

use crate::StatisticsError;
use crate::record::StatisticsRecord;
use crate::statistics::ComponentStatistics;

/// Token written for missing values.
pub const MISSING_VALUE: &str = "NA";

/// Default location of the statistics file.
pub const DEFAULT_OUTPUT_PATH: &str = "output/annualized_statistics.csv";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Statistics file columns, in output order.
pub const STATISTICS_COLUMNS: [&str; 39] = [
    "moped_component_id",
    "project_id",
    "project_component_id",
    "project_name",
    "project_lead",
    "type_name",
    "component_name",
    "component_name_full",
    "component_subtype",
    "component_work_types",
    "substantial_completion_date",
    "years_before_completion",
    "years_after_completion",
    "pre_crash_count",
    "post_crash_count",
    "pre_fatal_crash_count",
    "post_fatal_crash_count",
    "pre_total_injury_count",
    "post_total_injury_count",
    "pre_total_death_count",
    "post_total_death_count",
    "pre_est_comp_cost",
    "post_est_comp_cost",
    "pre_annualized_crash_rate",
    "post_annualized_crash_rate",
    "delta_crash_rate",
    "pre_annualized_fatal_crash_rate",
    "post_annualized_fatal_crash_rate",
    "delta_fatal_crash_rate",
    "pre_annualized_injury_rate",
    "post_annualized_injury_rate",
    "delta_injury_rate",
    "pre_annualized_death_rate",
    "post_annualized_death_rate",
    "delta_death_rate",
    "pre_annualized_cost",
    "post_annualized_cost",
    "delta_comp_cost",
    "line_geometry",
];

const REQUIRED_COLUMNS: [&str; 2] = ["moped_component_id", "substantial_completion_date"];

/// Writes the statistics table as CSV.
///
/// # Errors
///
/// Returns [`StatisticsError::Csv`] if writing fails.
pub fn write_statistics<W: Write>(
    writer: W,
    rows: &[ComponentStatistics],
) -> Result<(), StatisticsError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(STATISTICS_COLUMNS)?;

    for row in rows {
        csv.serialize(StatisticsRecord::from(row))?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes the statistics table to `path`, creating parent directories and
/// overwriting any existing file.
///
/// # Errors
///
/// Returns [`StatisticsError`] if the directory or file cannot be written.
pub fn write_statistics_file(
    path: &Path,
    rows: &[ComponentStatistics],
) -> Result<(), StatisticsError> {
    let file = create_file(path)?;
    write_statistics(file, rows)?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Writes one CSV row per crash/component match.
///
/// # Errors
///
/// Returns [`StatisticsError::Csv`] if writing fails.
pub fn write_matches<W: Write>(
    writer: W,
    matches: &[CrashComponentMatch],
) -> Result<(), StatisticsError> {
    let mut csv = csv::Writer::from_writer(writer);
    for m in matches {
        csv.serialize(m)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the matches to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`StatisticsError`] if the directory or file cannot be written.
pub fn write_matches_file(
    path: &Path,
    matches: &[CrashComponentMatch],
) -> Result<(), StatisticsError> {
    let file = create_file(path)?;
    write_matches(file, matches)?;
    log::info!("Wrote {} matches to {}", matches.len(), path.display());
    Ok(())
}

fn create_file(path: &Path) -> Result<fs::File, StatisticsError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::File::create(path)?)
}

/// Reads a statistics table written by [`write_statistics`].
///
/// Columns are looked up by name, so extra columns are ignored and order
/// does not matter.
///
/// # Errors
///
/// Returns [`StatisticsError::MissingColumn`] if a required column is
/// absent, or [`StatisticsError::Parse`] for a malformed value.
pub fn read_statistics<R: Read>(reader: R) -> Result<Vec<ComponentStatistics>, StatisticsError> {
    let mut csv = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?;
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|name| name == required) {
            return Err(StatisticsError::MissingColumn(required.to_string()));
        }
    }

    csv.deserialize::<StatisticsRecord>()
        .map(|record| record.map(ComponentStatistics::from).map_err(read_error))
        .collect()
}

/// Reads a statistics file from disk.
///
/// # Errors
///
/// Returns [`StatisticsError`] if the file cannot be opened or parsed.
pub fn read_statistics_file(path: &Path) -> Result<Vec<ComponentStatistics>, StatisticsError> {
    read_statistics(fs::File::open(path)?)
}

fn read_error(e: csv::Error) -> StatisticsError {
    if let csv::ErrorKind::Deserialize { pos, err } = e.kind() {
        return StatisticsError::Parse {
            line: pos.as_ref().map_or(0, csv::Position::line),
            message: err.to_string(),
        };
    }
    e.into()
}

/// Parses the date formats a statistics file may carry: the written
/// `YYYY-MM-DD HH:MM:SS+HH:MM` form, RFC 3339, a naive timestamp, or a
/// bare date.
#[must_use]
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_str(value, DATE_FORMAT) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use geo::{Geometry, LineString};

    use crash_impact_models::ComponentMetadata;

    use super::*;
    use crate::{AnnualizedRates, ComponentWindows, WindowTotals};

    fn row() -> ComponentStatistics {
        ComponentStatistics {
            moped_component_id: 12,
            project_id: 3,
            project_component_id: 12,
            metadata: ComponentMetadata {
                project_name: Some("Lamar, Phase 2".to_string()),
                component_name: Some("Bike Lane".to_string()),
                ..ComponentMetadata::default()
            },
            substantial_completion_date: Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap(),
            years_before_completion: 2.5,
            years_after_completion: 0.0,
            windows: ComponentWindows {
                pre: WindowTotals {
                    crash_count: 5,
                    fatal_crash_count: 1,
                    injury_count: 2,
                    death_count: 1,
                    est_comp_cost: 1_250.5,
                },
                post: WindowTotals::default(),
            },
            pre_rates: AnnualizedRates {
                crash_rate: 2.0,
                fatal_crash_rate: 0.4,
                injury_rate: 0.8,
                death_rate: 0.4,
                cost: 500.2,
            },
            post_rates: AnnualizedRates {
                crash_rate: f64::NAN,
                fatal_crash_rate: f64::NAN,
                injury_rate: f64::NAN,
                death_rate: f64::NAN,
                cost: f64::NAN,
            },
            delta: AnnualizedRates {
                crash_rate: f64::NAN,
                fatal_crash_rate: f64::NAN,
                injury_rate: f64::NAN,
                death_rate: f64::NAN,
                cost: f64::NAN,
            },
            line_geometry: Some(Geometry::LineString(LineString::from(vec![
                (-97.75, 30.27),
                (-97.74, 30.28),
            ]))),
        }
    }

    fn written(rows: &[ComponentStatistics]) -> String {
        let mut buf = Vec::new();
        write_statistics(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_lists_columns_in_order() {
        let text = written(&[]);
        assert_eq!(text.trim_end(), STATISTICS_COLUMNS.join(","));
    }

    #[test]
    fn missing_and_nan_values_are_na() {
        let text = written(&[row()]);
        let line = text.lines().nth(1).unwrap();

        assert!(line.starts_with("12,3,12,\"Lamar, Phase 2\",NA,NA,Bike Lane,NA,NA,NA,"));
        assert!(line.contains("2021-06-01 00:00:00+00:00"));
        assert!(line.contains(",NA,NA,NA,"));
        assert!(!line.contains("NaN"));
        assert!(line.contains(",\"LINESTRING"));
    }

    #[test]
    fn written_rows_read_back() {
        let text = written(&[row()]);
        let rows = read_statistics(text.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);

        let back = &rows[0];
        let original = row();
        assert_eq!(back.moped_component_id, original.moped_component_id);
        assert_eq!(back.metadata, original.metadata);
        assert_eq!(back.substantial_completion_date, original.substantial_completion_date);
        assert_eq!(back.windows, original.windows);
        assert_eq!(back.pre_rates, original.pre_rates);
        assert!(back.post_rates.crash_rate.is_nan());
        assert_eq!(back.line_geometry, original.line_geometry);
    }

    #[test]
    fn missing_required_column_is_reported() {
        let err = read_statistics("project_id\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, StatisticsError::MissingColumn(c) if c == "moped_component_id"));
    }

    #[test]
    fn bad_number_reports_line_and_value() {
        let text = "moped_component_id,substantial_completion_date,pre_crash_count\n\
                    1,2021-01-01,lots\n";
        let err = read_statistics(text.as_bytes()).unwrap_err();
        match err {
            StatisticsError::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("lots"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn float_rendered_counts_are_accepted() {
        let text = "moped_component_id,substantial_completion_date,pre_crash_count\n\
                    7.0,2021-01-01T00:00:00Z,3.0\n";
        let rows = read_statistics(text.as_bytes()).unwrap();
        assert_eq!(rows[0].moped_component_id, 7);
        assert_eq!(rows[0].project_component_id, 7);
        assert_eq!(rows[0].windows.pre.crash_count, 3);
    }

    #[test]
    fn parse_date_accepts_common_forms() {
        let expected = Utc.with_ymd_and_hms(2020, 3, 4, 0, 0, 0).unwrap();
        for value in [
            "2020-03-04 00:00:00+00:00",
            "2020-03-04T00:00:00Z",
            "2020-03-04 00:00:00",
            "2020-03-04T00:00:00.000",
            "2020-03-04",
        ] {
            assert_eq!(parse_date(value), Some(expected), "{value}");
        }
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn matches_are_written_with_header() {
        let when = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let m = CrashComponentMatch {
            crash_project_component_id: "1-2-3".to_string(),
            crash_id: 1,
            project_id: 2,
            moped_component_id: 3,
            crash_date: when,
            substantial_completion_date: when,
            crash_fatal_binary: 0,
            crash_pre_completion: false,
            crash_post_completion: false,
            crash_project_date_diff: 0,
            tot_injry_cnt: 0,
            death_cnt: 0,
            est_comp_cost: 0.0,
            road_constr_zone_fl: Some("N".to_string()),
        };
        let mut buf = Vec::new();
        write_matches(&mut buf, &[m]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("crash_project_component_id,crash_id,"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1-2-3,1,2,3,"));
        assert!(row.ends_with(",N"));
    }
}
