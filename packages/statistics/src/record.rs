//! Flat CSV row of the statistics table.
//!
//! Field order is the file's column order. The `NA` token stands in for
//! anything missing: text reads back as `None`, floats as `NaN`, and
//! counts as zero.

use chrono::{DateTime, Utc};
use crash_impact_models::ComponentMetadata;
use geo::Geometry;
use serde::{Deserialize, Serialize};

use crate::aggregate::{ComponentWindows, WindowTotals};
use crate::rates::AnnualizedRates;
use crate::statistics::ComponentStatistics;

#[derive(Debug, Serialize, Deserialize)]
pub struct StatisticsRecord {
    #[serde(deserialize_with = "na::integer")]
    moped_component_id: i64,
    #[serde(default, deserialize_with = "na::integer")]
    project_id: i64,
    #[serde(default, with = "na::optional_integer")]
    project_component_id: Option<i64>,
    #[serde(default, with = "na::text")]
    project_name: Option<String>,
    #[serde(default, with = "na::text")]
    project_lead: Option<String>,
    #[serde(default, with = "na::text")]
    type_name: Option<String>,
    #[serde(default, with = "na::text")]
    component_name: Option<String>,
    #[serde(default, with = "na::text")]
    component_name_full: Option<String>,
    #[serde(default, with = "na::text")]
    component_subtype: Option<String>,
    #[serde(default, with = "na::text")]
    component_work_types: Option<String>,
    #[serde(with = "na::date")]
    substantial_completion_date: DateTime<Utc>,
    #[serde(default = "na::missing_float", with = "na::float")]
    years_before_completion: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    years_after_completion: f64,
    #[serde(default, deserialize_with = "na::count")]
    pre_crash_count: u64,
    #[serde(default, deserialize_with = "na::count")]
    post_crash_count: u64,
    #[serde(default, deserialize_with = "na::count")]
    pre_fatal_crash_count: u64,
    #[serde(default, deserialize_with = "na::count")]
    post_fatal_crash_count: u64,
    #[serde(default, deserialize_with = "na::integer")]
    pre_total_injury_count: i64,
    #[serde(default, deserialize_with = "na::integer")]
    post_total_injury_count: i64,
    #[serde(default, deserialize_with = "na::integer")]
    pre_total_death_count: i64,
    #[serde(default, deserialize_with = "na::integer")]
    post_total_death_count: i64,
    #[serde(default = "na::missing_float", with = "na::float")]
    pre_est_comp_cost: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    post_est_comp_cost: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    pre_annualized_crash_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    post_annualized_crash_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    delta_crash_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    pre_annualized_fatal_crash_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    post_annualized_fatal_crash_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    delta_fatal_crash_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    pre_annualized_injury_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    post_annualized_injury_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    delta_injury_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    pre_annualized_death_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    post_annualized_death_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    delta_death_rate: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    pre_annualized_cost: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    post_annualized_cost: f64,
    #[serde(default = "na::missing_float", with = "na::float")]
    delta_comp_cost: f64,
    #[serde(default, with = "na::geometry")]
    line_geometry: Option<Geometry<f64>>,
}

impl From<&ComponentStatistics> for StatisticsRecord {
    fn from(row: &ComponentStatistics) -> Self {
        let meta = row.metadata.clone();
        let (pre, post) = (&row.windows.pre, &row.windows.post);

        Self {
            moped_component_id: row.moped_component_id,
            project_id: row.project_id,
            project_component_id: Some(row.project_component_id),
            project_name: meta.project_name,
            project_lead: meta.project_lead,
            type_name: meta.type_name,
            component_name: meta.component_name,
            component_name_full: meta.component_name_full,
            component_subtype: meta.component_subtype,
            component_work_types: meta.component_work_types,
            substantial_completion_date: row.substantial_completion_date,
            years_before_completion: row.years_before_completion,
            years_after_completion: row.years_after_completion,
            pre_crash_count: pre.crash_count,
            post_crash_count: post.crash_count,
            pre_fatal_crash_count: pre.fatal_crash_count,
            post_fatal_crash_count: post.fatal_crash_count,
            pre_total_injury_count: pre.injury_count,
            post_total_injury_count: post.injury_count,
            pre_total_death_count: pre.death_count,
            post_total_death_count: post.death_count,
            pre_est_comp_cost: pre.est_comp_cost,
            post_est_comp_cost: post.est_comp_cost,
            pre_annualized_crash_rate: row.pre_rates.crash_rate,
            post_annualized_crash_rate: row.post_rates.crash_rate,
            delta_crash_rate: row.delta.crash_rate,
            pre_annualized_fatal_crash_rate: row.pre_rates.fatal_crash_rate,
            post_annualized_fatal_crash_rate: row.post_rates.fatal_crash_rate,
            delta_fatal_crash_rate: row.delta.fatal_crash_rate,
            pre_annualized_injury_rate: row.pre_rates.injury_rate,
            post_annualized_injury_rate: row.post_rates.injury_rate,
            delta_injury_rate: row.delta.injury_rate,
            pre_annualized_death_rate: row.pre_rates.death_rate,
            post_annualized_death_rate: row.post_rates.death_rate,
            delta_death_rate: row.delta.death_rate,
            pre_annualized_cost: row.pre_rates.cost,
            post_annualized_cost: row.post_rates.cost,
            delta_comp_cost: row.delta.cost,
            line_geometry: row.line_geometry.clone(),
        }
    }
}

impl From<StatisticsRecord> for ComponentStatistics {
    fn from(record: StatisticsRecord) -> Self {
        Self {
            moped_component_id: record.moped_component_id,
            project_id: record.project_id,
            project_component_id: record
                .project_component_id
                .unwrap_or(record.moped_component_id),
            metadata: ComponentMetadata {
                project_name: record.project_name,
                project_lead: record.project_lead,
                type_name: record.type_name,
                component_name: record.component_name,
                component_name_full: record.component_name_full,
                component_subtype: record.component_subtype,
                component_work_types: record.component_work_types,
            },
            substantial_completion_date: record.substantial_completion_date,
            years_before_completion: record.years_before_completion,
            years_after_completion: record.years_after_completion,
            windows: ComponentWindows {
                pre: WindowTotals {
                    crash_count: record.pre_crash_count,
                    fatal_crash_count: record.pre_fatal_crash_count,
                    injury_count: record.pre_total_injury_count,
                    death_count: record.pre_total_death_count,
                    est_comp_cost: record.pre_est_comp_cost,
                },
                post: WindowTotals {
                    crash_count: record.post_crash_count,
                    fatal_crash_count: record.post_fatal_crash_count,
                    injury_count: record.post_total_injury_count,
                    death_count: record.post_total_death_count,
                    est_comp_cost: record.post_est_comp_cost,
                },
            },
            pre_rates: AnnualizedRates {
                crash_rate: record.pre_annualized_crash_rate,
                fatal_crash_rate: record.pre_annualized_fatal_crash_rate,
                injury_rate: record.pre_annualized_injury_rate,
                death_rate: record.pre_annualized_death_rate,
                cost: record.pre_annualized_cost,
            },
            post_rates: AnnualizedRates {
                crash_rate: record.post_annualized_crash_rate,
                fatal_crash_rate: record.post_annualized_fatal_crash_rate,
                injury_rate: record.post_annualized_injury_rate,
                death_rate: record.post_annualized_death_rate,
                cost: record.post_annualized_cost,
            },
            delta: AnnualizedRates {
                crash_rate: record.delta_crash_rate,
                fatal_crash_rate: record.delta_fatal_crash_rate,
                injury_rate: record.delta_injury_rate,
                death_rate: record.delta_death_rate,
                cost: record.delta_comp_cost,
            },
            line_geometry: record.line_geometry,
        }
    }
}

/// `serde` helpers for `NA`-aware fields.
mod na {
    use serde::de::Error as _;
    use serde::{Deserialize as _, Deserializer};

    use crate::output::MISSING_VALUE;

    /// The trimmed field, or `None` when empty or `NA`.
    fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = String::deserialize(deserializer)?;
        let value = value.trim();
        Ok((!value.is_empty() && value != MISSING_VALUE).then(|| value.to_string()))
    }

    /// Accepts a float rendering such as `3.0`.
    #[allow(clippy::cast_possible_truncation)]
    fn parse_integer(value: &str) -> Result<i64, String> {
        if let Ok(parsed) = value.parse::<i64>() {
            return Ok(parsed);
        }
        match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => Ok(parsed as i64),
            _ => Err(format!("not an integer: {value}")),
        }
    }

    pub const fn missing_float() -> f64 {
        f64::NAN
    }

    pub fn integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        present(deserializer)?.map_or(Ok(0), |value| {
            parse_integer(&value).map_err(D::Error::custom)
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        u64::try_from(integer(deserializer)?).map_err(D::Error::custom)
    }

    pub mod optional_integer {
        use serde::de::Error as _;
        use serde::{Deserializer, Serializer};

        use crate::output::MISSING_VALUE;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_i64(*value),
                None => serializer.serialize_str(MISSING_VALUE),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            super::present(deserializer)?
                .map(|value| super::parse_integer(&value).map_err(D::Error::custom))
                .transpose()
        }
    }

    pub mod text {
        use serde::{Deserializer, Serializer};

        use crate::output::MISSING_VALUE;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<String>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(value.as_deref().unwrap_or(MISSING_VALUE))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<String>, D::Error> {
            super::present(deserializer)
        }
    }

    /// `NaN` is written as `NA`.
    pub mod float {
        use serde::de::Error as _;
        use serde::{Deserializer, Serializer};

        use crate::output::MISSING_VALUE;

        #[allow(clippy::trivially_copy_pass_by_ref)]
        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            if value.is_nan() {
                serializer.serialize_str(MISSING_VALUE)
            } else {
                serializer.collect_str(value)
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            super::present(deserializer)?.map_or(Ok(f64::NAN), |value| {
                value.parse().map_err(D::Error::custom)
            })
        }
    }

    pub mod date {
        use chrono::{DateTime, Utc};
        use serde::de::Error as _;
        use serde::{Deserializer, Serializer};

        use crate::output::{DATE_FORMAT, parse_date};

        pub fn serialize<S: Serializer>(
            value: &DateTime<Utc>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.collect_str(&value.format(DATE_FORMAT))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<DateTime<Utc>, D::Error> {
            let value = super::present(deserializer)?
                .ok_or_else(|| D::Error::custom("missing date"))?;
            parse_date(&value).ok_or_else(|| D::Error::custom(format!("unrecognized date: {value}")))
        }
    }

    /// Geometries as WKT.
    pub mod geometry {
        use crash_impact_geometry::{parse_wkt, to_wkt};
        use geo::Geometry;
        use serde::de::Error as _;
        use serde::{Deserializer, Serializer};

        use crate::output::MISSING_VALUE;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<Geometry<f64>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(geometry) => serializer.serialize_str(&to_wkt(geometry)),
                None => serializer.serialize_str(MISSING_VALUE),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Geometry<f64>>, D::Error> {
            super::present(deserializer)?
                .map(|value| parse_wkt(&value).map_err(D::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::STATISTICS_COLUMNS;

    #[test]
    fn field_names_follow_column_order() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let record = StatisticsRecord {
            moped_component_id: 1,
            project_id: 1,
            project_component_id: Some(1),
            project_name: None,
            project_lead: None,
            type_name: None,
            component_name: None,
            component_name_full: None,
            component_subtype: None,
            component_work_types: None,
            substantial_completion_date: DateTime::from_timestamp(0, 0).unwrap(),
            years_before_completion: 1.0,
            years_after_completion: 1.0,
            pre_crash_count: 0,
            post_crash_count: 0,
            pre_fatal_crash_count: 0,
            post_fatal_crash_count: 0,
            pre_total_injury_count: 0,
            post_total_injury_count: 0,
            pre_total_death_count: 0,
            post_total_death_count: 0,
            pre_est_comp_cost: 0.0,
            post_est_comp_cost: 0.0,
            pre_annualized_crash_rate: 0.0,
            post_annualized_crash_rate: 0.0,
            delta_crash_rate: 0.0,
            pre_annualized_fatal_crash_rate: 0.0,
            post_annualized_fatal_crash_rate: 0.0,
            delta_fatal_crash_rate: 0.0,
            pre_annualized_injury_rate: 0.0,
            post_annualized_injury_rate: 0.0,
            delta_injury_rate: 0.0,
            pre_annualized_death_rate: 0.0,
            post_annualized_death_rate: 0.0,
            delta_death_rate: 0.0,
            pre_annualized_cost: 0.0,
            post_annualized_cost: 0.0,
            delta_comp_cost: 0.0,
            line_geometry: None,
        };
        writer.serialize(record).unwrap();
        let written = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(written.lines().next().unwrap(), STATISTICS_COLUMNS.join(","));
    }
}
