//! Feature Vector Assembly

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::{CalendarFeatures, MonthFlags, SeasonFlags};
use crate::history::LagFeatures;
use crate::observation::RawObservation;
use crate::schema::{FeatureRow, FEATURE_COUNT};

/// Feature vector in model column order.
///
/// Field order mirrors `FEATURE_COLUMNS`; serde names are the column names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatureVector {
    pub temp: f64,
    pub dew: f64,
    pub humidity: f64,
    pub windgust: f64,
    pub windspeed: f64,
    pub sealevelpressure: f64,
    pub cloudcover: f64,
    pub visibility: f64,
    pub solarradiation: f64,
    pub uvindex: f64,
    pub winddir_sin: f64,
    pub winddir_cos: f64,

    pub hour: u32,
    pub dayofweek: u32,
    pub quarter: u32,
    pub month: u32,
    pub year: i32,
    pub dayofyear: u32,
    pub dayofmonth: u32,
    pub weekofyear: u32,

    pub rolling_mean_24hr: Option<f64>,
    pub lag_1: Option<f64>,
    pub lag_24: Option<f64>,
    pub lag_168: Option<f64>,
    pub rolling_std_24hr: Option<f64>,
    pub rolling_mean: Option<f64>,

    #[serde(rename = "season_Spring")]
    pub season_spring: u8,
    #[serde(rename = "season_Summer")]
    pub season_summer: u8,
    #[serde(rename = "season_Winter")]
    pub season_winter: u8,

    #[serde(rename = "month_name_Aug")]
    pub month_name_aug: u8,
    #[serde(rename = "month_name_Dec")]
    pub month_name_dec: u8,
    #[serde(rename = "month_name_Feb")]
    pub month_name_feb: u8,
    #[serde(rename = "month_name_Jan")]
    pub month_name_jan: u8,
    #[serde(rename = "month_name_Jul")]
    pub month_name_jul: u8,
    #[serde(rename = "month_name_Jun")]
    pub month_name_jun: u8,
    #[serde(rename = "month_name_Mar")]
    pub month_name_mar: u8,
    #[serde(rename = "month_name_May")]
    pub month_name_may: u8,
    #[serde(rename = "month_name_Nov")]
    pub month_name_nov: u8,
    #[serde(rename = "month_name_Oct")]
    pub month_name_oct: u8,
    #[serde(rename = "month_name_Sep")]
    pub month_name_sep: u8,

    #[serde(rename = "week_type_Weekend")]
    pub week_type_weekend: u8,
}

impl DerivedFeatureVector {
    /// Lag and rolling fields as one group
    pub fn lag_features(&self) -> LagFeatures {
        LagFeatures {
            rolling_mean_24hr: self.rolling_mean_24hr,
            lag_1: self.lag_1,
            lag_24: self.lag_24,
            lag_168: self.lag_168,
            rolling_std_24hr: self.rolling_std_24hr,
            rolling_mean: self.rolling_mean,
        }
    }

    /// Flatten into a model input row
    pub fn to_row(&self) -> FeatureRow {
        let flag = |v: u8| Some(f64::from(v));
        let values: [Option<f64>; FEATURE_COUNT] = [
            Some(self.temp),
            Some(self.dew),
            Some(self.humidity),
            Some(self.windgust),
            Some(self.windspeed),
            Some(self.sealevelpressure),
            Some(self.cloudcover),
            Some(self.visibility),
            Some(self.solarradiation),
            Some(self.uvindex),
            Some(self.winddir_sin),
            Some(self.winddir_cos),
            Some(f64::from(self.hour)),
            Some(f64::from(self.dayofweek)),
            Some(f64::from(self.quarter)),
            Some(f64::from(self.month)),
            Some(f64::from(self.year)),
            Some(f64::from(self.dayofyear)),
            Some(f64::from(self.dayofmonth)),
            Some(f64::from(self.weekofyear)),
            self.rolling_mean_24hr,
            self.lag_1,
            self.lag_24,
            self.lag_168,
            self.rolling_std_24hr,
            self.rolling_mean,
            flag(self.season_spring),
            flag(self.season_summer),
            flag(self.season_winter),
            flag(self.month_name_aug),
            flag(self.month_name_dec),
            flag(self.month_name_feb),
            flag(self.month_name_jan),
            flag(self.month_name_jul),
            flag(self.month_name_jun),
            flag(self.month_name_mar),
            flag(self.month_name_may),
            flag(self.month_name_nov),
            flag(self.month_name_oct),
            flag(self.month_name_sep),
            flag(self.week_type_weekend),
        ];
        FeatureRow::new(values)
    }
}

/// Derives model features from raw observations
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureDeriver;

impl FeatureDeriver {
    pub fn new() -> Self {
        Self
    }

    /// Derive features for a single observation with no history.
    /// Every lag and rolling field is left missing.
    pub fn derive(&self, obs: &RawObservation) -> DerivedFeatureVector {
        self.derive_with_history(obs, LagFeatures::missing())
    }

    /// Derive features for an observation whose lag/rolling values are known
    pub fn derive_with_history(&self, obs: &RawObservation, lags: LagFeatures) -> DerivedFeatureVector {
        let calendar = CalendarFeatures::from_datetime(&obs.timestamp);
        let season = SeasonFlags::from(calendar.season());
        let months = MonthFlags::from_month(calendar.month);
        let radians = obs.winddir_degree.to_radians();

        debug!(
            "Deriving features for {}: month={}, dayofweek={}, lags_present={}",
            obs.timestamp,
            calendar.month,
            calendar.dayofweek,
            lags.present_count()
        );

        DerivedFeatureVector {
            temp: obs.temp,
            dew: obs.dew,
            humidity: obs.humidity,
            windgust: obs.windgust,
            windspeed: obs.windspeed,
            sealevelpressure: obs.sealevelpressure,
            cloudcover: obs.cloudcover,
            visibility: obs.visibility,
            solarradiation: obs.solarradiation,
            uvindex: obs.uvindex,
            winddir_sin: radians.sin(),
            winddir_cos: radians.cos(),

            hour: calendar.hour,
            dayofweek: calendar.dayofweek,
            quarter: calendar.quarter,
            month: calendar.month,
            year: calendar.year,
            dayofyear: calendar.dayofyear,
            dayofmonth: calendar.dayofmonth,
            weekofyear: calendar.weekofyear,

            rolling_mean_24hr: lags.rolling_mean_24hr,
            lag_1: lags.lag_1,
            lag_24: lags.lag_24,
            lag_168: lags.lag_168,
            rolling_std_24hr: lags.rolling_std_24hr,
            rolling_mean: lags.rolling_mean,

            season_spring: season.spring.into(),
            season_summer: season.summer.into(),
            season_winter: season.winter.into(),

            month_name_aug: months.aug.into(),
            month_name_dec: months.dec.into(),
            month_name_feb: months.feb.into(),
            month_name_jan: months.jan.into(),
            month_name_jul: months.jul.into(),
            month_name_jun: months.jun.into(),
            month_name_mar: months.mar.into(),
            month_name_may: months.may.into(),
            month_name_nov: months.nov.into(),
            month_name_oct: months.oct.into(),
            month_name_sep: months.sep.into(),

            week_type_weekend: calendar.is_weekend().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_timestamp, FEATURE_COLUMNS};
    use proptest::prelude::*;

    fn observation(raw_ts: &str, winddir_degree: f64) -> RawObservation {
        RawObservation {
            timestamp: parse_timestamp(raw_ts).unwrap(),
            temp: 25.0,
            dew: 10.0,
            humidity: 60.0,
            windgust: 20.0,
            windspeed: 10.0,
            sealevelpressure: 1013.0,
            cloudcover: 0.5,
            visibility: 10.0,
            solarradiation: 500.0,
            uvindex: 5.0,
            winddir_degree,
        }
    }

    fn month_columns(row: &FeatureRow) -> Vec<(&'static str, f64)> {
        FEATURE_COLUMNS
            .iter()
            .filter(|c| c.starts_with("month_name_"))
            .map(|c| (*c, row.get(c).unwrap()))
            .collect()
    }

    #[test]
    fn test_monday_in_january() {
        let features = FeatureDeriver::new().derive(&observation("2024-01-15 10:00", 90.0));
        let row = features.to_row();

        assert_eq!(row.get("month_name_Jan"), Some(1.0));
        for (name, value) in month_columns(&row) {
            if name != "month_name_Jan" {
                assert_eq!(value, 0.0, "{name}");
            }
        }
        assert_eq!(row.get("season_Winter"), Some(1.0));
        assert_eq!(row.get("season_Spring"), Some(0.0));
        assert_eq!(row.get("season_Summer"), Some(0.0));
        assert_eq!(row.get("week_type_Weekend"), Some(0.0));
        assert_eq!(row.get("quarter"), Some(1.0));
        assert_eq!(row.get("dayofweek"), Some(0.0));
    }

    #[test]
    fn test_manual_input_has_missing_history() {
        let features = FeatureDeriver::new().derive(&observation("2024-07-06 18:00", 0.0));
        let row = features.to_row();
        for name in [
            "rolling_mean_24hr",
            "lag_1",
            "lag_24",
            "lag_168",
            "rolling_std_24hr",
            "rolling_mean",
        ] {
            assert_eq!(row.get(name), None, "{name}");
        }
        assert!(row.to_model_input()[21].is_nan());
        assert_eq!(features.week_type_weekend, 1);
    }

    #[test]
    fn test_wind_direction_90_degrees() {
        let features = FeatureDeriver::new().derive(&observation("2024-05-01 00:00", 90.0));
        assert!((features.winddir_sin - 1.0).abs() < 1e-9);
        assert!(features.winddir_cos.abs() < 1e-9);
    }

    #[test]
    fn test_wind_direction_cardinal_points() {
        let deriver = FeatureDeriver::new();
        let expected = [(0.0, 0.0, 1.0), (90.0, 1.0, 0.0), (180.0, 0.0, -1.0), (270.0, -1.0, 0.0)];
        for (deg, sin, cos) in expected {
            let f = deriver.derive(&observation("2024-05-01 00:00", deg));
            assert!((f.winddir_sin - sin).abs() < 1e-9, "sin {deg}");
            assert!((f.winddir_cos - cos).abs() < 1e-9, "cos {deg}");
        }
    }

    #[test]
    fn test_row_order_matches_schema() {
        let features = FeatureDeriver::new().derive(&observation("2023-10-09 13:00", 45.0));
        let row = features.to_row();
        assert_eq!(row.values[0], Some(25.0));
        assert_eq!(row.values[12], Some(13.0));
        assert_eq!(row.values[16], Some(2023.0));
        assert_eq!(row.get("month_name_Oct"), Some(1.0));
        assert_eq!(row.get("season_Spring"), Some(0.0));
        assert_eq!(row.get("season_Summer"), Some(0.0));
        assert_eq!(row.get("season_Winter"), Some(0.0));
    }

    #[test]
    fn test_serialized_names_match_schema() {
        let features = FeatureDeriver::new().derive(&observation("2024-01-15 10:00", 90.0));
        let json = serde_json::to_value(features).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), FEATURE_COLUMNS.len());
        for name in FEATURE_COLUMNS {
            assert!(object.contains_key(name), "{name}");
        }
        assert!(object["lag_1"].is_null());
    }

    proptest! {
        #[test]
        fn prop_wind_components_on_unit_circle(deg in 0.0f64..=360.0) {
            let f = FeatureDeriver::new().derive(&observation("2024-05-01 00:00", deg));
            let norm = f.winddir_sin.powi(2) + f.winddir_cos.powi(2);
            prop_assert!((norm - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_single_month_flag(month in 1u32..=12, day in 1u32..=28, hour in 0u32..24) {
            let raw = format!("2022-{:02}-{:02} {:02}:00", month, day, hour);
            let row = FeatureDeriver::new().derive(&observation(&raw, 10.0)).to_row();
            let set: f64 = month_columns(&row).iter().map(|(_, v)| v).sum();
            let expected = if month == 4 { 0.0 } else { 1.0 };
            prop_assert_eq!(set, expected);
        }
    }
}
