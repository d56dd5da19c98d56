//! Model Input Schema

/// Number of columns the model consumes
pub const FEATURE_COUNT: usize = 41;

/// Column names in the exact order the model was trained with
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "temp",
    "dew",
    "humidity",
    "windgust",
    "windspeed",
    "sealevelpressure",
    "cloudcover",
    "visibility",
    "solarradiation",
    "uvindex",
    "winddir_sin",
    "winddir_cos",
    "hour",
    "dayofweek",
    "quarter",
    "month",
    "year",
    "dayofyear",
    "dayofmonth",
    "weekofyear",
    "rolling_mean_24hr",
    "lag_1",
    "lag_24",
    "lag_168",
    "rolling_std_24hr",
    "rolling_mean",
    "season_Spring",
    "season_Summer",
    "season_Winter",
    "month_name_Aug",
    "month_name_Dec",
    "month_name_Feb",
    "month_name_Jan",
    "month_name_Jul",
    "month_name_Jun",
    "month_name_Mar",
    "month_name_May",
    "month_name_Nov",
    "month_name_Oct",
    "month_name_Sep",
    "week_type_Weekend",
];

/// Position of a schema column, if the name belongs to the schema
pub fn column_index(name: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| *c == name)
}

/// One model input row in schema order; `None` marks a missing value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub values: [Option<f64>; FEATURE_COUNT],
}

impl Default for FeatureRow {
    fn default() -> Self {
        Self {
            values: [None; FEATURE_COUNT],
        }
    }
}

impl FeatureRow {
    /// Build a row from values already in schema order
    pub fn new(values: [Option<f64>; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Value of a named column
    pub fn get(&self, name: &str) -> Option<f64> {
        column_index(name).and_then(|idx| self.values[idx])
    }

    /// Number of columns in the row
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; rows are fixed width
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode as model tensor data. Missing values become NaN, which tree
    /// ensembles route down their "missing" branch.
    pub fn to_model_input(&self) -> Vec<f32> {
        self.values
            .iter()
            .map(|v| v.map(|x| x as f32).unwrap_or(f32::NAN))
            .collect()
    }
}
