use serde::ser::SerializeMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::scoring::BASE_EFFICIENCY_KM_PER_L;

/// Vehicle identifier recorded when the submitted one is blank.
pub const UNSPECIFIED_VEHICLE: &str = "미지정";

/// Closed set of driving-behavior events counted by the telematics export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Overspeeding,
    LongOverspeeding,
    SuddenAcceleration,
    SuddenStart,
    SuddenDeceleration,
    SuddenStop,
    SuddenLeftTurn,
    SuddenRightTurn,
    SuddenUTurn,
    SuddenOvertaking,
    SuddenLaneChange,
}

impl RiskCategory {
    pub const COUNT: usize = 11;

    pub const fn ordered() -> [Self; Self::COUNT] {
        [
            Self::Overspeeding,
            Self::LongOverspeeding,
            Self::SuddenAcceleration,
            Self::SuddenStart,
            Self::SuddenDeceleration,
            Self::SuddenStop,
            Self::SuddenLeftTurn,
            Self::SuddenRightTurn,
            Self::SuddenUTurn,
            Self::SuddenOvertaking,
            Self::SuddenLaneChange,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Overspeeding => "과속",
            Self::LongOverspeeding => "장기과속",
            Self::SuddenAcceleration => "급가속",
            Self::SuddenStart => "급출발",
            Self::SuddenDeceleration => "급감속",
            Self::SuddenStop => "급정지",
            Self::SuddenLeftTurn => "급좌회전",
            Self::SuddenRightTurn => "급우회전",
            Self::SuddenUTurn => "급U턴",
            Self::SuddenOvertaking => "급앞지르기",
            Self::SuddenLaneChange => "급진로변경",
        }
    }

    /// Field name used by the dashboard form and CSV exports.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Overspeeding => "overspeeding",
            Self::LongOverspeeding => "longOverspeeding",
            Self::SuddenAcceleration => "suddenAccel",
            Self::SuddenStart => "suddenStart",
            Self::SuddenDeceleration => "suddenDecel",
            Self::SuddenStop => "suddenStop",
            Self::SuddenLeftTurn => "suddenLeft",
            Self::SuddenRightTurn => "suddenRight",
            Self::SuddenUTurn => "suddenUturn",
            Self::SuddenOvertaking => "suddenOvertaking",
            Self::SuddenLaneChange => "suddenLaneChange",
        }
    }

    /// Name used in serialized payloads; matches the serde representation.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Overspeeding => "overspeeding",
            Self::LongOverspeeding => "long_overspeeding",
            Self::SuddenAcceleration => "sudden_acceleration",
            Self::SuddenStart => "sudden_start",
            Self::SuddenDeceleration => "sudden_deceleration",
            Self::SuddenStop => "sudden_stop",
            Self::SuddenLeftTurn => "sudden_left_turn",
            Self::SuddenRightTurn => "sudden_right_turn",
            Self::SuddenUTurn => "sudden_u_turn",
            Self::SuddenOvertaking => "sudden_overtaking",
            Self::SuddenLaneChange => "sudden_lane_change",
        }
    }

    /// Resolves a form key, payload slug, or Korean label.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ordered().into_iter().find(|category| {
            category.key().eq_ignore_ascii_case(trimmed)
                || category.slug() == trimmed
                || category.label() == trimmed
        })
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Event counts for every [`RiskCategory`]; absent categories read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RiskCounters {
    counts: [f64; RiskCategory::COUNT],
}

impl RiskCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Negative and non-finite counts are stored as zero.
    pub fn set(&mut self, category: RiskCategory, value: f64) {
        self.counts[category.index()] = non_negative(value);
    }

    pub fn with(mut self, category: RiskCategory, value: f64) -> Self {
        self.set(category, value);
        self
    }

    pub fn get(&self, category: RiskCategory) -> f64 {
        self.counts[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskCategory, f64)> + '_ {
        RiskCategory::ordered()
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    /// Categories with at least one recorded event, in display order.
    pub fn detected(&self) -> impl Iterator<Item = (RiskCategory, f64)> + '_ {
        self.iter().filter(|(_, value)| *value > 0.0)
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }
}

impl FromIterator<(RiskCategory, f64)> for RiskCounters {
    fn from_iter<I: IntoIterator<Item = (RiskCategory, f64)>>(iter: I) -> Self {
        let mut counters = Self::new();
        for (category, value) in iter {
            counters.set(category, value);
        }
        counters
    }
}

impl Serialize for RiskCounters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RiskCategory::COUNT))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.slug(), &value)?;
        }
        map.end()
    }
}

/// One submitted analysis subject. Fields are fixed at construction; a new
/// submission produces a new record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrivingRecord {
    vehicle_id: String,
    total_distance_km: f64,
    estimated_fuel_liters: f64,
    risks: RiskCounters,
}

impl DrivingRecord {
    pub fn new(vehicle_id: impl Into<String>, total_distance_km: f64, risks: RiskCounters) -> Self {
        let vehicle_id = vehicle_id.into();
        let vehicle_id = match vehicle_id.trim() {
            "" => UNSPECIFIED_VEHICLE.to_string(),
            trimmed => trimmed.to_string(),
        };
        let total_distance_km = non_negative(total_distance_km);

        Self {
            vehicle_id,
            total_distance_km,
            estimated_fuel_liters: total_distance_km / BASE_EFFICIENCY_KM_PER_L,
            risks,
        }
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn estimated_fuel_liters(&self) -> f64 {
        self.estimated_fuel_liters
    }

    pub fn risks(&self) -> &RiskCounters {
        &self.risks
    }
}

/// Raw form value: the dashboard posts numbers, text, or nothing at all.
/// Anything else (booleans, arrays, objects) is accepted and reads as 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Blank,
    Other(IgnoredAny),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Number(value) => *value,
            FieldValue::Text(raw) => parse_numeric(raw),
            FieldValue::Blank | FieldValue::Other(_) => 0.0,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// Submission surface for a single vehicle. Risk fields are flattened so the
/// payload mirrors the input form; unrecognized keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivingInput {
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub total_distance: Option<FieldValue>,
    #[serde(flatten)]
    pub risks: BTreeMap<String, FieldValue>,
}

impl DrivingInput {
    pub fn into_record(self) -> DrivingRecord {
        let risks = self
            .risks
            .iter()
            .filter_map(|(key, value)| RiskCategory::parse(key).map(|c| (c, value.as_f64())))
            .collect();
        let total_distance = self
            .total_distance
            .as_ref()
            .map(FieldValue::as_f64)
            .unwrap_or(0.0);

        DrivingRecord::new(self.vehicle_number.unwrap_or_default(), total_distance, risks)
    }
}

/// Lenient numeric parse: the longest leading number wins, anything else is 0.
pub fn parse_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let end = numeric_prefix_len(trimmed);
    trimmed[..end]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

fn numeric_prefix_len(value: &str) -> usize {
    let bytes = value.as_bytes();
    let digits_end = |mut idx: usize| {
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        idx
    };

    let mut idx = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_end = digits_end(idx);
    let mut mantissa_digits = integer_end - idx;
    idx = integer_end;

    if bytes.get(idx) == Some(&b'.') {
        let fraction_end = digits_end(idx + 1);
        mantissa_digits += fraction_end - (idx + 1);
        idx = fraction_end;
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        let mut exponent_start = idx + 1;
        if matches!(bytes.get(exponent_start), Some(b'+' | b'-')) {
            exponent_start += 1;
        }
        let exponent_end = digits_end(exponent_start);
        if exponent_end > exponent_start {
            idx = exponent_end;
        }
    }

    idx
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
