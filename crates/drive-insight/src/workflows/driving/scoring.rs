//! Closed-form safety and economy scoring.
//!
//! The safety score is a linear heuristic: every risk event costs
//! [`PENALTY_PER_RISK_EVENT`] points from a perfect 100. It is meant to be
//! easy to read, not statistically calibrated. The economy projection rests on
//! the fixed assumptions below; recalibrate them here rather than at call
//! sites.

use super::domain::{DrivingRecord, RiskCounters};
use serde::Serialize;

pub const MAX_SAFETY_SCORE: f64 = 100.0;
pub const PENALTY_PER_RISK_EVENT: f64 = 2.0;

/// Improvement available even to a driver with no recorded events.
pub const BASE_EFFICIENCY_GAIN: f64 = 0.05;
pub const EFFICIENCY_GAIN_PER_RISK_EVENT: f64 = 0.02;
pub const MAX_EFFICIENCY_GAIN: f64 = 0.30;

/// Baseline fuel efficiency in km/L.
pub const BASE_EFFICIENCY_KM_PER_L: f64 = 12.0;
/// Fuel price in KRW per liter.
pub const FUEL_PRICE_PER_LITER: f64 = 1650.0;
/// kg of CO2 emitted per liter burned.
pub const CARBON_KG_PER_LITER: f64 = 2.3;
/// Distance used for the projection when none was reported.
pub const MIN_PROJECTION_DISTANCE_KM: f64 = 1.0;

/// Projected savings if the recorded risk behaviors were corrected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomyProjection {
    pub total_risk: f64,
    pub efficiency_gain: f64,
    pub total_fuel_liters: f64,
    /// Whole KRW.
    pub savings: i64,
    pub carbon_reduction_kg: f64,
    pub current_efficiency: f64,
    pub potential_efficiency: f64,
    pub gain_percent: String,
}

pub fn total_risk(counters: &RiskCounters) -> f64 {
    counters.total()
}

pub fn safety_score(record: &DrivingRecord) -> u8 {
    let total = total_risk(record.risks());
    let score = MAX_SAFETY_SCORE - total * PENALTY_PER_RISK_EVENT;
    score.round().clamp(0.0, MAX_SAFETY_SCORE) as u8
}

pub fn efficiency_gain(total_risk: f64) -> f64 {
    (BASE_EFFICIENCY_GAIN + total_risk * EFFICIENCY_GAIN_PER_RISK_EVENT).min(MAX_EFFICIENCY_GAIN)
}

pub fn economy_projection(record: &DrivingRecord) -> EconomyProjection {
    let total_risk = total_risk(record.risks());
    let efficiency_gain = efficiency_gain(total_risk);

    let distance = match record.total_distance_km() {
        distance if distance > 0.0 => distance,
        _ => MIN_PROJECTION_DISTANCE_KM,
    };
    let total_fuel_liters = distance / BASE_EFFICIENCY_KM_PER_L;

    let savings = (total_fuel_liters * FUEL_PRICE_PER_LITER * efficiency_gain).round() as i64;
    let carbon_reduction_kg =
        round_to(total_fuel_liters * CARBON_KG_PER_LITER * efficiency_gain, 2);
    let potential_efficiency = round_to(BASE_EFFICIENCY_KM_PER_L * (1.0 + efficiency_gain), 2);

    EconomyProjection {
        total_risk,
        efficiency_gain,
        total_fuel_liters,
        savings,
        carbon_reduction_kg,
        current_efficiency: round_to(BASE_EFFICIENCY_KM_PER_L, 2),
        potential_efficiency,
        gain_percent: format!("{:.1}", efficiency_gain * 100.0),
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::driving::domain::RiskCategory;

    fn record(distance: f64, events: f64) -> DrivingRecord {
        let risks = RiskCounters::new().with(RiskCategory::SuddenAcceleration, events);
        DrivingRecord::new("12가3456", distance, risks)
    }

    #[test]
    fn score_rounds_fractional_totals() {
        assert_eq!(safety_score(&record(100.0, 0.3)), 99);
        assert_eq!(safety_score(&record(100.0, 12.5)), 75);
    }

    #[test]
    fn zero_distance_projects_on_minimum_distance() {
        let projection = economy_projection(&record(0.0, 0.0));
        assert_eq!(projection.total_fuel_liters, MIN_PROJECTION_DISTANCE_KM / 12.0);
        assert_eq!(projection.savings, 7);
        assert_eq!(projection.gain_percent, "5.0");
    }

    #[test]
    fn fractional_gain_formats_to_one_decimal() {
        let projection = economy_projection(&record(1200.0, 1.5));
        assert_eq!(projection.gain_percent, "8.0");
        assert_eq!(projection.current_efficiency, 12.0);
        assert_eq!(projection.potential_efficiency, 12.96);
    }
}
