use super::domain::{DrivingRecord, RiskCategory};
use super::report::{display_report, ReportText};
use super::scoring::{economy_projection, round_to, safety_score, EconomyProjection};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const GOOD_SCORE_THRESHOLD: u8 = 80;
pub const CAUTION_SCORE_THRESHOLD: u8 = 40;
pub const PROJECTION_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyBand {
    Good,
    Caution,
    Danger,
}

impl SafetyBand {
    pub const fn from_score(score: u8) -> Self {
        if score >= GOOD_SCORE_THRESHOLD {
            Self::Good
        } else if score >= CAUTION_SCORE_THRESHOLD {
            Self::Caution
        } else {
            Self::Danger
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "안전",
            Self::Caution => "주의",
            Self::Danger => "위험",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskChartEntry {
    pub category: RiskCategory,
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySavings {
    pub month: u32,
    pub cumulative_savings: i64,
}

/// Every number the dashboard renders for one record.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub vehicle_id: String,
    pub total_distance_km: f64,
    pub estimated_fuel_liters: f64,
    pub safety_score: u8,
    pub safety_band: SafetyBand,
    pub safety_band_label: &'static str,
    pub economy: EconomyProjection,
    pub risk_chart: Vec<RiskChartEntry>,
    pub monthly_savings: Vec<MonthlySavings>,
}

impl AnalysisSummary {
    pub fn from_record(record: &DrivingRecord) -> Self {
        let safety_score = safety_score(record);
        let safety_band = SafetyBand::from_score(safety_score);
        let economy = economy_projection(record);

        let risk_chart = record
            .risks()
            .iter()
            .map(|(category, value)| RiskChartEntry {
                category,
                label: category.label(),
                value: round_to(value, 1),
            })
            .collect();

        let monthly_savings = monthly_savings_curve(economy.savings);

        Self {
            vehicle_id: record.vehicle_id().to_string(),
            total_distance_km: record.total_distance_km(),
            estimated_fuel_liters: record.estimated_fuel_liters(),
            safety_score,
            safety_band,
            safety_band_label: safety_band.label(),
            economy,
            risk_chart,
            monthly_savings,
        }
    }
}

/// Cumulative savings at the end of each month of a year.
pub fn monthly_savings_curve(annual_savings: i64) -> Vec<MonthlySavings> {
    let monthly = annual_savings as f64 / f64::from(PROJECTION_MONTHS);
    (1..=PROJECTION_MONTHS)
        .map(|month| MonthlySavings {
            month,
            cumulative_savings: (monthly * f64::from(month)).round() as i64,
        })
        .collect()
}

/// Outcome of one submission or report regeneration.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    #[serde(skip)]
    record: DrivingRecord,
    pub summary: AnalysisSummary,
    pub report: ReportText,
    pub report_source: &'static str,
    pub display_report: String,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(record: DrivingRecord, report: ReportText) -> Self {
        let summary = AnalysisSummary::from_record(&record);
        Self::assemble(record, summary, report)
    }

    /// Same record and figures, fresh report.
    pub fn with_report(&self, report: ReportText) -> Self {
        Self::assemble(self.record.clone(), self.summary.clone(), report)
    }

    pub fn record(&self) -> &DrivingRecord {
        &self.record
    }

    fn assemble(record: DrivingRecord, summary: AnalysisSummary, report: ReportText) -> Self {
        let display_report = display_report(report.as_str()).to_string();
        Self {
            record,
            summary,
            report_source: report.source_label(),
            report,
            display_report,
            generated_at: Utc::now(),
        }
    }
}
