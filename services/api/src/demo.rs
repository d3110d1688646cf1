use crate::infra::{build_report_client, parse_risk_arg};
use clap::Args;
use drive_insight::config::AppConfig;
use drive_insight::error::AppError;
use drive_insight::telemetry;
use drive_insight::workflows::driving::report::CONNECTION_ERROR_REPORT;
use drive_insight::workflows::driving::{
    AnalysisResult, AnalysisSession, AnalysisSummary, BulkImporter, DrivingRecord, RiskCategory,
    RiskCounters,
};
use std::path::PathBuf;

const SAMPLE_FLEET_CSV: &str = "vehicleNumber,totalDistance,overspeeding,suddenAccel,suddenStop,suddenLaneChange
12가3456,15000,3,4,2,1
34나5678,8200,0,1,0,0
56다7890,22000,12,9,14,11
";

#[derive(Args, Debug, Default)]
pub(crate) struct AnalyzeArgs {
    /// Vehicle registration number (blank means unspecified)
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
    /// Total distance driven in km
    #[arg(long)]
    pub(crate) distance: Option<f64>,
    /// Risk event count as KEY=VALUE; repeat for each category
    #[arg(long = "risk", value_parser = parse_risk_arg)]
    pub(crate) risks: Vec<(RiskCategory, f64)>,
    /// Score every row of a CSV export instead of a single vehicle (no reports)
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Never call the text-generation service
    #[arg(long)]
    pub(crate) offline: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Never call the text-generation service
    #[arg(long)]
    pub(crate) offline: bool,
}

pub(crate) async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        vehicle,
        distance,
        risks,
        csv,
        offline,
    } = args;

    let config = load_cli_config()?;

    if let Some(path) = csv {
        let records = BulkImporter::from_path(&path)?;
        println!("Scored {} vehicles from {}", records.len(), path.display());
        render_fleet_table(&records);
        return Ok(());
    }

    let record = DrivingRecord::new(
        vehicle.unwrap_or_default(),
        distance.unwrap_or_default(),
        risks.into_iter().collect::<RiskCounters>(),
    );

    let session = AnalysisSession::new(build_report_client(&config.report, offline)?);
    analyze_and_render(&session, record).await;
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = load_cli_config()?;
    let session = AnalysisSession::new(build_report_client(&config.report, args.offline)?);

    println!("Driving safety demo");
    let record = DrivingRecord::new(
        "12가3456",
        15000.0,
        RiskCounters::new()
            .with(RiskCategory::Overspeeding, 3.0)
            .with(RiskCategory::SuddenAcceleration, 4.0)
            .with(RiskCategory::SuddenStop, 2.0)
            .with(RiskCategory::SuddenLaneChange, 1.0),
    );
    analyze_and_render(&session, record).await;

    println!("\nFleet snapshot (scores only)");
    let fleet = BulkImporter::from_reader(SAMPLE_FLEET_CSV.as_bytes())?;
    render_fleet_table(&fleet);

    Ok(())
}

/// One-shot commands log report failures the same way the server does.
fn load_cli_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

async fn analyze_and_render(session: &AnalysisSession, record: DrivingRecord) {
    match session.analyze(record).await {
        Ok(result) => render_result(&result),
        Err(err) => {
            println!("  Analysis unavailable: {err}");
            println!("{CONNECTION_ERROR_REPORT}");
        }
    }
}

fn render_result(result: &AnalysisResult) {
    let summary = &result.summary;
    let economy = &summary.economy;

    println!("Vehicle {}", summary.vehicle_id);
    println!(
        "- {:.1} km driven | ~{:.1} L fuel",
        summary.total_distance_km, summary.estimated_fuel_liters
    );
    println!(
        "- Safety score {} ({}) | {} risk events",
        summary.safety_score, summary.safety_band_label, economy.total_risk
    );
    println!(
        "- Efficiency {:.2} -> {:.2} km/L (+{}%)",
        economy.current_efficiency, economy.potential_efficiency, economy.gain_percent
    );
    println!(
        "- Projected savings {} KRW | {:.2} kg CO2 avoided",
        economy.savings, economy.carbon_reduction_kg
    );

    let detected: Vec<_> = summary
        .risk_chart
        .iter()
        .filter(|entry| entry.value > 0.0)
        .collect();
    if detected.is_empty() {
        println!("Risk events: none");
    } else {
        println!("Risk events:");
        for entry in detected {
            println!("  - {}: {}", entry.label, entry.value);
        }
    }

    if let Some(last) = summary.monthly_savings.last() {
        println!(
            "Savings after {} months: {} KRW",
            last.month, last.cumulative_savings
        );
    }

    println!("\nReport ({})", result.report_source);
    println!("{}", result.report);
}

fn render_fleet_table(records: &[DrivingRecord]) {
    for record in records {
        let summary = AnalysisSummary::from_record(record);
        println!(
            "  - {}: score {} ({}) | {} risk events | {} KRW projected savings",
            summary.vehicle_id,
            summary.safety_score,
            summary.safety_band_label,
            summary.economy.total_risk,
            summary.economy.savings
        );
    }
}
