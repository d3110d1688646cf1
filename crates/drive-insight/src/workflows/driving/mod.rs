//! Driving-behavior analysis: risk counters, scoring, and the narrative
//! report pipeline built on top of them.

pub mod analysis;
pub mod domain;
pub mod import;
pub mod report;
pub mod router;
pub mod scoring;
pub mod session;

pub use analysis::{AnalysisResult, AnalysisSummary, RiskChartEntry, SafetyBand};
pub use domain::{
    parse_numeric, DrivingInput, DrivingRecord, FieldValue, RiskCategory, RiskCounters,
    UNSPECIFIED_VEHICLE,
};
pub use import::{BulkImportError, BulkImporter};
pub use report::{
    GenerationError, GenerationSettings, ReportClient, ReportText, TextGenerator,
};
pub use router::analysis_router;
pub use scoring::EconomyProjection;
pub use session::{AnalysisSession, SessionError};
