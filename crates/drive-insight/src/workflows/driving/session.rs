use super::analysis::AnalysisResult;
use super::domain::DrivingRecord;
use super::report::ReportClient;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("an analysis is already in progress")]
    Busy,
    #[error("no analysis has been submitted yet")]
    NoAnalysis,
}

/// Holds the latest analysis and admits one report request at a time.
/// Results are replaced wholesale; a call made while another is pending is
/// rejected with [`SessionError::Busy`].
#[derive(Debug)]
pub struct AnalysisSession {
    client: ReportClient,
    in_flight: Mutex<()>,
    current: RwLock<Option<Arc<AnalysisResult>>>,
}

impl AnalysisSession {
    pub fn new(client: ReportClient) -> Self {
        Self {
            client,
            in_flight: Mutex::new(()),
            current: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &ReportClient {
        &self.client
    }

    pub async fn analyze(&self, record: DrivingRecord) -> Result<Arc<AnalysisResult>, SessionError> {
        let _slot = self.in_flight.try_lock().map_err(|_| SessionError::Busy)?;

        let report = self.client.generate_report(&record).await;
        let result = Arc::new(AnalysisResult::new(record, report));
        self.replace(Arc::clone(&result)).await;

        info!(
            vehicle = %result.summary.vehicle_id,
            safety_score = result.summary.safety_score,
            report = result.report_source,
            "analysis completed"
        );
        Ok(result)
    }

    /// Re-runs report generation for the current record.
    pub async fn regenerate(&self) -> Result<Arc<AnalysisResult>, SessionError> {
        let _slot = self.in_flight.try_lock().map_err(|_| SessionError::Busy)?;
        let previous = self.current().await.ok_or(SessionError::NoAnalysis)?;

        let report = self.client.generate_report(previous.record()).await;
        let result = Arc::new(previous.with_report(report));
        self.replace(Arc::clone(&result)).await;

        info!(
            vehicle = %result.summary.vehicle_id,
            report = result.report_source,
            "report regenerated"
        );
        Ok(result)
    }

    pub async fn current(&self) -> Option<Arc<AnalysisResult>> {
        self.current.read().await.clone()
    }

    async fn replace(&self, result: Arc<AnalysisResult>) {
        *self.current.write().await = Some(result);
    }
}
