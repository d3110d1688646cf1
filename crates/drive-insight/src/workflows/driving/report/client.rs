use super::prompt::{build_prompt, ATTRIBUTION_LINE};
use super::sanitize::sanitize_report_text;
use crate::workflows::driving::domain::DrivingRecord;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_TOP_P: f32 = 0.9;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Report served whenever generation fails for any reason.
pub const FALLBACK_REPORT: &str = "현재 AI 분석 서버가 일시적으로 응답하지 않습니다. 데이터를 확인하여 직접적인 분석 결과를 참고해 주시기 바랍니다.\n\n분석 기관: 한국교통안전공단 AI 청년자문단 손유준";

/// Fixed sampling configuration sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl GenerationSettings {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation credential is not configured")]
    MissingCredential,
    #[error("text generation request failed: {0}")]
    Transport(String),
    #[error("text generation service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("text generation response could not be decoded: {0}")]
    Malformed(String),
    #[error("text generation service returned no text")]
    EmptyResponse,
    #[error("text generation did not finish within {0:?}")]
    Timeout(Duration),
    #[error("text generation task aborted: {0}")]
    Aborted(String),
}

impl GenerationError {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Transport(_) => "transport",
            Self::Service { .. } => "service",
            Self::Malformed(_) => "malformed",
            Self::EmptyResponse => "empty_response",
            Self::Timeout(_) => "timeout",
            Self::Aborted(_) => "aborted",
        }
    }
}

/// Boundary to the external text-generation provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, GenerationError>;
}

/// Narrative analysis handed to callers: generated prose or the fixed fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportText {
    Generated(String),
    Fallback,
}

impl ReportText {
    pub fn as_str(&self) -> &str {
        match self {
            ReportText::Generated(text) => text,
            ReportText::Fallback => FALLBACK_REPORT,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ReportText::Fallback)
    }

    pub const fn source_label(&self) -> &'static str {
        match self {
            ReportText::Generated(_) => "generated",
            ReportText::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ReportText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReportText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Issues one generation call per report and absorbs every failure into
/// [`ReportText::Fallback`].
#[derive(Clone)]
pub struct ReportClient {
    generator: Arc<dyn TextGenerator>,
    settings: GenerationSettings,
    timeout: Duration,
}

impl fmt::Debug for ReportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportClient")
            .field("settings", &self.settings)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ReportClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            settings: GenerationSettings::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Always resolves; failures are logged and replaced by the fallback.
    pub async fn generate_report(&self, record: &DrivingRecord) -> ReportText {
        match self.try_generate(record).await {
            Ok(text) => {
                debug!(
                    vehicle = record.vehicle_id(),
                    chars = text.chars().count(),
                    "report generated"
                );
                ReportText::Generated(text)
            }
            Err(err) => {
                warn!(
                    vehicle = record.vehicle_id(),
                    kind = err.kind(),
                    error = %err,
                    "report generation failed; serving fallback report"
                );
                ReportText::Fallback
            }
        }
    }

    /// Single generation attempt with the failure cause preserved.
    pub async fn try_generate(&self, record: &DrivingRecord) -> Result<String, GenerationError> {
        let prompt = build_prompt(record);
        let generator = Arc::clone(&self.generator);
        let settings = self.settings.clone();

        let mut task =
            tokio::spawn(async move { generator.generate(&prompt, &settings).await });

        let raw = match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => return Err(GenerationError::Aborted(join_error.to_string())),
            Err(_) => {
                task.abort();
                return Err(GenerationError::Timeout(self.timeout));
            }
        };

        let text = sanitize_report_text(&raw);
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(with_attribution(text))
    }
}

fn with_attribution(text: String) -> String {
    if text.ends_with(ATTRIBUTION_LINE) {
        text
    } else {
        format!("{text}\n\n{ATTRIBUTION_LINE}")
    }
}
