use async_trait::async_trait;
use drive_insight::config::ReportConfig;
use drive_insight::error::AppError;
use drive_insight::workflows::driving::report::GeminiGenerator;
use drive_insight::workflows::driving::{
    parse_numeric, GenerationError, GenerationSettings, ReportClient, RiskCategory, TextGenerator,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Generator used with `--offline`. Every call fails, so reports resolve to
/// the fallback text without touching the network.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::Transport(
            "offline mode: text generation disabled".to_string(),
        ))
    }
}

pub(crate) fn build_report_client(
    config: &ReportConfig,
    offline: bool,
) -> Result<ReportClient, AppError> {
    let generator: Arc<dyn TextGenerator> = if offline {
        Arc::new(OfflineGenerator)
    } else {
        Arc::new(GeminiGenerator::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.timeout,
        )?)
    };

    Ok(ReportClient::new(generator)
        .with_settings(GenerationSettings::with_model(config.model.clone()))
        .with_timeout(config.timeout))
}

/// Parses `--risk key=value`. Keys accept form names, slugs, or Korean labels.
pub(crate) fn parse_risk_arg(raw: &str) -> Result<(RiskCategory, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let category = RiskCategory::parse(key)
        .ok_or_else(|| format!("unknown risk category '{}'", key.trim()))?;
    Ok((category, parse_numeric(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn risk_args_accept_keys_and_labels() {
        assert_eq!(
            parse_risk_arg("suddenAccel=4"),
            Ok((RiskCategory::SuddenAcceleration, 4.0))
        );
        assert_eq!(
            parse_risk_arg("급정지=2.5"),
            Ok((RiskCategory::SuddenStop, 2.5))
        );
        assert_eq!(
            parse_risk_arg("overspeeding=abc"),
            Ok((RiskCategory::Overspeeding, 0.0))
        );
    }

    #[test]
    fn risk_args_reject_bad_shapes() {
        assert!(parse_risk_arg("suddenAccel").is_err());
        assert!(parse_risk_arg("drifting=3")
            .expect_err("unknown category")
            .contains("drifting"));
    }

    #[tokio::test]
    async fn offline_client_serves_fallback() {
        let config = ReportConfig {
            api_key: Some("unused".to_string()),
            model: "test-model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(3),
        };
        let client = build_report_client(&config, true).expect("client builds");
        assert_eq!(client.settings().model, "test-model");
        assert_eq!(client.timeout(), Duration::from_secs(3));

        let record = drive_insight::workflows::driving::DrivingRecord::new(
            "12가3456",
            100.0,
            Default::default(),
        );
        assert!(client.generate_report(&record).await.is_fallback());
    }
}
