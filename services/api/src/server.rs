use crate::cli::ServeArgs;
use crate::infra::{build_report_client, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use drive_insight::config::AppConfig;
use drive_insight::error::AppError;
use drive_insight::telemetry;
use drive_insight::workflows::driving::AnalysisSession;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    if !args.offline && config.report.api_key.is_none() {
        warn!("no API_KEY configured; reports will use the fallback text");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let client = build_report_client(&config.report, args.offline)?;
    let session = Arc::new(AnalysisSession::new(client));

    let app = with_operational_routes(session)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model = %config.report.model,
        offline = args.offline,
        "drive insight service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
