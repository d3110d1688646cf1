use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use drive_insight::workflows::driving::{analysis_router, AnalysisSession};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_operational_routes(session: Arc<AnalysisSession>) -> axum::Router {
    analysis_router(session)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::OfflineGenerator;
    use axum::body::Body;
    use axum::http::Request;
    use drive_insight::workflows::driving::ReportClient;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let session = AnalysisSession::new(ReportClient::new(Arc::new(OfflineGenerator)));
        with_operational_routes(Arc::new(session)).layer(Extension(state))
    }

    async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let response = get(app(false), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_tracks_flag() {
        assert_eq!(
            get(app(false), "/ready").await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(get(app(true), "/ready").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_render_as_text() {
        let response = get(app(true), "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn analysis_routes_are_mounted() {
        let response = get(app(true), "/api/v1/analysis/current").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
