use drive_insight::workflows::driving::report::{
    build_prompt, GeminiGenerator, ReportClient, ReportText, ATTRIBUTION_LINE, FALLBACK_REPORT,
};
use drive_insight::workflows::driving::{DrivingRecord, GenerationError, RiskCategory, RiskCounters};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

fn sample_record() -> DrivingRecord {
    let risks = RiskCounters::new()
        .with(RiskCategory::SuddenAcceleration, 5.0)
        .with(RiskCategory::SuddenDeceleration, 2.0);
    DrivingRecord::new("12가3456", 15000.0, risks)
}

fn client_for(server: &MockServer, api_key: Option<&str>) -> ReportClient {
    let generator = GeminiGenerator::new(
        server.uri(),
        api_key.map(str::to_string),
        Duration::from_secs(5),
    )
    .expect("http client builds");
    ReportClient::new(Arc::new(generator))
}

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn generated_report_is_sanitized() {
    let server = MockServer::start().await;
    let record = sample_record();

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": build_prompt(&record) }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            "### 운전 스타일 평가\n**급가속**이 5회 감지되었습니다.\n\n-- 교정 방법 --\n출발 시 페달을 천천히 밟으세요.\n\n분석 기관: 한국교통안전공단 AI 청년자문단 손유준\n",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server, Some("test-key"))
        .generate_report(&record)
        .await;

    let text = match report {
        ReportText::Generated(text) => text,
        ReportText::Fallback => panic!("expected generated report"),
    };
    assert!(text.starts_with("운전 스타일 평가\n급가속이 5회 감지되었습니다."));
    assert!(text.contains("\n\n 교정 방법 \n"));
    assert!(text.ends_with(ATTRIBUTION_LINE));
    for marker in ["**", "###", "--"] {
        assert!(!text.contains(marker));
    }
}

#[tokio::test]
async fn service_error_resolves_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": 503, "message": "The model is overloaded." }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));

    match client.try_generate(&sample_record()).await {
        Err(GenerationError::Service { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "The model is overloaded.");
        }
        other => panic!("expected service error, got {other:?}"),
    }
    assert_eq!(
        client.generate_report(&sample_record()).await.as_str(),
        FALLBACK_REPORT
    );
}

#[tokio::test]
async fn empty_candidates_resolve_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));

    assert!(matches!(
        client.try_generate(&sample_record()).await,
        Err(GenerationError::EmptyResponse)
    ));
    assert!(client.generate_report(&sample_record()).await.is_fallback());
}

#[tokio::test]
async fn malformed_payload_resolves_to_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"));

    assert!(matches!(
        client.try_generate(&sample_record()).await,
        Err(GenerationError::Malformed(_))
    ));
    assert!(client.generate_report(&sample_record()).await.is_fallback());
}

#[tokio::test]
async fn missing_credential_never_reaches_the_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);

    assert!(matches!(
        client.try_generate(&sample_record()).await,
        Err(GenerationError::MissingCredential)
    ));
    assert!(client.generate_report(&sample_record()).await.is_fallback());
}

#[tokio::test]
async fn slow_service_hits_the_deadline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(candidate("늦은 응답"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key")).with_timeout(Duration::from_millis(100));

    assert!(matches!(
        client.try_generate(&sample_record()).await,
        Err(GenerationError::Timeout(_))
    ));
    assert_eq!(
        client.generate_report(&sample_record()).await,
        ReportText::Fallback
    );
}

#[tokio::test]
async fn unreachable_service_resolves_to_fallback() {
    let generator = GeminiGenerator::new(
        "http://127.0.0.1:9",
        Some("test-key".to_string()),
        Duration::from_secs(2),
    )
    .expect("http client builds");
    let client = ReportClient::new(Arc::new(generator));

    assert!(client.generate_report(&sample_record()).await.is_fallback());
}
