//! Display-time substitution, independent of the report client's own
//! fallback text.

/// Shown in place of a report that is missing or signals a failure.
pub const PENDING_PLACEHOLDER: &str =
    "결과를 분석중입니다. 장시간 결과가 나오지 않을 시 새로고침 해주세요.";

/// Stored by callers when the analysis call itself could not be made.
pub const CONNECTION_ERROR_REPORT: &str = "Error: 분석 시스템 연결 오류";

pub const FAILURE_MARKERS: [&str; 2] = ["응답하지 않습니다", "Error"];

pub fn display_report(report: &str) -> &str {
    if report.trim().is_empty() || FAILURE_MARKERS.iter().any(|marker| report.contains(marker)) {
        PENDING_PLACEHOLDER
    } else {
        report
    }
}
