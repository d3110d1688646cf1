use crate::workflows::driving::domain::DrivingRecord;

/// Closing line every report has to carry.
pub const ATTRIBUTION_LINE: &str = "분석 기관: 한국교통안전공단 AI 청년자문단 손유준";

/// Risk summary used when no category recorded an event.
pub const NO_RISK_SUMMARY: &str = "없음 (매우 안전함)";

/// Builds the generation prompt. Output depends only on the record, so a
/// retry for the same record sends the same prompt.
pub fn build_prompt(record: &DrivingRecord) -> String {
    let detected: Vec<String> = record
        .risks()
        .detected()
        .map(|(category, count)| format!("{}: {}회", category.label(), count))
        .collect();
    let risk_summary = if detected.is_empty() {
        NO_RISK_SUMMARY.to_string()
    } else {
        detected.join(", ")
    };

    format!(
        "차량번호 {vehicle}의 운전 데이터를 분석하여 전문적인 '안전운전 및 경제운전 교정 리포트'를 작성하세요.

데이터 요약:
- 총 주행거리: {distance}km
- 검출된 위험 행동: {risk_summary}

리포트 구성 가이드:
1. 운전자의 전반적인 운전 스타일 평가 (칭찬과 조언 포함)
2. 가장 두드러진 위험 요소의 위험성(사고 확률 등) 분석
3. 구체적인 교정 방법 (예: 급가속 방지를 위한 페달링 기법 등)
4. 경제성 분석 결과(유류비 절감)에 대한 코멘트
5. 마지막 한마디: 운전자를 격려하는 따뜻한 메시지

작성 규칙:
- 텍스트 강조를 위한 특수 기호(별표, 대시, 백틱 등)는 절대 사용하지 마세요.
- 읽기 편하게 문단 사이에 줄바꿈을 충분히 사용하세요.
- 마지막 줄에는 반드시 \"{ATTRIBUTION_LINE}\"을 명시하세요.
",
        vehicle = record.vehicle_id(),
        distance = record.total_distance_km(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::driving::domain::{RiskCategory, RiskCounters};

    fn sample_record() -> DrivingRecord {
        let risks = RiskCounters::new()
            .with(RiskCategory::SuddenAcceleration, 4.0)
            .with(RiskCategory::Overspeeding, 2.5)
            .with(RiskCategory::SuddenLaneChange, 1.0);
        DrivingRecord::new("34나5678", 15000.0, risks)
    }

    #[test]
    fn prompt_lists_only_detected_categories_in_order() {
        let prompt = build_prompt(&sample_record());

        assert!(prompt.contains("차량번호 34나5678"));
        assert!(prompt.contains("총 주행거리: 15000km"));
        assert!(prompt.contains("검출된 위험 행동: 과속: 2.5회, 급가속: 4회, 급진로변경: 1회\n"));
        assert!(!prompt.contains("급정지"));
        assert!(prompt.contains(ATTRIBUTION_LINE));
    }

    #[test]
    fn prompt_reports_no_detected_risks() {
        let record = DrivingRecord::new("", 0.0, RiskCounters::new());
        let prompt = build_prompt(&record);

        assert!(prompt.contains("차량번호 미지정"));
        assert!(prompt.contains(&format!("검출된 위험 행동: {NO_RISK_SUMMARY}")));
    }

    #[test]
    fn prompt_is_stable_for_equal_records() {
        let first = build_prompt(&sample_record());
        let second = build_prompt(&sample_record().clone());
        assert_eq!(first, second);
    }
}
