use super::*;
use serde_json::json;

fn flagged_provider(id: &str) -> Provider {
    serde_json::from_value(json!({
        "provider_id": id,
        "name": "Dr. Jane Smith",
        "specialty": "Cardiology",
        "phone": "555-01",
        "license_number": "",
        "address": "1 Main St",
        "status": "Flagged",
        "confidence_score": 45,
        "issues": ["Invalid phone format"],
        "suggested_values": {"phone": "555-0100"}
    }))
    .expect("provider")
}

fn run_with(results: Vec<Provider>, validated: u32, flagged: u32, total: u32) -> Run {
    Run {
        run_id: RunId::new("R1"),
        timestamp: "2024-05-01T10:15:30.123456".to_string(),
        total_providers: total,
        validated,
        flagged,
        results,
    }
}

#[test]
fn deserializes_backend_run_payload() {
    let run: Run = serde_json::from_value(json!({
        "run_id": "a1b2c3d4",
        "timestamp": "2024-05-01T10:15:30.123456",
        "total_providers": 1,
        "validated": 0,
        "flagged": 1,
        "results": [{
            "provider_id": "P3",
            "name": "Dr. Lee",
            "specialty": "Oncology",
            "address": "2 Elm St",
            "phone": "N/A",
            "email": "N/A",
            "license_number": "N/A",
            "last_updated": "N/A",
            "status": "Flagged",
            "confidence_score": 58,
            "issues": ["Missing license", "Invalid phone format"],
            "suggested_values": {}
        }]
    }))
    .expect("run");

    assert_eq!(run.run_id.as_str(), "a1b2c3d4");
    assert_eq!(run.results[0].status, ProviderStatus::Flagged);
    assert!(run.results[0].extra.is_empty());
    run.validate().expect("consistent run");
}

#[test]
fn only_flagged_providers_are_reviewable() {
    let mut provider = flagged_provider("P1");
    assert!(provider.is_reviewable());
    provider.status = ProviderStatus::Valid;
    assert!(!provider.is_reviewable());
}

#[test]
fn field_value_treats_empty_as_missing() {
    let provider = flagged_provider("P1");
    assert_eq!(provider.field_value("phone"), Some("555-01"));
    assert_eq!(provider.field_value("license_number"), None);
    assert_eq!(provider.field_value("email"), None);
}

#[test]
fn field_value_reads_unmodelled_string_fields() {
    let provider: Provider = serde_json::from_value(json!({
        "provider_id": "P9",
        "status": "Flagged",
        "confidence_score": 60,
        "npi": "1234567890",
        "suggested_values": {"npi": "1234567893"}
    }))
    .expect("provider");

    assert_eq!(provider.field_value("npi"), Some("1234567890"));
    assert_eq!(provider.field_value("fax"), None);
}

#[test]
fn validate_rejects_count_mismatch() {
    let run = run_with(vec![flagged_provider("P1")], 1, 1, 1);
    let err = run.validate().expect_err("must fail");
    assert!(matches!(err, ModelError::CountMismatch { total: 1, .. }));
    assert!(!run.counts_consistent());
}

#[test]
fn duplicate_provider_ids_are_anomalies_not_errors() {
    let run = run_with(
        vec![
            flagged_provider("N/A"),
            flagged_provider("P1"),
            flagged_provider("N/A"),
        ],
        0,
        3,
        3,
    );
    run.validate().expect("counts are consistent");
    assert_eq!(
        run.anomalies(),
        vec![ModelError::DuplicateProvider {
            run_id: RunId::new("R1"),
            provider_id: ProviderId::new("N/A"),
        }]
    );
    assert_eq!(
        run.provider(&ProviderId::new("N/A")).map(|p| &p.provider_id),
        Some(&ProviderId::new("N/A"))
    );
}

#[test]
fn confidence_above_hundred_is_an_anomaly() {
    let mut provider = flagged_provider("P1");
    provider.confidence_score = 140;
    let run = run_with(vec![provider], 0, 1, 1);
    run.validate().expect("counts are consistent");
    assert!(matches!(
        run.anomalies().as_slice(),
        [ModelError::ConfidenceOutOfRange { score: 140, .. }]
    ));
}

#[test]
fn empty_run_is_consistent() {
    let run = run_with(Vec::new(), 0, 0, 0);
    run.validate().expect("empty run is valid");
    assert!(run.anomalies().is_empty());
}

#[test]
fn created_at_accepts_naive_and_offset_timestamps() {
    let mut run = run_with(Vec::new(), 0, 0, 0);
    let naive = run.created_at().expect("naive timestamp");
    assert_eq!(naive.to_rfc3339(), "2024-05-01T10:15:30.123456+00:00");

    run.timestamp = "2024-05-01T12:15:30+02:00".to_string();
    let offset = run.created_at().expect("rfc3339 timestamp");
    assert_eq!(offset.to_rfc3339(), "2024-05-01T10:15:30+00:00");

    run.timestamp = "yesterday".to_string();
    assert!(run.created_at().is_none());
}

#[test]
fn review_action_uses_lowercase_wire_names() {
    assert_eq!(
        serde_json::to_value(ReviewAction::Approve).expect("json"),
        json!("approve")
    );
    assert_eq!(ReviewAction::Reject.to_string(), "reject");
}
