use chrono::{TimeZone, Utc};
use select_harness::results::{
    FailureKind, RunContext, RunReport, ScenarioFailure, ScenarioResult, REPORT_SCHEMA_VERSION,
};

fn report() -> RunReport {
    RunReport {
        schema_version: REPORT_SCHEMA_VERSION,
        context: RunContext {
            label: "local".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
            host: "ci-host".to_string(),
            backend: "local".to_string(),
            query_tool: "s5cmd".to_string(),
            manifest: None,
        },
        scenarios: vec![
            ScenarioResult {
                scenario: "passes".to_string(),
                conversion: "structured_lines -> structured_lines".to_string(),
                success: true,
                elapsed_ms: 1.5,
                bucket: Some("passes-1".to_string()),
                failure: None,
            },
            ScenarioResult {
                scenario: "fails".to_string(),
                conversion: "structured_lines -> delimited_text".to_string(),
                success: false,
                elapsed_ms: 2.0,
                bucket: None,
                failure: Some(ScenarioFailure::new(FailureKind::Query, "exit 3")),
            },
        ],
    }
}

#[test]
fn schema_version_is_recorded_once_at_the_top_level() {
    let value = serde_json::to_value(report()).expect("serialize report");
    assert_eq!(value["schema_version"], REPORT_SCHEMA_VERSION);
    let context = value["context"].as_object().expect("context object");
    assert!(!context.contains_key("schema_version"));
    assert!(!context.contains_key("manifest"), "absent manifest is omitted");
}

#[test]
fn report_round_trips_and_counts_failures() {
    let json = serde_json::to_string(&report()).expect("serialize report");
    let parsed: RunReport = serde_json::from_str(&json).expect("parse report");
    assert_eq!(parsed.failed(), 1);
    assert_eq!(
        parsed.scenarios[1].failure.as_ref().map(|failure| failure.kind),
        Some(FailureKind::Query)
    );
    assert!(json.contains("\"kind\":\"query\""));
}
