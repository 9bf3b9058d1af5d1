//! Integration tests for the batch orchestrator: directory and in-memory
//! modes, failure isolation, progress reporting, and cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use conforma_core::issue::codes;
use conforma_core::{BatchError, BatchValidationProgress, ValidationConfiguration};
use conforma_engine::{
    BatchValidator, CancelToken, ClinicalResourceParser, ParsedResource, ProgressObserver,
    ResourceValidator, SchemaConformanceEngine,
};

const PATIENT_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["resourceType", "id"],
    "properties": {
        "resourceType": {"const": "Patient"},
        "id": {"type": "string"}
    }
}"#;

/// Build a schema-backed validator with one patient profile, returning the
/// tempdir guards alongside it.
fn schema_validator() -> (tempfile::TempDir, ResourceValidator) {
    let profile_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        profile_dir.path().join("patient.schema.json"),
        PATIENT_SCHEMA,
    )
    .unwrap();
    let engine = SchemaConformanceEngine::from_dir(profile_dir.path()).unwrap();
    let validator = ResourceValidator::new(
        Arc::new(ClinicalResourceParser::new()),
        Arc::new(engine),
    );
    (profile_dir, validator)
}

fn patient_json(id: usize) -> String {
    format!(r#"{{"resourceType": "Patient", "id": "p{id}"}}"#)
}

fn config() -> ValidationConfiguration {
    ValidationConfiguration::default()
        .with_profiles(vec!["patient.schema.json".to_string()])
        .with_min_pass_rate(50.0)
        .with_max_fatal_errors(10)
}

/// Observer that records every snapshot.
#[derive(Default)]
struct RecordingObserver {
    snapshots: Mutex<Vec<BatchValidationProgress>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, progress: &BatchValidationProgress) {
        self.snapshots.lock().unwrap().push(progress.clone());
    }
}

#[tokio::test]
async fn directory_batch_isolates_an_unreadable_file() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();
    for i in 0..5 {
        std::fs::write(data.path().join(format!("patient-{i}.json")), patient_json(i)).unwrap();
    }
    // Invalid UTF-8 makes read_to_string fail without retrying.
    std::fs::write(data.path().join("garbage.json"), [0xff, 0xfe, 0x00, 0xff]).unwrap();

    let batch = BatchValidator::new(validator, config());
    let report = batch
        .validate_directory(data.path(), "*", &CancelToken::new())
        .await
        .expect("one unreadable file must not abort the batch");

    assert_eq!(report.results.len(), 6);
    let failed: Vec<_> = report.results.iter().filter(|r| !r.is_valid).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].resource_name, "garbage");
    assert_eq!(failed[0].issues.len(), 1);
    assert_eq!(failed[0].issues[0].code, codes::FILE_PROCESSING_ERROR);

    let summary = report.summary.as_ref().unwrap();
    assert_eq!(summary.total_resources, 6);
    assert_eq!(summary.passed_resources, 5);
    assert_eq!(summary.failed_resources, 1);
}

#[tokio::test]
async fn directory_batch_results_are_sorted_by_name() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();
    for name in ["zulu", "alpha", "mike"] {
        std::fs::write(data.path().join(format!("{name}.json")), patient_json(1)).unwrap();
    }

    let batch = BatchValidator::new(validator, config());
    let report = batch
        .validate_directory(data.path(), "*", &CancelToken::new())
        .await
        .unwrap();

    let names: Vec<_> = report
        .results
        .iter()
        .map(|r| r.resource_name.as_str())
        .collect();
    assert_eq!(names, ["alpha", "mike", "zulu"]);
}

#[tokio::test]
async fn directory_pattern_filters_files() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("patient-1.json"), patient_json(1)).unwrap();
    std::fs::write(data.path().join("observation-1.json"), patient_json(2)).unwrap();
    std::fs::write(data.path().join("notes.txt"), "not a resource").unwrap();

    let batch = BatchValidator::new(validator, config());
    let report = batch
        .validate_directory(data.path(), "patient-*.json", &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].resource_name, "patient-1");
}

#[tokio::test]
async fn missing_directory_is_a_precondition_error() {
    let (_profiles, validator) = schema_validator();
    let batch = BatchValidator::new(validator, config());
    let err = batch
        .validate_directory(
            std::path::Path::new("/definitely/not/here"),
            "*",
            &CancelToken::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::Precondition { .. }));
}

#[tokio::test]
async fn empty_directory_yields_a_successful_empty_report() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();

    let batch = BatchValidator::new(validator, config());
    let report = batch
        .validate_directory(data.path(), "*", &CancelToken::new())
        .await
        .unwrap();

    let summary = report.summary.as_ref().unwrap();
    assert_eq!(summary.total_resources, 0);
    assert_eq!(summary.pass_rate, 100.0);
    assert!(summary.overall_success);
}

#[tokio::test]
async fn progress_observer_sees_every_item_exactly_once() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();
    for i in 0..12 {
        std::fs::write(data.path().join(format!("p-{i:02}.json")), patient_json(i)).unwrap();
    }

    let observer = Arc::new(RecordingObserver::default());
    let batch = BatchValidator::new(validator, config()).with_observer(observer.clone());
    batch
        .validate_directory(data.path(), "*", &CancelToken::new())
        .await
        .unwrap();

    let snapshots = observer.snapshots.lock().unwrap();
    assert_eq!(snapshots.len(), 12);
    assert!(snapshots.iter().all(|s| s.total == 12));
    assert!(snapshots.iter().all(|s| s.stage == "validating"));
    let max_completed = snapshots.iter().map(|s| s.completed).max().unwrap();
    assert_eq!(max_completed, 12);
}

/// Observer that raises the cancellation token after the first completion.
struct CancellingObserver {
    token: CancelToken,
    seen: AtomicUsize,
}

impl ProgressObserver for CancellingObserver {
    fn on_progress(&self, _progress: &BatchValidationProgress) {
        if self.seen.fetch_add(1, Ordering::SeqCst) == 0 {
            self.token.cancel();
        }
    }
}

#[tokio::test]
async fn cancellation_surfaces_instead_of_a_truncated_report() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();
    for i in 0..100 {
        std::fs::write(data.path().join(format!("p-{i:03}.json")), patient_json(i)).unwrap();
    }

    let token = CancelToken::new();
    let observer = Arc::new(CancellingObserver {
        token: token.clone(),
        seen: AtomicUsize::new(0),
    });
    let batch = BatchValidator::new(validator, config()).with_observer(observer);
    let outcome = batch.validate_directory(data.path(), "*", &token).await;

    assert!(matches!(outcome, Err(BatchError::Cancelled)));
}

#[tokio::test]
async fn in_memory_batch_validates_under_bounded_concurrency() {
    let (_profiles, validator) = schema_validator();
    let resources: Vec<ParsedResource> = (0..20)
        .map(|i| {
            ParsedResource::from_value(
                format!("mem-{i:02}"),
                serde_json::from_str(&patient_json(i)).unwrap(),
            )
        })
        .collect();

    let batch = BatchValidator::new(
        validator,
        config().with_max_concurrency(3),
    );
    let report = batch
        .validate_resources(resources, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 20);
    assert!(report.results.iter().all(|r| r.is_valid));
    assert_eq!(report.metrics.as_ref().unwrap().concurrency, 3);
}

#[tokio::test]
async fn in_memory_cancellation_before_start_schedules_nothing() {
    let (_profiles, validator) = schema_validator();
    let token = CancelToken::new();
    token.cancel();

    let resources = vec![ParsedResource::from_value(
        "a",
        serde_json::from_str(&patient_json(1)).unwrap(),
    )];
    let batch = BatchValidator::new(validator, config());
    let outcome = batch.validate_resources(resources, &token).await;
    assert!(matches!(outcome, Err(BatchError::Cancelled)));
}

#[tokio::test]
async fn invalid_resources_fail_but_do_not_abort() {
    let (_profiles, validator) = schema_validator();
    let data = tempfile::tempdir().unwrap();
    std::fs::write(data.path().join("good.json"), patient_json(1)).unwrap();
    // Valid JSON, violates the profile (missing id, wrong type).
    std::fs::write(
        data.path().join("bad.json"),
        r#"{"resourceType": "Observation"}"#,
    )
    .unwrap();
    // Not JSON at all.
    std::fs::write(data.path().join("mangled.json"), "{not json").unwrap();

    let batch = BatchValidator::new(validator, config());
    let report = batch
        .validate_directory(data.path(), "*", &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(report.results.len(), 3);
    let by_name = |n: &str| report.results.iter().find(|r| r.resource_name == n).unwrap();
    assert!(by_name("good").is_valid);
    assert!(!by_name("bad").is_valid);
    let mangled = by_name("mangled");
    assert!(!mangled.is_valid);
    assert_eq!(mangled.issues[0].code, codes::PARSE_ERROR);
}
