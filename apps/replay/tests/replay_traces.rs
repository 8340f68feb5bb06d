//! Replays of the shipped traces and of scratch trace files.

use std::io::Write;
use std::path::PathBuf;

use checkout_replay::{replay_file, ReplayError, ReplayReport};
use checkout_session::CheckoutConfig;
use tempfile::NamedTempFile;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures")
}

fn config() -> CheckoutConfig {
    let mut config = CheckoutConfig::default();
    config.catalog.scanner_path = fixtures().join("products.csv");
    config.catalog.register_path = fixtures().join("products.csv");
    config
}

fn trace_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp trace");
    file.write_all(contents.as_bytes()).expect("write temp trace");
    file
}

#[test]
fn recorded_csv_trace_replays() {
    let report = replay_file(fixtures().join("traces/session.csv"), config()).unwrap();
    assert_eq!(
        report,
        ReplayReport {
            traces: 1,
            events: 25,
            sessions: 3
        }
    );
}

#[test]
fn recorded_json_trace_replays() {
    let report = replay_file(fixtures().join("traces/session.json"), config()).unwrap();
    assert_eq!(
        report,
        ReplayReport {
            traces: 3,
            events: 25,
            sessions: 3
        }
    );
}

#[test]
fn english_operation_names_replay() {
    let file = trace_file(
        ".csv",
        "1,0,a,scan1,unlock,[],0\n\
         2,0,a,scan1,scan,[3017620402678],0\n\
         3,0,a,scan1,handoff,[caisse1],0\n\
         4,0,a,caisse1,openSession,[],0\n\
         5,0,a,caisse1,addItem,[3017620402678],0\n\
         6,0,a,caisse1,removeItem,[3017620402678],0\n\
         7,0,a,caisse1,closeSession,[],0\n\
         8,0,a,caisse1,pay,[1.86],0\n",
    );

    let report = replay_file(file.path(), config()).unwrap();
    assert_eq!(report.events, 8);
}

#[test]
fn wrong_expectation_fails_at_its_line() {
    let file = trace_file(
        ".csv",
        "1,0,a,scan1,debloquer,[],0\n\
         2,0,a,scan1,scanner,[3017620402678],0\n\
         3,0,a,scan1,transmission,[caisse1],0\n\
         4,0,a,caisse1,payer,[2],0.50\n\
         5,0,a,scan1,debloquer,[],0\n",
    );

    let err = replay_file(file.path(), config()).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    match err {
        ReplayError::Mismatch {
            line,
            object,
            operation,
            actual,
            ..
        } => {
            assert_eq!(line, 4);
            assert_eq!(object, "caisse1");
            assert_eq!(operation, "pay");
            assert_eq!(actual, "0.14");
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn json_mismatch_uses_event_number() {
    let file = trace_file(
        ".json",
        r#"{"traces": [
            {"events": [
                {"action": "debloquer", "inputs": {}, "outputs": {"Status": 0}, "meta_data": {"object": "scan1"}}
            ]},
            {"events": [
                {"action": "debloquer", "inputs": {}, "outputs": {"Status": 0}, "meta_data": {"object": "scan1"}}
            ]}
        ]}"#,
    );

    match replay_file(file.path(), config()) {
        Err(ReplayError::Mismatch { line, actual, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(actual, "-1");
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn unsupported_or_missing_files() {
    let file = trace_file(".txt", "");
    let err = replay_file(file.path(), config()).unwrap_err();
    assert!(matches!(err, ReplayError::UnsupportedFormat(_)));
    assert_eq!(err.exit_code(), 2);

    assert!(matches!(
        replay_file("/nonexistent/trace.csv", config()),
        Err(ReplayError::Io(_))
    ));

    let file = trace_file(".json", "{\"traces\": [");
    assert!(matches!(
        replay_file(file.path(), config()),
        Err(ReplayError::Json(_))
    ));
}
