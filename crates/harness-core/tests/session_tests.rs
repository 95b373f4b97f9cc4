//! End-to-end session runs against the shipped compose files, with Docker
//! and HTTP replaced by recording doubles

use check_harness_core::bootstrap::{ComposeAction, RecordingRunner};
use check_harness_core::config::{ConfigOverrides, EnvSnapshot, resolve_settings};
use check_harness_core::couch::{self, CouchVersion};
use check_harness_core::seed::HttpResponse;
use check_harness_core::seed::mock::{Method, MockTransport};
use check_harness_core::session::Session;
use check_harness_core::HarnessError;
use tempfile::TempDir;

fn fast_settings(version: &str, dir: &TempDir) -> check_harness_core::config::HarnessSettings {
    std::fs::write(
        dir.path().join(".harness.toml"),
        "[bootstrap]\nsettle_secs = 0\n\n[seed]\nmax_attempts = 4\ninterval_ms = 0\n",
    )
    .unwrap();
    // Stop the repo-config walk at the temp dir.
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();

    let env = EnvSnapshot::from_pairs([("COUCH_VERSION", version), ("COUCH_PORT", "15984")]);
    resolve_settings(&ConfigOverrides::default(), &env, dir.path(), dir.path()).unwrap()
}

#[test]
fn test_v2_session_seeds_every_node() {
    let dir = TempDir::new().unwrap();
    let settings = fast_settings("2.3.1", &dir);
    let runner = RecordingRunner::new();
    let mock = MockTransport::new();
    mock.default_get(Ok(HttpResponse::new(200, r#"{"couchdb":{"request_time":{}}}"#)));

    let session = Session::start(&settings, Box::new(runner.clone()), &mock).unwrap();

    let descriptor = session.environment().descriptor();
    assert!(descriptor.file.ends_with("couch/compose/compose_v2.yaml"));
    assert!(descriptor.file.exists());
    assert!(
        descriptor
            .env
            .contains(&("COUCH_PORT".to_string(), "15984".to_string()))
    );

    assert_eq!(
        session.instance(),
        &couch::instance_config(CouchVersion::V2, "http://localhost:15984")
    );
    for node in couch::CLUSTER_NODES {
        let url = format!("http://localhost:15984/_node/{node}/_stats");
        assert_eq!(mock.get_count(&url), 1, "{url}");
    }
    assert!(
        mock.calls()
            .iter()
            .filter(|c| c.method == Method::Put)
            .all(|c| c.credentials == CouchVersion::V2.credentials())
    );

    session.stop().unwrap();
    assert_eq!(
        runner.actions(),
        vec![
            (ComposeAction::Up, settings.project.clone()),
            (ComposeAction::Down, settings.project.clone()),
        ]
    );
}

#[test]
fn test_v1_session_polls_single_node_unauthenticated() {
    let dir = TempDir::new().unwrap();
    let settings = fast_settings("1", &dir);
    let mock = MockTransport::new();
    mock.default_get(Ok(HttpResponse::new(200, r#"{"httpd":{}}"#)));

    let session = Session::start(&settings, Box::new(RecordingRunner::new()), &mock).unwrap();

    assert!(session.instance().user.is_none());
    assert_eq!(mock.get_count("http://localhost:15984/_stats"), 1);
    assert!(mock.calls().iter().all(|c| c.credentials.is_none()));
}

#[test]
fn test_empty_stats_time_out_quietly() {
    let dir = TempDir::new().unwrap();
    let settings = fast_settings("2", &dir);
    let mock = MockTransport::new();
    mock.default_get(Ok(HttpResponse::new(200, "{}")));

    let session = Session::start(&settings, Box::new(RecordingRunner::new()), &mock).unwrap();

    let report = session.seed_report().unwrap();
    assert!(report.timed_out);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.pending().len(), 3);
}

#[test]
fn test_unreachable_service_fails_setup_and_tears_down() {
    let dir = TempDir::new().unwrap();
    let settings = fast_settings("2", &dir);
    let runner = RecordingRunner::new();
    let mock = MockTransport::new();
    // Default GET reply is "connection refused"; fail fast.
    let err = check_harness_core::bootstrap::Bootstrapper::new(
        Box::new(runner.clone()),
        settings.bootstrap_timeout,
    )
    .start(
        check_harness_core::session::descriptor(&settings),
        vec![Box::new(
            check_harness_core::bootstrap::CheckEndpoints::new(&mock, vec![settings.base_url()])
                .with_attempts(2, std::time::Duration::ZERO),
        )],
    )
    .unwrap_err();

    assert!(err.is_setup_failure());
    assert!(matches!(err, HarnessError::ConditionFailed { .. }));
    assert_eq!(runner.down_count(), 1);
}
