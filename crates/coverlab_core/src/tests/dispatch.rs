//! Tests for run dispatch against fake engines
//!
//! These tests verify:
//! - Geometry artifacts are generated once per key and never rewritten
//! - Missing archives fail the run before the engine is launched
//! - Stale reports are removed, or reused when configured
//! - Timeouts and spawn failures are reported as engine statuses

use std::fs;

use super::fixtures::{ECHO_ENGINE, Lab, SLEEPING_ENGINE};
use crate::engine::{EngineStatus, RunDispatcher};
use crate::error::RunError;
use crate::geometry::GeometryArtifact;
use crate::model::{ParamValue, RunConfig};

fn run(delta: f64, archive: i64) -> RunConfig {
    RunConfig::new([
        ("delta", ParamValue::Float(delta)),
        ("n_regions", ParamValue::Int(3)),
        ("region_size", ParamValue::Float(0.25)),
        ("archive_size", ParamValue::Int(archive)),
    ])
    .unwrap()
}

#[test]
fn test_dispatch_writes_report_at_tag_path() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());

    let outcome = dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    assert_eq!(outcome.tag.as_str(), "0.1-3-0.25-1000");
    assert_eq!(outcome.report_path, lab.report_path("0.1-3-0.25-1000"));
    assert!(matches!(
        outcome.status,
        EngineStatus::Exited { code: Some(0), .. }
    ));
    assert!(outcome.report_path.is_file());

    let geometry = lab.config.regions_path().join("3-0.25.csv");
    let artifact = GeometryArtifact::read(&geometry).unwrap();
    assert_eq!(artifact.len(), 3);
}

#[test]
fn test_geometry_generated_once_per_key() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());

    dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    let geometry = dispatcher.cache().path_for("3-0.25");
    let first_bytes = fs::read(&geometry).unwrap();
    let first_mtime = fs::metadata(&geometry).unwrap().modified().unwrap();

    // Same geometry key, different delta
    dispatcher.dispatch(&run(0.2, 1000)).unwrap();
    assert_eq!(dispatcher.cache().generated_count(), 1);
    assert_eq!(fs::read(&geometry).unwrap(), first_bytes);
    assert_eq!(
        fs::metadata(&geometry).unwrap().modified().unwrap(),
        first_mtime
    );
}

#[test]
fn test_existing_artifact_is_never_revalidated() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());
    let geometry = dispatcher.cache().path_for("3-0.25");
    fs::create_dir_all(geometry.parent().unwrap()).unwrap();
    fs::write(&geometry, "Polygon\n\"[[0,0],[1,0],[0,1]]\"\n").unwrap();

    dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    assert_eq!(dispatcher.cache().generated_count(), 0);
    assert_eq!(GeometryArtifact::read(&geometry).unwrap().len(), 1);
}

#[test]
fn test_regenerated_artifact_is_identical() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());
    dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    let geometry = dispatcher.cache().path_for("3-0.25");
    let original = fs::read(&geometry).unwrap();

    fs::remove_file(&geometry).unwrap();
    let fresh = RunDispatcher::new(lab.config.clone());
    fresh.dispatch(&run(0.1, 1000)).unwrap();
    assert_eq!(fs::read(&geometry).unwrap(), original);
}

#[test]
fn test_missing_archive_fails_run() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());
    let err = dispatcher.dispatch(&run(0.1, 5000)).unwrap_err();
    assert!(matches!(err, RunError::MissingArchive(ref p) if p.ends_with("5000.csv")));
    assert!(!lab.report_path("0.1-3-0.25-5000").exists());
}

#[test]
fn test_text_archive_stays_inside_archives_dir() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());
    let outside = lab.config.archives_path().join("../escape.csv");
    fs::write(&outside, "id\n").unwrap();

    let config = RunConfig::new([
        ("delta", ParamValue::Float(0.1)),
        ("n_regions", ParamValue::Int(3)),
        ("region_size", ParamValue::Float(0.25)),
        ("archive_size", ParamValue::from("../escape")),
    ])
    .unwrap();
    let err = dispatcher.dispatch(&config).unwrap_err();
    let RunError::MissingArchive(path) = &err else {
        panic!("expected a missing archive, got {err:?}");
    };
    assert_eq!(path.parent(), Some(lab.config.archives_path().as_path()));
    assert_eq!(path.file_name().unwrap(), "..%2Fescape.csv");
}

#[test]
fn test_stale_report_is_removed_before_launch() {
    let lab = Lab::new(super::fixtures::CRASHING_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());
    let report = lab.report_path("0.1-3-0.25-1000");
    fs::create_dir_all(report.parent().unwrap()).unwrap();
    fs::write(&report, r#"[{"t1": 99}]"#).unwrap();

    let outcome = dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    assert_eq!(
        outcome.status,
        EngineStatus::Exited {
            code: Some(139),
            stderr: "segmentation fault".into()
        }
    );
    assert!(!report.exists());
}

#[test]
fn test_reuse_reports_skips_engine() {
    let mut lab = Lab::new(ECHO_ENGINE);
    lab.config.reuse_reports = true;
    // The engine would fail if launched.
    lab.config.engine = lab.root().join("bin/does-not-exist");
    let dispatcher = RunDispatcher::new(lab.config.clone());
    let report = lab.report_path("0.1-3-0.25-1000");
    fs::create_dir_all(report.parent().unwrap()).unwrap();
    fs::write(&report, r#"[{"t1": 99}]"#).unwrap();

    let outcome = dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    assert_eq!(outcome.status, EngineStatus::Reused);
    assert!(report.exists());
}

#[test]
fn test_timeout_kills_engine() {
    let mut lab = Lab::new(SLEEPING_ENGINE);
    lab.config.timeout_secs = Some(1);
    let dispatcher = RunDispatcher::new(lab.config.clone());

    let start = std::time::Instant::now();
    let outcome = dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    assert!(matches!(outcome.status, EngineStatus::TimedOut { .. }));
    assert!(start.elapsed() < std::time::Duration::from_secs(8));
}

#[test]
fn test_missing_engine_is_spawn_failure() {
    let mut lab = Lab::new(ECHO_ENGINE);
    lab.config.engine = lab.root().join("bin/nope");
    let dispatcher = RunDispatcher::new(lab.config.clone());
    let outcome = dispatcher.dispatch(&run(0.1, 1000)).unwrap();
    assert!(matches!(outcome.status, EngineStatus::SpawnFailed(_)));
}

#[test]
fn test_parallel_dispatch_shares_one_artifact() {
    let lab = Lab::new(ECHO_ENGINE);
    let dispatcher = RunDispatcher::new(lab.config.clone());

    std::thread::scope(|s| {
        for i in 0..6 {
            let dispatcher = &dispatcher;
            s.spawn(move || {
                dispatcher
                    .dispatch(&run(0.1 + f64::from(i) * 0.1, 1000))
                    .unwrap();
            });
        }
    });
    assert_eq!(dispatcher.cache().generated_count(), 1);
}
