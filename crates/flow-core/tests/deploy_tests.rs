//! Deploy-and-wait scenarios

use std::sync::Arc;
use std::time::Duration;

use flow_content::ArtifactKind;
use flow_core::{CancelToken, DeployOptions, Error, deploy_artifacts};
use flow_test_utils::{BundleBuilder, FakeTenant};

fn tenant_with(ids: &[&str]) -> Arc<FakeTenant> {
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    for id in ids {
        tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::Integration, id).version("1.0.3"));
    }
    tenant
}

fn quick(max_checks: u32) -> DeployOptions {
    DeployOptions {
        delay: Duration::ZERO,
        max_checks,
    }
}

#[test]
fn waits_until_started() {
    let tenant = tenant_with(&["Flow_A", "Flow_B"]);
    tenant.set_deploy_polls(2);
    let ids = vec!["Flow_A".to_string(), "Flow_B".to_string()];

    let started = deploy_artifacts(
        &FakeTenant::client(&tenant),
        ArtifactKind::Integration,
        &ids,
        &quick(5),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(started.len(), 2);
    assert!(started.iter().all(|s| s.status == "STARTED" && s.version == "1.0.3"));
    assert_eq!(tenant.runtime_status("Flow_B").as_deref(), Some("STARTED"));
}

#[test]
fn error_status_carries_error_information() {
    let tenant = tenant_with(&["Flow_A"]);
    tenant.fail_deploy("Flow_A");

    let err = deploy_artifacts(
        &FakeTenant::client(&tenant),
        ArtifactKind::Integration,
        &["Flow_A".to_string()],
        &quick(3),
        &CancelToken::new(),
    )
    .unwrap_err();

    match err {
        Error::DeployFailed { id, status, details } => {
            assert_eq!(id, "Flow_A");
            assert_eq!(status, "ERROR");
            assert!(details.contains("failed"), "{details}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn gives_up_after_check_limit() {
    let tenant = tenant_with(&["Flow_A"]);
    tenant.set_deploy_polls(10);

    let err = deploy_artifacts(
        &FakeTenant::client(&tenant),
        ArtifactKind::Integration,
        &["Flow_A".to_string()],
        &quick(2),
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::DeployTimeout { checks: 2, .. }));
}

#[test]
fn unknown_artifact_is_not_found() {
    let tenant = tenant_with(&[]);

    let err = deploy_artifacts(
        &FakeTenant::client(&tenant),
        ArtifactKind::Integration,
        &["Missing".to_string()],
        &quick(1),
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Api(ref e) if e.is_not_found()));
}

#[test]
fn cancelled_run_deploys_nothing() {
    let tenant = tenant_with(&["Flow_A"]);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = deploy_artifacts(
        &FakeTenant::client(&tenant),
        ArtifactKind::Integration,
        &["Flow_A".to_string()],
        &quick(1),
        &cancel,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert!(tenant.mutations().is_empty());
}
