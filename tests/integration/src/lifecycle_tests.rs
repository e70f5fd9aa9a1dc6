//! Designtime artifact lifecycle across the API and core crates

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flow_api::model::ACTIVE;
use flow_content::ArtifactKind;
use flow_core::{
    Action, CancelToken, ConfigFile, DeployOptions, PackageChange, SyncConfig, SyncDirection, SyncEngine,
    deploy_artifacts, update_package,
};
use flow_fs::NormalizedPath;
use flow_test_utils::{BundleBuilder, FakeTenant, TestWorkspace};
use pretty_assertions::assert_eq;

fn fixture(relative: &str) -> NormalizedPath {
    NormalizedPath::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures").join(relative))
}

#[test]
fn create_update_deploy_delete() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.set_deploy_polls(1);
    let client = FakeTenant::client(&tenant);
    let designtime = client.designtime(ArtifactKind::Integration);

    let source = NormalizedPath::new(
        BundleBuilder::new(ArtifactKind::Integration, "Flow_A")
            .parameter("Host", "a.example.com")
            .write_to(&ws.root().join("src/Flow_A")),
    );

    designtime.create("Flow_A", "Flow A", "Pkg", &source).unwrap();
    let created = designtime.get("Flow_A", ACTIVE).unwrap();
    assert!(created.exists);
    assert_eq!(created.version, "1.0.0");

    designtime.update("Flow_A", "Flow A", "Pkg", &source).unwrap();
    assert_eq!(designtime.get("Flow_A", ACTIVE).unwrap().version, "1.0.1");

    let started = deploy_artifacts(
        &client,
        ArtifactKind::Integration,
        &["Flow_A".to_string()],
        &DeployOptions {
            delay: Duration::ZERO,
            max_checks: 3,
        },
        &CancelToken::new(),
    )
    .unwrap();
    assert!(started[0].status.starts_with("START"));
    assert_eq!(started[0].version, "1.0.1");

    designtime.delete("Flow_A").unwrap();
    assert!(!designtime.get("Flow_A", ACTIVE).unwrap().exists);
}

#[test]
fn create_twice_is_a_conflict() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    let designtime = FakeTenant::client(&tenant).designtime(ArtifactKind::MessageMapping);
    let source = NormalizedPath::new(
        BundleBuilder::new(ArtifactKind::MessageMapping, "Map_A").write_to(&ws.root().join("src/Map_A")),
    );

    designtime.create("Map_A", "Map A", "Pkg", &source).unwrap();
    let err = designtime.create("Map_A", "Map A", "Pkg", &source).unwrap_err();

    assert!(matches!(err, flow_api::Error::Conflict { .. }), "{err}");
}

#[test]
fn package_from_fixture_then_push() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    let client = FakeTenant::client(&tenant);

    let change = update_package(&client, &fixture("packages/OrderProcessing.json")).unwrap();
    assert_eq!(change, PackageChange::Created);
    assert_eq!(
        tenant.package_field("OrderProcessing", "LineOfBusiness").as_deref(),
        Some("Sales")
    );

    BundleBuilder::new(ArtifactKind::ScriptCollection, "Common_Scripts")
        .write_to(&ws.artifacts_dir().join("Common_Scripts"));
    let mut config = SyncConfig::new("OrderProcessing", ws.repo_path(), ws.work_path())
        .with_artifacts_dir(ws.artifacts_path());
    config.direction = SyncDirection::Remote;

    let report = SyncEngine::new(client, config).unwrap().run().unwrap();

    assert_eq!(report.action_for("Common_Scripts"), Some(Action::Created));
    assert_eq!(
        tenant.artifact_version(ArtifactKind::ScriptCollection, "Common_Scripts").as_deref(),
        Some("1.0.0")
    );
}

#[test]
fn sample_config_file_parses() {
    let file = ConfigFile::load(&fixture("flowsync.toml")).unwrap();

    assert_eq!(file.tenant.timeout, Some(120));
    assert_eq!(file.sync.package_id.as_deref(), Some("OrderProcessing"));
    assert_eq!(file.sync.draft_handling.as_deref(), Some("ERROR"));
    assert_eq!(file.sync.parallelism, Some(4));
    assert_eq!(file.sync.script_collection_map, vec!["Common_Scripts:Common_Scripts_QA"]);
}
