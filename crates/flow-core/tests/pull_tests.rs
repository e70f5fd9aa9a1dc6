//! Pull scenarios against the in-memory tenant

use std::sync::Arc;

use flow_api::Method;
use flow_content::ArtifactKind;
use flow_core::{Action, ArtifactFilter, DraftPolicy, Error, NamingMode, SyncConfig, SyncEngine};
use flow_test_utils::{BundleBuilder, FakeTenant, TestWorkspace, git};
use pretty_assertions::assert_eq;

fn config(ws: &TestWorkspace) -> SyncConfig {
    SyncConfig::new("Pkg", ws.repo_path(), ws.work_path()).with_artifacts_dir(ws.artifacts_path())
}

fn seeded_tenant() -> Arc<FakeTenant> {
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::Integration, "Flow_A")
            .name("Order Flow")
            .parameter("Host", "example.com"),
    );
    tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::ScriptCollection, "Scripts"));
    tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::ValueMapping, "Codes"));
    tenant
}

#[test]
fn pull_writes_artifacts_and_commits() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();

    let report = SyncEngine::new(FakeTenant::client(&tenant), config(&ws))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.count(Action::Written), 3);
    ws.assert_artifact_file_exists("Flow_A/META-INF/MANIFEST.MF");
    ws.assert_artifact_file_contains("Flow_A/src/main/resources/parameters.prop", "Host=example.com");
    ws.assert_artifact_file_exists("Scripts/src/main/resources/script/script1.groovy");
    ws.assert_artifact_file_exists("Codes/value_mapping.xml");
    assert!(ws.work_dir().join("download/Flow_A.zip").is_file());

    assert!(report.commit.is_some());
    let (message, user, email) = git::head_commit(&ws.repo_dir());
    assert_eq!(message, "Sync repo from tenant");
    assert_eq!(user, "github-actions[bot]");
    assert_eq!(email, "41898282+github-actions[bot]@users.noreply.github.com");
}

#[test]
fn second_pull_changes_nothing() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let engine = SyncEngine::new(FakeTenant::client(&tenant), config(&ws)).unwrap();

    engine.run().unwrap();
    let report = engine.run().unwrap();

    assert_eq!(report.count(Action::Unchanged), 3);
    assert!(!report.has_changes());
    assert!(report.commit.is_none());
    assert_eq!(git::commit_count(&ws.repo_dir()), 1);
}

#[test]
fn remote_change_is_written() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let engine = SyncEngine::new(FakeTenant::client(&tenant), config(&ws)).unwrap();
    engine.run().unwrap();

    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::Integration, "Flow_A")
            .name("Order Flow")
            .version("1.0.1")
            .parameter("Host", "other.example.com"),
    );
    let report = engine.run().unwrap();

    assert_eq!(report.action_for("Flow_A"), Some(Action::Written));
    assert_eq!(report.action_for("Codes"), Some(Action::Unchanged));
    ws.assert_artifact_file_contains("Flow_A/src/main/resources/parameters.prop", "other.example.com");
    assert_eq!(git::commit_count(&ws.repo_dir()), 2);
}

#[test]
fn version_only_change_is_not_written() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let engine = SyncEngine::new(FakeTenant::client(&tenant), config(&ws)).unwrap();
    engine.run().unwrap();

    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::ValueMapping, "Codes").version("1.0.7"),
    );
    let report = engine.run().unwrap();

    assert_eq!(report.action_for("Codes"), Some(Action::Unchanged));
    ws.assert_artifact_file_contains("Codes/META-INF/MANIFEST.MF", "Bundle-Version: 1.0.0");
}

#[test]
fn read_only_package_is_skipped() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_read_only_package("Pkg", "Standard Content");
    tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Flow_A"));

    let report = SyncEngine::new(FakeTenant::client(&tenant), config(&ws))
        .unwrap()
        .run()
        .unwrap();

    assert!(report.skipped_read_only);
    assert!(report.outcomes.is_empty());
    ws.assert_artifact_file_not_exists("Flow_A");
    assert_eq!(git::commit_count(&ws.repo_dir()), 0);
    assert_eq!(tenant.requests().len(), 1);
}

#[test]
fn missing_package_is_an_error() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());

    let result = SyncEngine::new(FakeTenant::client(&tenant), config(&ws))
        .unwrap()
        .run();

    assert!(matches!(result, Err(Error::PackageNotFound { ref id, .. }) if id == "Pkg"));
}

#[test]
fn drafts_are_skipped_by_default() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    tenant.add_draft("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Draft_Flow"));

    let report = SyncEngine::new(FakeTenant::client(&tenant), config(&ws))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.action_for("Draft_Flow"), Some(Action::SkippedDraft));
    ws.assert_artifact_file_not_exists("Draft_Flow");
    ws.assert_artifact_file_exists("Flow_A/META-INF/MANIFEST.MF");
}

#[test]
fn draft_error_policy_aborts_before_downloading() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    tenant.add_draft("Pkg", &BundleBuilder::new(ArtifactKind::MessageMapping, "Draft_Map"));
    let mut config = config(&ws);
    config.draft_policy = DraftPolicy::Error;

    let result = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run();

    assert!(matches!(result, Err(Error::DraftConflict { ref id }) if id == "Draft_Map"));
    assert!(tenant.requests().iter().all(|r| !r.path.ends_with("$value")));
    ws.assert_artifact_file_not_exists("Flow_A");
}

#[test]
fn draft_add_policy_pulls_drafts() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    tenant.add_draft("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Draft_Flow"));
    let mut config = config(&ws);
    config.draft_policy = DraftPolicy::Add;

    let report = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run().unwrap();

    assert_eq!(report.action_for("Draft_Flow"), Some(Action::Written));
    ws.assert_artifact_file_exists("Draft_Flow/META-INF/MANIFEST.MF");
}

#[test]
fn include_list_limits_the_run() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let mut config = config(&ws);
    config.filter = ArtifactFilter::from_lists(vec!["Codes".into()], Vec::new()).unwrap();

    let report = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run().unwrap();

    assert_eq!(report.outcomes.len(), 1);
    ws.assert_artifact_file_exists("Codes/value_mapping.xml");
    ws.assert_artifact_file_not_exists("Flow_A");
    ws.assert_artifact_file_not_exists("Scripts");
}

#[test]
fn name_mode_uses_sanitized_names() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::Integration, "Flow_A").name("Orders: Inbound"),
    );
    let mut config = config(&ws);
    config.naming = NamingMode::Name;

    SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run().unwrap();

    ws.assert_artifact_file_exists("Orders_ Inbound/META-INF/MANIFEST.MF");
}

#[test]
fn name_collisions_are_rejected() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Flow_A").name("Orders"));
    tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::MessageMapping, "Map_A").name("orders"));
    let mut config = config(&ws);
    config.naming = NamingMode::Name;

    let result = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run();

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
    ws.assert_artifact_file_not_exists("Orders");
}

#[test]
fn package_details_are_written_only_when_changed() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let mut config = config(&ws);
    config.sync_package_details = true;
    let engine = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap();

    let first = engine.run().unwrap();
    let second = engine.run().unwrap();

    assert!(first.package_details_written);
    assert!(!second.package_details_written);
    ws.assert_artifact_file_contains("Pkg.json", "\"ShortText\": \"Package\"");
}

#[test]
fn script_collection_references_are_rewritten() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.add_artifact("Pkg", &BundleBuilder::iflow_referencing("Flow_A", "Common_Scripts"));
    let mut config = config(&ws);
    config.script_collection_map = vec!["Common_Scripts:Common_Scripts_QA".into()];

    SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run().unwrap();

    ws.assert_artifact_file_contains(
        "Flow_A/src/main/resources/scenarioflows/integrationflow/Flow_A.iflw",
        "<value>Common_Scripts_QA</value>",
    );
    ws.assert_artifact_file_contains("Flow_A/META-INF/MANIFEST.MF", "Common_Scripts_QA");
}

#[test]
fn download_failure_names_the_artifact() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    tenant.fail_on(Method::Get, "Codes", 500, "internal error");

    let err = SyncEngine::new(FakeTenant::client(&tenant), config(&ws))
        .unwrap()
        .run()
        .unwrap_err();

    match &err {
        Error::ArtifactFailed { id, source, .. } => {
            assert_eq!(id, "Codes");
            assert!(source.to_string().contains("500"), "{source}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(git::commit_count(&ws.repo_dir()), 0);
}

#[test]
fn skip_commit_leaves_history_alone() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let mut config = config(&ws);
    config.commit.skip = true;

    let report = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run().unwrap();

    assert_eq!(report.count(Action::Written), 3);
    assert!(report.commit.is_none());
    assert_eq!(git::commit_count(&ws.repo_dir()), 0);
}

#[test]
fn parallel_pull_matches_sequential_result() {
    let ws = TestWorkspace::new();
    let tenant = seeded_tenant();
    let mut config = config(&ws);
    config.parallelism = 4;

    let report = SyncEngine::new(FakeTenant::client(&tenant), config).unwrap().run().unwrap();

    let ids: Vec<&str> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["Flow_A", "Scripts", "Codes"]);
    assert_eq!(report.count(Action::Written), 3);
}
