//! Pull and push scenarios spanning several runs

use std::sync::Arc;

use flow_content::ArtifactKind;
use flow_core::{Action, DraftPolicy, NamingMode, SyncConfig, SyncDirection, SyncEngine};
use flow_test_utils::{BundleBuilder, FakeTenant, TestWorkspace, git};
use pretty_assertions::assert_eq;

fn config(ws: &TestWorkspace, package_id: &str, direction: SyncDirection) -> SyncConfig {
    let mut config =
        SyncConfig::new(package_id, ws.repo_path(), ws.work_path()).with_artifacts_dir(ws.artifacts_path());
    config.direction = direction;
    config
}

fn mixed_package(tenant: &FakeTenant) {
    tenant.add_package("Pkg", "Package");
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::iflow_referencing("Order_Inbound", "Common_Scripts")
            .name("Order Inbound")
            .version("1.2.3")
            .parameter("Endpoint", "/orders"),
    );
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::MessageMapping, "Order_Map").name("Order Map"),
    );
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::ScriptCollection, "Common_Scripts").name("Common Scripts"),
    );
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::ValueMapping, "Country_Codes").name("Country Codes"),
    );
}

#[test]
fn pull_then_push_is_a_no_op_in_name_mode() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    mixed_package(&tenant);

    let mut pull = config(&ws, "Pkg", SyncDirection::Local);
    pull.naming = NamingMode::Name;
    let pulled = SyncEngine::new(FakeTenant::client(&tenant), pull).unwrap().run().unwrap();
    assert_eq!(pulled.count(Action::Written), 4);
    ws.assert_artifact_file_exists("Order Inbound/META-INF/MANIFEST.MF");

    tenant.clear_requests();
    let pushed = SyncEngine::new(FakeTenant::client(&tenant), config(&ws, "Pkg", SyncDirection::Remote))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(pushed.count(Action::Unchanged), 4);
    assert!(tenant.mutations().is_empty());
    assert_eq!(
        tenant.artifact_version(ArtifactKind::Integration, "Order_Inbound").as_deref(),
        Some("1.2.3")
    );
}

#[test]
fn local_edit_round_trips_to_the_tenant() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    mixed_package(&tenant);
    SyncEngine::new(FakeTenant::client(&tenant), config(&ws, "Pkg", SyncDirection::Local))
        .unwrap()
        .run()
        .unwrap();

    std::fs::write(
        ws.artifacts_dir().join("Order_Inbound/src/main/resources/parameters.prop"),
        "#Store parameters\nEndpoint=/orders/v2\n",
    )
    .unwrap();
    let pushed = SyncEngine::new(FakeTenant::client(&tenant), config(&ws, "Pkg", SyncDirection::Remote))
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(pushed.action_for("Order_Inbound"), Some(Action::Updated));
    assert_eq!(pushed.count(Action::Updated), 1);
    assert_eq!(
        tenant.artifact_version(ArtifactKind::Integration, "Order_Inbound").as_deref(),
        Some("1.2.4")
    );

    // The remote now differs only by version, which pull ignores
    let pulled = SyncEngine::new(FakeTenant::client(&tenant), config(&ws, "Pkg", SyncDirection::Local))
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(pulled.action_for("Order_Inbound"), Some(Action::Unchanged));
    ws.assert_artifact_file_contains("Order_Inbound/src/main/resources/parameters.prop", "/orders/v2");
    assert_eq!(git::commit_count(&ws.repo_dir()), 2);
}

#[test]
fn rewritten_pull_is_stable_across_runs() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    mixed_package(&tenant);
    let mut pull = config(&ws, "Pkg", SyncDirection::Local);
    pull.script_collection_map = vec!["Common_Scripts:Common_Scripts_QA".into()];
    let engine = SyncEngine::new(FakeTenant::client(&tenant), pull).unwrap();

    engine.run().unwrap();
    let second = engine.run().unwrap();

    assert_eq!(second.action_for("Order_Inbound"), Some(Action::Unchanged));
    assert_eq!(git::commit_count(&ws.repo_dir()), 1);
    ws.assert_artifact_file_contains("Order_Inbound/META-INF/MANIFEST.MF", "Common_Scripts_QA");
}

#[test]
fn changes_outside_diff_rules_are_not_written() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::Integration, "Flow_A").file("notes/readme.txt", "first"),
    );
    let engine =
        SyncEngine::new(FakeTenant::client(&tenant), config(&ws, "Pkg", SyncDirection::Local)).unwrap();
    engine.run().unwrap();

    tenant.add_artifact(
        "Pkg",
        &BundleBuilder::new(ArtifactKind::Integration, "Flow_A").file("notes/readme.txt", "second"),
    );
    let report = engine.run().unwrap();

    assert_eq!(report.action_for("Flow_A"), Some(Action::Unchanged));
    ws.assert_artifact_file_contains("Flow_A/notes/readme.txt", "first");
}

#[test]
fn saved_draft_is_picked_up_by_the_next_pull() {
    let ws = TestWorkspace::new();
    let tenant = Arc::new(FakeTenant::new());
    tenant.add_package("Pkg", "Package");
    tenant.add_draft("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Flow_A"));
    let mut pull = config(&ws, "Pkg", SyncDirection::Local);
    pull.draft_policy = DraftPolicy::Skip;
    let engine = SyncEngine::new(FakeTenant::client(&tenant), pull).unwrap();

    let first = engine.run().unwrap();
    assert_eq!(first.action_for("Flow_A"), Some(Action::SkippedDraft));
    ws.assert_artifact_file_not_exists("Flow_A");

    tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Flow_A"));
    let second = engine.run().unwrap();
    assert_eq!(second.action_for("Flow_A"), Some(Action::Written));
}

#[test]
fn pulled_package_is_promoted_to_a_second_tenant() {
    let ws = TestWorkspace::new();
    let source = Arc::new(FakeTenant::new());
    mixed_package(&source);
    SyncEngine::new(FakeTenant::client(&source), config(&ws, "Pkg", SyncDirection::Local))
        .unwrap()
        .run()
        .unwrap();

    let target = Arc::new(FakeTenant::new());
    target.add_package("Pkg", "Package");
    let mut push = config(&ws, "Pkg", SyncDirection::Remote);
    push.parallelism = 3;
    let report = SyncEngine::new(FakeTenant::client(&target), push).unwrap().run().unwrap();

    assert_eq!(report.count(Action::Created), 4);
    for kind in ArtifactKind::ALL {
        let id = report
            .outcomes
            .iter()
            .find(|o| o.kind == kind)
            .map(|o| o.id.clone())
            .unwrap();
        assert_eq!(target.artifact_version(kind, &id).as_deref(), Some("1.0.0"));
    }
    assert!(source.mutations().is_empty());
}
