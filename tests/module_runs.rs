use serde_json::Value;
use vsr_app::runner::{run_host_graphics, run_tag};
use vsr_reconcile::{FailurePolicy, GraphicsParams, HostTarget, TagParams, TagState};
use vsr_vmware::types::{AssignmentPolicy, GraphicsConfig, GraphicsType, HostConnectionState};
use vsr_vmware::{SimulatedDirectory, VmwareError};

const CATEGORY: &str = "urn:vmomi:InventoryServiceCategory:b2c3:GLOBAL";

fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

fn lab() -> SimulatedDirectory {
    SimulatedDirectory::new()
        .with_host(
            "esxi-b.lab",
            HostConnectionState::Connected,
            GraphicsConfig::new(GraphicsType::Shared, AssignmentPolicy::Performance),
        )
        .with_host(
            "esxi-a.lab",
            HostConnectionState::Connected,
            GraphicsConfig::new(GraphicsType::SharedDirect, AssignmentPolicy::Consolidation),
        )
        .with_host(
            "esxi-c.lab",
            HostConnectionState::NotResponding,
            GraphicsConfig::new(GraphicsType::Shared, AssignmentPolicy::Performance),
        )
        .with_cluster("vdi", &["esxi-b.lab", "esxi-a.lab", "esxi-c.lab"])
        .with_category(CATEGORY, "Department")
}

fn graphics(target: HostTarget) -> GraphicsParams {
    GraphicsParams {
        target,
        graphics_type: GraphicsType::SharedDirect,
        assignment_policy: AssignmentPolicy::Consolidation,
        restart_xorg: true,
        on_host_error: FailurePolicy::FailFast,
    }
}

#[tokio::test]
async fn host_results_keep_cluster_order() {
    let dir = lab();
    let out = run_host_graphics(&dir, &graphics(HostTarget::Cluster("vdi".into())), false).await;
    assert_eq!(out.exit_code, 0);

    let b = out.body.find("esxi-b.lab").unwrap();
    let a = out.body.find("esxi-a.lab").unwrap();
    let c = out.body.find("esxi-c.lab").unwrap();
    assert!(b < a && a < c);

    let v = json(&out.body);
    assert_eq!(v["changed"], true);
    assert_eq!(v["results"]["esxi-b.lab"]["changed"], true);
    assert_eq!(v["results"]["esxi-a.lab"]["msg"], "All Host Graphics Settings already configured");
    assert_eq!(v["results"]["esxi-c.lab"]["msg"], "Host esxi-c.lab is disconnected and cannot be changed");
}

#[tokio::test]
async fn check_mode_reports_no_change() {
    let dir = lab();
    let out = run_host_graphics(&dir, &graphics(HostTarget::Cluster("vdi".into())), true).await;
    let v = json(&out.body);
    assert_eq!(v["changed"], false);
    assert!(v["results"]["esxi-b.lab"]["msg"]
        .as_str()
        .unwrap()
        .starts_with("New host graphics settings would be changed to:"));
    assert!(dir.mutations().await.is_empty());
}

#[tokio::test]
async fn host_fault_fails_the_run_with_partial_results() {
    let dir = lab().with_update_fault("esxi-b.lab", VmwareError::config_fault("Graphics device busy"));
    let mut p = graphics(HostTarget::Cluster("vdi".into()));
    p.on_host_error = FailurePolicy::Continue;
    let out = run_host_graphics(&dir, &p, false).await;

    assert_eq!(out.exit_code, 1);
    let v = json(&out.body);
    assert_eq!(v["failed"], true);
    assert_eq!(v["changed"], false);
    assert_eq!(v["msg"], "Failed to configure host graphics settings on 1 of 3 host(s)");
    assert_eq!(v["results"]["esxi-b.lab"]["failed"], true);
    assert_eq!(
        v["results"]["esxi-b.lab"]["msg"],
        "Failed to configure host graphics settings for host esxi-b.lab due to: Graphics device busy"
    );
}

#[tokio::test]
async fn unresolvable_hosts_fail_without_results() {
    let dir = lab();
    let out = run_host_graphics(&dir, &graphics(HostTarget::Hosts(vec!["nope".into()])), false).await;
    assert_eq!(out.exit_code, 1);
    let v = json(&out.body);
    assert_eq!(v["msg"], "Failed to find host system.");
    assert!(v.get("results").is_none());
}

#[tokio::test]
async fn sample_tag_is_created() {
    let dir = lab().with_created_tag_id("urn:vmomi:InventoryServiceTag:7d1c:GLOBAL");
    let p = TagParams {
        tag_name: "Sample_Tag_0002".into(),
        tag_description: "Sample Description".into(),
        category_id: Some(CATEGORY.into()),
        state: TagState::Present,
    };
    let out = run_tag(&dir, &p, false).await;
    assert_eq!(out.exit_code, 0);
    assert_eq!(
        out.body,
        r#"{"changed":true,"tag_status":{"msg":"Tag 'Sample_Tag_0002' created.","tag_id":"urn:vmomi:InventoryServiceTag:7d1c:GLOBAL"}}"#
    );
}

#[tokio::test]
async fn absent_tag_that_does_not_exist() {
    let dir = lab();
    let p = TagParams {
        tag_name: "Sample_Tag_0002".into(),
        tag_description: String::new(),
        category_id: None,
        state: TagState::Absent,
    };
    let out = run_tag(&dir, &p, false).await;
    assert_eq!(out.body, r#"{"changed":false}"#);
}

#[tokio::test]
async fn tag_without_category_fails_cleanly() {
    let dir = lab();
    let p = TagParams {
        tag_name: "Sample_Tag_0002".into(),
        tag_description: String::new(),
        category_id: None,
        state: TagState::Present,
    };
    let out = run_tag(&dir, &p, false).await;
    assert_eq!(out.exit_code, 1);
    assert_eq!(
        json(&out.body)["msg"],
        "'category_id' is required parameter while creating tag."
    );
}
