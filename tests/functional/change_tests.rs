//! Change flow tests.

use jiff::Timestamp;
use k8s_openapi::api::core::v1::NodeCondition;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use nodecon::reconciler::{ChangeOutcome, change};
use nodecon::{ConditionChangeRequest, ConditionStatus};

use crate::Call;
use crate::common::fixtures::{
    NodeBuilder, condition, conditions_of, find_condition, fixed_time, healthy_node,
};
use crate::mock_client::MockNodeStore;

#[tokio::test]
async fn test_change_single_condition_to_true() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);
    let now = Timestamp::now();

    let request = ConditionChangeRequest::single("worker-1", "DiskPressure", ConditionStatus::True)
        .with_message("disk is full");
    let outcome = change(&store, &request, now).await.unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Applied {
            types: vec!["DiskPressure".to_string()]
        }
    );

    let node = store.node("worker-1");
    let disk = find_condition(&node, "DiskPressure").unwrap();
    assert_eq!(disk.status, "True");
    assert_eq!(disk.message.as_deref(), Some("disk is full"));
    assert_eq!(disk.last_transition_time, Some(Time(now)));
    assert_eq!(disk.reason.as_deref(), Some("KubeletDiskPressure"));

    // Other conditions are untouched
    let ready = find_condition(&node, "Ready").unwrap();
    assert_eq!(ready.last_transition_time, Some(Time(fixed_time())));
}

#[tokio::test]
async fn test_change_reads_twice_and_replaces_once() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);

    let request = ConditionChangeRequest::single("worker-1", "GPUHealthy", ConditionStatus::False);
    change(&store, &request, Timestamp::now()).await.unwrap();

    assert_eq!(
        store.calls(),
        vec![
            Call::Get("worker-1".to_string()),
            Call::Get("worker-1".to_string()),
            Call::ReplaceStatus("worker-1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_true_to_false_advances_transition_time() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);
    let now = Timestamp::now();

    let request = ConditionChangeRequest::single("worker-1", "GPUHealthy", ConditionStatus::False);
    change(&store, &request, now).await.unwrap();

    let node = store.node("worker-1");
    let gpu = find_condition(&node, "GPUHealthy").unwrap();
    assert_eq!(gpu.status, "False");
    let transitioned = gpu.last_transition_time.as_ref().unwrap().0;
    assert!(transitioned >= fixed_time());
    assert_eq!(transitioned, now);
}

#[tokio::test]
async fn test_true_to_true_keeps_transition_time() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);

    let request = ConditionChangeRequest::single("worker-1", "GPUHealthy", ConditionStatus::True);
    change(&store, &request, Timestamp::now()).await.unwrap();

    let node = store.node("worker-1");
    let gpu = find_condition(&node, "GPUHealthy").unwrap();
    assert_eq!(gpu.status, "True");
    assert_eq!(gpu.last_transition_time, Some(Time(fixed_time())));
}

#[tokio::test]
async fn test_disk_pressure_to_true_keeps_message() {
    let store = MockNodeStore::with_nodes([NodeBuilder::new("worker-1")
        .condition("Ready", "True")
        .condition("DiskPressure", "False")
        .build()]);

    let request = ConditionChangeRequest::single("worker-1", "DiskPressure", ConditionStatus::True);
    change(&store, &request, Timestamp::now()).await.unwrap();

    let node = store.node("worker-1");
    let disk = find_condition(&node, "DiskPressure").unwrap();
    assert_eq!(disk.status, "True");
    assert_eq!(disk.message.as_deref(), Some("DiskPressure reported by kubelet"));
}

#[tokio::test]
async fn test_disk_pressure_to_false_uses_ok_message() {
    let store = MockNodeStore::with_nodes([NodeBuilder::new("worker-1")
        .condition("Ready", "True")
        .condition("DiskPressure", "True")
        .build()]);

    let request = ConditionChangeRequest::single("worker-1", "DiskPressure", ConditionStatus::False);
    change(&store, &request, Timestamp::now()).await.unwrap();

    let node = store.node("worker-1");
    let disk = find_condition(&node, "DiskPressure").unwrap();
    assert_eq!(disk.message.as_deref(), Some("kubelet has no disk pressure"));
}

#[tokio::test]
async fn test_change_all_to_false_skips_ready_and_keeps_messages() {
    let store = MockNodeStore::with_nodes([NodeBuilder::new("worker-1")
        .condition("Ready", "True")
        .with_condition(NodeCondition {
            message: Some("kubelet has insufficient memory available".to_string()),
            ..condition("MemoryPressure", "True", fixed_time())
        })
        .condition("GPUHealthy", "True")
        .build()]);

    let request = ConditionChangeRequest::all("worker-1", ConditionStatus::False);
    let outcome = change(&store, &request, Timestamp::now()).await.unwrap();

    assert_eq!(
        outcome,
        ChangeOutcome::Applied {
            types: vec!["MemoryPressure".to_string(), "GPUHealthy".to_string()]
        }
    );

    let node = store.node("worker-1");
    assert_eq!(find_condition(&node, "Ready").unwrap().status, "True");
    assert_eq!(find_condition(&node, "MemoryPressure").unwrap().status, "False");
    assert_eq!(
        find_condition(&node, "MemoryPressure").unwrap().message.as_deref(),
        Some("kubelet has insufficient memory available")
    );
    assert_eq!(find_condition(&node, "GPUHealthy").unwrap().status, "False");
}

#[tokio::test]
async fn test_change_creates_missing_condition() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);
    let now = Timestamp::now();

    let request = ConditionChangeRequest::single("worker-1", "EFSConnectFail", ConditionStatus::True)
        .with_message("mount timed out");
    change(&store, &request, now).await.unwrap();

    let node = store.node("worker-1");
    assert_eq!(conditions_of(&node).len(), 6);
    let efs = conditions_of(&node).last().unwrap();
    assert_eq!(efs.type_, "EFSConnectFail");
    assert_eq!(efs.status, "True");
    assert_eq!(efs.reason.as_deref(), Some("EFSConnectFail"));
    assert_eq!(efs.message.as_deref(), Some("mount timed out"));
    assert_eq!(efs.last_heartbeat_time, Some(Time(now)));
    assert_eq!(efs.last_transition_time, Some(Time(now)));
}

#[tokio::test]
async fn test_rejected_requests_never_reach_the_store() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);

    let bulk_true = ConditionChangeRequest::all("worker-1", ConditionStatus::True);
    assert!(change(&store, &bulk_true, Timestamp::now()).await.is_err());

    let ready_false = ConditionChangeRequest::single("worker-1", "Ready", ConditionStatus::False);
    assert!(change(&store, &ready_false, Timestamp::now()).await.is_err());

    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_change_missing_node_is_noop() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);

    let request = ConditionChangeRequest::single("worker-2", "GPUHealthy", ConditionStatus::False);
    let outcome = change(&store, &request, Timestamp::now()).await.unwrap();

    assert_eq!(outcome, ChangeOutcome::NodeMissing);
    assert!(!store.was_written());
}

#[tokio::test]
async fn test_change_write_failure_is_returned() {
    let store = MockNodeStore::with_nodes([healthy_node("worker-1")]);
    store.fail_writes("conflict");

    let request = ConditionChangeRequest::single("worker-1", "GPUHealthy", ConditionStatus::False);
    let err = change(&store, &request, Timestamp::now()).await.unwrap_err();

    assert!(!err.is_usage());
    assert!(!err.is_not_found());
}
