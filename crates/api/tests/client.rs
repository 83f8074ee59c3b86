use api::{CheckBundle, Client, Graph, MemoryTransport, OverlaySet, RuleSet};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn fixture() -> (Arc<MemoryTransport>, Client) {
    let transport = Arc::new(MemoryTransport::new());
    let client = Client::new(transport.clone());
    (transport, client)
}

#[tokio::test]
async fn test_check_bundle_crud() {
    let (transport, client) = fixture();

    let bundle = CheckBundle {
        brokers: vec!["/broker/1".to_string(), "/broker/2".to_string()],
        display_name: "dns".to_string(),
        period: 60,
        status: "active".to_string(),
        target: "example.com".to_string(),
        timeout: 10.0,
        type_: "dns".to_string(),
        ..Default::default()
    };

    let created = client.create(&bundle).await.unwrap();
    let cid = created.cid.clone().unwrap();
    assert_eq!(cid, "/check_bundle/1001");
    assert_eq!(created.checks, vec!["/check/10010", "/check/10011"]);
    assert_eq!(created.created, Some(api::memory::MEMORY_EPOCH));

    let mut fetched: CheckBundle = client.fetch(&cid).await.unwrap();
    assert_eq!(fetched, created);

    fetched.display_name = "renamed".to_string();
    fetched.checks.clear();
    let updated = client.update(&fetched).await.unwrap();
    assert_eq!(updated.display_name, "renamed");
    // Computed attributes survive an update which omits them.
    assert_eq!(updated.checks, created.checks);

    client.delete::<CheckBundle>(&cid).await.unwrap();
    let err = client.fetch::<CheckBundle>(&cid).await.unwrap_err();
    assert!(err.is_not_found(), "{err}");

    let methods: Vec<_> = transport.requests().iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["POST", "GET", "PUT", "DELETE", "GET"]);
}

#[tokio::test]
async fn test_rule_set_cid() {
    let (_transport, client) = fixture();

    let created = client
        .create(&RuleSet {
            check: "/check/1234".to_string(),
            metric_name: Some("rtt".to_string()),
            metric_type: "numeric".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(created.cid.as_deref(), Some("/rule_set/1234_rtt"));
}

#[tokio::test]
async fn test_failures_and_not_found() {
    let (transport, client) = fixture();

    transport.fail_next(500, "internal error");
    let err = client.fetch::<CheckBundle>("/check_bundle/1").await.unwrap_err();
    assert_eq!(err.to_string(), "API response code 500: internal error");
    assert!(!err.is_not_found());

    let err = client.fetch::<CheckBundle>("/check_bundle/1").await.unwrap_err();
    assert!(err.is_not_found());

    let err = client.update(&CheckBundle::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "check_bundle has no CID");
}

#[tokio::test]
async fn test_overlay_sets_live_within_graph() {
    let (transport, client) = fixture();
    transport.insert("/graph/abc", json!({"_cid": "/graph/abc", "title": "latency"}));

    let set = OverlaySet {
        title: "week over week".to_string(),
        ..Default::default()
    };
    client.put_overlay_set("/graph/abc", "os1", set.clone()).await.unwrap();
    assert_eq!(client.fetch_overlay_set("/graph/abc", "os1").await.unwrap(), set);

    let graph: Graph = client.fetch("/graph/abc").await.unwrap();
    assert_eq!(graph.title, "latency");
    assert_eq!(graph.overlay_sets.len(), 1);

    client.delete_overlay_set("/graph/abc", "os1").await.unwrap();
    let err = client.fetch_overlay_set("/graph/abc", "os1").await.unwrap_err();
    assert!(err.is_not_found());
}
