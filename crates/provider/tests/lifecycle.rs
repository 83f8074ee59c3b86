use pretty_assertions::assert_eq;
use provider::{
    CheckTranslator, Context, Error, Managed, Meta, Resource, RuleSetGroupTranslator,
    RuleSetTranslator,
};
use schema::{MemoryData, ResourceData};
use serde_json::{json, Value};
use std::sync::Arc;

fn context() -> (Context, Arc<api::MemoryTransport>) {
    let transport = Arc::new(api::MemoryTransport::new());
    let ctx = Context::new(api::Client::new(transport.clone()), Meta::default());
    (ctx, transport)
}

fn new_data(resource: &dyn Resource, config: Value) -> MemoryData {
    MemoryData::new(Arc::new(resource.schema()), &config)
}

fn sorted(values: &Value) -> Vec<&str> {
    let mut out: Vec<&str> = values
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect();
    out.sort();
    out
}

fn sort_by_key(items: &mut Value, key: impl Fn(&Value) -> &Value) {
    if let Some(items) = items.as_array_mut() {
        items.sort_by(|a, b| key(a).to_string().cmp(&key(b).to_string()));
    }
}

/// Assert that each configured attribute reads back unchanged.
fn assert_configured_state(data: &MemoryData, keys: &[&str]) {
    for key in keys {
        assert_eq!(data.state()[key], data.config()[key], "attribute {key}");
    }
}

#[tokio::test]
async fn test_dns_check_lifecycle() {
    let (ctx, transport) = context();
    let check = Managed::<CheckTranslator>::new();

    let mut data = new_data(
        &check,
        json!({
            "collector": [{"id": "/broker/1"}, {"id": "/broker/2"}],
            "dns": [{"query": "google.com", "rtype": "A"}],
            "metric": [
                {"name": "answer", "type": "text"},
                {"name": "rtt", "type": "numeric"},
                {"name": "ttl", "type": "numeric"},
            ],
            "period": "300",
            "target": "api.circonus.com",
        }),
    );
    check.create(&ctx, &mut data).await.unwrap();
    assert_eq!(data.id(), Some("/check_bundle/1001"));

    let stored = transport.entity("/check_bundle/1001").unwrap();
    assert_eq!(stored["type"], json!("dns"));
    assert_eq!(stored["timeout"], json!(10.0));

    // Set elements are ordered by hash, so sort them for a stable snapshot.
    let mut bundle = check.encode(&Meta::default(), &data).unwrap();
    sort_by_key(&mut bundle["brokers"], |b| b);
    sort_by_key(&mut bundle["metrics"], |m| &m["name"]);
    insta::assert_json_snapshot!(bundle, {".timeout" => "[timeout]"}, @r###"
    {
      "brokers": [
        "/broker/1",
        "/broker/2"
      ],
      "config": {
        "ctype": "IN",
        "nameserver": "%[target]",
        "query": "google.com",
        "rtype": "A"
      },
      "display_name": "dns api.circonus.com",
      "metric_filters": [],
      "metrics": [
        {
          "name": "answer",
          "status": "active",
          "tags": [],
          "type": "text",
          "units": null
        },
        {
          "name": "rtt",
          "status": "active",
          "tags": [],
          "type": "numeric",
          "units": null
        },
        {
          "name": "ttl",
          "status": "active",
          "tags": [],
          "type": "numeric",
          "units": null
        }
      ],
      "notes": null,
      "period": 300,
      "status": "active",
      "tags": [],
      "target": "api.circonus.com",
      "timeout": "[timeout]",
      "type": "dns"
    }
    "###);

    data.commit();
    check.read(&ctx, &mut data).await.unwrap();
    assert_configured_state(
        &data,
        &["active", "collector", "dns", "metric", "period", "target", "timeout"],
    );
    assert_eq!(data.state()["name"], json!("dns api.circonus.com"));
    assert_eq!(data.state()["checks"].as_array().map(Vec::len), Some(2));
    assert_eq!(data.state()["check_id"], data.state()["checks"][0]);

    assert!(check.exists(&ctx, &data).await.unwrap());
    check.delete(&ctx, &mut data).await.unwrap();
    assert_eq!(data.id(), None);
    assert!(transport.entity("/check_bundle/1001").is_none());
}

#[tokio::test]
async fn test_json_check_derives_port_and_target() {
    let (ctx, transport) = context();
    let check = Managed::<CheckTranslator>::new();

    let mut data = new_data(
        &check,
        json!({
            "collector": [{"id": "/broker/1"}],
            "json": [{"url": "https://api.example.com/path"}],
        }),
    );
    check.create(&ctx, &mut data).await.unwrap();

    let stored = transport.entity("/check_bundle/1001").unwrap();
    assert_eq!(stored["config"]["port"], json!("443"));
    assert_eq!(stored["target"], json!("api.example.com"));
    assert_eq!(data.state()["target"], json!("api.example.com"));

    // The derived port isn't configured, so it doesn't read back.
    data.commit();
    check.read(&ctx, &mut data).await.unwrap();
    assert_configured_state(&data, &["json"]);
    assert_eq!(data.state()["json"][0].get("port"), None);

    let mut data = new_data(
        &check,
        json!({
            "collector": [{"id": "/broker/1"}],
            "promtext": [{"url": "http://node.example.com:9100/metrics"}],
        }),
    );
    check.create(&ctx, &mut data).await.unwrap();
    let stored = transport.entity(data.id().unwrap()).unwrap();
    assert_eq!(stored["config"]["port"], json!("9100"));

    check.read(&ctx, &mut data).await.unwrap();
    assert_configured_state(&data, &["promtext"]);
    assert_eq!(data.state()["target"], json!("node.example.com"));
}

#[tokio::test]
async fn test_cloudwatch_dimensions_and_metrics() {
    let (ctx, transport) = context();
    let check = Managed::<CheckTranslator>::new();

    let mut data = new_data(
        &check,
        json!({
            "collector": [{"id": "/broker/1"}],
            "cloudwatch": [{
                "api_key": "AKIA",
                "api_secret": "secret",
                "dimmensions": {"DBInstanceIdentifier": "atlas-production"},
                "metric": ["ReadIOPS", "CPUUtilization"],
                "namespace": "AWS/RDS",
                "url": "https://monitoring.us-east-1.amazonaws.com",
            }],
        }),
    );
    check.create(&ctx, &mut data).await.unwrap();

    let stored = transport.entity("/check_bundle/1001").unwrap();
    assert_eq!(stored["config"]["dim_DBInstanceIdentifier"], json!("atlas-production"));
    assert_eq!(stored["config"]["cloudwatch_metrics"], json!("CPUUtilization,ReadIOPS"));

    check.read(&ctx, &mut data).await.unwrap();
    assert_configured_state(&data, &["cloudwatch"]);
}

#[tokio::test]
async fn test_missing_check_is_forgotten() {
    let (ctx, _transport) = context();
    let check = Managed::<CheckTranslator>::new();

    let mut data = MemoryData::existing(
        Arc::new(check.schema()),
        "/check_bundle/77",
        &json!({}),
        &json!({"target": "example.com"}),
    );
    assert!(!check.exists(&ctx, &data).await.unwrap());

    check.read(&ctx, &mut data).await.unwrap();
    assert_eq!(data.id(), None);
    assert_eq!(data.state(), &json!({}));
}

#[tokio::test]
async fn test_absence_round_trip() {
    let (ctx, transport) = context();
    let rule_set = Managed::<RuleSetTranslator>::new();

    let mut data = new_data(
        &rule_set,
        json!({
            "check": "/check/12",
            "metric_name": "rtt",
            "if": [{"value": {"absent": "70"}, "then": {"notify": ["/contact_group/1"], "severity": 1}}],
        }),
    );
    rule_set.create(&ctx, &mut data).await.unwrap();
    assert_eq!(data.id(), Some("/rule_set/12_rtt"));

    let stored = transport.entity("/rule_set/12_rtt").unwrap();
    assert_eq!(stored["rules"][0]["criteria"], json!("on absence"));
    assert_eq!(stored["rules"][0]["value"], json!(70));

    rule_set.read(&ctx, &mut data).await.unwrap();
    assert_configured_state(&data, &["check", "if", "metric_name", "metric_type"]);
}

#[tokio::test]
async fn test_notify_is_merged_by_severity() {
    let (ctx, transport) = context();
    let rule_set = Managed::<RuleSetTranslator>::new();

    let mut data = new_data(
        &rule_set,
        json!({
            "check": "/check/12",
            "metric_name": "rtt",
            "if": [
                {"value": {"max_value": "500"}, "then": {"notify": ["/contact_group/1"], "severity": 3}},
                {"value": {"max_value": "300"}, "then": {"notify": ["/contact_group/2"], "severity": 3}},
                {"value": {"max_value": "100"}, "then": {"notify": ["/contact_group/3"], "severity": 2}},
            ],
        }),
    );
    rule_set.create(&ctx, &mut data).await.unwrap();

    let stored = transport.entity("/rule_set/12_rtt").unwrap();
    assert_eq!(
        stored["contact_groups"],
        json!({"2": ["/contact_group/3"], "3": ["/contact_group/1", "/contact_group/2"]})
    );

    // Rules of equal severity share their contact groups.
    rule_set.read(&ctx, &mut data).await.unwrap();
    assert_eq!(
        sorted(&data.state()["if"][0]["then"]["notify"]),
        vec!["/contact_group/1", "/contact_group/2"]
    );
    assert_eq!(data.state()["if"][1]["then"]["notify"], data.state()["if"][0]["then"]["notify"]);
    assert_eq!(data.state()["if"][2]["then"]["notify"], json!(["/contact_group/3"]));
}

#[tokio::test]
async fn test_overlapping_notify_is_merged() {
    let (ctx, transport) = context();
    let rule_set = Managed::<RuleSetTranslator>::new();

    let mut data = new_data(
        &rule_set,
        json!({
            "check": "/check/12",
            "metric_name": "rtt",
            "if": [
                {
                    "value": {"max_value": "500"},
                    "then": {"notify": ["/contact_group/1", "/contact_group/2"], "severity": 3},
                },
                {
                    "value": {"max_value": "300"},
                    "then": {"notify": ["/contact_group/2", "/contact_group/3"], "severity": 3},
                },
            ],
        }),
    );
    rule_set.create(&ctx, &mut data).await.unwrap();

    insta::assert_json_snapshot!(transport.entity("/rule_set/12_rtt").unwrap(), @r###"
    {
      "_cid": "/rule_set/12_rtt",
      "check": "/check/12",
      "contact_groups": {
        "3": [
          "/contact_group/1",
          "/contact_group/2",
          "/contact_group/3"
        ]
      },
      "filter": null,
      "link": null,
      "metric_name": "rtt",
      "metric_pattern": null,
      "metric_type": "numeric",
      "notes": null,
      "parent": null,
      "rules": [
        {
          "criteria": "max value",
          "severity": 3,
          "value": "500",
          "wait": 0
        },
        {
          "criteria": "max value",
          "severity": 3,
          "value": "300",
          "wait": 0
        }
      ],
      "tags": []
    }
    "###);

    rule_set.read(&ctx, &mut data).await.unwrap();
    for rule in data.state()["if"].as_array().unwrap() {
        assert_eq!(
            sorted(&rule["then"]["notify"]),
            vec!["/contact_group/1", "/contact_group/2", "/contact_group/3"]
        );
    }
}

#[tokio::test]
async fn test_after_is_normalized() {
    let rule_set = Managed::<RuleSetTranslator>::new();

    let wires: Vec<Value> = [json!(120), json!("120s"), json!("2m")]
        .into_iter()
        .map(|after| {
            let data = new_data(
                &rule_set,
                json!({
                    "check": "/check/12",
                    "metric_name": "rtt",
                    "if": [{"value": {"max_value": "1"}, "then": {"after": after, "severity": 2}}],
                }),
            );
            assert_eq!(data.config()["if"][0]["then"]["after"], json!("120"));
            rule_set.encode(&Meta::default(), &data).unwrap()
        })
        .collect();

    assert_eq!(wires[0]["rules"][0]["wait"], json!(2));
    assert_eq!(wires[0], wires[1]);
    assert_eq!(wires[1], wires[2]);
}

#[tokio::test]
async fn test_incompatible_criteria_is_rejected() {
    let (ctx, transport) = context();
    let rule_set = Managed::<RuleSetTranslator>::new();

    let mut data = new_data(
        &rule_set,
        json!({
            "check": "/check/12",
            "metric_name": "status",
            "metric_type": "text",
            "if": [{"value": {"max_value": "1"}}],
        }),
    );
    let err = rule_set.create(&ctx, &mut data).await.unwrap_err();
    assert!(err.to_string().contains("not compatible with metric_type"), "{err}");

    let mut data = new_data(
        &rule_set,
        json!({
            "check": "/check/12",
            "metric_name": "rtt",
            "if": [{"value": {"max_value": "1", "min_value": "0"}}],
        }),
    );
    rule_set.create(&ctx, &mut data).await.unwrap_err();

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_group_conditions_are_ordered() {
    let (ctx, transport) = context();
    let group = Managed::<RuleSetGroupTranslator>::new();

    let mut data = new_data(
        &group,
        json!({
            "name": "web tier",
            "condition": [
                {"index": 3, "rule_set": "/rule_set/3_c", "matching_severities": [3]},
                {"index": 1, "rule_set": "/rule_set/1_a", "matching_severities": [1]},
                {"index": 2, "rule_set": "/rule_set/2_b", "matching_severities": [2, 1]},
            ],
            "formula": {"expression": "A and B and C", "raise_severity": 2},
            "notify": {"sev2": ["/contact_group/9"]},
        }),
    );
    group.create(&ctx, &mut data).await.unwrap();

    let stored = transport.entity("/rule_set_group/1001").unwrap();
    let indices: Vec<_> = stored["rule_set_conditions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["index"].clone())
        .collect();
    assert_eq!(indices, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(stored["contact_groups"]["2"], json!(["/contact_group/9"]));
    assert_eq!(stored["contact_groups"]["5"], json!([]));

    let conditions = data.state()["condition"].as_array().unwrap();
    assert_eq!(conditions[0]["rule_set"], json!("/rule_set/1_a"));
    assert_eq!(conditions[2]["rule_set"], json!("/rule_set/3_c"));
    let severities = conditions[1]["matching_severities"].as_array().unwrap();
    assert_eq!(severities.len(), 2);
    assert!(severities.contains(&json!(1)) && severities.contains(&json!(2)));
}

#[tokio::test]
async fn test_auto_tag_is_hidden_from_state() {
    let transport = Arc::new(api::MemoryTransport::new());
    let ctx = Context::new(
        api::Client::new(transport.clone()),
        Meta {
            auto_tag: true,
            ..Meta::default()
        },
    );
    let rule_set = Managed::<RuleSetTranslator>::new();

    let mut data = new_data(
        &rule_set,
        json!({
            "check": "/check/12",
            "metric_name": "rtt",
            "if": [{"value": {"max_value": "1"}}],
            "tags": ["Team:Web", "team:web", "env:prod"],
        }),
    );
    assert_eq!(sorted(&data.config()["tags"]), vec!["env:prod", "team:web"]);
    rule_set.create(&ctx, &mut data).await.unwrap();

    let stored = transport.entity("/rule_set/12_rtt").unwrap();
    assert_eq!(stored["tags"], json!(["author:terraform", "env:prod", "team:web"]));
    assert_eq!(sorted(&data.state()["tags"]), vec!["env:prod", "team:web"]);
}

#[tokio::test]
async fn test_platform_failure_leaves_no_id() {
    let (ctx, transport) = context();
    let rule_set = Managed::<RuleSetTranslator>::new();
    transport.fail_next(403, "forbidden");

    let mut data = new_data(
        &rule_set,
        json!({"check": "/check/12", "metric_name": "rtt", "if": [{"value": {"max_value": "1"}}]}),
    );
    let err = rule_set.create(&ctx, &mut data).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(err.to_string().contains("API response code 403"), "{err}");
    assert_eq!(data.id(), None);
}

#[tokio::test]
async fn test_import_percent_encoded_id() {
    let (ctx, transport) = context();
    let rule_set = Managed::<RuleSetTranslator>::new();
    transport.insert(
        "/rule_set/12_rtt",
        json!({
            "_cid": "/rule_set/12_rtt",
            "check": "/check/12",
            "metric_name": "rtt",
            "metric_type": "numeric",
            "rules": [{"criteria": "max value", "severity": 1, "value": "5"}],
        }),
    );

    let mut data = new_data(&rule_set, json!({}));
    rule_set
        .import(&ctx, "%2Frule_set%2F12_rtt", &mut data)
        .await
        .unwrap();
    assert_eq!(data.id(), Some("/rule_set/12_rtt"));
    assert_eq!(data.state()["if"][0]["value"]["max_value"], json!("5"));

    let mut data = new_data(&rule_set, json!({}));
    let err = rule_set.import(&ctx, "/rule_set/9_nope", &mut data).await.unwrap_err();
    assert!(matches!(err, Error::Missing { .. }));
}
