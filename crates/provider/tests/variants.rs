use pretty_assertions::assert_eq;
use provider::check::{swamp::Swamp, variants};
use provider::{CheckTranslator, Context, Managed, Meta, Resource};
use schema::{MemoryData, ResourceData};
use serde_json::{json, Value};
use std::sync::Arc;

fn context() -> (Context, Arc<api::MemoryTransport>) {
    let transport = Arc::new(api::MemoryTransport::new());
    let ctx = Context::new(api::Client::new(transport.clone()), Meta::default());
    (ctx, transport)
}

/// A configuration of each variant block, and the target it's checked
/// against where the variant doesn't derive one.
fn cases() -> Vec<(&'static str, Value, Option<&'static str>)> {
    vec![
        ("caql", json!({"query": "search:metric:average(\"rtt\")"}), None),
        (
            "cloudwatch",
            json!({
                "api_key": "AKIA",
                "api_secret": "secret",
                "dimmensions": {"InstanceId": "i-0abc"},
                "granularity": 5,
                "metric": ["CPUUtilization", "NetworkIn"],
                "namespace": "AWS/EC2",
                "url": "https://monitoring.us-west-2.amazonaws.com",
            }),
            None,
        ),
        (
            "consul",
            json!({
                "acl_token": "t0k3n",
                "allow_stale": true,
                "dc": "dc2",
                "headers": {"X-Trace": "on"},
                "service": "web",
                "service_blacklist": ["web-canary"],
            }),
            None,
        ),
        ("dns", json!({"query": "example.com", "rtype": "MX"}), Some("ns1.example.com")),
        (
            "external",
            json!({"command": "/usr/bin/check_disk", "env": {"LANG": "C"}, "output_extract": "^(\\d+)"}),
            Some("db1.example.com"),
        ),
        (
            "http",
            json!({
                "body_regexp": "ok",
                "headers": {"Accept": "text/plain"},
                "method": "HEAD",
                "redirects": 3,
                "url": "https://www.example.com/health",
            }),
            None,
        ),
        ("httptrap", json!({"async_metrics": true, "secret": "s3cret"}), Some("httptrap.example.com")),
        ("icmp_ping", json!({"availability": 75, "count": 5, "interval": "2s"}), Some("10.0.0.1")),
        (
            "jmx",
            json!({
                "host": "10.0.0.7",
                "mbean_domains": ["java.lang", "kafka.server"],
                "mbean_properties": [
                    {"index": 1, "name": "HeapMemoryUsage", "type": "Memory"},
                    {"index": 2, "name": "ThreadCount", "type": "Threading"},
                ],
                "port": 9999,
            }),
            None,
        ),
        (
            "json",
            json!({"headers": {"Accept": "application/json"}, "url": "https://api.example.com/stats"}),
            None,
        ),
        ("memcached", json!({"port": 11212}), Some("cache.example.com")),
        (
            "mysql",
            json!({"dsn": "user=mon host=db1 port=3306", "query": "select count(*) from t"}),
            Some("db1.example.com"),
        ),
        ("ntp", json!({"use_control": true}), Some("pool.ntp.org")),
        ("promtext", json!({"url": "http://node.example.com:9100/metrics"}), None),
        ("redis", json!({"db_index": 2, "password": "hunter2"}), Some("redis.example.com")),
        (
            "smtp",
            json!({"from": "mon@example.com", "starttls": true, "to": "sink@example.com"}),
            Some("mx.example.com"),
        ),
        (
            "snmp",
            json!({
                "community": "public",
                "oid": [
                    {"name": "ifInOctets", "path": ".1.3.6.1.2.1.2.2.1.10.1", "type": "counter"},
                    {"name": "sysUpTime", "path": ".1.3.6.1.2.1.1.3.0"},
                ],
                "version": "2c",
            }),
            Some("switch.example.com"),
        ),
        ("ssh2", json!({"method_hostkey": "ssh-ed25519", "port": 2222}), Some("bastion.example.com")),
        ("statsd", json!({"source_ip": "10.1.2.3"}), None),
        ("tcp", json!({"banner_regexp": "^SSH", "host": "10.0.0.9", "port": 22, "tls": true}), None),
    ]
}

#[test]
fn test_every_variant_has_a_case() {
    let mut names: Vec<_> = cases().into_iter().map(|(name, _, _)| name).collect();
    names.sort();
    let mut expect: Vec<_> = variants::VARIANTS.iter().map(|v| v.name).collect();
    expect.sort();
    assert_eq!(names, expect);
}

#[tokio::test]
async fn test_variant_blocks_read_back_unchanged() {
    let (ctx, transport) = context();
    let check = Managed::<CheckTranslator>::new();

    for (name, block, target) in cases() {
        let mut config = json!({"collector": [{"id": "/broker/1"}]});
        config[name] = json!([block]);
        if let Some(target) = target {
            config["target"] = json!(target);
        }

        let mut data = MemoryData::new(Arc::new(check.schema()), &config);
        check
            .create(&ctx, &mut data)
            .await
            .unwrap_or_else(|err| panic!("create {name}: {err}"));
        let id = data.id().unwrap().to_string();

        data.commit();
        check
            .read(&ctx, &mut data)
            .await
            .unwrap_or_else(|err| panic!("read {name}: {err}"));
        assert_eq!(data.state()[name], data.config()[name], "variant {name}");

        // Every key the variant writes is one it reads back.
        let bundle: api::CheckBundle = serde_json::from_value(transport.entity(&id).unwrap()).unwrap();
        let mut swamp = Swamp::new(&bundle.type_, &bundle.config);
        variants::decode(&bundle, &mut swamp).unwrap();
        let residue: Vec<String> = swamp.residue().map(str::to_string).collect();
        swamp
            .finish()
            .unwrap_or_else(|err| panic!("variant {name} left {residue:?}: {err}"));
    }
}

#[tokio::test]
async fn test_configured_port_is_kept() {
    let (ctx, transport) = context();
    let check = Managed::<CheckTranslator>::new();

    // An explicit port matching the URL's default still reads back.
    let mut data = MemoryData::new(
        Arc::new(check.schema()),
        &json!({
            "collector": [{"id": "/broker/1"}],
            "json": [{"port": 443, "url": "https://api.example.com/stats"}],
        }),
    );
    check.create(&ctx, &mut data).await.unwrap();
    check.read(&ctx, &mut data).await.unwrap();
    assert_eq!(data.state()["json"][0]["port"], json!(443));
    assert_eq!(data.state()["json"], data.config()["json"]);

    let stored = transport.entity(data.id().unwrap()).unwrap();
    assert_eq!(stored["config"]["port"], json!("443"));
}
