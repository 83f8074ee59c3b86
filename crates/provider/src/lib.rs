// The provider crate translates the desired state of Circonus monitoring
// resources into platform entities and back. Each managed resource is a
// Translator between its typed model and wire entity, lifted into a
// Resource by `Managed`; a few resources and the data sources implement
// their lifecycle directly.

mod account;
pub mod check;
mod cli;
mod collector;
mod config;
mod contact_group;
mod context;
mod dashboard;
mod error;
mod graph;
pub mod hashing;
mod maintenance;
mod metric;
mod metric_cluster;
mod overlay_set;
mod resource;
mod rule_set;
mod rule_set_group;
pub mod tags;
mod worksheet;

pub use account::AccountSource;
pub use check::CheckTranslator;
pub use cli::Cli;
pub use collector::CollectorSource;
pub use config::{ProviderConfig, TagConfig, DEFAULT_API_URL};
pub use contact_group::ContactGroupTranslator;
pub use context::{Context, Meta, DEFAULT_TAG};
pub use dashboard::DashboardTranslator;
pub use error::{provider_bug, Error};
pub use graph::GraphTranslator;
pub use maintenance::MaintenanceTranslator;
pub use metric::MetricResource;
pub use metric_cluster::MetricClusterTranslator;
pub use overlay_set::OverlaySetResource;
pub use resource::{DataSource, Managed, Resource, Translator};
pub use rule_set::RuleSetTranslator;
pub use rule_set_group::RuleSetGroupTranslator;
pub use worksheet::WorksheetTranslator;

/// Every managed resource of the provider.
pub fn resources() -> Vec<Box<dyn Resource>> {
    vec![
        Box::new(Managed::<CheckTranslator>::new()),
        Box::new(Managed::<ContactGroupTranslator>::new()),
        Box::new(Managed::<DashboardTranslator>::new()),
        Box::new(Managed::<GraphTranslator>::new()),
        Box::new(Managed::<MaintenanceTranslator>::new()),
        Box::new(MetricResource),
        Box::new(Managed::<MetricClusterTranslator>::new()),
        Box::new(OverlaySetResource),
        Box::new(Managed::<RuleSetTranslator>::new()),
        Box::new(Managed::<RuleSetGroupTranslator>::new()),
        Box::new(Managed::<WorksheetTranslator>::new()),
    ]
}

/// Every data source of the provider.
pub fn data_sources() -> Vec<Box<dyn DataSource>> {
    vec![Box::new(AccountSource), Box::new(CollectorSource)]
}

/// Look up a managed resource by name, with or without its
/// `circonus_` prefix.
pub fn resource(name: &str) -> Option<Box<dyn Resource>> {
    resources().into_iter().find(|r| matches_name(r.name(), name))
}

pub fn data_source(name: &str) -> Option<Box<dyn DataSource>> {
    data_sources().into_iter().find(|d| matches_name(d.name(), name))
}

fn matches_name(full: &str, name: &str) -> bool {
    full == name || full.strip_prefix("circonus_") == Some(name)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_registry() {
        let names: Vec<_> = resources().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "circonus_check",
                "circonus_contact_group",
                "circonus_dashboard",
                "circonus_graph",
                "circonus_maintenance",
                "circonus_metric",
                "circonus_metric_cluster",
                "circonus_overlay_set",
                "circonus_rule_set",
                "circonus_rule_set_group",
                "circonus_worksheet",
            ]
        );
        assert_eq!(resource("rule_set").map(|r| r.name()), Some("circonus_rule_set"));
        assert_eq!(data_source("circonus_collector").map(|d| d.name()), Some("circonus_collector"));
        assert!(resource("rule").is_none());
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_every_attribute_is_described() {
        for resource in resources() {
            resource.schema();
        }
        for source in data_sources() {
            source.schema();
        }
        assert!(!logs_contain("has no description"));
        assert!(!logs_contain("description of an unknown attribute"));
    }

    #[test]
    fn test_rule_set_schema() {
        let mut described = BTreeMap::new();
        let mut defaults = BTreeMap::new();

        RuleSetTranslator::schema().walk_mut(&mut |name: &str, attr: &mut schema::Attribute| {
            described.insert(name.to_string(), attr.description.clone());
            if let Some(default) = &attr.default {
                defaults.insert(name.to_string(), default.clone());
            }
        });

        insta::assert_json_snapshot!(defaults, @r###"
        {
          "if.then": {
            "severity": 1
          },
          "if.then.severity": 1,
          "metric_type": "numeric"
        }
        "###);

        insta::assert_json_snapshot!(described, @r###"
        {
          "check": "CID of the check whose metric is evaluated",
          "if": "Ordered rules, the first of which to match determines the alert",
          "if.then": "Notification raised when the rule matches",
          "if.then.after": "Delay before notifying, in whole minutes",
          "if.then.notify": "Contact groups to notify",
          "if.then.severity": "Severity of the alert, where 0 clears it",
          "if.value": "Predicate of the rule",
          "if.value.absent": "Match when no data arrives for this long",
          "if.value.changed": "Match when a text metric changes",
          "if.value.contains": "Match text metrics containing this substring",
          "if.value.match": "Match text metrics equal to this value",
          "if.value.max_value": "Match numeric metrics above this value",
          "if.value.min_value": "Match numeric metrics below this value",
          "if.value.not_contain": "Match text metrics not containing this substring",
          "if.value.not_match": "Match text metrics not equal to this value",
          "if.value.over": "Window over which the metric is aggregated first",
          "if.value.over.atleast": "Minimum duration of data the window must hold",
          "if.value.over.last": "Duration of the window",
          "if.value.over.using": "Function aggregating the window",
          "link": "URL included in notifications",
          "metric_filter": "Tag filter of metrics matched by metric_pattern",
          "metric_name": "Name of the metric to evaluate",
          "metric_pattern": "Regex of metric names to evaluate",
          "metric_type": "Kind of metric evaluated, numeric or text",
          "notes": "Notes included in notifications",
          "parent": "CID of a rule set which suppresses this one while alerting",
          "tags": "Tags of the rule set"
        }
        "###);
    }
}
