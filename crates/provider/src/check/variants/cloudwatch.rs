use super::{default_target, http_url, put, put_opt, put_prefixed, split_list, url_host, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::checks::variants::CloudWatch;
use schema::{Attribute, Kind, Schema, Validator};
use serde_json::Value;

pub const DEFAULT_VERSION: &str = "2010-08-01";

pub fn schema() -> Schema {
    Schema::new()
        .attr("api_key", Attribute::string().required().sensitive())
        .attr("api_secret", Attribute::string().required().sensitive())
        .attr("dimmensions", Attribute::map(Kind::String))
        .attr(
            "granularity",
            Attribute::int().validate(Validator::IntRange { min: 1, max: 5 }),
        )
        .attr("metric", Attribute::set(Kind::String).required().min_items(1))
        .attr("namespace", Attribute::string().required())
        .attr("url", Attribute::string().required().validate(http_url()))
        .attr("version", Attribute::string().default(DEFAULT_VERSION))
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("cloudwatch.api_key", "AWS access key"),
    ("cloudwatch.api_secret", "AWS secret key"),
    ("cloudwatch.dimmensions", "Dimensions of the queried metrics"),
    ("cloudwatch.granularity", "Granularity of the metrics, in minutes"),
    ("cloudwatch.metric", "Names of the CloudWatch metrics to poll"),
    ("cloudwatch.namespace", "CloudWatch namespace of the metrics, such as AWS/RDS"),
    ("cloudwatch.url", "Regional CloudWatch monitoring endpoint"),
    ("cloudwatch.version", "Version of the CloudWatch API"),
];

const FIELDS: &[Field] = &[
    Field::Str("api_key"),
    Field::Str("api_secret"),
    Field::Map("dimmensions"),
    Field::Int("granularity"),
    Field::Set("metric"),
    Field::Str("namespace"),
    Field::Str("url"),
    Field::Str("version"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(cw: &CloudWatch, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put(config, "api_key", &cw.api_key);
    put(config, "api_secret", &cw.api_secret);
    put_prefixed(config, "dim_", &cw.dimmensions);
    put_opt(config, "granularity", cw.granularity);
    // BTreeSet iterates in sorted order.
    put(config, "cloudwatch_metrics", itertools::join(&cw.metric, ","));
    put(config, "namespace", &cw.namespace);
    put(config, "url", &cw.url);
    put(config, "version", cw.version.as_deref().unwrap_or(DEFAULT_VERSION));

    default_target(bundle, url_host(&cw.url));
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<CloudWatch, Error> {
    Ok(CloudWatch {
        api_key: swamp.take("api_key").unwrap_or_default(),
        api_secret: swamp.take("api_secret").unwrap_or_default(),
        dimmensions: swamp.take_prefixed("dim_"),
        granularity: swamp.take_parsed("granularity"),
        metric: split_list(swamp.take("cloudwatch_metrics"), ',').into_iter().collect(),
        namespace: swamp.take("namespace").unwrap_or_default(),
        url: swamp.take("url").unwrap_or_default(),
        version: Some(swamp.take("version").unwrap_or_else(|| DEFAULT_VERSION.to_string())),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dimensions_and_metrics() {
        let cw = CloudWatch {
            api_key: "AKIA".to_string(),
            api_secret: "s3cr3t".to_string(),
            dimmensions: [("DBInstanceIdentifier".to_string(), "atlas".to_string())].into(),
            metric: ["ReadIOPS", "CPUUtilization"].map(String::from).into(),
            namespace: "AWS/RDS".to_string(),
            url: "https://monitoring.us-east-1.amazonaws.com".to_string(),
            ..Default::default()
        };
        let mut bundle = CheckBundle::default();
        encode(&cw, &mut bundle);

        assert_eq!(bundle.config["dim_DBInstanceIdentifier"], "atlas");
        assert_eq!(bundle.config["cloudwatch_metrics"], "CPUUtilization,ReadIOPS");
        assert_eq!(bundle.config["version"], DEFAULT_VERSION);
        assert_eq!(bundle.target, "monitoring.us-east-1.amazonaws.com");

        let mut swamp = Swamp::new("cloudwatch", &bundle.config);
        let decoded = decode(&bundle, &mut swamp).unwrap();
        swamp.finish().unwrap();

        assert_eq!(
            decoded,
            CloudWatch {
                version: Some(DEFAULT_VERSION.to_string()),
                ..cw
            }
        );
    }
}
