use super::{put, Swamp};
use crate::{
    hashing::{sum, Field},
    Error,
};
use api::CheckBundle;
use models::{checks::variants::IcmpPing, Seconds};
use schema::{Attribute, Schema, Validator};
use serde_json::Value;

pub const DEFAULT_AVAILABILITY: f64 = 100.0;
pub const DEFAULT_COUNT: u64 = 5;
pub const DEFAULT_INTERVAL: Seconds = Seconds(2);

pub fn schema() -> Schema {
    Schema::new()
        .attr(
            "availability",
            Attribute::float()
                .default(DEFAULT_AVAILABILITY)
                .validate(Validator::FloatRange { min: 0.0, max: 100.0 }),
        )
        .attr(
            "count",
            Attribute::int()
                .default(DEFAULT_COUNT)
                .validate(Validator::IntRange { min: 1, max: 20 }),
        )
        .attr(
            "interval",
            Attribute::duration()
                .default(DEFAULT_INTERVAL.to_string())
                .validate(Validator::Duration {
                    min: Some(1),
                    max: Some(5 * 60),
                }),
        )
}

pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("icmp_ping.availability", "Percentage of packets which must be returned for the target to be available"),
    ("icmp_ping.count", "Number of packets to send"),
    ("icmp_ping.interval", "Interval between packets"),
];

const FIELDS: &[Field] = &[
    Field::Float("availability"),
    Field::Int("count"),
    Field::Str("interval"),
];

pub fn hash(v: &Value) -> u32 {
    sum(v, FIELDS)
}

pub fn encode(ping: &IcmpPing, bundle: &mut CheckBundle) {
    let config = &mut bundle.config;
    put(config, "avail_needed", ping.availability.unwrap_or(DEFAULT_AVAILABILITY));
    put(config, "count", ping.count.unwrap_or(DEFAULT_COUNT));
    // The wire interval is in milliseconds.
    let interval = ping.interval.unwrap_or(DEFAULT_INTERVAL);
    put(config, "interval", interval.as_secs() * 1000);
}

pub fn decode(_bundle: &CheckBundle, swamp: &mut Swamp) -> Result<IcmpPing, Error> {
    Ok(IcmpPing {
        availability: swamp.take_parsed("avail_needed"),
        count: swamp.take_parsed("count"),
        interval: swamp
            .take_parsed::<u64>("interval")
            .map(|ms| Seconds::new(ms / 1000)),
    })
}
