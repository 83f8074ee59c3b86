// The api crate speaks the platform's REST API: wire types of every entity,
// the Transport seam with HTTP and in-memory implementations, and a typed
// Client over them.

mod account;
mod broker;
mod check_bundle;
mod client;
mod contact_group;
mod dashboard;
mod graph;
mod maintenance;
pub mod memory;
mod metric_cluster;
mod rule_set;
mod rule_set_group;
mod severity;
mod transport;
mod worksheet;

pub use account::{Account, AccountInvite, AccountLimit, AccountUser};
pub use broker::{Broker, BrokerDetail};
pub use check_bundle::{
    BundleMetric, Check, CheckBundle, METRIC_ACTIVE, METRIC_AVAILABLE, STATUS_ACTIVE,
    STATUS_DISABLED,
};
pub use client::{Client, Entity};
pub use contact_group::{
    AlertFormats, ContactGroup, Contacts, Escalation, ExternalContact, HttpContactInfo,
    PagerDutyContactInfo, SlackContactInfo, UserContact, VictorOpsContactInfo,
};
pub use dashboard::{Dashboard, GridLayout, Widget};
pub use graph::{Graph, GraphDatapoint, GraphMetricCluster, Overlay, OverlaySet, OverlayUiSpecs};
pub use maintenance::Maintenance;
pub use memory::MemoryTransport;
pub use metric_cluster::{ClusterQuery, MetricCluster};
pub use rule_set::{Rule, RuleSet, RuleValue};
pub use rule_set_group::{GroupFormula, RuleSetCondition, RuleSetGroup};
pub use severity::Severity;
pub use transport::{HttpTransport, Transport};
pub use worksheet::{SmartQuery, Worksheet, WorksheetGraph};

/// Application name sent with every request.
pub const APP_NAME: &str = "terraform-provider-circonus";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("API response code {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{method} {url} failed")]
    Request {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid API URL {0:?}")]
    Url(String, #[source] url::ParseError),
    #[error("failed to decode response of {what}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {kind}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} has no CID")]
    MissingCid { kind: &'static str },
}

impl Error {
    /// Whether the error is the platform reporting that an object
    /// doesn't exist.
    pub fn is_not_found(&self) -> bool {
        is_not_found(&self.to_string())
    }
}

/// Platform errors are classified by their text: any error which mentions
/// a 404 response code is "not found".
pub fn is_not_found(message: &str) -> bool {
    message.contains("API response code 404")
}
