use serde::{Deserialize, Serialize};

/// Account is the read-only projection of a platform account.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Account {
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub cc_email: Option<String>,
    pub city: Option<String>,
    pub contact_groups: Vec<String>,
    pub country_code: Option<String>,
    pub current: bool,
    pub description: Option<String>,
    pub id: Option<String>,
    pub invites: Vec<AccountInvite>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub state_prov: Option<String>,
    pub timezone: Option<String>,
    pub ui_base_url: Option<String>,
    pub usage: Vec<AccountUsage>,
    pub users: Vec<AccountUser>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountInvite {
    pub email: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountUsage {
    pub limit: u64,
    #[serde(rename = "type")]
    pub type_: String,
    pub used: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountUser {
    pub id: String,
    pub role: String,
}
