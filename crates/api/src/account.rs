use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Account {
    #[serde(rename = "_cid")]
    pub cid: Option<String>,
    #[serde(rename = "_contact_groups")]
    pub contact_groups: Vec<String>,
    #[serde(rename = "_owner")]
    pub owner: Option<String>,
    #[serde(rename = "_ui_base_url")]
    pub ui_base_url: Option<String>,
    #[serde(rename = "_usage")]
    pub usage: Vec<AccountLimit>,

    pub address1: Option<String>,
    pub address2: Option<String>,
    pub cc_email: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub description: Option<String>,
    pub invites: Vec<AccountInvite>,
    pub name: Option<String>,
    pub state_prov: Option<String>,
    pub timezone: Option<String>,
    pub users: Vec<AccountUser>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountLimit {
    #[serde(rename = "_limit")]
    pub limit: u64,
    #[serde(rename = "_type")]
    pub type_: String,
    #[serde(rename = "_used")]
    pub used: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountInvite {
    pub email: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AccountUser {
    pub role: String,
    pub user: String,
}

impl crate::Entity for Account {
    const KIND: &'static str = "account";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
