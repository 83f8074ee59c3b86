use crate::{Context, DataSource, Error};
use models::{ids::Entity, Account, AccountInvite, AccountUsage, AccountUser};
use schema::{descriptions, Attribute, Kind, ResourceData, Schema, Validator};

pub const NAME: &str = "circonus_account";

/// CID of the account which owns the API token.
const CURRENT: &str = "/account/current";

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("address1", "First line of the account's address"),
    ("address2", "Second line of the account's address"),
    ("cc_email", "Address copied on account email"),
    ("city", "City of the account's address"),
    ("contact_groups", "CIDs of the account's contact groups"),
    ("country_code", "ISO country code of the account's address"),
    ("current", "Look up the account which owns the API token"),
    ("description", "Description of the account"),
    ("id", "CID of the account"),
    ("invites", "Outstanding invitations to the account"),
    ("invites.email", "Address invited"),
    ("invites.role", "Role of the invited user"),
    ("name", "Name of the account"),
    ("owner", "CID of the account's owner"),
    ("state_prov", "State or province of the account's address"),
    ("timezone", "Timezone of the account"),
    ("ui_base_url", "Base URL of the account's web UI"),
    ("usage", "Usage of the account's limits"),
    ("usage.limit", "Limit of the resource"),
    ("usage.type", "Resource which is limited"),
    ("usage.used", "Amount of the limit in use"),
    ("users", "Users of the account"),
    ("users.id", "CID of the user"),
    ("users.role", "Role of the user"),
];

pub struct AccountSource;

pub fn project(wire: &api::Account, current: bool) -> Account {
    Account {
        address1: wire.address1.clone(),
        address2: wire.address2.clone(),
        cc_email: wire.cc_email.clone(),
        city: wire.city.clone(),
        contact_groups: wire.contact_groups.clone(),
        country_code: wire.country_code.clone(),
        current,
        description: wire.description.clone(),
        id: wire.cid.clone(),
        invites: wire
            .invites
            .iter()
            .map(|i| AccountInvite {
                email: i.email.clone(),
                role: i.role.clone(),
            })
            .collect(),
        name: wire.name.clone(),
        owner: wire.owner.clone(),
        state_prov: wire.state_prov.clone(),
        timezone: wire.timezone.clone(),
        ui_base_url: wire.ui_base_url.clone(),
        usage: wire
            .usage
            .iter()
            .map(|u| AccountUsage {
                limit: u.limit,
                type_: u.type_.clone(),
                used: u.used,
            })
            .collect(),
        users: wire
            .users
            .iter()
            .map(|u| AccountUser {
                id: u.user.clone(),
                role: u.role.clone(),
            })
            .collect(),
    }
}

#[async_trait::async_trait]
impl DataSource for AccountSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn schema(&self) -> Schema {
        let computed = || Attribute::string().computed();
        let invite = Schema::new().attr("email", computed()).attr("role", computed());
        let usage = Schema::new()
            .attr("limit", Attribute::int().computed())
            .attr("type", computed())
            .attr("used", Attribute::int().computed());
        let user = Schema::new().attr("id", computed()).attr("role", computed());

        let mut schema = Schema::new()
            .attr("address1", computed())
            .attr("address2", computed())
            .attr("cc_email", computed())
            .attr("city", computed())
            .attr("contact_groups", Attribute::list(Kind::String).computed())
            .attr("country_code", computed())
            .attr("current", Attribute::bool())
            .attr("description", computed())
            .attr(
                "id",
                Attribute::string()
                    .optional_computed()
                    .validate(Validator::Cid(Entity::Account)),
            )
            .attr("invites", Attribute::list(Kind::Block(invite)).computed())
            .attr("name", computed())
            .attr("owner", computed())
            .attr("state_prov", computed())
            .attr("timezone", computed())
            .attr("ui_base_url", computed())
            .attr("usage", Attribute::list(Kind::Block(usage)).computed())
            .attr("users", Attribute::list(Kind::Block(user)).computed())
            .exactly_one_of(&["current", "id"]);

        descriptions::fuse(NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    async fn read(&self, ctx: &Context, data: &mut dyn ResourceData) -> Result<(), Error> {
        let violations = schema::validate(data.schema(), data.config());
        if !violations.is_empty() {
            return Err(Error::invalid(violations));
        }

        let current = data.config().get("current").and_then(|v| v.as_bool()).unwrap_or_default();
        let cid = match data.config().get("id").and_then(|v| v.as_str()) {
            Some(id) if !current => id.to_string(),
            _ => CURRENT.to_string(),
        };

        let wire: api::Account = ctx.call(NAME, &cid, ctx.client.fetch(&cid)).await?;
        let account = project(&wire, current);

        data.set_id(Some(account.id.clone().unwrap_or(cid)));
        Ok(schema::encode_state(&account, data)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use schema::MemoryData;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_current_account() {
        let transport = Arc::new(api::MemoryTransport::new());
        transport.insert(
            "/account/current",
            json!({
                "_cid": "/account/42",
                "_contact_groups": ["/contact_group/1"],
                "_owner": "/user/7",
                "_ui_base_url": "https://acme.circonus.com/",
                "_usage": [{"_limit": 500, "_type": "Host", "_used": 12}],
                "name": "acme",
                "users": [{"role": "Admin", "user": "/user/7"}],
            }),
        );
        let ctx = Context::new(api::Client::new(transport), Default::default());

        let mut data = MemoryData::new(Arc::new(AccountSource.schema()), &json!({"current": true}));
        AccountSource.read(&ctx, &mut data).await.unwrap();

        assert_eq!(data.id(), Some("/account/42"));
        let state = data.state();
        assert_eq!(state["owner"], json!("/user/7"));
        assert_eq!(state["usage"][0]["limit"], json!(500));
        assert_eq!(state["users"][0]["id"], json!("/user/7"));
    }

    #[tokio::test]
    async fn test_missing_account_propagates() {
        let transport = Arc::new(api::MemoryTransport::new());
        let ctx = Context::new(api::Client::new(transport), Default::default());

        let mut data = MemoryData::new(Arc::new(AccountSource.schema()), &json!({"id": "/account/9"}));
        let err = AccountSource.read(&ctx, &mut data).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
