use crate::{Error, Meta, Translator};
use models::{Dashboard, GridLayout, Violation, Widget};
use schema::{descriptions, Attribute, Kind, Schema, Validator};
use serde_json::Value;

pub struct DashboardTranslator;

const WIDGET_TYPES: &[&str] = &[
    "alerts",
    "chart",
    "cluster",
    "forecast",
    "gauge",
    "graph",
    "html",
    "list",
    "status",
    "text",
];

const DESCRIPTIONS: &[(&str, &str)] = &[
    ("account_default", "Whether this is the account's default dashboard"),
    ("created", "Time the dashboard was created, in epoch seconds"),
    ("dashboard_uuid", "UUID of the dashboard"),
    ("grid_layout", "Dimensions of the widget grid"),
    ("grid_layout.height", "Rows of the grid"),
    ("grid_layout.width", "Columns of the grid"),
    ("last_modified", "Time of the last modification, in epoch seconds"),
    ("shared", "Whether the dashboard is visible to the whole account"),
    ("title", "Title of the dashboard"),
    ("widget", "Widgets placed on the grid"),
    ("widget.active", "Whether the widget is displayed"),
    ("widget.height", "Rows spanned by the widget"),
    ("widget.name", "Name of the widget"),
    ("widget.origin", "Grid cell of the widget's top-left corner, such as a0"),
    ("widget.settings", "Settings of the widget, which vary by type"),
    ("widget.type", "Type of the widget"),
    ("widget.widget_id", "Identifier of the widget within the dashboard"),
    ("widget.width", "Columns spanned by the widget"),
];

fn cells() -> Attribute {
    Attribute::int()
        .required()
        .validate(Validator::IntRange { min: 1, max: 26 })
}

impl Translator for DashboardTranslator {
    const NAME: &'static str = "circonus_dashboard";

    type Model = Dashboard;
    type Wire = api::Dashboard;

    fn schema() -> Schema {
        let grid_layout = Schema::new().attr("height", cells()).attr("width", cells());
        let widget = Schema::new()
            .attr("active", Attribute::bool().default(true))
            .attr("height", cells())
            .attr("name", Attribute::string().required())
            .attr(
                "origin",
                Attribute::string()
                    .required()
                    .validate(Validator::regex("^[a-z][0-9]+$")),
            )
            .attr("settings", Attribute::map(Kind::String))
            .attr(
                "type",
                Attribute::string().required().validate(Validator::OneOf(WIDGET_TYPES)),
            )
            .attr("widget_id", Attribute::string().required())
            .attr("width", cells());

        let mut schema = Schema::new()
            .attr("account_default", Attribute::bool())
            .attr("created", Attribute::int().computed())
            .attr("dashboard_uuid", Attribute::string().computed())
            .attr("grid_layout", Attribute::block(grid_layout).required())
            .attr("last_modified", Attribute::int().computed())
            .attr("shared", Attribute::bool())
            .attr("title", Attribute::string().required())
            .attr("widget", Attribute::list(Kind::Block(widget)));

        descriptions::fuse(Self::NAME, &mut schema, DESCRIPTIONS);
        schema
    }

    fn validate(dashboard: &Dashboard) -> Vec<Violation> {
        dashboard.validate()
    }

    fn encode(dashboard: &Dashboard, _meta: &Meta) -> Result<api::Dashboard, Error> {
        let widgets = dashboard
            .widget
            .iter()
            .map(|w| api::Widget {
                active: w.active,
                height: w.height,
                name: w.name.clone(),
                origin: w.origin.clone(),
                settings: w
                    .settings
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
                type_: w.type_.clone(),
                widget_id: w.widget_id.clone(),
                width: w.width,
            })
            .collect();

        Ok(api::Dashboard {
            cid: None,
            created: None,
            dashboard_uuid: None,
            last_modified: None,
            account_default: dashboard.account_default,
            grid_layout: api::GridLayout {
                height: dashboard.grid_layout.height,
                width: dashboard.grid_layout.width,
            },
            shared: dashboard.shared,
            title: dashboard.title.clone(),
            widgets,
        })
    }

    fn decode(wire: &api::Dashboard, _meta: &Meta) -> Result<Dashboard, Error> {
        let widget = wire
            .widgets
            .iter()
            .map(|w| Widget {
                active: w.active,
                height: w.height,
                name: w.name.clone(),
                origin: w.origin.clone(),
                settings: w
                    .settings
                    .iter()
                    .filter_map(|(k, v)| setting(v).map(|v| (k.clone(), v)))
                    .collect(),
                type_: w.type_.clone(),
                widget_id: w.widget_id.clone(),
                width: w.width,
            })
            .collect();

        Ok(Dashboard {
            account_default: wire.account_default,
            grid_layout: GridLayout {
                height: wire.grid_layout.height,
                width: wire.grid_layout.width,
            },
            shared: wire.shared,
            title: wire.title.clone(),
            widget,
            created: wire.created,
            dashboard_uuid: wire.dashboard_uuid.clone(),
            last_modified: wire.last_modified,
        })
    }
}

/// Widget settings are flattened to strings. Nested settings are kept as
/// their JSON text, and nulls are dropped.
fn setting(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_settings() {
        let wire: api::Dashboard = serde_json::from_value(json!({
            "_cid": "/dashboard/12",
            "_dashboard_uuid": "1f1e7e2c-84f5-4a4a-9b47-d1d6e8c2b39e",
            "title": "ops",
            "grid_layout": {"height": 4, "width": 4},
            "widgets": [{
                "active": true,
                "height": 1,
                "width": 2,
                "name": "Graph",
                "origin": "a0",
                "type": "graph",
                "widget_id": "w4",
                "settings": {
                    "graph_id": "0f6b4fce",
                    "hide_xaxis": false,
                    "period": 2000,
                    "key_size": null,
                    "overlay_set_id": "",
                },
            }],
        }))
        .unwrap();

        let dashboard = DashboardTranslator::decode(&wire, &Meta::default()).unwrap();
        let settings = &dashboard.widget[0].settings;
        assert_eq!(settings["hide_xaxis"], "false");
        assert_eq!(settings["period"], "2000");
        assert!(!settings.contains_key("key_size"));
        assert_eq!(dashboard.dashboard_uuid.as_deref(), Some("1f1e7e2c-84f5-4a4a-9b47-d1d6e8c2b39e"));
        assert!(dashboard.validate().is_empty());

        let encoded = DashboardTranslator::encode(&dashboard, &Meta::default()).unwrap();
        assert_eq!(encoded.widgets[0].settings["graph_id"], json!("0f6b4fce"));
        assert_eq!(encoded.cid, None);
    }
}
