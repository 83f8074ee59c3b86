use super::Violation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Dashboard is a grid of widgets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Dashboard {
    #[serde(default)]
    pub account_default: bool,
    #[serde(default)]
    pub grid_layout: GridLayout,
    #[serde(default)]
    pub shared: bool,
    pub title: String,
    #[serde(default)]
    pub widget: Vec<Widget>,

    // Computed.
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub dashboard_uuid: Option<String>,
    #[serde(default)]
    pub last_modified: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub height: u32,
    pub width: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            height: 4,
            width: 4,
        }
    }
}

/// Widget is placed at `origin` (a column letter and row digit, such as
/// `a0`) and spans `width` by `height` grid cells.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    #[serde(default = "super::default_true")]
    pub active: bool,
    pub height: u32,
    pub name: String,
    pub origin: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub widget_id: String,
    pub width: u32,
}

impl Dashboard {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut ids = BTreeSet::new();

        for (i, widget) in self.widget.iter().enumerate() {
            if !ids.insert(widget.widget_id.as_str()) {
                out.push(Violation::new(
                    format!("widget.{i}.widget_id"),
                    format!("widget_id {:?} is used more than once", widget.widget_id),
                ));
            }
            match parse_origin(&widget.origin) {
                None => out.push(Violation::new(
                    format!("widget.{i}.origin"),
                    format!("{:?} is not a grid origin such as \"a0\"", widget.origin),
                )),
                Some((col, row)) => {
                    if col + widget.width > self.grid_layout.width
                        || row + widget.height > self.grid_layout.height
                    {
                        out.push(Violation::new(
                            format!("widget.{i}"),
                            "widget extends beyond the grid layout",
                        ));
                    }
                }
            }
        }
        out
    }
}

/// Parse an origin like `c2` into zero-based (column, row).
pub fn parse_origin(origin: &str) -> Option<(u32, u32)> {
    let mut chars = origin.chars();
    let col = chars.next()?;
    if !col.is_ascii_lowercase() {
        return None;
    }
    let row: u32 = chars.as_str().parse().ok()?;
    Some((col as u32 - 'a' as u32, row))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_origin_parsing() {
        assert_eq!(parse_origin("a0"), Some((0, 0)));
        assert_eq!(parse_origin("c12"), Some((2, 12)));
        assert_eq!(parse_origin("A0"), None);
        assert_eq!(parse_origin("a"), None);
    }

    #[test]
    fn test_widgets_fit_grid() {
        let dash: Dashboard = serde_json::from_value(json!({
            "title": "ops",
            "grid_layout": {"height": 2, "width": 2},
            "widget": [
                {"height": 1, "width": 2, "name": "Graph", "origin": "a0", "type": "graph", "widget_id": "w1"},
                {"height": 2, "width": 1, "name": "Graph", "origin": "b1", "type": "graph", "widget_id": "w1"},
            ],
        }))
        .unwrap();

        let paths: Vec<_> = dash.validate().into_iter().map(|v| v.path).collect();
        assert_eq!(paths, vec!["widget.1.widget_id", "widget.1"]);
    }
}
