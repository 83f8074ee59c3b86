use super::{Seconds, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// OverlaySet is a titled group of overlays drawn over a graph.
/// It is persisted as part of its graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OverlaySet {
    /// CID of the graph which holds the overlay set.
    pub graph: String,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
    pub title: String,
}

/// Overlay draws a time-shifted copy of the graph, or an annotation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Overlay {
    pub decouple: bool,
    pub id: String,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub x_shift: Option<Seconds>,
    pub z: Option<i64>,
}

impl OverlaySet {
    pub fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut seen = BTreeSet::new();

        for (i, overlay) in self.overlays.iter().enumerate() {
            if overlay.id.trim().is_empty() {
                out.push(Violation::new(format!("overlays.{i}.id"), "id is required"));
            } else if !seen.insert(overlay.id.as_str()) {
                out.push(Violation::new(
                    format!("overlays.{i}.id"),
                    format!("overlay id {:?} is used more than once", overlay.id),
                ));
            }
        }
        out
    }
}
