use super::Tags;
use serde::{Deserialize, Serialize};

/// Worksheet is an ordered collection of graphs, plus smart queries which
/// pull in graphs matching a search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Worksheet {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub favourite: bool,
    /// Graph CIDs, in display order.
    #[serde(default)]
    pub graphs: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub smart_queries: Vec<SmartQuery>,
    #[serde(default)]
    pub tags: Tags,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SmartQuery {
    pub name: String,
    #[serde(default)]
    pub order: Vec<String>,
    pub query: String,
}
