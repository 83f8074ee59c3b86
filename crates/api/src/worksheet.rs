use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Worksheet {
    #[serde(rename = "_cid", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    pub description: Option<String>,
    pub favorite: bool,
    pub graphs: Vec<WorksheetGraph>,
    pub notes: Option<String>,
    pub smart_queries: Vec<SmartQuery>,
    pub tags: Vec<String>,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WorksheetGraph {
    pub graph: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SmartQuery {
    pub name: String,
    pub order: Vec<String>,
    pub query: String,
}

impl crate::Entity for Worksheet {
    const KIND: &'static str = "worksheet";

    fn cid(&self) -> Option<&str> {
        self.cid.as_deref()
    }

    fn set_cid(&mut self, cid: String) {
        self.cid = Some(cid);
    }
}
