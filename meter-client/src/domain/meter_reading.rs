use serde::{Deserialize, Serialize};

/// One meter on a reading route.
///
/// `inx_dep` is the previous index printed on the route sheet; `meter_value`
/// is what the field agent records on site.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub code: String,
    #[serde(rename = "installationID")]
    pub installation_id: String,
    #[serde(rename = "branchID")]
    pub branch_id: String,
    pub compteur: String,
    pub inx_dep: String,
    pub meter_value: Option<String>,
    pub name: String,
    pub obs: String,
    pub usage: String,
    pub seq: String,
    pub reading_date: Option<String>,
    pub flagged: bool,
}

impl MeterReading {
    /// A reading is complete once a non-empty meter value has been recorded.
    pub fn is_complete(&self) -> bool {
        self.meter_value.as_deref().is_some_and(|v| !v.is_empty())
    }
}
