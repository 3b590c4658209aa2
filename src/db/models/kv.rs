use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the namespaced key/value table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
