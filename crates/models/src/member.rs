use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use crate::field_descriptor::FieldValue;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
    Visitor,
    Transferred,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Member {
    pub id: Uuid,
    pub entity_id: Option<Uuid>, // Branch or department the member belongs to
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    /// Organization-defined values, as stored by the backend. Loosely typed
    /// because descriptors can change after a member was saved.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn custom_value(&self, name: &str) -> Option<FieldValue> {
        self.custom_fields.get(name).and_then(FieldValue::from_json)
    }
}

/// Request body for creating or updating a member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct MemberPayload {
    pub entity_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: MemberStatus,
    pub custom_fields: BTreeMap<String, FieldValue>,
}

/// Query string for member listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct MemberQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
}
