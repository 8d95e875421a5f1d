use serde::{Deserialize, Serialize};

use super::{AvailabilityId, ContactId, CorporationId};

/// Open slot offered by a corporation for a period, as returned by
/// `GET /period/{id}/corporations/`. Displayed as a "corporation" but
/// identified by the availability id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityOption {
    pub id: AvailabilityId,
    #[serde(rename = "id_corp")]
    pub corporation_id: CorporationId,
    #[serde(rename = "corp_name")]
    pub corporation_name: String,
    pub domain: String,
    pub free: bool,
    pub priority: bool,
}

impl AvailabilityOption {
    pub fn is_selectable(&self) -> bool {
        self.free
    }

    pub fn label(&self) -> &str {
        &self.corporation_name
    }
}

/// Corporation contact, as returned by `GET /corporation/{id}/contacts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_main: Option<bool>,
    pub corporation_id: Option<CorporationId>,
}

impl Contact {
    pub fn label(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        match self.role.as_deref() {
            Some(role) if !role.is_empty() => format!("{} ({})", name, role),
            _ => name,
        }
    }
}
