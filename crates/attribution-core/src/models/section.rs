use serde::{Deserialize, Serialize};

use super::{PeriodId, SectionId};

/// Top-level grouping a period belongs to. Sections come from the screen
/// itself, never from an AJAX endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub label: String,
}

/// Training period, as returned by `GET /section/{id}/periods/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub dates: String,
    pub title: String,
}

impl Period {
    pub fn label(&self) -> String {
        format!("{} {}", self.dates, self.title)
    }
}
