use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ReferentId;

/// Supervising teacher with the number of trainings currently assigned.
/// The displayed label is always derived from `assigned_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referent {
    pub id: ReferentId,
    pub name: String,
    pub assigned_count: u32,
}

fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*)\((\d+)\)\s*$").expect("referent label pattern"))
}

impl Referent {
    pub fn new(id: ReferentId, name: impl Into<String>, assigned_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            assigned_count,
        }
    }

    /// Build a referent from a rendered `"<Name> (<count>)"` label.
    /// A label without a trailing count is read as zero assignments.
    pub fn from_label(id: ReferentId, label: &str) -> Self {
        match label_pattern().captures(label) {
            Some(caps) => {
                let count = caps[2].parse().unwrap_or(0);
                Self::new(id, caps[1].trim(), count)
            }
            None => Self::new(id, label.trim(), 0),
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.assigned_count)
    }

    pub fn increment(&mut self) {
        self.assigned_count += 1;
    }

    pub fn decrement(&mut self) {
        self.assigned_count = self.assigned_count.saturating_sub(1);
    }
}
