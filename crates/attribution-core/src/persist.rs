//! Last selected section and period, kept between runs.
//!
//! Each value expires 7 days after it was written, like the cookies the
//! screen keeps in a browser. This is a resume convenience only: an expired,
//! missing or unreadable file simply means nothing is pre-selected.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{PeriodId, SectionId};

/// Selection file name in the state directory
const SELECTION_FILE: &str = "selection.json";

/// Lifetime of a remembered value in days.
const EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub value: i64,
    pub expires_at: DateTime<Utc>,
}

impl StoredValue {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            expires_at: Utc::now() + Duration::days(EXPIRY_DAYS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelectionData {
    pub section: Option<StoredValue>,
    pub periode: Option<StoredValue>,
}

pub struct SavedSelection {
    state_dir: PathBuf,
    pub data: SavedSelectionData,
}

impl SavedSelection {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            state_dir,
            data: SavedSelectionData::default(),
        }
    }

    /// Load the saved selection from disk, dropping expired values
    pub fn load(state_dir: PathBuf) -> Result<Self> {
        let mut saved = Self::new(state_dir);
        let path = saved.selection_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read selection file")?;
            let mut data: SavedSelectionData = serde_json::from_str(&contents)
                .context("Failed to parse selection file")?;

            if data.section.as_ref().is_some_and(StoredValue::is_expired) {
                debug!("Saved section expired");
                data.section = None;
            }
            if data.periode.as_ref().is_some_and(StoredValue::is_expired) {
                debug!("Saved period expired");
                data.periode = None;
            }
            saved.data = data;
        }
        Ok(saved)
    }

    pub fn save(&self) -> Result<()> {
        let path = self.selection_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn section(&self) -> Option<SectionId> {
        Self::live(&self.data.section)
    }

    pub fn period(&self) -> Option<PeriodId> {
        Self::live(&self.data.periode)
    }

    /// Remember the section; the remembered period belongs to the old one
    pub fn remember_section(&mut self, section: Option<SectionId>) -> Result<()> {
        self.data.section = section.map(StoredValue::new);
        self.data.periode = None;
        self.save()
    }

    pub fn remember_period(&mut self, period: Option<PeriodId>) -> Result<()> {
        self.data.periode = period.map(StoredValue::new);
        self.save()
    }

    fn live(value: &Option<StoredValue>) -> Option<i64> {
        value.as_ref().filter(|v| !v.is_expired()).map(|v| v.value)
    }

    fn selection_path(&self) -> PathBuf {
        self.state_dir.join(SELECTION_FILE)
    }
}
