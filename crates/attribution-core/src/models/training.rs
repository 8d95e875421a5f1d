use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{AvailabilityId, ContactId, ReferentId, StudentId, TrainingId};

/// Pairing request sent to `POST /training/new/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTraining {
    pub student: StudentId,
    pub availability: AvailabilityId,
    pub referent: Option<ReferentId>,
    pub contact: Option<ContactId>,
}

impl NewTraining {
    /// Form fields as posted by the screen. Absent referent/contact are sent
    /// as empty strings, which the server reads as "none".
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        fn opt(value: Option<i64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        vec![
            ("student", self.student.to_string()),
            ("avail", self.availability.to_string()),
            ("referent", opt(self.referent)),
            ("contact", opt(self.contact)),
        ]
    }
}

/// Server answer to a pairing request: the literal `OK`, or an error text
/// to show verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Rejected(String),
}

impl CreateOutcome {
    pub fn from_body(body: &str) -> Self {
        if body.trim() == "OK" {
            CreateOutcome::Created
        } else {
            CreateOutcome::Rejected(body.to_string())
        }
    }
}

/// Server answer to `POST /training/del/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedTraining {
    pub ref_id: Option<ReferentId>,
}

fn item_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"id="training_(\d+)""#).expect("training id pattern"))
}

/// Server-rendered trainings list for a period, with the training ids
/// found in its `<li id="training_<pk>">` items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingsListing {
    markup: String,
    training_ids: Vec<TrainingId>,
}

impl TrainingsListing {
    pub fn from_markup(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let training_ids = item_id_pattern()
            .captures_iter(&markup)
            .filter_map(|caps| caps[1].parse().ok())
            .collect();
        Self { markup, training_ids }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn training_ids(&self) -> &[TrainingId] {
        &self.training_ids
    }

    pub fn contains(&self, id: TrainingId) -> bool {
        self.training_ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.training_ids.is_empty()
    }

    /// Drop the item of a deleted training. Returns false if it was not listed.
    pub fn remove(&mut self, id: TrainingId) -> bool {
        let Some(pos) = self.training_ids.iter().position(|&t| t == id) else {
            return false;
        };
        self.training_ids.remove(pos);

        let item = format!(r#"(?s)<li[^>]*\bid="training_{}"[^>]*>.*?</li>\s*"#, id);
        if let Ok(re) = Regex::new(&item) {
            self.markup = re.replace(&self.markup, "").into_owned();
        }
        true
    }
}
