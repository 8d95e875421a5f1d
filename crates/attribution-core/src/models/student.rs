use serde::{Deserialize, Serialize};

use super::{StudentId, TrainingId};

/// Student listed for a period, as returned by `GET /period/{id}/students/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentOption {
    pub id: StudentId,
    pub name: String,
    pub klass: String,
    /// Training already assigned for the period, if any
    pub training_id: Option<TrainingId>,
}

impl StudentOption {
    /// Only students without a training for the period can be paired.
    pub fn is_selectable(&self) -> bool {
        self.training_id.is_none()
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.klass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_students_response() {
        let json = r#"[{"name": "Dupont Marie", "id": 42, "training_id": null, "klass": "2ASE1"},
                       {"name": "Muller Jean", "id": 43, "training_id": 310, "klass": "2ASE2"}]"#;
        let students: Vec<StudentOption> =
            serde_json::from_str(json).expect("Failed to parse students JSON");
        assert_eq!(students.len(), 2);
        assert!(students[0].is_selectable());
        assert!(!students[1].is_selectable());
        assert_eq!(students[0].label(), "Dupont Marie (2ASE1)");
    }
}
