//! Plain-text rendering of the selection store.
//!
//! Every function returns the text to print; nothing here writes to stdout.

use std::fmt::Write;

use attribution_core::utils::{corp_total_label, strip_html, student_total_label, truncate_string};
use attribution_core::SelectionStore;

/// Column width of option labels in lists
const LABEL_WIDTH: usize = 60;

/// Lines of a detail panel shown in the status
const DETAIL_LINES: usize = 8;

fn marker(selected: bool) -> &'static str {
    if selected {
        ">"
    } else {
        " "
    }
}

fn row(out: &mut String, selected: bool, id: i64, label: &str) {
    let _ = writeln!(
        out,
        "{} {:>6}  {}",
        marker(selected),
        id,
        truncate_string(label, LABEL_WIDTH)
    );
}

pub fn sections(store: &SelectionStore) -> String {
    let mut out = String::new();
    for section in store.sections() {
        row(&mut out, store.active_section() == Some(section.id), section.id, &section.label);
    }
    out
}

pub fn periods(store: &SelectionStore) -> String {
    if store.active_section().is_none() {
        return "No section selected\n".to_string();
    }
    let mut out = String::new();
    for period in store.periods() {
        row(&mut out, store.active_period() == Some(period.id), period.id, &period.label());
    }
    out
}

pub fn students(store: &SelectionStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", student_total_label(store.student_total()));
    if !store.student_filter().is_empty() {
        let _ = writeln!(out, "class: {}", store.student_filter());
    }
    for student in store.visible_students() {
        row(&mut out, store.active_student() == Some(student.id), student.id, &student.label());
    }
    if !store.class_choices().is_empty() {
        let _ = writeln!(out, "classes: {}", store.class_choices().join(", "));
    }
    out
}

pub fn availabilities(store: &SelectionStore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", corp_total_label(store.corp_total()));
    if !store.corporation_filter().is_empty() {
        let _ = writeln!(out, "domain: {}", store.corporation_filter());
    }
    for availability in store.visible_availabilities() {
        let label = if availability.priority {
            format!("* {}", availability.label())
        } else {
            availability.label().to_string()
        };
        row(
            &mut out,
            store.active_availability() == Some(availability.id),
            availability.id,
            &label,
        );
    }
    if !store.domain_choices().is_empty() {
        let _ = writeln!(out, "domains: {}", store.domain_choices().join(", "));
    }
    out
}

pub fn contacts(store: &SelectionStore) -> String {
    if store.contacts().is_empty() {
        return "No contacts\n".to_string();
    }
    let mut out = String::new();
    for contact in store.contacts() {
        row(&mut out, store.active_contact() == Some(contact.id), contact.id, &contact.label());
    }
    out
}

pub fn referents(store: &SelectionStore) -> String {
    let mut out = String::new();
    for referent in store.referents() {
        row(&mut out, store.active_referent() == Some(referent.id), referent.id, &referent.label());
    }
    out
}

pub fn trainings(store: &SelectionStore) -> String {
    match store.trainings() {
        None => "No trainings loaded\n".to_string(),
        Some(listing) if listing.is_empty() => "No trainings for this period\n".to_string(),
        Some(listing) => {
            let mut out = strip_html(listing.markup());
            out.push('\n');
            let ids: Vec<String> = listing.training_ids().iter().map(i64::to_string).collect();
            let _ = writeln!(out, "ids: {}", ids.join(", "));
            out
        }
    }
}

fn detail(out: &mut String, title: &str, markup: Option<&str>) {
    let Some(markup) = markup else {
        return;
    };
    let _ = writeln!(out, "-- {} --", title);
    for line in strip_html(markup).lines().take(DETAIL_LINES) {
        let _ = writeln!(out, "  {}", line);
    }
}

/// Summary of every selection, the counters and the detail panels
pub fn status(store: &SelectionStore) -> String {
    let mut out = String::new();

    let section = store
        .active_section()
        .and_then(|id| store.sections().iter().find(|s| s.id == id))
        .map(|s| s.label.clone());
    let period = store
        .active_period()
        .and_then(|id| store.periods().iter().find(|p| p.id == id))
        .map(|p| p.label());
    let student = store
        .active_student()
        .and_then(|id| store.student_options().iter().find(|s| s.id == id))
        .map(|s| s.label());
    let availability = store.active_availability_option().map(|a| a.label().to_string());
    let contact = store
        .active_contact()
        .and_then(|id| store.contacts().iter().find(|c| c.id == id))
        .map(|c| c.label());
    let referent = store
        .active_referent()
        .and_then(|id| store.referent(id))
        .map(|r| r.label());

    let none = || "-".to_string();
    let _ = writeln!(out, "section:  {}", section.unwrap_or_else(none));
    let _ = writeln!(out, "period:   {}", period.unwrap_or_else(none));
    let _ = writeln!(
        out,
        "{} / {}",
        student_total_label(store.student_total()),
        corp_total_label(store.corp_total())
    );
    let _ = writeln!(out, "student:  {}", student.unwrap_or_else(none));
    let _ = writeln!(out, "corp:     {}", availability.unwrap_or_else(none));
    let _ = writeln!(out, "contact:  {}", contact.unwrap_or_else(none));
    let _ = writeln!(out, "referent: {}", referent.unwrap_or_else(none));

    let mut actions = Vec::new();
    if store.can_pair() {
        actions.push("pair");
    }
    if store.export_available() {
        actions.push("export");
    }
    if store.export_non_attributed_available() {
        actions.push("export non-attr");
    }
    if !actions.is_empty() {
        let _ = writeln!(out, "available: {}", actions.join(", "));
    }

    detail(&mut out, "student", store.student_detail());
    detail(&mut out, "corp", store.availability_detail());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use attribution_core::models::{Period, Referent, Section, StudentOption};

    fn store() -> SelectionStore {
        let mut store = SelectionStore::new(
            vec![Section { id: 1, label: "ASE".to_string() }],
            vec![Referent::new(3, "Besson Claire", 4)],
        );
        store.set_section(Some(1)).unwrap();
        store.apply_periods(vec![Period {
            id: 10,
            dates: "2024-2025".to_string(),
            title: "Stage 1".to_string(),
        }]);
        store.set_period(Some(10)).unwrap();
        store.apply_students(vec![StudentOption {
            id: 42,
            name: "Dupont Marie".to_string(),
            klass: "2A".to_string(),
            training_id: None,
        }]);
        store
    }

    #[test]
    fn test_students_list_marks_selection() {
        let mut store = store();
        store.set_student(Some(42)).unwrap();
        let text = students(&store);
        assert!(text.starts_with("1 étudiant-e-s\n"));
        assert!(text.contains(">     42  Dupont Marie (2A)"));
        assert!(text.contains("classes: 2A"));
    }

    #[test]
    fn test_status_without_selection() {
        let text = status(&store());
        assert!(text.contains("section:  ASE"));
        assert!(text.contains("period:   2024-2025 Stage 1"));
        assert!(text.contains("student:  -"));
        assert!(!text.contains("available:"));
    }

    #[test]
    fn test_status_shows_detail_text() {
        let mut store = store();
        store.set_student(Some(42)).unwrap();
        store.apply_student_detail("<h3>Dupont Marie</h3><p>2A &amp; stage</p>".to_string());
        let text = status(&store);
        assert!(text.contains("-- student --\n  Dupont Marie\n  2A & stage\n"));
    }

    #[test]
    fn test_periods_need_section() {
        let store = SelectionStore::new(Vec::new(), Vec::new());
        assert_eq!(periods(&store), "No section selected\n");
        assert_eq!(trainings(&store), "No trainings loaded\n");
    }
}
