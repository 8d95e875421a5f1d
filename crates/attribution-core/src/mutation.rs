//! Optimistic updates applied after the server confirmed a mutation.
//!
//! Nothing here runs before the server answered: a rejected or failed
//! request never reaches these functions. `lists_current` tells whether the
//! period the request was issued under is still the active one; when it is
//! not, the lists already belong to another period and only the referent
//! counts, which span periods, are touched.

use tracing::debug;

use crate::models::{NewTraining, ReferentId, TrainingId};
use crate::store::SelectionStore;

fn bump_referent(store: &mut SelectionStore, referent: ReferentId, increment: bool) {
    match store.referents.iter_mut().find(|r| r.id == referent) {
        Some(r) if increment => r.increment(),
        Some(r) => r.decrement(),
        None => debug!(referent, "Referent not listed, count left as is"),
    }
}

/// A training was created from `request`.
///
/// The paired student and availability leave their lists (so both totals
/// drop by one), both selections and detail panels are cleared, the
/// referent's count goes up by one and the referent/contact choices reset.
/// The trainings list itself is reloaded by the caller.
pub fn apply_created(store: &mut SelectionStore, request: &NewTraining, lists_current: bool) {
    if let Some(referent) = request.referent {
        bump_referent(store, referent, true);
    }
    store.active_referent = None;

    if !lists_current {
        return;
    }

    store.student_options.retain(|s| s.id != request.student);
    store
        .availability_options
        .retain(|a| a.id != request.availability);

    store.active_student = None;
    store.student_detail = None;
    store.active_availability = None;
    store.availability_detail = None;
    store.active_contact = None;
}

/// A training was deleted; `referent` is the referent the server reported.
///
/// The caller reloads the student and availability lists from the server,
/// since the freed entries are the server's to provide.
pub fn apply_deleted(
    store: &mut SelectionStore,
    training: TrainingId,
    referent: Option<ReferentId>,
    lists_current: bool,
) {
    if let Some(referent) = referent {
        bump_referent(store, referent, false);
    }

    if lists_current {
        if let Some(listing) = store.trainings.as_mut() {
            if !listing.remove(training) {
                debug!(training, "Deleted training was not in the displayed list");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AvailabilityOption, Period, Referent, Section, StudentOption, TrainingsListing,
    };

    fn store() -> SelectionStore {
        let mut store = SelectionStore::new(
            vec![Section { id: 1, label: "ASE".to_string() }],
            vec![Referent::new(3, "Besson Claire", 4), Referent::new(4, "Jacot Paul", 0)],
        );
        store.set_section(Some(1)).unwrap();
        store.apply_periods(vec![Period {
            id: 10,
            dates: "2024".to_string(),
            title: "Stage".to_string(),
        }]);
        store.set_period(Some(10)).unwrap();
        store.apply_students(
            [41, 42, 43]
                .into_iter()
                .map(|id| StudentOption {
                    id,
                    name: format!("Student {}", id),
                    klass: "2A".to_string(),
                    training_id: None,
                })
                .collect(),
        );
        store.apply_availabilities(
            [6, 7]
                .into_iter()
                .map(|id| AvailabilityOption {
                    id,
                    corporation_id: id * 10,
                    corporation_name: format!("Corp {}", id),
                    domain: "EMS".to_string(),
                    free: true,
                    priority: false,
                })
                .collect(),
        );
        store.apply_trainings(TrainingsListing::from_markup(
            r#"<li id="training_300">a</li><li id="training_301">b</li>"#,
        ));
        store
    }

    fn request() -> NewTraining {
        NewTraining {
            student: 42,
            availability: 7,
            referent: Some(3),
            contact: None,
        }
    }

    #[test]
    fn test_created_updates_lists_and_counters() {
        let mut store = store();
        store.set_student(Some(42)).unwrap();
        store.set_availability(Some(7)).unwrap();
        store.set_referent(Some(3)).unwrap();
        store.apply_student_detail("<p>detail</p>".to_string());
        let (students, corps) = (store.student_total(), store.corp_total());

        apply_created(&mut store, &request(), true);

        assert_eq!(store.student_total(), students - 1);
        assert_eq!(store.corp_total(), corps - 1);
        assert!(store.student_options().iter().all(|s| s.id != 42));
        assert!(store.availability_options().iter().all(|a| a.id != 7));
        assert_eq!(store.referent(3).unwrap().label(), "Besson Claire (5)");
        assert_eq!(store.active_student(), None);
        assert_eq!(store.active_availability(), None);
        assert_eq!(store.student_detail(), None);
        assert_eq!(store.active_referent(), None);
        assert!(!store.can_pair());
    }

    #[test]
    fn test_created_for_stale_period_only_counts_referent() {
        let mut store = store();
        apply_created(&mut store, &request(), false);
        assert_eq!(store.student_total(), 3);
        assert_eq!(store.corp_total(), 2);
        assert_eq!(store.referent(3).unwrap().assigned_count, 5);
    }

    #[test]
    fn test_created_without_referent() {
        let mut store = store();
        let req = NewTraining { referent: None, ..request() };
        apply_created(&mut store, &req, true);
        assert_eq!(store.referent(3).unwrap().assigned_count, 4);
        assert_eq!(store.referent(4).unwrap().assigned_count, 0);
    }

    #[test]
    fn test_deleted_decrements_referent_and_drops_item() {
        let mut store = store();
        apply_deleted(&mut store, 300, Some(3), true);
        assert_eq!(store.referent(3).unwrap().label(), "Besson Claire (3)");
        assert_eq!(store.trainings().unwrap().training_ids(), &[301]);
    }

    #[test]
    fn test_deleted_with_unknown_or_missing_referent() {
        let mut store = store();
        apply_deleted(&mut store, 301, Some(99), true);
        apply_deleted(&mut store, 999, None, true);
        assert_eq!(store.referent(3).unwrap().assigned_count, 4);
        assert_eq!(store.trainings().unwrap().training_ids(), &[300]);
    }
}
