//! Selection state for the attribution screen.
//!
//! `SelectionStore` is the single owner of the current selections and of
//! the unfiltered option lists fetched for the active period. Every setter
//! clears the state that depends on the value it changes, in this order:
//!
//! ```text
//! section -> period -> { students, availabilities, trainings } -> { details, contacts }
//! ```
//!
//! The store performs no I/O. The cascade controller decides which fetches
//! follow a transition and feeds their results back through the `apply_*`
//! methods.

use thiserror::Error;

use crate::api::AttributionScreen;
use crate::filter::{distinct_keys, filter_options};
use crate::models::{
    AvailabilityId, AvailabilityOption, Contact, ContactId, CorporationId, NewTraining, Period,
    PeriodId, Referent, ReferentId, Section, SectionId, StudentId, StudentOption, TrainingId,
    TrainingsListing,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown section: {0}")]
    UnknownSection(SectionId),

    #[error("Unknown period: {0}")]
    UnknownPeriod(PeriodId),

    #[error("Student {0} is not available for pairing")]
    UnknownStudent(StudentId),

    #[error("Availability {0} is not free")]
    UnknownAvailability(AvailabilityId),

    #[error("Unknown contact: {0}")]
    UnknownContact(ContactId),

    #[error("Unknown referent: {0}")]
    UnknownReferent(ReferentId),

    #[error("A student and an availability must both be selected")]
    PairingUnavailable,

    #[error("No period selected")]
    NoActivePeriod,

    #[error("Training {0} is not in the displayed list")]
    UnknownTraining(TrainingId),

    #[error("Nothing to export for this period")]
    NothingToExport,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    pub(crate) sections: Vec<Section>,
    pub(crate) referents: Vec<Referent>,
    pub(crate) active_section: Option<SectionId>,

    pub(crate) periods: Vec<Period>,
    pub(crate) active_period: Option<PeriodId>,

    // Selectable options of the active period, in fetch order
    pub(crate) student_options: Vec<StudentOption>,
    pub(crate) availability_options: Vec<AvailabilityOption>,
    pub(crate) class_choices: Vec<String>,
    pub(crate) domain_choices: Vec<String>,
    pub(crate) student_filter: String,
    pub(crate) corporation_filter: String,
    pub(crate) trainings: Option<TrainingsListing>,

    pub(crate) active_student: Option<StudentId>,
    pub(crate) active_availability: Option<AvailabilityId>,
    pub(crate) student_detail: Option<String>,
    pub(crate) availability_detail: Option<String>,

    pub(crate) contacts: Vec<Contact>,
    /// Corporation the loaded contacts belong to
    pub(crate) contacts_corporation: Option<CorporationId>,
    pub(crate) active_contact: Option<ContactId>,
    pub(crate) active_referent: Option<ReferentId>,
}

impl SelectionStore {
    pub fn new(sections: Vec<Section>, referents: Vec<Referent>) -> Self {
        Self {
            sections,
            referents,
            ..Default::default()
        }
    }

    pub fn from_screen(screen: AttributionScreen) -> Self {
        Self::new(screen.sections, screen.referents)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn referents(&self) -> &[Referent] {
        &self.referents
    }

    pub fn referent(&self, id: ReferentId) -> Option<&Referent> {
        self.referents.iter().find(|r| r.id == id)
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.active_section
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn active_period(&self) -> Option<PeriodId> {
        self.active_period
    }

    pub fn student_options(&self) -> &[StudentOption] {
        &self.student_options
    }

    pub fn availability_options(&self) -> &[AvailabilityOption] {
        &self.availability_options
    }

    pub fn class_choices(&self) -> &[String] {
        &self.class_choices
    }

    pub fn domain_choices(&self) -> &[String] {
        &self.domain_choices
    }

    pub fn student_filter(&self) -> &str {
        &self.student_filter
    }

    pub fn corporation_filter(&self) -> &str {
        &self.corporation_filter
    }

    pub fn trainings(&self) -> Option<&TrainingsListing> {
        self.trainings.as_ref()
    }

    pub fn active_student(&self) -> Option<StudentId> {
        self.active_student
    }

    pub fn active_availability(&self) -> Option<AvailabilityId> {
        self.active_availability
    }

    pub fn active_availability_option(&self) -> Option<&AvailabilityOption> {
        let id = self.active_availability?;
        self.availability_options.iter().find(|a| a.id == id)
    }

    pub fn student_detail(&self) -> Option<&str> {
        self.student_detail.as_deref()
    }

    pub fn availability_detail(&self) -> Option<&str> {
        self.availability_detail.as_deref()
    }

    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn contacts_corporation(&self) -> Option<CorporationId> {
        self.contacts_corporation
    }

    pub fn active_contact(&self) -> Option<ContactId> {
        self.active_contact
    }

    pub fn active_referent(&self) -> Option<ReferentId> {
        self.active_referent
    }

    /// Number of selectable students for the active period
    pub fn student_total(&self) -> usize {
        self.student_options.len()
    }

    /// Number of free availabilities for the active period
    pub fn corp_total(&self) -> usize {
        self.availability_options.len()
    }

    /// Pairing is possible iff both a student and an availability are selected
    pub fn can_pair(&self) -> bool {
        self.active_student.is_some() && self.active_availability.is_some()
    }

    pub fn export_available(&self) -> bool {
        self.active_period.is_some() && self.trainings.as_ref().is_some_and(|t| !t.is_empty())
    }

    pub fn export_non_attributed_available(&self) -> bool {
        self.active_period.is_some() && !self.availability_options.is_empty()
    }

    // =========================================================================
    // Local filter views
    // =========================================================================

    pub fn visible_students(&self) -> Vec<&StudentOption> {
        filter_options(&self.student_options, &self.student_filter)
    }

    pub fn visible_availabilities(&self) -> Vec<&AvailabilityOption> {
        filter_options(&self.availability_options, &self.corporation_filter)
    }

    pub fn set_student_filter(&mut self, class: &str) {
        self.student_filter = class.to_string();
    }

    pub fn set_corporation_filter(&mut self, domain: &str) {
        self.corporation_filter = domain.to_string();
    }

    // =========================================================================
    // Level 0-1: section and period
    // =========================================================================

    pub fn set_section(&mut self, section: Option<SectionId>) -> Result<(), SelectionError> {
        if let Some(id) = section {
            if !self.sections.iter().any(|s| s.id == id) {
                return Err(SelectionError::UnknownSection(id));
            }
        }
        self.active_section = section;
        self.periods.clear();
        self.active_period = None;
        self.clear_period_state();
        Ok(())
    }

    pub fn apply_periods(&mut self, periods: Vec<Period>) {
        self.periods = periods;
    }

    pub fn set_period(&mut self, period: Option<PeriodId>) -> Result<(), SelectionError> {
        if let Some(id) = period {
            if !self.periods.iter().any(|p| p.id == id) {
                return Err(SelectionError::UnknownPeriod(id));
            }
        }
        self.active_period = period;
        self.clear_period_state();
        Ok(())
    }

    fn clear_period_state(&mut self) {
        self.clear_students();
        self.clear_availabilities();
        self.trainings = None;
    }

    // =========================================================================
    // Level 2: lists of the active period
    // =========================================================================

    /// Drop the student list together with the selection and detail built on it
    pub fn clear_students(&mut self) {
        self.student_options.clear();
        self.class_choices.clear();
        self.student_filter.clear();
        self.active_student = None;
        self.student_detail = None;
    }

    /// Keep the students without a training; filter choices cover every student
    pub fn apply_students(&mut self, students: Vec<StudentOption>) {
        self.class_choices = distinct_keys(&students);
        self.student_options = students.into_iter().filter(|s| s.is_selectable()).collect();
    }

    /// Drop the availability list together with the selection, detail and contacts
    pub fn clear_availabilities(&mut self) {
        self.availability_options.clear();
        self.domain_choices.clear();
        self.corporation_filter.clear();
        self.active_availability = None;
        self.availability_detail = None;
        self.clear_contacts();
    }

    pub fn apply_availabilities(&mut self, availabilities: Vec<AvailabilityOption>) {
        self.domain_choices = distinct_keys(&availabilities);
        self.availability_options = availabilities
            .into_iter()
            .filter(|a| a.is_selectable())
            .collect();
    }

    pub fn apply_trainings(&mut self, listing: TrainingsListing) {
        self.trainings = Some(listing);
    }

    // =========================================================================
    // Level 2-3: student / availability selection and their panels
    // =========================================================================

    pub fn set_student(&mut self, student: Option<StudentId>) -> Result<(), SelectionError> {
        if let Some(id) = student {
            if !self.student_options.iter().any(|s| s.id == id) {
                return Err(SelectionError::UnknownStudent(id));
            }
        }
        self.active_student = student;
        self.student_detail = None;
        Ok(())
    }

    pub fn apply_student_detail(&mut self, markup: String) {
        self.student_detail = Some(markup);
    }

    pub fn set_availability(
        &mut self,
        availability: Option<AvailabilityId>,
    ) -> Result<(), SelectionError> {
        if let Some(id) = availability {
            if !self.availability_options.iter().any(|a| a.id == id) {
                return Err(SelectionError::UnknownAvailability(id));
            }
        }
        self.active_availability = availability;
        self.availability_detail = None;
        Ok(())
    }

    pub fn apply_availability_detail(&mut self, markup: String) {
        self.availability_detail = Some(markup);
    }

    pub fn clear_contacts(&mut self) {
        self.contacts.clear();
        self.contacts_corporation = None;
        self.active_contact = None;
    }

    /// Replace the contact list; a single contact is selected right away
    pub fn apply_contacts(&mut self, corporation: CorporationId, contacts: Vec<Contact>) {
        self.contacts = contacts;
        self.contacts_corporation = Some(corporation);
        self.active_contact = None;
        self.select_lone_contact();
    }

    /// Select the contact when the loaded list holds exactly one
    pub fn select_lone_contact(&mut self) {
        if let [only] = self.contacts.as_slice() {
            self.active_contact = Some(only.id);
        }
    }

    pub fn set_contact(&mut self, contact: Option<ContactId>) -> Result<(), SelectionError> {
        if let Some(id) = contact {
            if !self.contacts.iter().any(|c| c.id == id) {
                return Err(SelectionError::UnknownContact(id));
            }
        }
        self.active_contact = contact;
        Ok(())
    }

    pub fn set_referent(&mut self, referent: Option<ReferentId>) -> Result<(), SelectionError> {
        if let Some(id) = referent {
            if self.referent(id).is_none() {
                return Err(SelectionError::UnknownReferent(id));
            }
        }
        self.active_referent = referent;
        Ok(())
    }

    /// Pairing request built from the current selections
    pub fn pairing_request(&self) -> Result<NewTraining, SelectionError> {
        if self.active_period.is_none() {
            return Err(SelectionError::NoActivePeriod);
        }
        match (self.active_student, self.active_availability) {
            (Some(student), Some(availability)) => Ok(NewTraining {
                student,
                availability,
                referent: self.active_referent,
                contact: self.active_contact,
            }),
            _ => Err(SelectionError::PairingUnavailable),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
