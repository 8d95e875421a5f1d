//! Orchestration of the attribution screen's selection chain.
//!
//! `CascadeController` owns the `SelectionStore` and drives the gateway.
//! Selection changes are synchronous: the store is cleared below the changed
//! level before any fetch is issued. Fetches run as spawned tasks that send
//! their results back through an MPSC channel; `apply_next`, `settle` and
//! `drain` apply them to the store on the caller's side.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::Gateway;
use crate::models::{
    AvailabilityId, AvailabilityOption, Contact, ContactId, CorporationId, CreateOutcome,
    DeletedTraining, NewTraining, Period, PeriodId, ReferentId, SectionId, StudentId,
    StudentOption, TrainingId, TrainingsListing,
};
use crate::mutation;
use crate::persist::SavedSelection;
use crate::store::{SelectionError, SelectionStore};

use super::ticket::{Epochs, Scope, Ticket};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the fetch result channel.
/// A period change issues three fetches; 32 leaves room for rapid changes.
const CHANNEL_BUFFER_SIZE: usize = 32;

// ============================================================================
// Task Results
// ============================================================================

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The server refused a pairing; text is shown verbatim
    Rejected(String),
    /// A request failed in transport or parsing; state was left as it was
    Error(String),
}

/// Result of one spawned request.
enum Outcome {
    Periods(Result<Vec<Period>>),
    Students(Result<Vec<StudentOption>>),
    Availabilities(Result<Vec<AvailabilityOption>>),
    Trainings(Result<String>),
    StudentDetail(Result<String>),
    AvailabilityDetail(Result<String>),
    Contacts(CorporationId, Result<Vec<Contact>>),
    Created {
        request: NewTraining,
        generation: u64,
        result: Result<CreateOutcome>,
    },
    Deleted {
        training: TrainingId,
        generation: u64,
        result: Result<DeletedTraining>,
    },
}

struct Completion {
    task: u64,
    ticket: Ticket,
    outcome: Outcome,
}

// ============================================================================
// Controller
// ============================================================================

pub struct CascadeController<G: Gateway> {
    gateway: Arc<G>,
    store: SelectionStore,
    saved: Option<SavedSelection>,
    epochs: Epochs,

    /// Period to re-select once the periods of the resumed section arrive
    resume_period: Option<PeriodId>,

    // In-flight tasks and their result channel
    pending: HashMap<u64, Ticket>,
    next_task: u64,
    result_tx: mpsc::Sender<Completion>,
    result_rx: mpsc::Receiver<Completion>,

    notices: Vec<Notice>,
}

impl<G: Gateway> CascadeController<G> {
    pub fn new(gateway: Arc<G>, store: SelectionStore) -> Self {
        let (result_tx, result_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            gateway,
            store,
            saved: None,
            epochs: Epochs::default(),
            resume_period: None,
            pending: HashMap::new(),
            next_task: 0,
            result_tx,
            result_rx,
            notices: Vec::new(),
        }
    }

    /// Remember section and period changes in `saved`
    pub fn with_saved_selection(mut self, saved: SavedSelection) -> Self {
        self.saved = Some(saved);
        self
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// True while any request, current or stale, has not answered yet
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Re-select the remembered section, and its period once periods arrive.
    /// Ids that no longer exist are ignored.
    pub fn resume(&mut self) {
        let Some(saved) = self.saved.as_ref() else {
            return;
        };
        let (section, period) = (saved.section(), saved.period());

        let Some(section) = section else {
            return;
        };
        if !self.store.sections().iter().any(|s| s.id == section) {
            debug!(section, "Saved section no longer listed");
            return;
        }

        info!(section, ?period, "Resuming saved selection");
        if self.change_section(Some(section)).is_ok() {
            // Keep the period: selecting the section again just dropped it
            if let Some(saved) = self.saved.as_mut() {
                if let Err(e) = saved.remember_period(period) {
                    warn!(error = %e, "Failed to save selection");
                }
            }
            self.resume_period = period;
        }
    }

    // =========================================================================
    // Selection changes
    // =========================================================================

    pub fn select_section(&mut self, section: Option<SectionId>) -> Result<(), SelectionError> {
        self.resume_period = None;
        self.change_section(section)
    }

    fn change_section(&mut self, section: Option<SectionId>) -> Result<(), SelectionError> {
        self.store.set_section(section)?;
        self.epochs.invalidate(Scope::SECTION_DEPENDENTS);
        info!(?section, "Section selected");

        if let Some(saved) = self.saved.as_mut() {
            if let Err(e) = saved.remember_section(section) {
                warn!(error = %e, "Failed to save selection");
            }
        }

        if let Some(section) = section {
            let gateway = Arc::clone(&self.gateway);
            self.spawn(
                Scope::Periods,
                Some(section),
                async move { Outcome::Periods(gateway.fetch_periods(section).await) }.boxed(),
            );
        }
        Ok(())
    }

    pub fn select_period(&mut self, period: Option<PeriodId>) -> Result<(), SelectionError> {
        self.store.set_period(period)?;
        self.epochs.invalidate(Scope::PERIOD_DEPENDENTS);
        info!(?period, "Period selected");

        if let Some(saved) = self.saved.as_mut() {
            if let Err(e) = saved.remember_period(period) {
                warn!(error = %e, "Failed to save selection");
            }
        }

        if let Some(period) = period {
            self.fetch_students(period);
            self.fetch_availabilities(period);
            self.fetch_trainings(period);
        }
        Ok(())
    }

    pub fn select_student(&mut self, student: Option<StudentId>) -> Result<(), SelectionError> {
        self.store.set_student(student)?;
        self.epochs.invalidate(&[Scope::StudentDetail]);
        debug!(?student, can_pair = self.store.can_pair(), "Student selected");

        if let (Some(student), Some(period)) = (student, self.store.active_period()) {
            let gateway = Arc::clone(&self.gateway);
            self.spawn(
                Scope::StudentDetail,
                Some(student),
                async move {
                    Outcome::StudentDetail(gateway.fetch_student_summary(student, period).await)
                }
                .boxed(),
            );
        }
        Ok(())
    }

    pub fn select_availability(
        &mut self,
        availability: Option<AvailabilityId>,
    ) -> Result<(), SelectionError> {
        self.store.set_availability(availability)?;
        self.epochs.invalidate(&[Scope::AvailabilityDetail]);
        debug!(?availability, can_pair = self.store.can_pair(), "Availability selected");

        let Some(availability) = availability else {
            return Ok(());
        };

        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            Scope::AvailabilityDetail,
            Some(availability),
            async move {
                Outcome::AvailabilityDetail(gateway.fetch_availability_summary(availability).await)
            }
            .boxed(),
        );

        let corporation = self
            .store
            .active_availability_option()
            .map(|a| a.corporation_id);
        if let Some(corporation) = corporation {
            if self.store.contacts_corporation() == Some(corporation) {
                debug!(corporation, "Contacts already loaded for corporation");
                self.store.select_lone_contact();
            } else {
                self.epochs.invalidate(&[Scope::Contacts]);
                self.store.clear_contacts();
                let gateway = Arc::clone(&self.gateway);
                self.spawn(
                    Scope::Contacts,
                    Some(corporation),
                    async move {
                        Outcome::Contacts(corporation, gateway.fetch_contacts(corporation).await)
                    }
                    .boxed(),
                );
            }
        }
        Ok(())
    }

    pub fn select_contact(&mut self, contact: Option<ContactId>) -> Result<(), SelectionError> {
        self.store.set_contact(contact)
    }

    pub fn select_referent(&mut self, referent: Option<ReferentId>) -> Result<(), SelectionError> {
        self.store.set_referent(referent)
    }

    pub fn filter_students(&mut self, class: &str) {
        self.store.set_student_filter(class);
    }

    pub fn filter_corporations(&mut self, domain: &str) {
        self.store.set_corporation_filter(domain);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Send the pairing of the selected student and availability.
    /// Nothing changes locally until the server accepted it.
    pub fn validate_pairing(&mut self) -> Result<(), SelectionError> {
        let request = self.store.pairing_request()?;
        let generation = self.epochs.period_generation();
        info!(
            student = request.student,
            availability = request.availability,
            referent = ?request.referent,
            "Creating training"
        );

        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            Scope::Mutation,
            Some(request.student),
            async move {
                let result = gateway.create_training(&request).await;
                Outcome::Created {
                    request,
                    generation,
                    result,
                }
            }
            .boxed(),
        );
        Ok(())
    }

    pub fn delete_training(&mut self, training: TrainingId) -> Result<(), SelectionError> {
        let listed = self.store.trainings().is_some_and(|t| t.contains(training));
        if !listed {
            return Err(SelectionError::UnknownTraining(training));
        }
        let generation = self.epochs.period_generation();
        info!(training, "Deleting training");

        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            Scope::Mutation,
            Some(training),
            async move {
                let result = gateway.delete_training(training).await;
                Outcome::Deleted {
                    training,
                    generation,
                    result,
                }
            }
            .boxed(),
        );
        Ok(())
    }

    /// Download the export of the active period
    pub async fn export(&self, non_attributed: bool) -> Result<Vec<u8>> {
        let period = self.store.active_period().ok_or(SelectionError::NoActivePeriod)?;
        let available = if non_attributed {
            self.store.export_non_attributed_available()
        } else {
            self.store.export_available()
        };
        if !available {
            return Err(SelectionError::NothingToExport.into());
        }
        info!(period, non_attributed, "Exporting");
        self.gateway.export_trainings(period, non_attributed).await
    }

    // =========================================================================
    // Fetch issuing
    // =========================================================================

    fn fetch_students(&mut self, period: PeriodId) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            Scope::Students,
            Some(period),
            async move { Outcome::Students(gateway.fetch_students(period).await) }.boxed(),
        );
    }

    fn fetch_availabilities(&mut self, period: PeriodId) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            Scope::Availabilities,
            Some(period),
            async move { Outcome::Availabilities(gateway.fetch_availabilities(period).await) }
                .boxed(),
        );
    }

    fn fetch_trainings(&mut self, period: PeriodId) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            Scope::Trainings,
            Some(period),
            async move { Outcome::Trainings(gateway.fetch_trainings_markup(period).await) }.boxed(),
        );
    }

    /// Spawn a request stamped with the current epoch of `scope`
    fn spawn(&mut self, scope: Scope, key: Option<i64>, request: BoxFuture<'static, Outcome>) {
        let ticket = self.epochs.issue(scope, key);
        let task = self.next_task;
        self.next_task += 1;
        self.pending.insert(task, ticket);
        debug!(task, ?scope, ?key, epoch = ticket.epoch, "Request issued");

        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let outcome = request.await;
            if let Err(e) = tx.send(Completion { task, ticket, outcome }).await {
                error!(error = %e, "Failed to send request result - channel closed");
            }
        });
    }

    // =========================================================================
    // Result processing
    // =========================================================================

    /// Wait for the next result and apply it. Returns false when idle.
    pub async fn apply_next(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        match self.result_rx.recv().await {
            Some(completion) => {
                self.process(completion);
                true
            }
            None => false,
        }
    }

    /// Apply results until no current request is outstanding.
    /// Requests already made stale are not waited for.
    pub async fn settle(&mut self) {
        while self.pending.values().any(|t| self.epochs.is_current(t)) {
            if !self.apply_next().await {
                break;
            }
        }
    }

    /// Apply results until every request answered, stale ones included
    pub async fn drain(&mut self) {
        while self.apply_next().await {}
    }

    fn process(&mut self, completion: Completion) {
        let Completion { task, ticket, outcome } = completion;
        self.pending.remove(&task);

        if !self.epochs.is_current(&ticket) {
            debug!(
                task,
                scope = ?ticket.scope,
                key = ?ticket.key,
                epoch = ticket.epoch,
                "Discarding stale result"
            );
            return;
        }

        match outcome {
            Outcome::Periods(result) => {
                if let Some(periods) = self.check("Periods", result) {
                    debug!(count = periods.len(), "Periods fetched");
                    self.store.apply_periods(periods);
                    self.resume_saved_period();
                }
            }
            Outcome::Students(result) => {
                if let Some(students) = self.check("Students", result) {
                    self.store.apply_students(students);
                    debug!(total = self.store.student_total(), "Students fetched");
                }
            }
            Outcome::Availabilities(result) => {
                if let Some(availabilities) = self.check("Availabilities", result) {
                    self.store.apply_availabilities(availabilities);
                    debug!(total = self.store.corp_total(), "Availabilities fetched");
                }
            }
            Outcome::Trainings(result) => {
                if let Some(markup) = self.check("Trainings", result) {
                    self.store.apply_trainings(TrainingsListing::from_markup(markup));
                }
            }
            Outcome::StudentDetail(result) => {
                if let Some(markup) = self.check("Student summary", result) {
                    self.store.apply_student_detail(markup);
                }
            }
            Outcome::AvailabilityDetail(result) => {
                if let Some(markup) = self.check("Availability summary", result) {
                    self.store.apply_availability_detail(markup);
                }
            }
            Outcome::Contacts(corporation, result) => {
                if let Some(contacts) = self.check("Contacts", result) {
                    debug!(corporation, count = contacts.len(), "Contacts fetched");
                    self.store.apply_contacts(corporation, contacts);
                }
            }
            Outcome::Created {
                request,
                generation,
                result,
            } => self.process_created(request, generation, result),
            Outcome::Deleted {
                training,
                generation,
                result,
            } => self.process_deleted(training, generation, result),
        }
    }

    /// Unwrap a fetch result, turning a failure into a notice
    fn check<T>(&mut self, name: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(data) => Some(data),
            Err(e) => {
                error!(error = %e, "{} fetch failed", name);
                self.notices.push(Notice::Error(format!("{}: {}", name, e)));
                None
            }
        }
    }

    fn resume_saved_period(&mut self) {
        let Some(period) = self.resume_period.take() else {
            return;
        };
        if !self.store.periods().iter().any(|p| p.id == period) {
            debug!(period, "Saved period no longer listed");
            return;
        }
        if let Err(e) = self.select_period(Some(period)) {
            warn!(error = %e, "Failed to resume saved period");
        }
    }

    fn process_created(
        &mut self,
        request: NewTraining,
        generation: u64,
        result: Result<CreateOutcome>,
    ) {
        match result {
            Ok(CreateOutcome::Created) => {
                let lists_current = generation == self.epochs.period_generation();
                info!(
                    student = request.student,
                    availability = request.availability,
                    lists_current,
                    "Training created"
                );
                mutation::apply_created(&mut self.store, &request, lists_current);
                if lists_current {
                    self.epochs.invalidate(&[Scope::StudentDetail, Scope::AvailabilityDetail]);
                    if let Some(period) = self.store.active_period() {
                        self.epochs.invalidate(&[Scope::Trainings]);
                        self.fetch_trainings(period);
                    }
                }
            }
            Ok(CreateOutcome::Rejected(message)) => {
                warn!(message = %message, "Training creation rejected");
                self.notices.push(Notice::Rejected(message));
            }
            Err(e) => {
                error!(error = %e, "Training creation failed");
                self.notices.push(Notice::Error(format!("Training creation: {}", e)));
            }
        }
    }

    fn process_deleted(
        &mut self,
        training: TrainingId,
        generation: u64,
        result: Result<DeletedTraining>,
    ) {
        match result {
            Ok(deleted) => {
                let lists_current = generation == self.epochs.period_generation();
                info!(training, referent = ?deleted.ref_id, lists_current, "Training deleted");
                mutation::apply_deleted(&mut self.store, training, deleted.ref_id, lists_current);
                if lists_current {
                    if let Some(period) = self.store.active_period() {
                        self.epochs.invalidate(Scope::STUDENT_LIST);
                        self.store.clear_students();
                        self.fetch_students(period);

                        self.epochs.invalidate(Scope::AVAILABILITY_LIST);
                        self.store.clear_availabilities();
                        self.fetch_availabilities(period);
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Training deletion failed");
                self.notices.push(Notice::Error(format!("Training deletion: {}", e)));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
