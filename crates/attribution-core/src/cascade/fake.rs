//! In-memory gateway for controller tests.
//!
//! Any call can be held behind a oneshot gate so tests decide the order in
//! which responses arrive, or made to fail like a dropped connection.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::api::{AttributionScreen, Gateway};
use crate::models::{
    AvailabilityId, AvailabilityOption, Contact, CorporationId, CreateOutcome, DeletedTraining,
    NewTraining, Period, PeriodId, ReferentId, SectionId, StudentId, StudentOption, TrainingId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Periods,
    Students,
    Availabilities,
    Trainings,
    StudentSummary,
    AvailabilitySummary,
    Contacts,
    Create,
    Delete,
    Export,
}

#[derive(Default)]
pub struct FakeGateway {
    pub screen: Mutex<AttributionScreen>,
    pub periods: Mutex<HashMap<SectionId, Vec<Period>>>,
    pub students: Mutex<HashMap<PeriodId, Vec<StudentOption>>>,
    pub availabilities: Mutex<HashMap<PeriodId, Vec<AvailabilityOption>>>,
    pub trainings: Mutex<HashMap<PeriodId, String>>,
    pub contacts: Mutex<HashMap<CorporationId, Vec<Contact>>>,
    /// Body returned by `create_training`; `None` means "OK"
    pub create_rejection: Mutex<Option<String>>,
    pub deleted_referents: Mutex<HashMap<TrainingId, Option<ReferentId>>>,
    holds: Mutex<HashMap<(Call, i64), oneshot::Receiver<()>>>,
    failures: Mutex<HashSet<(Call, i64)>>,
    calls: Mutex<Vec<(Call, i64)>>,
}

impl FakeGateway {
    /// Hold the next `call` for `key` until the returned sender fires or drops
    pub fn hold(&self, call: Call, key: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().unwrap().insert((call, key), rx);
        tx
    }

    pub fn fail(&self, call: Call, key: i64) {
        self.failures.lock().unwrap().insert((call, key));
    }

    pub fn calls(&self, call: Call) -> Vec<i64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == call)
            .map(|(_, key)| *key)
            .collect()
    }

    async fn gate(&self, call: Call, key: i64) -> Result<()> {
        self.calls.lock().unwrap().push((call, key));
        let hold = self.holds.lock().unwrap().remove(&(call, key));
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        if self.failures.lock().unwrap().contains(&(call, key)) {
            bail!("connection reset by peer");
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn fetch_screen(&self) -> Result<AttributionScreen> {
        Ok(self.screen.lock().unwrap().clone())
    }

    async fn fetch_periods(&self, section: SectionId) -> Result<Vec<Period>> {
        self.gate(Call::Periods, section).await?;
        Ok(self.periods.lock().unwrap().get(&section).cloned().unwrap_or_default())
    }

    async fn fetch_students(&self, period: PeriodId) -> Result<Vec<StudentOption>> {
        self.gate(Call::Students, period).await?;
        Ok(self.students.lock().unwrap().get(&period).cloned().unwrap_or_default())
    }

    async fn fetch_availabilities(&self, period: PeriodId) -> Result<Vec<AvailabilityOption>> {
        self.gate(Call::Availabilities, period).await?;
        Ok(self
            .availabilities
            .lock()
            .unwrap()
            .get(&period)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_trainings_markup(&self, period: PeriodId) -> Result<String> {
        self.gate(Call::Trainings, period).await?;
        Ok(self.trainings.lock().unwrap().get(&period).cloned().unwrap_or_default())
    }

    async fn fetch_student_summary(&self, student: StudentId, period: PeriodId) -> Result<String> {
        self.gate(Call::StudentSummary, student).await?;
        Ok(format!("<div>student {} in period {}</div>", student, period))
    }

    async fn fetch_availability_summary(&self, availability: AvailabilityId) -> Result<String> {
        self.gate(Call::AvailabilitySummary, availability).await?;
        Ok(format!("<div>availability {}</div>", availability))
    }

    async fn fetch_contacts(&self, corporation: CorporationId) -> Result<Vec<Contact>> {
        self.gate(Call::Contacts, corporation).await?;
        Ok(self.contacts.lock().unwrap().get(&corporation).cloned().unwrap_or_default())
    }

    async fn create_training(&self, request: &NewTraining) -> Result<CreateOutcome> {
        self.gate(Call::Create, request.student).await?;
        if let Some(text) = self.create_rejection.lock().unwrap().clone() {
            return Ok(CreateOutcome::from_body(&text));
        }

        // The server now reports the pair as taken
        for students in self.students.lock().unwrap().values_mut() {
            for s in students.iter_mut().filter(|s| s.id == request.student) {
                s.training_id = Some(1000 + request.student);
            }
        }
        for avails in self.availabilities.lock().unwrap().values_mut() {
            for a in avails.iter_mut().filter(|a| a.id == request.availability) {
                a.free = false;
            }
        }
        Ok(CreateOutcome::Created)
    }

    async fn delete_training(&self, training: TrainingId) -> Result<DeletedTraining> {
        self.gate(Call::Delete, training).await?;
        let ref_id = self
            .deleted_referents
            .lock()
            .unwrap()
            .get(&training)
            .copied()
            .flatten();
        Ok(DeletedTraining { ref_id })
    }

    async fn export_trainings(&self, period: PeriodId, non_attributed: bool) -> Result<Vec<u8>> {
        self.gate(Call::Export, period).await?;
        Ok(format!("export {} {}", period, non_attributed).into_bytes())
    }
}
