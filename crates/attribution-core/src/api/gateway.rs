use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    AvailabilityId, AvailabilityOption, Contact, CorporationId, CreateOutcome, DeletedTraining,
    NewTraining, Period, PeriodId, SectionId, StudentId, StudentOption, TrainingId,
};

use super::AttributionScreen;

/// Read and write operations the cascade controller needs from the server.
///
/// Reads are idempotent. Only `create_training` and `delete_training`
/// change server state; neither is retried by callers.
#[async_trait]
pub trait Gateway: Send + Sync + 'static {
    /// Load the screen itself: sections, referents and the CSRF token.
    async fn fetch_screen(&self) -> Result<AttributionScreen>;

    async fn fetch_periods(&self, section: SectionId) -> Result<Vec<Period>>;

    async fn fetch_students(&self, period: PeriodId) -> Result<Vec<StudentOption>>;

    async fn fetch_availabilities(&self, period: PeriodId) -> Result<Vec<AvailabilityOption>>;

    /// Server-rendered trainings list for the period.
    async fn fetch_trainings_markup(&self, period: PeriodId) -> Result<String>;

    async fn fetch_student_summary(&self, student: StudentId, period: PeriodId) -> Result<String>;

    async fn fetch_availability_summary(&self, availability: AvailabilityId) -> Result<String>;

    async fn fetch_contacts(&self, corporation: CorporationId) -> Result<Vec<Contact>>;

    async fn create_training(&self, request: &NewTraining) -> Result<CreateOutcome>;

    async fn delete_training(&self, training: TrainingId) -> Result<DeletedTraining>;

    /// Spreadsheet export of the period's trainings, or of its
    /// non-attributed availabilities when `non_attributed` is set.
    async fn export_trainings(&self, period: PeriodId, non_attributed: bool) -> Result<Vec<u8>>;
}
