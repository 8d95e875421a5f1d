//! Data models for the attribution screen.
//!
//! This module contains the structures exchanged with the server and held
//! by the selection store:
//!
//! - `Section`, `Period`: the two root levels of the selection chain
//! - `StudentOption`: a student listed for a period
//! - `AvailabilityOption`, `Contact`: corporation slots and their contacts
//! - `Referent`: supervising teacher with a running assignment count
//! - Training types: `NewTraining`, `CreateOutcome`, `DeletedTraining`, `TrainingsListing`

pub mod availability;
pub mod referent;
pub mod section;
pub mod student;
pub mod training;

pub use availability::{AvailabilityOption, Contact};
pub use referent::Referent;
pub use section::{Period, Section};
pub use student::StudentOption;
pub use training::{CreateOutcome, DeletedTraining, NewTraining, TrainingsListing};

pub type SectionId = i64;
pub type PeriodId = i64;
pub type StudentId = i64;
pub type AvailabilityId = i64;
pub type CorporationId = i64;
pub type ContactId = i64;
pub type ReferentId = i64;
pub type TrainingId = i64;
