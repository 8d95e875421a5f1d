//! Core library for the training attribution screen.
//!
//! Pairs students with training placements ("availabilities") within a
//! period. The pieces, leaf first:
//!
//! - `api`: the `Gateway` trait and its HTTP client
//! - `store`: `SelectionStore`, the single owner of selections and option lists
//! - `filter`: local class/domain views over the stored lists
//! - `mutation`: count and list updates applied after a confirmed create/delete
//! - `cascade`: `CascadeController`, which invalidates and refetches the
//!   dependent lists and drops results that arrive for an outdated selection
//! - `persist`, `config`: saved selection and application configuration

pub mod api;
pub mod cascade;
pub mod config;
pub mod filter;
pub mod models;
pub mod mutation;
pub mod persist;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError, AttributionScreen, Gateway};
pub use cascade::{CascadeController, Notice};
pub use config::Config;
pub use persist::SavedSelection;
pub use store::{SelectionError, SelectionStore};
