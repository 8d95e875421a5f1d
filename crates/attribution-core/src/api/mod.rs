//! Remote data gateway for the attribution screen.
//!
//! This module provides the `Gateway` trait used by the cascade controller
//! and `ApiClient`, its HTTP implementation against the school server's
//! AJAX endpoints. State-changing requests carry the page's CSRF token
//! as an opaque pass-through value.

pub mod client;
pub mod error;
pub mod gateway;
pub mod screen;

pub use client::ApiClient;
pub use error::ApiError;
pub use gateway::Gateway;
pub use screen::AttributionScreen;
