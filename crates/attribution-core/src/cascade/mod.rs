//! Cascade controller for the dependent selection chain.
//!
//! Changing a selection clears everything below it in the store right away,
//! then issues the fetches for the next level. Each fetch runs as its own
//! task and carries a `Ticket` taken when it was issued; its result is
//! applied only if no later change invalidated that ticket in the meantime.

pub mod controller;
pub mod ticket;

#[cfg(test)]
mod fake;

pub use controller::{CascadeController, Notice};
pub use ticket::{Epochs, Scope, Ticket};
