//! HTTP handlers, one module per audience.
//!
//! - [`requests`]: public guest endpoints (submit, queue, position)
//! - [`admin`]: operator endpoints (triage, bulk, delete, history, stats)
//! - [`health`]: liveness

pub mod admin;
pub mod health;
pub mod requests;
