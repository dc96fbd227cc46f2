//! Fetches per-card transaction records from the AP EPOS portal and
//! reconciles them into a flat JSON ledger.
//!
//! Pipeline: card numbers -> page fetch -> table location -> row parsing ->
//! reconciliation -> persisted store. The fetch stage runs with bounded
//! concurrency; parsing is pure; all store mutation happens on the
//! coordinator task.

pub mod config;
pub mod fetch;
pub mod portal;
pub mod reconcile;
pub mod registry;
pub mod store;
pub mod sync;
pub mod types;
