//! Domain logic for the song generation callback orchestrator.
//!
//! Everything in this crate is pure: no I/O, no database handles, no HTTP.
//! The api crate drives these rules from its stage processors; the db crate
//! uses the status tables to keep job lifecycles forward-only.

pub mod credits;
pub mod error;
pub mod lyrics;
pub mod naming;
pub mod stage;
pub mod types;
