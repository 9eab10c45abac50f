//! HTTP surface and orchestration core for song generation callbacks.
//!
//! The provider pushes webhooks at the routes in [`routes`]; handlers in
//! [`handlers`] validate, dedup, and acknowledge fast, then hand the body
//! to the dispatcher in [`callbacks`], where the stage processors drive
//! the generation ledger, media relocation, refunds, and cover jobs.

pub mod callbacks;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
