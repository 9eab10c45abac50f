//! Wire contract and outbound client for the song generation provider.
//!
//! `messages` holds the typed webhook bodies the provider POSTs to us;
//! `client` holds the [`client::CoverService`] seam and the HTTP client the
//! cover trigger uses to request cover generation.

pub mod client;
pub mod messages;

pub use client::{CoverService, HttpProviderClient, ProviderError};
pub use messages::{CoverCallback, MusicCallback, TrackVariant};
