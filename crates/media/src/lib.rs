//! Durable media relocation.
//!
//! The generation provider hosts audio and images on ephemeral URLs that
//! expire. [`relocator::HttpRelocator`] copies those bytes into storage we
//! control: download via `reqwest`, upload via a [`store::BlobStore`]
//! (S3 in production, in-memory for tests and local development), and
//! return the stable public URL.

pub mod relocator;
pub mod store;

pub use relocator::{HttpRelocator, RelocateError, Relocator};
pub use store::{BlobStore, MemoryBlobStore, S3BlobStore, StoreError};
