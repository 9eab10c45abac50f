//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope per project
//! conventions. Use [`DataResponse`] instead of ad-hoc
//! `serde_json::json!({ "data": ... })` to get compile-time type safety
//! and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Minimal webhook acknowledgement body.
///
/// Returned from callback endpoints both for fresh deliveries and for
/// recognized duplicates; the provider only cares about the 200.
#[derive(Debug, Serialize)]
pub struct CallbackAck {
    pub status: &'static str,
}

impl CallbackAck {
    /// Delivery accepted and queued for processing.
    pub fn received() -> Self {
        Self { status: "received" }
    }

    /// Delivery already seen; no reprocessing happened.
    pub fn duplicate() -> Self {
        Self { status: "duplicate" }
    }
}
