//! Request handlers for the callback surface.
//!
//! Each submodule owns one endpoint family. Handlers validate the body,
//! dedup via the idempotency guard, enqueue the work, and acknowledge —
//! never performing database writes or provider calls on the request path.

pub mod cover_callback;
pub mod cover_result;
pub mod music_callback;
