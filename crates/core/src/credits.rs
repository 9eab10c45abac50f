//! Credit ledger constants shared by the compensator and its repository.

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Transaction types
// ---------------------------------------------------------------------------

/// Debit recorded when a generation is requested.
pub const TX_SPEND: &str = "spend";
/// Credit returned after a failed generation.
pub const TX_REFUND: &str = "refund";
/// Promotional credit grant.
pub const TX_BONUS: &str = "bonus";

// ---------------------------------------------------------------------------
// Reference types
// ---------------------------------------------------------------------------

/// `reference_type` linking a transaction to a music generation job.
pub const REFERENCE_GENERATION: &str = "generation";

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// Refund amount used when no spend transaction references the failed job.
///
/// Matches the cheapest generation tier. The compensator logs a warning
/// whenever this fallback is taken, because the true debited amount could
/// not be determined from the ledger.
pub const DEFAULT_GENERATION_COST: i64 = 5;

/// Sentinel user id for jobs whose owner cannot be resolved.
pub const ANONYMOUS_USER_ID: DbId = 0;
