//! Job lifecycle states, webhook stage names, and provider result codes.
//!
//! A music job moves forward through `created -> text -> first -> complete`,
//! or to `error` from any state; it never regresses. Status changes are
//! expressed as guarded targeted updates: the caller asks the repository to
//! move a job to `new_status` and passes [`allowed_predecessors`] so the
//! `UPDATE` only fires when the persisted status is still behind the target.

// ---------------------------------------------------------------------------
// Music job statuses
// ---------------------------------------------------------------------------

/// Job row exists, no callback has been processed yet.
pub const STATUS_CREATED: &str = "created";
/// Lyrics and streaming previews are available.
pub const STATUS_TEXT: &str = "text";
/// At least one variant has durable final audio.
pub const STATUS_FIRST: &str = "first";
/// Every variant has durable final audio.
pub const STATUS_COMPLETE: &str = "complete";
/// The provider reported a failure; the job is terminal.
pub const STATUS_ERROR: &str = "error";

/// All valid music job statuses, in lifecycle order.
pub const VALID_JOB_STATUSES: &[&str] = &[
    STATUS_CREATED,
    STATUS_TEXT,
    STATUS_FIRST,
    STATUS_COMPLETE,
    STATUS_ERROR,
];

/// Statuses a job may hold immediately before moving to `target`.
///
/// Returns an empty slice for an unknown target, which makes the guarded
/// `UPDATE ... WHERE status = ANY(...)` a no-op rather than a corruption.
pub fn allowed_predecessors(target: &str) -> &'static [&'static str] {
    match target {
        STATUS_TEXT => &[STATUS_CREATED],
        STATUS_FIRST => &[STATUS_CREATED, STATUS_TEXT],
        STATUS_COMPLETE => &[STATUS_CREATED, STATUS_TEXT, STATUS_FIRST],
        // A provider failure overrides any prior state.
        STATUS_ERROR => &[STATUS_CREATED, STATUS_TEXT, STATUS_FIRST, STATUS_COMPLETE],
        _ => &[],
    }
}

// ---------------------------------------------------------------------------
// Cover job statuses
// ---------------------------------------------------------------------------

/// Cover job submitted to the provider, result pending.
pub const COVER_GENERATING: &str = "generating";
/// Cover images persisted.
pub const COVER_COMPLETE: &str = "complete";
/// The provider reported a cover failure.
pub const COVER_ERROR: &str = "error";

// ---------------------------------------------------------------------------
// Webhook stages
// ---------------------------------------------------------------------------

/// Lyrics + streaming previews, no final audio yet.
pub const STAGE_TEXT: &str = "text";
/// First variant(s) carrying final audio.
pub const STAGE_FIRST: &str = "first";
/// All variants carrying final audio.
pub const STAGE_COMPLETE: &str = "complete";

// ---------------------------------------------------------------------------
// Provider result codes
// ---------------------------------------------------------------------------

/// The provider's success code; anything else is the failure family.
pub const CODE_SUCCESS: i64 = 200;

/// Classification of a non-success provider result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 400: the provider considers this request a duplicate/conflict.
    DuplicateConflict,
    /// 501: the generation itself failed.
    GenerationFailed,
    /// 531: provider-side server error, credits are refunded.
    ServerError,
    /// Any other non-200 code.
    Other,
}

impl FailureKind {
    /// Classify a provider result code. Must not be called with 200.
    pub fn classify(code: i64) -> Self {
        match code {
            400 => FailureKind::DuplicateConflict,
            501 => FailureKind::GenerationFailed,
            531 => FailureKind::ServerError,
            _ => FailureKind::Other,
        }
    }

    /// Short tag stored on generation error records.
    pub fn error_tag(self) -> &'static str {
        match self {
            FailureKind::DuplicateConflict => "duplicate",
            FailureKind::GenerationFailed => "generation_failed",
            FailureKind::ServerError => "server_error",
            FailureKind::Other => "provider_error",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_follows_created() {
        assert_eq!(allowed_predecessors(STATUS_TEXT), &[STATUS_CREATED]);
    }

    #[test]
    fn complete_never_follows_complete() {
        assert!(!allowed_predecessors(STATUS_COMPLETE).contains(&STATUS_COMPLETE));
    }

    #[test]
    fn error_is_reachable_from_every_non_error_state() {
        let preds = allowed_predecessors(STATUS_ERROR);
        for status in [STATUS_CREATED, STATUS_TEXT, STATUS_FIRST, STATUS_COMPLETE] {
            assert!(preds.contains(&status), "{status} should precede error");
        }
        assert!(!preds.contains(&STATUS_ERROR));
    }

    #[test]
    fn unknown_target_has_no_predecessors() {
        assert!(allowed_predecessors("bogus").is_empty());
    }

    #[test]
    fn first_cannot_regress_to_text() {
        // "first" is not an allowed predecessor target for "text".
        assert!(!allowed_predecessors(STATUS_TEXT).contains(&STATUS_FIRST));
    }

    #[test]
    fn classify_known_failure_codes() {
        assert_eq!(FailureKind::classify(400), FailureKind::DuplicateConflict);
        assert_eq!(FailureKind::classify(501), FailureKind::GenerationFailed);
        assert_eq!(FailureKind::classify(531), FailureKind::ServerError);
        assert_eq!(FailureKind::classify(500), FailureKind::Other);
        assert_eq!(FailureKind::classify(-1), FailureKind::Other);
    }

    #[test]
    fn error_tags_are_stable() {
        assert_eq!(FailureKind::ServerError.error_tag(), "server_error");
        assert_eq!(FailureKind::Other.error_tag(), "provider_error");
    }
}
